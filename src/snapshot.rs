//! Binary snapshot of a whole cohort.
//!
//! Layout, all numbers little-endian:
//!
//! ```text
//! u32 student_count
//! per student:
//!     i32 id, i32 age, f64 average, u32 course_count,
//!     string last_name, string first_name,
//!     per course:
//!         f64 coefficient, f64 average, string name,
//!         u32 grade_count, f64 grades[grade_count]
//! string := u32 len (counting a trailing NUL), UTF-8 bytes, NUL
//! ```
//!
//! Files whose name ends in `.gz` are gzip-compressed.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::error::SnapshotError;
use crate::model::{Cohort, Course, Grades, Student};

/// Serializes `cohort` into the snapshot layout.
///
/// # Errors
///
/// Fails only if a count or string length exceeds `u32::MAX`.
pub fn encode(cohort: &Cohort) -> Result<Bytes, SnapshotError> {
    let mut buf = BytesMut::new();

    buf.put_u32_le(count(cohort.students.len(), "student count")?);
    for student in &cohort.students {
        buf.put_i32_le(student.id);
        buf.put_i32_le(student.age);
        buf.put_f64_le(student.average);
        buf.put_u32_le(count(student.courses.len(), "course count")?);
        put_string(&mut buf, &student.last_name)?;
        put_string(&mut buf, &student.first_name)?;

        for course in &student.courses {
            buf.put_f64_le(course.coefficient);
            buf.put_f64_le(course.average);
            put_string(&mut buf, &course.name)?;
            buf.put_u32_le(count(course.grades.len(), "grade count")?);
            for &grade in course.grades.as_slice() {
                buf.put_f64_le(grade);
            }
        }
    }

    Ok(buf.freeze())
}

/// Reads a cohort back from the snapshot layout.
///
/// Stored averages are restored as written; call
/// [`recompute_averages`](crate::analyzers::averages::recompute_averages) to
/// derive them from the grades instead.
///
/// # Errors
///
/// Returns [`SnapshotError::Truncated`] when the input ends early and
/// [`SnapshotError::InvalidString`] for malformed strings.
pub fn decode<B: Buf>(mut buf: B) -> Result<Cohort, SnapshotError> {
    let student_count = get_u32(&mut buf)? as usize;
    let mut students = Vec::with_capacity(student_count.min(buf.remaining()));

    for _ in 0..student_count {
        let id = get_i32(&mut buf)?;
        let age = get_i32(&mut buf)?;
        let average = get_f64(&mut buf)?;
        let course_count = get_u32(&mut buf)? as usize;
        let last_name = get_string(&mut buf)?;
        let first_name = get_string(&mut buf)?;

        let mut courses = Vec::with_capacity(course_count.min(buf.remaining()));
        for _ in 0..course_count {
            let coefficient = get_f64(&mut buf)?;
            let course_average = get_f64(&mut buf)?;
            let name = get_string(&mut buf)?;
            let grade_count = get_u32(&mut buf)? as usize;

            let mut grades = Vec::with_capacity(grade_count.min(buf.remaining() / 8));
            for _ in 0..grade_count {
                grades.push(get_f64(&mut buf)?);
            }

            courses.push(Course {
                name,
                coefficient,
                grades: Grades(grades),
                average: course_average,
            });
        }

        students.push(Student {
            id,
            last_name,
            first_name,
            age,
            courses,
            average,
        });
    }

    if buf.has_remaining() {
        debug!(trailing = buf.remaining(), "Ignoring bytes after snapshot");
    }

    Ok(Cohort { students })
}

/// Writes `cohort` to `path`, gzip-compressed when the name ends in `.gz`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), students = cohort.len()))]
pub fn save(path: impl AsRef<Path>, cohort: &Cohort) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let encoded = encode(cohort)?;

    let body = if is_gzip(path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        encoder.finish()?
    } else {
        encoded.to_vec()
    };

    fs::write(path, &body)?;
    info!(bytes = body.len(), "Snapshot saved");
    Ok(())
}

/// Reads a cohort written by [`save`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<Cohort, SnapshotError> {
    let path = path.as_ref();
    let raw = fs::read(path)?;

    let bytes = if is_gzip(path) {
        let mut decoded = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded)?;
        decoded
    } else {
        raw
    };

    let cohort = decode(bytes.as_slice())?;
    info!(students = cohort.len(), "Snapshot loaded");
    Ok(cohort)
}

/// True for snapshot paths such as `promotion.bin.gz`.
pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn count(len: usize, what: &'static str) -> Result<u32, SnapshotError> {
    u32::try_from(len).map_err(|_| SnapshotError::TooLarge(what))
}

fn put_string(buf: &mut BytesMut, value: &str) -> Result<(), SnapshotError> {
    buf.put_u32_le(count(value.len() + 1, "string length")?);
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
    Ok(())
}

fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<(), SnapshotError> {
    if buf.remaining() < needed {
        return Err(SnapshotError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

fn get_u32<B: Buf>(buf: &mut B) -> Result<u32, SnapshotError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn get_i32<B: Buf>(buf: &mut B) -> Result<i32, SnapshotError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32_le())
}

fn get_f64<B: Buf>(buf: &mut B) -> Result<f64, SnapshotError> {
    ensure(buf, 8)?;
    Ok(buf.get_f64_le())
}

fn get_string<B: Buf>(buf: &mut B) -> Result<String, SnapshotError> {
    let len = get_u32(buf)? as usize;
    if len == 0 {
        return Err(SnapshotError::InvalidString("zero length".to_string()));
    }
    ensure(buf, len)?;

    let raw = buf.copy_to_bytes(len);
    let (terminator, text) = raw
        .split_last()
        .ok_or_else(|| SnapshotError::InvalidString("zero length".to_string()))?;
    if *terminator != 0 {
        return Err(SnapshotError::InvalidString("missing NUL terminator".to_string()));
    }

    String::from_utf8(text.to_vec()).map_err(|e| SnapshotError::InvalidString(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::averages::recompute_averages;

    #[test]
    fn test_empty_cohort_is_four_bytes() {
        let encoded = encode(&Cohort::new()).unwrap();
        assert_eq!(&encoded[..], &[0u8, 0, 0, 0]);
        assert_eq!(decode(encoded).unwrap(), Cohort::new());
    }

    #[test]
    fn test_string_layout_counts_terminator() {
        let mut cohort = Cohort::new();
        cohort.students.push(Student::new(1, "Al", "Bo", 20));
        let encoded = encode(&cohort).unwrap();

        // count, id, age, average, course count
        let name_at = 4 + 4 + 4 + 8 + 4;
        assert_eq!(&encoded[name_at..name_at + 4], &3u32.to_le_bytes());
        assert_eq!(&encoded[name_at + 4..name_at + 7], b"Bo\0");
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let cohort = sample_cohort();
        let decoded = decode(encode(&cohort).unwrap()).unwrap();
        assert_eq!(decoded, cohort);

        let mut recomputed = decoded.clone();
        recompute_averages(&mut recomputed);
        assert_eq!(recomputed, cohort);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let encoded = encode(&sample_cohort()).unwrap();
        for cut in [0, 3, 10, encoded.len() - 1] {
            let err = decode(&encoded[..cut]).unwrap_err();
            assert!(matches!(err, SnapshotError::Truncated { .. }), "cut at {cut}");
        }
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1);
        buf.put_i32_le(1);
        buf.put_i32_le(20);
        buf.put_f64_le(0.0);
        buf.put_u32_le(0);
        buf.put_u32_le(2);
        buf.put_slice(b"Bo");

        let err = decode(buf.freeze()).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidString(_)));
    }

    #[test]
    fn test_save_and_load_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let cohort = sample_cohort();

        for name in ["promotion.bin", "promotion.bin.gz"] {
            let path = dir.path().join(name);
            save(&path, &cohort).unwrap();
            assert_eq!(load(&path).unwrap(), cohort);
        }
    }

    #[test]
    fn test_gzip_detection() {
        assert!(is_gzip(Path::new("out/promotion.bin.gz")));
        assert!(!is_gzip(Path::new("promotion.bin")));
    }

    // Helper functions for tests
    fn sample_cohort() -> Cohort {
        let mut jane = Student::new(1, "Jane", "Doe", 20);
        let mut math = Course::new("Mathématiques", 2.0);
        math.grades.push(10.0);
        math.grades.push(13.5);
        jane.courses.push(math);
        jane.courses.push(Course::new("Physique", 1.0));

        let mut cohort = Cohort {
            students: vec![jane, Student::new(2, "John", "Smith", 22)],
        };
        recompute_averages(&mut cohort);
        cohort
    }
}
