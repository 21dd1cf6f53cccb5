//! Record parsers for the `;`-delimited data rows of a cohort file.
//!
//! Every record kind has a strict parser returning a [`RecordError`] and a
//! `salvage_*` counterpart that extracts what it can, scanf-style, and falls
//! back to zero for numbers it cannot read.

use crate::error::RecordError;
use crate::model::{Course, Student};

/// A `studentId;courseName;grade` row, not yet attached to any student.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub student_id: i32,
    pub course_name: String,
    pub grade: f64,
}

/// Parses `id;firstName;lastName;age`.
///
/// # Errors
///
/// Fails unless the line has exactly four fields, both names are non-empty and
/// `id`/`age` are integers.
pub fn parse_student(line: &str) -> Result<Student, RecordError> {
    let fields = split_exact(line, 4)?;

    let id = parse_int("id", fields[0])?;
    let first_name = non_empty("first_name", fields[1])?;
    let last_name = non_empty("last_name", fields[2])?;
    let age = parse_int("age", fields[3])?;

    Ok(Student::new(id, first_name, last_name, age))
}

/// Parses `courseName;coefficient`, splitting on the first `;` only.
///
/// # Errors
///
/// Fails when there is no `;`, the name is empty or the coefficient is not a
/// finite number.
pub fn parse_course(line: &str) -> Result<Course, RecordError> {
    let (name, coefficient) = line
        .split_once(';')
        .ok_or(RecordError::FieldCount {
            expected: 2,
            found: 1,
        })?;

    let name = non_empty("name", name)?;
    let coefficient = parse_number("coefficient", coefficient)?;

    Ok(Course::new(name, coefficient))
}

/// Parses `studentId;courseName;grade`.
pub fn parse_grade(line: &str) -> Result<GradeRecord, RecordError> {
    let fields = split_exact(line, 3)?;

    Ok(GradeRecord {
        student_id: parse_int("student_id", fields[0])?,
        course_name: non_empty("course", fields[1])?.to_string(),
        grade: parse_number("grade", fields[2])?,
    })
}

/// Best-effort student: missing text becomes empty, unreadable numbers 0.
pub fn salvage_student(line: &str) -> Student {
    let mut fields = line.split(';');
    let mut next = || fields.next().unwrap_or("");

    let id = leading_int(next()).unwrap_or(0);
    let first_name = next().to_string();
    let last_name = next().to_string();
    let age = leading_int(next()).unwrap_or(0);

    Student::new(id, first_name, last_name, age)
}

/// Best-effort course: everything before the first `;` is the name.
pub fn salvage_course(line: &str) -> Course {
    let (name, rest) = line.split_once(';').unwrap_or((line, ""));
    Course::new(name, leading_float(rest).unwrap_or(0.0))
}

/// Best-effort grade row, or `None` when the three values cannot be read.
///
/// The id must be a whole integer field and the grade needs a numeric
/// prefix; anything after the grade is ignored.
pub fn salvage_grade(line: &str) -> Option<GradeRecord> {
    let mut fields = line.splitn(3, ';');
    let id_field = fields.next()?;
    let course_name = fields.next().filter(|c| !c.is_empty())?;
    let grade = leading_float(fields.next()?)?;

    let id_digits = numeric_prefix(id_field, false);
    if id_digits.len() != id_field.trim_start().len() {
        return None;
    }

    Some(GradeRecord {
        student_id: id_digits.parse().ok()?,
        course_name: course_name.to_string(),
        grade,
    })
}

fn split_exact(line: &str, expected: usize) -> Result<Vec<&str>, RecordError> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() != expected {
        return Err(RecordError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RecordError> {
    if value.trim().is_empty() {
        Err(RecordError::EmptyField { field })
    } else {
        Ok(value)
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i32, RecordError> {
    value
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, RecordError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn leading_int(value: &str) -> Option<i32> {
    numeric_prefix(value, false).parse().ok()
}

fn leading_float(value: &str) -> Option<f64> {
    numeric_prefix(value, true)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Longest prefix (after leading whitespace) that reads as a decimal number.
fn numeric_prefix(value: &str, fractional: bool) -> &str {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if fractional {
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            if has_digits || frac_end > end + 1 {
                has_digits = true;
                end = frac_end;
            }
        }

        if has_digits && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_end = digits_from(exp);
            if exp_end > exp {
                end = exp_end;
            }
        }
    }

    if has_digits { &value[..end] } else { "" }
}
