//! Output formatting and persistence for cohorts and rankings.
//!
//! Supports text reports, pretty-printing, JSON serialization, and CSV append.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analyzers::ranking::CourseRank;
use crate::model::{Cohort, Course, Student};

const RULE: &str = "===============================================";

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line of a ranking export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub generated_at: DateTime<Utc>,
    pub rank: usize,
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Ranked course, or `None` for the overall ranking.
    pub course: Option<String>,
    pub average: f64,
}

impl RankingRow {
    /// Rows for an overall ranking, numbered from 1.
    pub fn from_overall(ranked: &[&Student]) -> Vec<Self> {
        let now = Utc::now();
        ranked
            .iter()
            .enumerate()
            .map(|(i, s)| Self::new(now, i + 1, s, None, s.average))
            .collect()
    }

    /// Rows for a per-course ranking, numbered from 1.
    pub fn from_course(course: &str, ranked: &[CourseRank<'_>]) -> Vec<Self> {
        let now = Utc::now();
        ranked
            .iter()
            .enumerate()
            .map(|(i, r)| Self::new(now, i + 1, r.student, Some(course), r.average))
            .collect()
    }

    fn new(
        generated_at: DateTime<Utc>,
        rank: usize,
        student: &Student,
        course: Option<&str>,
        average: f64,
    ) -> Self {
        Self {
            generated_at,
            rank,
            student_id: student.id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            course: course.map(str::to_string),
            average,
        }
    }
}

/// Appends [`RankingRow`] records to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_rankings(path: &str, rows: &[RankingRow]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV rankings");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    // an existing file already starts with the header row
    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

const STRING_WRITE: &str = "writing to a String cannot fail";

pub fn render_student_info(student: &Student) -> String {
    let mut out = String::new();
    write_student_info(&mut out, student).expect(STRING_WRITE);
    out
}

/// Full listing: every student with every course and grade.
pub fn render_cohort(cohort: &Cohort) -> String {
    let mut out = String::new();
    write_cohort(&mut out, cohort).expect(STRING_WRITE);
    out
}

/// Students already in ranking order, under a "TOP n" banner.
pub fn render_top_students(ranked: &[&Student]) -> String {
    let mut out = String::new();
    write_top_students(&mut out, ranked).expect(STRING_WRITE);
    out
}

/// The best students of one course with their course average.
pub fn render_course_podium(course: &str, ranks: &[CourseRank<'_>]) -> String {
    let mut out = String::new();
    write_course_podium(&mut out, course, ranks).expect(STRING_WRITE);
    out
}

fn write_student_info(out: &mut impl fmt::Write, student: &Student) -> fmt::Result {
    writeln!(out, "  ========================================")?;
    writeln!(out, "  Student ID: {}", student.id)?;
    writeln!(out, "  Name: {}", student.full_name())?;
    writeln!(out, "  Age: {} years old", student.age)?;
    writeln!(out, "  Overall Average: {:.2}", student.average)?;
    writeln!(out, "  Number of Courses: {}", student.courses.len())?;
    writeln!(out, "  ========================================")
}

fn write_course(out: &mut impl fmt::Write, course: &Course) -> fmt::Result {
    writeln!(
        out,
        "    - {} (Coef: {:.2}, Avg: {:.2}, {} grades)",
        course.name,
        course.coefficient,
        course.average,
        course.grades.len()
    )?;

    if course.grades.is_empty() {
        return writeln!(out, "      No grades available");
    }

    let grades: Vec<String> = course
        .grades
        .as_slice()
        .iter()
        .map(|g| format!("{g:.2}"))
        .collect();
    writeln!(
        out,
        "      Grades ({}): {}",
        course.grades.len(),
        grades.join("; ")
    )
}

fn write_banner(out: &mut impl fmt::Write, title: &str) -> fmt::Result {
    writeln!(out, "{RULE}")?;
    writeln!(out, "          {title}")?;
    writeln!(out, "{RULE}")
}

fn write_cohort(out: &mut impl fmt::Write, cohort: &Cohort) -> fmt::Result {
    write_banner(out, "PROMOTION INFORMATION")?;
    writeln!(out, "Total Students: {}", cohort.len())?;
    writeln!(out, "{RULE}")?;

    if cohort.is_empty() {
        writeln!(out, "\nNo students in this promotion")?;
        return writeln!(out, "{RULE}");
    }

    let total = cohort.len();
    for (i, student) in cohort.students.iter().enumerate() {
        writeln!(out, "\n[Student {}/{}]", i + 1, total)?;
        write_student_info(out, student)?;

        if student.courses.is_empty() {
            writeln!(out, "  No courses enrolled")?;
            continue;
        }

        writeln!(out, "\n  Courses Details:")?;
        let course_total = student.courses.len();
        for (j, course) in student.courses.iter().enumerate() {
            writeln!(out, "\n  [Course {}/{}]", j + 1, course_total)?;
            write_course(out, course)?;
        }
    }

    writeln!(out)?;
    write_banner(out, "END OF PROMOTION DATA")
}

fn write_top_students(out: &mut impl fmt::Write, ranked: &[&Student]) -> fmt::Result {
    write_banner(out, &format!("TOP {} STUDENTS BY PROMOTION", ranked.len()))?;

    if ranked.is_empty() {
        writeln!(out, "\nNo students")?;
        return writeln!(out, "{RULE}");
    }

    for (i, student) in ranked.iter().enumerate() {
        writeln!(out, "\n[Top Student {}/{}]", i + 1, ranked.len())?;
        write_student_info(out, student)?;
    }

    writeln!(out)?;
    write_banner(out, "END OF TOP STUDENTS DATA")
}

fn write_course_podium(
    out: &mut impl fmt::Write,
    course: &str,
    ranks: &[CourseRank<'_>],
) -> fmt::Result {
    write_banner(out, &format!("TOP {} STUDENTS IN {}", ranks.len(), course))?;

    for (i, rank) in ranks.iter().enumerate() {
        writeln!(out, "\n[Top Student {}/{}]", i + 1, ranks.len())?;
        if rank.has_course {
            writeln!(out, "Grade in {}: {:.2}", course, rank.average)?;
        } else {
            writeln!(out, "Grade in {}: not enrolled", course)?;
        }
        write_student_info(out, rank.student)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::averages::recompute_averages;
    use crate::analyzers::ranking::{rank_by_course, rank_by_overall_average};
    use std::fs;

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&create_cohort());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&create_cohort()).unwrap();
    }

    #[test]
    fn test_append_rankings_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rankings.csv");
        let path = path.to_str().unwrap();

        let cohort = create_cohort();
        let rows = RankingRow::from_overall(&rank_by_overall_average(&cohort));
        append_rankings(path, &rows).unwrap();
        append_rankings(path, &rows).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 appends of 2 rows
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_ranking_rows_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("math.csv");
        let path = path.to_str().unwrap();

        let cohort = create_cohort();
        let podium = rank_by_course(&cohort, "Math").unwrap();
        append_rankings(path, &RankingRow::from_course("Math", &podium)).unwrap();

        let mut reader = csv::Reader::from_path(path).unwrap();
        let rows: Vec<RankingRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].student_id, 2);
        assert_eq!(rows[0].course.as_deref(), Some("Math"));
        assert_eq!(rows[0].average, 18.0);
    }

    #[test]
    fn test_render_cohort_lists_grades() {
        let text = render_cohort(&create_cohort());
        assert!(text.contains("Total Students: 2"));
        assert!(text.contains("Name: Jane Doe"));
        assert!(text.contains("- Math (Coef: 2.00, Avg: 12.00, 2 grades)"));
        assert!(text.contains("Grades (2): 10.00; 14.00"));
        assert!(text.contains("No grades available"));
    }

    #[test]
    fn test_render_student_info_block() {
        let cohort = create_cohort();
        let text = render_student_info(cohort.student(1).unwrap());
        let expected = "\
  ========================================
  Student ID: 1
  Name: Jane Doe
  Age: 20 years old
  Overall Average: 8.00
  Number of Courses: 2
  ========================================
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_cohort_closes_with_banner() {
        let text = render_cohort(&create_cohort());
        assert!(text.starts_with(&format!("{RULE}\n          PROMOTION INFORMATION\n")));
        assert!(text.ends_with(&format!("\n\n{RULE}\n          END OF PROMOTION DATA\n{RULE}\n")));
    }

    #[test]
    fn test_render_empty_cohort() {
        let text = render_cohort(&Cohort::new());
        assert!(text.contains("No students in this promotion"));
    }

    #[test]
    fn test_render_top_and_podium() {
        let cohort = create_cohort();
        let top = render_top_students(&rank_by_overall_average(&cohort));
        assert!(top.contains("TOP 2 STUDENTS BY PROMOTION"));
        assert!(top.find("Student ID: 2").unwrap() < top.find("Student ID: 1").unwrap());

        let podium = render_course_podium("Art", &rank_by_course(&cohort, "Art").unwrap());
        assert!(podium.contains("Grade in Art: not enrolled"));
    }

    // Helper functions for tests
    fn create_cohort() -> Cohort {
        let mut jane = Student::new(1, "Jane", "Doe", 20);
        let mut math = Course::new("Math", 2.0);
        math.grades.push(10.0);
        math.grades.push(14.0);
        jane.courses.push(math);
        jane.courses.push(Course::new("Physics", 1.0));

        let mut john = Student::new(2, "John", "Smith", 22);
        let mut math = Course::new("Math", 2.0);
        math.grades.push(18.0);
        john.courses.push(math);

        let mut cohort = Cohort {
            students: vec![jane, john],
        };
        recompute_averages(&mut cohort);
        cohort
    }
}
