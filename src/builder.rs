//! Cohort construction from the three-section text format.
//!
//! [`CohortBuilder`] encodes the build order in its type: students are
//! enrolled first, then every course is attached to every student, then
//! grades are recorded, and only then can the averaged [`Cohort`] be taken
//! out. [`load_cohort`] drives the builder from a text source.

use std::collections::HashMap;
use std::io::BufRead;
use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyzers::averages::recompute_averages;
use crate::config::{LoadOptions, ParsePolicy};
use crate::error::{BuildError, LoadError, RecordError, Section};
use crate::input::{LineReader, seek_section};
use crate::model::{Cohort, Course, Student};
use crate::parser::{
    GradeRecord, parse_course, parse_grade, parse_student, salvage_course, salvage_grade,
    salvage_student,
};

/// Builder stage: students may be added.
pub struct Enrolling;
/// Builder stage: courses are attached to every enrolled student.
pub struct Attaching;
/// Builder stage: grades are recorded against (student, course) pairs.
pub struct Grading;

pub struct CohortBuilder<Stage> {
    students: Vec<Student>,
    by_id: HashMap<i32, usize>,
    // per student, course name -> position of its first occurrence
    course_index: Vec<HashMap<String, usize>>,
    _stage: PhantomData<Stage>,
}

/// What happened to a grade handed to [`CohortBuilder::add_grade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    Attached,
    UnknownStudent,
    UnknownCourse,
}

impl<Stage> CohortBuilder<Stage> {
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    fn advance<Next>(self) -> CohortBuilder<Next> {
        CohortBuilder {
            students: self.students,
            by_id: self.by_id,
            course_index: self.course_index,
            _stage: PhantomData,
        }
    }
}

impl Default for CohortBuilder<Enrolling> {
    fn default() -> Self {
        Self::new()
    }
}

impl CohortBuilder<Enrolling> {
    pub fn new() -> Self {
        Self {
            students: Vec::new(),
            by_id: HashMap::new(),
            course_index: Vec::new(),
            _stage: PhantomData,
        }
    }

    /// Enrolls a student at the end of the cohort.
    ///
    /// # Errors
    ///
    /// Rejects a student whose id is already enrolled; the first one stays.
    pub fn add_student(&mut self, student: Student) -> Result<(), BuildError> {
        if self.by_id.contains_key(&student.id) {
            return Err(BuildError::DuplicateStudent(student.id));
        }

        let mut index = HashMap::new();
        for (position, course) in student.courses.iter().enumerate() {
            index.entry(course.name.clone()).or_insert(position);
        }

        self.by_id.insert(student.id, self.students.len());
        self.course_index.push(index);
        self.students.push(student);
        Ok(())
    }

    pub fn attach_courses(self) -> CohortBuilder<Attaching> {
        self.advance()
    }
}

impl CohortBuilder<Attaching> {
    /// Appends a copy of `course` to every enrolled student.
    pub fn add_course(&mut self, course: &Course) {
        for (student, index) in self.students.iter_mut().zip(&mut self.course_index) {
            index
                .entry(course.name.clone())
                .or_insert(student.courses.len());
            student.courses.push(course.clone());
        }
    }

    pub fn record_grades(self) -> CohortBuilder<Grading> {
        self.advance()
    }
}

impl CohortBuilder<Grading> {
    /// Appends the grade to the first matching course of the matching student.
    pub fn add_grade(&mut self, record: &GradeRecord) -> GradeOutcome {
        let Some(&student_pos) = self.by_id.get(&record.student_id) else {
            return GradeOutcome::UnknownStudent;
        };
        let Some(&course_pos) = self.course_index[student_pos].get(&record.course_name) else {
            return GradeOutcome::UnknownCourse;
        };

        self.students[student_pos].courses[course_pos]
            .grades
            .push(record.grade);
        GradeOutcome::Attached
    }

    /// Computes course then overall averages and hands over the cohort.
    pub fn finish(self) -> Cohort {
        let mut cohort = Cohort {
            students: self.students,
        };
        recompute_averages(&mut cohort);
        cohort
    }
}

/// Counters collected while loading a cohort file.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub students: usize,
    pub courses: usize,
    pub grades: usize,

    // malformed rows
    pub salvaged_rows: usize,
    pub skipped_rows: usize,

    // dropped references
    pub duplicate_students: usize,
    pub unknown_students: usize,
    pub unknown_courses: usize,

    pub missing_sections: Vec<String>,
}

#[derive(Debug)]
pub struct Loaded {
    pub cohort: Cohort,
    pub report: LoadReport,
}

/// Reads the students, courses and grades sections, in that order, and
/// returns the averaged cohort.
///
/// The reader is borrowed and never closed. A missing section is treated as
/// empty. Malformed rows are handled according to `options.policy`; grades
/// naming an unknown student or course are dropped and counted.
///
/// # Errors
///
/// Read failures are always returned. Under [`ParsePolicy::Strict`] the
/// first malformed row or duplicate student id is returned as well.
#[tracing::instrument(skip_all, fields(policy = ?options.policy))]
pub fn load_cohort<R: BufRead>(reader: R, options: &LoadOptions) -> Result<Loaded, LoadError> {
    let mut lines = LineReader::new(reader);
    let mut report = LoadReport::default();
    let names = &options.sections;
    let policy = options.policy;

    let mut enrolling = CohortBuilder::new();
    for_each_row(&mut lines, &names.students, &mut report, |row, line, report| {
        let Some(student) = resolve(
            parse_student(row),
            || Some(salvage_student(row)),
            policy,
            Section::Students,
            line,
            report,
        )?
        else {
            return Ok(());
        };

        match enrolling.add_student(student) {
            Ok(()) => Ok(()),
            Err(source) if policy == ParsePolicy::Strict => Err(LoadError::Build {
                section: Section::Students,
                line,
                source,
            }),
            Err(err) => {
                warn!(line, error = %err, "Ignoring duplicate student");
                report.duplicate_students += 1;
                Ok(())
            }
        }
    })?;
    report.students = enrolling.student_count();

    let mut attaching = enrolling.attach_courses();
    for_each_row(&mut lines, &names.courses, &mut report, |row, line, report| {
        if let Some(course) = resolve(
            parse_course(row),
            || Some(salvage_course(row)),
            policy,
            Section::Courses,
            line,
            report,
        )? {
            attaching.add_course(&course);
            report.courses += 1;
        }
        Ok(())
    })?;

    let mut grading = attaching.record_grades();
    for_each_row(&mut lines, &names.grades, &mut report, |row, line, report| {
        let Some(record) = resolve(
            parse_grade(row),
            || salvage_grade(row),
            policy,
            Section::Grades,
            line,
            report,
        )?
        else {
            return Ok(());
        };

        match grading.add_grade(&record) {
            GradeOutcome::Attached => report.grades += 1,
            GradeOutcome::UnknownStudent => {
                debug!(line, student_id = record.student_id, "Grade for unknown student");
                report.unknown_students += 1;
            }
            GradeOutcome::UnknownCourse => {
                debug!(line, course = %record.course_name, "Grade for unknown course");
                report.unknown_courses += 1;
            }
        }
        Ok(())
    })?;

    let cohort = grading.finish();
    info!(
        students = report.students,
        courses = report.courses,
        grades = report.grades,
        skipped = report.skipped_rows,
        "Cohort loaded"
    );

    Ok(Loaded { cohort, report })
}

/// Locates `marker` and feeds each data row to `handle` until the first empty
/// line or end-of-input.
fn for_each_row<R, F>(
    lines: &mut LineReader<R>,
    marker: &str,
    report: &mut LoadReport,
    mut handle: F,
) -> Result<(), LoadError>
where
    R: BufRead,
    F: FnMut(&str, usize, &mut LoadReport) -> Result<(), LoadError>,
{
    let start = seek_section(lines, marker)?;
    if !start.found {
        report.missing_sections.push(marker.to_string());
    }

    let mut current = start.first_line;
    while let Some(row) = current.take().filter(|row| !row.is_empty()) {
        handle(&row, lines.line_number(), report)?;
        current = lines.next_line()?;
    }
    Ok(())
}

/// Applies the parse policy to one strictly parsed row.
fn resolve<T>(
    parsed: Result<T, RecordError>,
    salvage: impl FnOnce() -> Option<T>,
    policy: ParsePolicy,
    section: Section,
    line: usize,
    report: &mut LoadReport,
) -> Result<Option<T>, LoadError> {
    let source = match parsed {
        Ok(record) => return Ok(Some(record)),
        Err(source) => source,
    };

    match policy {
        ParsePolicy::Strict => Err(LoadError::Record {
            section,
            line,
            source,
        }),
        ParsePolicy::Skip => {
            warn!(%section, line, error = %source, "Skipping malformed row");
            report.skipped_rows += 1;
            Ok(None)
        }
        ParsePolicy::Lenient => match salvage() {
            Some(record) => {
                warn!(%section, line, error = %source, "Malformed row read with defaults");
                report.salvaged_rows += 1;
                Ok(Some(record))
            }
            None => {
                debug!(%section, line, error = %source, "Unreadable row dropped");
                report.skipped_rows += 1;
                Ok(None)
            }
        },
    }
}
