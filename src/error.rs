//! Error types shared by the loading, ranking and snapshot layers.

use std::fmt;
use thiserror::Error;

/// The three blocks of the text input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Students,
    Courses,
    Grades,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Students => "students",
            Section::Courses => "courses",
            Section::Grades => "grades",
        };
        f.write_str(name)
    }
}

/// Why a single delimited line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field `{field}` is empty")]
    EmptyField { field: &'static str },

    #[error("field `{field}` is not a number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
}

/// Violations of the cohort construction rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("student id {0} is already enrolled")]
    DuplicateStudent(i32),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read cohort source")]
    Io(#[from] std::io::Error),

    #[error("{section} section, line {line}: {source}")]
    Record {
        section: Section,
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("{section} section, line {line}: {source}")]
    Build {
        section: Section,
        line: usize,
        #[source]
        source: BuildError,
    },
}

/// Precondition failures of the ranking operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("cannot rank an empty cohort")]
    EmptyCohort,

    #[error("a course name is required to rank by course")]
    MissingCourseName,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed")]
    Io(#[from] std::io::Error),

    #[error("snapshot truncated: needed {needed} bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("invalid string in snapshot: {0}")]
    InvalidString(String),

    #[error("{0} does not fit in the snapshot format")]
    TooLarge(&'static str),
}
