//! In-memory cohort model: students own courses, courses own their grades.

use serde::{Deserialize, Serialize};

/// Ordered grade values for one course, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grades(pub Vec<f64>);

impl Grades {
    pub fn push(&mut self, grade: f64) {
        self.0.push(grade);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// A subject followed by one student, weighted by `coefficient`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub coefficient: f64,
    pub grades: Grades,
    pub average: f64,
}

impl Course {
    /// Creates a course with no grades and a zero average.
    pub fn new(name: impl Into<String>, coefficient: f64) -> Self {
        Self {
            name: name.into(),
            coefficient,
            grades: Grades::default(),
            average: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub age: i32,
    pub courses: Vec<Course>,
    pub average: f64,
}

impl Student {
    pub fn new(
        id: i32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i32,
    ) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            age,
            courses: Vec::new(),
            average: 0.0,
        }
    }

    /// First course whose name matches exactly.
    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.name == name)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Root aggregate: every student of the promotion, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub students: Vec<Student>,
}

impl Cohort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// First student carrying `id`.
    pub fn student(&self, id: i32) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Sorts the student list in place by overall average, best first.
    ///
    /// Equal averages keep their current relative order.
    pub fn sort_by_overall_average(&mut self) {
        self.students.sort_by(|a, b| b.average.total_cmp(&a.average));
    }
}
