use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::utility::{mean, stddev};
use crate::model::Cohort;

/// Per-course summary across the whole cohort.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CourseStats {
    pub name: String,
    pub coefficient: f64,
    pub graded_students: usize,
    pub grades: usize,
    pub mean_average: f64,
    pub stddev: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CohortStats {
    pub generated_at: DateTime<Utc>,
    pub students: usize,
    pub courses: usize,
    pub grades: usize,

    // overall averages
    pub mean_average: f64,
    pub stddev: f64,
    pub min_average: f64,
    pub max_average: f64,

    pub course_stats: Vec<CourseStats>,
}

impl CohortStats {
    /// Summarizes an averaged cohort.
    ///
    /// Courses are listed in first-seen order and matched by name; a
    /// student's repeated course names count once.
    pub fn from_cohort(cohort: &Cohort) -> Self {
        let averages: Vec<f64> = cohort.students.iter().map(|s| s.average).collect();
        let overall_mean = mean(&averages);

        let mut course_stats: Vec<CourseStats> = Vec::new();
        let mut course_averages: Vec<Vec<f64>> = Vec::new();

        for student in &cohort.students {
            for (position, course) in student.courses.iter().enumerate() {
                if student.courses[..position].iter().any(|c| c.name == course.name) {
                    continue;
                }

                let slot = match course_stats.iter().position(|s| s.name == course.name) {
                    Some(slot) => slot,
                    None => {
                        course_stats.push(CourseStats {
                            name: course.name.clone(),
                            coefficient: course.coefficient,
                            ..Default::default()
                        });
                        course_averages.push(Vec::new());
                        course_stats.len() - 1
                    }
                };

                let entry = &mut course_stats[slot];
                entry.grades += course.grades.len();
                if !course.grades.is_empty() {
                    entry.graded_students += 1;
                }
                course_averages[slot].push(course.average);
            }
        }

        for (entry, values) in course_stats.iter_mut().zip(&course_averages) {
            entry.mean_average = mean(values);
            entry.stddev = stddev(values, entry.mean_average);
        }

        CohortStats {
            generated_at: Utc::now(),
            students: cohort.len(),
            courses: course_stats.len(),
            grades: course_stats.iter().map(|c| c.grades).sum(),
            mean_average: overall_mean,
            stddev: stddev(&averages, overall_mean),
            min_average: averages.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_average: averages.iter().copied().reduce(f64::max).unwrap_or(0.0),
            course_stats,
        }
    }

    /// Share of `part` in `total` as a percentage, 0 for an empty total.
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Percentage of students holding at least one grade in `course`.
    pub fn graded_pct(&self, course: &str) -> f64 {
        self.course_stats
            .iter()
            .find(|c| c.name == course)
            .map(|c| Self::pct(c.graded_students, self.students))
            .unwrap_or(0.0)
    }
}
