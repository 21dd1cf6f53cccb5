use crate::error::RankError;
use crate::model::{Cohort, Student};

/// Comparison value for a student who does not follow the ranked course.
pub const MISSING_COURSE_SENTINEL: f64 = -1.0;

/// How many students [`rank_by_course`] returns.
pub const COURSE_PODIUM_SIZE: usize = 3;

/// A student's standing in one course.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRank<'a> {
    pub student: &'a Student,
    /// Course average, or [`MISSING_COURSE_SENTINEL`] when `has_course` is false.
    pub average: f64,
    pub has_course: bool,
}

/// All students by overall average, best first; ties keep cohort order.
///
/// The cohort itself is not reordered, see [`Cohort::sort_by_overall_average`]
/// for the in-place variant.
pub fn rank_by_overall_average(cohort: &Cohort) -> Vec<&Student> {
    let mut ranked: Vec<&Student> = cohort.students.iter().collect();
    ranked.sort_by(|a, b| b.average.total_cmp(&a.average));
    ranked
}

pub fn top_by_overall_average(cohort: &Cohort, n: usize) -> Vec<&Student> {
    let mut ranked = rank_by_overall_average(cohort);
    ranked.truncate(n);
    ranked
}

/// The best [`COURSE_PODIUM_SIZE`] students in `course_name`.
///
/// # Errors
///
/// See [`top_by_course`].
pub fn rank_by_course<'a>(
    cohort: &'a Cohort,
    course_name: &str,
) -> Result<Vec<CourseRank<'a>>, RankError> {
    top_by_course(cohort, course_name, COURSE_PODIUM_SIZE)
}

/// The best `n` students by their average in `course_name`.
///
/// Only the first course with that name counts for each student. Students
/// without it rank after everyone who has it, using the sentinel average.
///
/// # Errors
///
/// Returns [`RankError::MissingCourseName`] for a blank name and
/// [`RankError::EmptyCohort`] when there is nobody to rank.
pub fn top_by_course<'a>(
    cohort: &'a Cohort,
    course_name: &str,
    n: usize,
) -> Result<Vec<CourseRank<'a>>, RankError> {
    if course_name.trim().is_empty() {
        return Err(RankError::MissingCourseName);
    }
    if cohort.is_empty() {
        return Err(RankError::EmptyCohort);
    }

    let mut ranks: Vec<CourseRank<'a>> = cohort
        .students
        .iter()
        .map(|student| match student.course(course_name) {
            Some(course) => CourseRank {
                student,
                average: course.average,
                has_course: true,
            },
            None => CourseRank {
                student,
                average: MISSING_COURSE_SENTINEL,
                has_course: false,
            },
        })
        .collect();

    ranks.sort_by(|a, b| b.average.total_cmp(&a.average));
    ranks.truncate(n);

    Ok(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Course;

    #[test]
    fn test_overall_ranking_descending_and_stable() {
        let cohort = cohort(&[(1, 12.0), (2, 15.5), (3, 12.0), (4, 3.0)]);
        let ids: Vec<i32> = rank_by_overall_average(&cohort)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
        // cohort order untouched
        assert_eq!(cohort.students[0].id, 1);
    }

    #[test]
    fn test_top_by_overall_average_truncates() {
        let cohort = cohort(&[(1, 12.0), (2, 15.5), (3, 14.0)]);
        assert_eq!(top_by_overall_average(&cohort, 2).len(), 2);
        assert_eq!(top_by_overall_average(&cohort, 10).len(), 3);
    }

    #[test]
    fn test_rank_by_course_top_three() {
        let mut cohort = cohort(&[(1, 0.0), (2, 0.0), (3, 0.0), (4, 0.0)]);
        for (student, avg) in cohort.students.iter_mut().zip([11.0, 17.0, 9.0, 14.0]) {
            let mut math = Course::new("Math", 1.0);
            math.average = avg;
            student.courses.push(math);
        }

        let podium = rank_by_course(&cohort, "Math").unwrap();
        let ids: Vec<i32> = podium.iter().map(|r| r.student.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
        assert_eq!(podium[0].average, 17.0);
        assert!(podium.iter().all(|r| r.has_course));
    }

    #[test]
    fn test_missing_course_ranks_below_zero_average() {
        let mut cohort = cohort(&[(1, 0.0), (2, 0.0)]);
        cohort.students[1].courses.push(Course::new("Math", 1.0));

        let podium = rank_by_course(&cohort, "Math").unwrap();
        assert_eq!(podium[0].student.id, 2);
        assert_eq!(podium[0].average, 0.0);
        assert_eq!(podium[1].student.id, 1);
        assert_eq!(podium[1].average, MISSING_COURSE_SENTINEL);
        assert!(!podium[1].has_course);
    }

    #[test]
    fn test_unknown_course_returns_everyone_with_sentinel() {
        let cohort = cohort(&[(1, 10.0), (2, 12.0)]);
        let podium = rank_by_course(&cohort, "Latin").unwrap();
        assert_eq!(podium.len(), 2);
        assert!(podium.iter().all(|r| r.average == MISSING_COURSE_SENTINEL));
        assert_eq!(podium[0].student.id, 1);
    }

    #[test]
    fn test_rank_by_course_preconditions() {
        assert_eq!(
            rank_by_course(&Cohort::new(), "Math"),
            Err(RankError::EmptyCohort)
        );
        assert_eq!(
            rank_by_course(&cohort(&[(1, 1.0)]), "  "),
            Err(RankError::MissingCourseName)
        );
    }

    // Helper functions for tests
    fn cohort(entries: &[(i32, f64)]) -> Cohort {
        let students = entries
            .iter()
            .map(|&(id, average)| {
                let mut s = Student::new(id, "First", "Last", 20);
                s.average = average;
                s
            })
            .collect();
        Cohort { students }
    }
}
