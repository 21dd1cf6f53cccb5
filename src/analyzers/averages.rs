use crate::analyzers::utility::{mean, weighted_mean};
use crate::model::Cohort;

/// Sets every course average to the mean of its grades, or 0 without grades.
pub fn recompute_course_averages(cohort: &mut Cohort) {
    for course in cohort
        .students
        .iter_mut()
        .flat_map(|s| s.courses.iter_mut())
    {
        course.average = mean(course.grades.as_slice());
    }
}

/// Sets every overall average to the coefficient-weighted mean of the
/// student's course averages.
///
/// A student whose coefficients sum to zero, or who has no course, gets 0.
/// Course averages must already be up to date.
pub fn recompute_student_averages(cohort: &mut Cohort) {
    for student in &mut cohort.students {
        student.average = weighted_mean(
            student
                .courses
                .iter()
                .map(|c| (c.average, c.coefficient)),
        );
    }
}

/// Course averages first, then overall averages.
pub fn recompute_averages(cohort: &mut Cohort) {
    recompute_course_averages(cohort);
    recompute_student_averages(cohort);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Course, Student};

    #[test]
    fn test_course_average_is_mean() {
        let mut cohort = cohort_with(vec![course("Math", 1.0, &[10.0, 12.0, 17.0])]);
        recompute_course_averages(&mut cohort);
        assert_eq!(cohort.students[0].courses[0].average, 13.0);
    }

    #[test]
    fn test_course_without_grades_averages_zero() {
        let mut stale = course("Math", 1.0, &[]);
        stale.average = 9.0;
        let mut cohort = cohort_with(vec![stale]);

        recompute_course_averages(&mut cohort);
        assert_eq!(cohort.students[0].courses[0].average, 0.0);
    }

    #[test]
    fn test_overall_average_is_weighted() {
        let mut cohort = cohort_with(vec![
            course("Math", 2.0, &[10.0]),
            course("Physics", 1.0, &[16.0]),
        ]);
        recompute_averages(&mut cohort);
        assert_eq!(cohort.students[0].average, 12.0);
    }

    #[test]
    fn test_ungraded_course_still_weighs() {
        let mut cohort = cohort_with(vec![
            course("Math", 1.0, &[16.0]),
            course("Art", 3.0, &[]),
        ]);
        recompute_averages(&mut cohort);
        assert_eq!(cohort.students[0].average, 4.0);
    }

    #[test]
    fn test_zero_coefficients_average_zero() {
        let mut cohort = cohort_with(vec![course("Sport", 0.0, &[20.0])]);
        recompute_averages(&mut cohort);
        assert_eq!(cohort.students[0].courses[0].average, 20.0);
        assert_eq!(cohort.students[0].average, 0.0);
    }

    #[test]
    fn test_student_without_courses_averages_zero() {
        let mut cohort = cohort_with(vec![]);
        cohort.students[0].average = 11.0;
        recompute_averages(&mut cohort);
        assert_eq!(cohort.students[0].average, 0.0);
    }

    // Helper functions for tests
    fn course(name: &str, coefficient: f64, grades: &[f64]) -> Course {
        let mut course = Course::new(name, coefficient);
        for &g in grades {
            course.grades.push(g);
        }
        course
    }

    fn cohort_with(courses: Vec<Course>) -> Cohort {
        let mut student = Student::new(1, "Jane", "Doe", 20);
        student.courses = courses;
        Cohort {
            students: vec![student],
        }
    }
}
