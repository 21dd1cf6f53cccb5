//! Cohort aggregation: course and overall averages, and student rankings.
//!
//! Averages are recomputed in two steps, course averages from grades and
//! then coefficient-weighted overall averages from course averages. The
//! ranking functions read an averaged cohort and return ordered views.

pub mod averages;
pub mod ranking;
pub mod utility;
