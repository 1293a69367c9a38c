//! Report assembly.
//!
//! Each report runs its searches, aggregates the results in memory and only
//! then hands the finished value to [`output`] for writing.

pub mod aggregate;
pub mod output;
pub mod sprint;
pub mod weekly;

pub use aggregate::{AggregateBucket, Aggregates, Buckets, DEFAULT_STORY_POINTS_FIELD};
pub use output::{write_html, write_json};
pub use sprint::{build_sprint_report, SprintReport};
pub use weekly::{build_weekly_report, WeeklyReport};
