//! Grouping of issues by status, status category and type.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::types::UNKNOWN_LABEL;
use crate::api::Issue;

/// Field label tried when no story points field is configured, or when the
/// configured one is absent on an issue.
pub const DEFAULT_STORY_POINTS_FIELD: &str = "Custom field (Story Points)";

/// Count and summed story points for one grouping label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub count: usize,
    /// Summed story points.
    pub sp: f64,
}

impl AggregateBucket {
    fn add(&mut self, points: f64) {
        self.count += 1;
        self.sp += points;
    }
}

/// Label to bucket mapping, ordered by label.
pub type Buckets = BTreeMap<String, AggregateBucket>;

/// The three groupings of a sprint report plus the story points total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub by_status: Buckets,
    pub by_category: Buckets,
    pub by_type: Buckets,
    /// Sum of story points over every issue. Reported in the metadata.
    #[serde(skip)]
    pub story_points_total: f64,
}

impl Aggregates {
    /// Group `issues` and sum the story points field.
    ///
    /// `story_points_field` is tried first, then
    /// [`DEFAULT_STORY_POINTS_FIELD`]. Missing or non-numeric values count as
    /// zero; missing labels become "Unknown".
    pub fn from_issues(issues: &[Issue], story_points_field: Option<&str>) -> Self {
        let mut aggregates = Self::default();

        for issue in issues {
            let points = story_points(issue, story_points_field);
            let status = issue.status_name().unwrap_or(UNKNOWN_LABEL);
            let category = issue.status_category_name().unwrap_or(UNKNOWN_LABEL);
            let issue_type = issue.issue_type_name().unwrap_or(UNKNOWN_LABEL);

            bucket(&mut aggregates.by_status, status).add(points);
            bucket(&mut aggregates.by_category, category).add(points);
            bucket(&mut aggregates.by_type, issue_type).add(points);
            aggregates.story_points_total += points;
        }

        aggregates
    }

    /// Number of issues aggregated.
    pub fn issue_count(&self) -> usize {
        self.by_status.values().map(|b| b.count).sum()
    }
}

fn bucket<'a>(buckets: &'a mut Buckets, label: &str) -> &'a mut AggregateBucket {
    buckets.entry(label.to_string()).or_default()
}

/// Story points of one issue, or zero.
pub fn story_points(issue: &Issue, field: Option<&str>) -> f64 {
    field
        .into_iter()
        .chain(std::iter::once(DEFAULT_STORY_POINTS_FIELD))
        .find_map(|key| issue.numeric_field(key))
        .unwrap_or(0.0)
}
