//! pcdiff-compare — index-aligned before/after label comparison.
//!
//! Point `i` of the before cloud is "the same point" as point `i` of the after
//! cloud. There is no spatial matching; clouds of different length or order
//! degrade the agreement figure silently.

use anyhow::Result;
use hashbrown::HashMap;
use pcdiff_core::{class_name, PointCloud};
use serde::{Deserialize, Serialize};

/// Per-class counts in both clouds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub class_id: i64,
    pub class_name: String,
    pub before_count: usize,
    pub after_count: usize,
    /// `after_count - before_count`
    pub difference: i64,
    pub percent_change: f64,
}

impl ClassStats {
    fn new(class_id: i64, before_count: usize, after_count: usize) -> Self {
        let difference = after_count as i64 - before_count as i64;
        let percent_change = if before_count > 0 {
            difference as f64 / before_count as f64 * 100.0
        } else if after_count > 0 {
            100.0
        } else {
            0.0
        };
        Self {
            class_id,
            class_name: class_name(class_id).into_owned(),
            before_count,
            after_count,
            difference,
            percent_change,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Length of the before cloud.
    pub total_points: usize,
    pub matching_labels: usize,
    pub matching_percent: f64,
    /// One row per class id seen in either cloud, ascending by id.
    pub class_stats: Vec<ClassStats>,
    pub unique_classes_before: usize,
    pub unique_classes_after: usize,
}

impl ComparisonResult {
    pub fn stats_for(&self, class_id: i64) -> Option<&ClassStats> {
        self.class_stats
            .binary_search_by_key(&class_id, |s| s.class_id)
            .ok()
            .map(|i| &self.class_stats[i])
    }

    pub fn changed_classes(&self) -> impl Iterator<Item = &ClassStats> + '_ {
        self.class_stats.iter().filter(|s| s.difference != 0)
    }

    /// Before points whose label did not carry over, including those past the end of the after cloud.
    pub fn mismatching_labels(&self) -> usize {
        self.total_points.saturating_sub(self.matching_labels)
    }

    pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
    pub fn to_json_pretty(&self) -> Result<String> { Ok(serde_json::to_string_pretty(self)?) }
}

fn class_histogram(cloud: &PointCloud) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for id in cloud.class_ids() {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

pub fn compare(before: &PointCloud, after: &PointCloud) -> ComparisonResult {
    let total_points = before.len();

    // zip stops at the shorter cloud
    let matching_labels = before
        .points
        .iter()
        .zip(&after.points)
        .filter(|(b, a)| b.class_id == a.class_id)
        .count();

    let before_counts = class_histogram(before);
    let after_counts = class_histogram(after);

    let mut ids: Vec<i64> = before_counts.keys().chain(after_counts.keys()).copied().collect();
    ids.sort_unstable();
    ids.dedup();

    let class_stats = ids
        .into_iter()
        .map(|id| {
            ClassStats::new(
                id,
                before_counts.get(&id).copied().unwrap_or(0),
                after_counts.get(&id).copied().unwrap_or(0),
            )
        })
        .collect();

    let matching_percent = if total_points > 0 {
        matching_labels as f64 / total_points as f64 * 100.0
    } else {
        0.0
    };

    ComparisonResult {
        total_points,
        matching_labels,
        matching_percent,
        class_stats,
        unique_classes_before: before_counts.len(),
        unique_classes_after: after_counts.len(),
    }
}

/// `None` unless both sides are present.
pub fn compare_optional(before: Option<&PointCloud>, after: Option<&PointCloud>) -> Option<ComparisonResult> {
    Some(compare(before?, after?))
}
