use serde::{Deserialize, Serialize};

use crate::models::document::DocumentStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub rejected: usize,
    pub percentage: u32,
}

/// Aggregates instance statuses against the number of currently required templates.
///
/// `total` is the larger of the two counts so instances of since-deactivated templates
/// stay visible. With nothing required the percentage is 0, never 100.
pub fn compute_stats<I>(statuses: I, required_count: usize) -> DocumentStats
where
    I: IntoIterator<Item = DocumentStatus>,
{
    let mut stats = DocumentStats::default();
    let mut instance_count = 0;

    for status in statuses {
        instance_count += 1;
        match status {
            DocumentStatus::Verified => stats.completed += 1,
            DocumentStatus::Rejected => stats.rejected += 1,
            s if s.is_outstanding() => stats.pending += 1,
            _ => {}
        }
    }

    stats.total = required_count.max(instance_count);
    stats.percentage = if required_count > 0 {
        (stats.completed as f64 / required_count as f64 * 100.0).round() as u32
    } else {
        0
    };
    stats
}
