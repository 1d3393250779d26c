// Process ranking by CPU or memory.

use std::cmp::Ordering;

use crate::models::{ProcessUsage, SortKey};

/// Sort descending by `key`, ties broken by ascending pid, then keep the first `top_n`.
/// Truncation happens only after the whole set is ordered.
pub fn rank(mut processes: Vec<ProcessUsage>, key: SortKey, top_n: usize) -> Vec<ProcessUsage> {
    processes.sort_by(|a, b| compare(a, b, key));
    processes.truncate(top_n);
    processes
}

/// Total order for ranking. An unavailable CPU percentage sorts below any measured value.
pub fn compare(a: &ProcessUsage, b: &ProcessUsage, key: SortKey) -> Ordering {
    let by_metric = match key {
        SortKey::Cpu => compare_rate(b.cpu_percent, a.cpu_percent),
        SortKey::Memory => b.resident_bytes.cmp(&a.resident_bytes),
    };
    by_metric.then_with(|| a.pid.cmp(&b.pid))
}

fn compare_rate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
