// Memory and swap models

use serde::{Deserialize, Serialize};

/// Values from /proc/meminfo, in kibibytes as the kernel reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCounters {
    pub total_kib: u64,
    pub free_kib: u64,
    pub swap_total_kib: u64,
    pub swap_free_kib: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: Option<f64>,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    /// `None` when the host has no swap configured.
    pub swap_usage_percent: Option<f64>,
}

impl MemoryUsage {
    pub fn from_counters(c: &MemoryCounters) -> Self {
        let total_bytes = c.total_kib.saturating_mul(1024);
        let used_bytes = c.total_kib.saturating_sub(c.free_kib).saturating_mul(1024);
        let swap_total_bytes = c.swap_total_kib.saturating_mul(1024);
        let swap_used_bytes = c
            .swap_total_kib
            .saturating_sub(c.swap_free_kib)
            .saturating_mul(1024);
        Self {
            total_bytes,
            used_bytes,
            usage_percent: ratio_percent(used_bytes, total_bytes),
            swap_total_bytes,
            swap_used_bytes,
            swap_usage_percent: ratio_percent(swap_used_bytes, swap_total_bytes),
        }
    }
}

fn ratio_percent(part: u64, whole: u64) -> Option<f64> {
    if whole > 0 {
        Some((part as f64 / whole as f64) * 100.0)
    } else {
        None
    }
}
