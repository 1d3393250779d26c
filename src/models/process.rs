// Per-process models

use serde::{Deserialize, Serialize};

/// Raw per-process counters from one enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub state: char,
    /// utime + stime, in kernel ticks.
    pub cpu_ticks: u64,
    pub resident_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessUsage {
    pub pid: u32,
    pub name: String,
    pub state: char,
    /// Share of total machine CPU time over the last tick; `None` for a process seen for the first time.
    pub cpu_percent: Option<f64>,
    pub resident_bytes: u64,
}

/// Metric the process table is ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Cpu,
    Memory,
}
