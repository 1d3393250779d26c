// The immutable per-tick frame handed to the display collaborator.

use serde::{Deserialize, Serialize};

use super::{CpuUsage, MemoryUsage, NetworkUsage, ProcessUsage, SensorReading, SortKey};

/// A derived value that may be unavailable (no prior sample, non-positive
/// elapsed time, counter regression). Distinct from `Some(0.0)`.
pub type Rate = Option<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTable {
    pub sort_by: SortKey,
    /// Processes read this tick, before truncation to the top-N.
    pub scanned: usize,
    pub top: Vec<ProcessUsage>,
}

/// Each section is `None` when its source could not be read this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsFrame {
    /// Wall-clock time of the tick, ms since the Unix epoch.
    pub timestamp: u64,
    /// Seconds since the previous tick; `None` on the first tick.
    pub elapsed_secs: Rate,
    pub cpu: Option<CpuUsage>,
    pub memory: Option<MemoryUsage>,
    pub network: Option<NetworkUsage>,
    pub processes: Option<ProcessTable>,
    pub sensors: Option<Vec<SensorReading>>,
}
