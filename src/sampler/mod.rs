// Metric sources read straight from the kernel's text interfaces.

pub mod parse;
pub mod process;
pub mod ranking;
pub mod rates;
pub mod sensors;

pub use crate::models::SortKey;
pub use process::ProcessScan;
pub use rates::{CurrentCounters, DerivedRates, PriorCounters};
pub use sensors::SensorScan;

use crate::error::{MetricSource, SourceError};
use crate::models::{CpuCounterSnapshot, MemoryCounters, NetworkInterfaceCounter};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Roots of the proc and sys trees. Real hosts use `/proc` and `/sys`; tests point
/// these at fixture directories.
#[derive(Debug, Clone)]
pub struct ProcSources {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl Default for ProcSources {
    fn default() -> Self {
        Self::new("/proc", "/sys")
    }
}

impl ProcSources {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn sys_root(&self) -> &Path {
        &self.sys_root
    }

    #[instrument(skip(self), fields(source = "cpu_stat"))]
    pub fn read_cpu(&self) -> Result<CpuCounterSnapshot, SourceError> {
        let text = read_source(MetricSource::CpuStat, &self.proc_root.join("stat"))?;
        Ok(parse::parse_cpu_stat(&text)?)
    }

    #[instrument(skip(self), fields(source = "meminfo"))]
    pub fn read_memory(&self) -> Result<MemoryCounters, SourceError> {
        let text = read_source(MetricSource::MemInfo, &self.proc_root.join("meminfo"))?;
        Ok(parse::parse_meminfo(&text)?)
    }

    #[instrument(skip(self), fields(source = "net_dev"))]
    pub fn read_network(&self) -> Result<Vec<NetworkInterfaceCounter>, SourceError> {
        let path = self.proc_root.join("net").join("dev");
        let text = read_source(MetricSource::NetDev, &path)?;
        Ok(parse::parse_net_dev(&text)?)
    }

    #[instrument(skip(self), fields(source = "process_table"))]
    pub fn enumerate_processes(&self, cap: usize) -> Result<ProcessScan, SourceError> {
        process::enumerate(&self.proc_root, cap)
    }

    #[instrument(skip(self), fields(source = "hwmon"))]
    pub fn discover_sensors(&self) -> Result<SensorScan, SourceError> {
        sensors::discover(&self.sys_root)
    }
}

/// Read a whole source file. A missing or unreadable file is `SourceUnavailable`,
/// kept distinct from content that fails to parse.
fn read_source(origin: MetricSource, path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|e| SourceError::unavailable(origin, path, &e))
}
