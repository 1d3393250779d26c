// Error taxonomy for kernel-exposed metric sources.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which kernel interface a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricSource {
    CpuStat,
    MemInfo,
    NetDev,
    ProcessTable,
    ProcessStat,
    ProcessStatus,
    Hwmon,
}

impl fmt::Display for MetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricSource::CpuStat => "proc/stat",
            MetricSource::MemInfo => "proc/meminfo",
            MetricSource::NetDev => "proc/net/dev",
            MetricSource::ProcessTable => "proc",
            MetricSource::ProcessStat => "proc/<pid>/stat",
            MetricSource::ProcessStatus => "proc/<pid>/status",
            MetricSource::Hwmon => "sys/class/hwmon",
        };
        f.write_str(s)
    }
}

/// Text was read but did not match the expected structure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{origin}: {reason}")]
pub struct ParseError {
    pub origin: MetricSource,
    pub reason: String,
}

impl ParseError {
    pub fn new(origin: MetricSource, reason: impl Into<String>) -> Self {
        Self {
            origin,
            reason: reason.into(),
        }
    }
}

/// Failure of one metric source for one tick. Degrades only that source's section of the frame.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("{origin} unavailable at {}: {reason}", .path.display())]
    SourceUnavailable {
        origin: MetricSource,
        path: PathBuf,
        reason: String,
    },
    #[error("{origin} malformed: {reason}")]
    MalformedData {
        origin: MetricSource,
        reason: String,
    },
}

impl SourceError {
    pub fn unavailable(origin: MetricSource, path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        SourceError::SourceUnavailable {
            origin,
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn origin(&self) -> MetricSource {
        match self {
            SourceError::SourceUnavailable { origin, .. } => *origin,
            SourceError::MalformedData { origin, .. } => *origin,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::SourceUnavailable { .. })
    }
}

impl From<ParseError> for SourceError {
    fn from(e: ParseError) -> Self {
        SourceError::MalformedData {
            origin: e.origin,
            reason: e.reason,
        }
    }
}
