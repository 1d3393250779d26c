// Process table enumeration: /proc/<pid>/stat and /proc/<pid>/status.

use std::io;
use std::path::Path;

use super::parse;
use crate::error::{MetricSource, SourceError};
use crate::models::ProcessSample;

/// ESRCH as numbered on Linux; returned for reads on a process that exited after listing.
/// The value differs on other platforms, but only Linux exposes this /proc layout.
#[cfg(target_os = "linux")]
const ESRCH: i32 = 3;

/// Result of one pass. `errors` holds per-process failures other than disappearance.
#[derive(Debug, Default)]
pub struct ProcessScan {
    pub samples: Vec<ProcessSample>,
    pub errors: Vec<SourceError>,
}

/// Read up to `cap` processes, lowest pids first. Fails only if the process table itself
/// can't be listed; processes that vanish mid-scan are skipped.
pub fn enumerate(proc_root: &Path, cap: usize) -> Result<ProcessScan, SourceError> {
    let entries = std::fs::read_dir(proc_root)
        .map_err(|e| SourceError::unavailable(MetricSource::ProcessTable, proc_root, &e))?;

    let mut pids: Vec<u32> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| *pid > 0)
        .collect();
    pids.sort_unstable();
    pids.truncate(cap);

    let mut scan = ProcessScan::default();
    for pid in pids {
        match read_process(proc_root, pid) {
            Ok(Some(sample)) => scan.samples.push(sample),
            Ok(None) => tracing::trace!(pid, "process exited during scan"),
            Err(e) => scan.errors.push(e),
        }
    }
    Ok(scan)
}

/// `Ok(None)` when the process is gone.
fn read_process(proc_root: &Path, pid: u32) -> Result<Option<ProcessSample>, SourceError> {
    let dir = proc_root.join(pid.to_string());

    let stat_path = dir.join("stat");
    let stat_text = match read_lossy(&stat_path) {
        Ok(t) => t,
        Err(e) if is_vanished(&e) => return Ok(None),
        Err(e) => return Err(SourceError::unavailable(MetricSource::ProcessStat, stat_path, &e)),
    };
    let stat = parse::parse_process_stat(&stat_text)?;

    let status_path = dir.join("status");
    let status_text = match read_lossy(&status_path) {
        Ok(t) => t,
        Err(e) if is_vanished(&e) => return Ok(None),
        Err(e) => {
            return Err(SourceError::unavailable(
                MetricSource::ProcessStatus,
                status_path,
                &e,
            ));
        }
    };
    let rss_kib = parse::parse_vm_rss_kib(&status_text)?.unwrap_or(0);

    Ok(Some(ProcessSample {
        pid: stat.pid,
        name: stat.name,
        state: stat.state,
        cpu_ticks: stat.utime.saturating_add(stat.stime),
        resident_bytes: rss_kib.saturating_mul(1024),
    }))
}

/// `comm` is arbitrary bytes; invalid UTF-8 in the name must not hide the process.
fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(target_os = "linux")]
fn is_vanished(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(ESRCH)
}

#[cfg(not(target_os = "linux"))]
fn is_vanished(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}
