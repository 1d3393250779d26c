// Shared test helpers: a fake /proc and /sys tree on disk.

#![allow(dead_code)]

use hostsampler::diagnostics::DiagnosticsSink;
use hostsampler::error::SourceError;
use hostsampler::sampler::ProcSources;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

pub struct FakeHost {
    dir: TempDir,
}

impl FakeHost {
    /// Empty tree with /proc, /proc/net and /sys/class/hwmon present.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("proc").join("net")).unwrap();
        fs::create_dir_all(dir.path().join("sys").join("class").join("hwmon")).unwrap();
        Self { dir }
    }

    /// Tree with every source populated with plausible values.
    pub fn populated() -> Self {
        let host = Self::new();
        host.write_cpu(1000, 1000, 1000);
        host.write_meminfo(8_000_000, 2_000_000, 0, 0);
        host.write_net(&[("lo", 100, 100), ("eth0", 1000, 2000)]);
        host.add_process(1, "init", 10, 5, 4096);
        host.add_sensor("hwmon0", "temp1_input", "45000");
        host
    }

    pub fn proc_root(&self) -> PathBuf {
        self.dir.path().join("proc")
    }

    pub fn sys_root(&self) -> PathBuf {
        self.dir.path().join("sys")
    }

    pub fn sources(&self) -> ProcSources {
        ProcSources::new(self.proc_root(), self.sys_root())
    }

    pub fn write_cpu(&self, user: u64, system: u64, idle: u64) {
        let text = format!(
            "cpu  {} 0 {} {} 0 0 0 0 0 0\ncpu0 {} 0 {} {} 0 0 0 0 0 0\nintr 12345\n",
            user, system, idle, user, system, idle
        );
        fs::write(self.proc_root().join("stat"), text).unwrap();
    }

    pub fn write_meminfo(&self, total_kib: u64, free_kib: u64, swap_total_kib: u64, swap_free_kib: u64) {
        let text = format!(
            "MemTotal:       {} kB\nMemFree:        {} kB\nMemAvailable:   {} kB\nSwapTotal:      {} kB\nSwapFree:       {} kB\n",
            total_kib, free_kib, free_kib, swap_total_kib, swap_free_kib
        );
        fs::write(self.proc_root().join("meminfo"), text).unwrap();
    }

    pub fn write_net(&self, rows: &[(&str, u64, u64)]) {
        let mut text = String::from(
            "Inter-|   Receive                                                |  Transmit\n face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n",
        );
        for (name, rx, tx) in rows {
            text.push_str(&format!(
                "{:>6}: {} 10 0 0 0 0 0 0 {} 20 0 0 0 0 0 0\n",
                name, rx, tx
            ));
        }
        fs::write(self.proc_root().join("net").join("dev"), text).unwrap();
    }

    pub fn add_process(&self, pid: u32, name: &str, utime: u64, stime: u64, rss_kib: u64) {
        self.add_stat(pid, name, utime, stime);
        let status = format!(
            "Name:\t{}\nState:\tS (sleeping)\nPid:\t{}\nVmPeak:\t  {} kB\nVmRSS:\t  {} kB\nThreads:\t1\n",
            name,
            pid,
            rss_kib * 2,
            rss_kib
        );
        fs::write(self.proc_root().join(pid.to_string()).join("status"), status).unwrap();
    }

    /// Only the stat file; status is missing as if the process exited mid-scan.
    pub fn add_stat(&self, pid: u32, name: &str, utime: u64, stime: u64) {
        let dir = self.proc_root().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        let stat = format!(
            "{} ({}) S 1 {} {} 0 -1 4194560 100 0 0 0 {} {} 0 0 20 0 1 0 500 1000000 200 18446744073709551615\n",
            pid, name, pid, pid, utime, stime
        );
        fs::write(dir.join("stat"), stat).unwrap();
    }

    pub fn remove_process(&self, pid: u32) {
        fs::remove_dir_all(self.proc_root().join(pid.to_string())).unwrap();
    }

    pub fn remove_proc_file(&self, rel: &str) {
        fs::remove_file(self.proc_root().join(rel)).unwrap();
    }

    pub fn add_sensor(&self, chip: &str, file: &str, contents: &str) {
        let dir = self.sys_root().join("class").join("hwmon").join(chip);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), format!("{}\n", contents)).unwrap();
    }

    pub fn hwmon_dir(&self, chip: &str) -> PathBuf {
        self.sys_root().join("class").join("hwmon").join(chip)
    }
}

/// Collects reported failures for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SourceError>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SourceError> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&self, error: &SourceError) {
        self.events.lock().unwrap().push(error.clone());
    }
}
