use serde::Deserialize;

use crate::sampler::SortKey;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    pub top_n: usize,
    /// Upper bound on processes read per tick; bounds scan cost on large process tables.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,
    #[serde(default)]
    pub sort_by: SortKey,
}

fn default_max_processes() -> usize {
    4096
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_proc_root")]
    pub proc_root: String,
    #[serde(default = "default_sys_root")]
    pub sys_root: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            sys_root: default_sys_root(),
        }
    }
}

fn default_proc_root() -> String {
    "/proc".into()
}

fn default_sys_root() -> String {
    "/sys".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of frames buffered for the display (slow readers may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log sampler stats (frames emitted, diagnostics reported) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.top_n > 0,
            "sampling.top_n must be > 0, got {}",
            self.sampling.top_n
        );
        anyhow::ensure!(
            self.sampling.max_processes >= self.sampling.top_n,
            "sampling.max_processes must be >= sampling.top_n ({}), got {}",
            self.sampling.top_n,
            self.sampling.max_processes
        );
        anyhow::ensure!(
            !self.sources.proc_root.is_empty(),
            "sources.proc_root must be non-empty"
        );
        anyhow::ensure!(
            !self.sources.sys_root.is_empty(),
            "sources.sys_root must be non-empty"
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
