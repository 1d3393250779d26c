// Sampling orchestrator: owns prior-sample state and turns each tick into a MetricsFrame.
// The async loop moves the sampler into a blocking task per tick and takes it back,
// so a tick never overlaps the previous one's state update.

use crate::config::AppConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::error::SourceError;
use crate::models::{
    CpuUsage, MemoryUsage, MetricsFrame, ProcessTable, ProcessUsage, Rate, SortKey,
};
use crate::sampler::{CurrentCounters, PriorCounters, ProcSources, ranking, rates};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" message (avoid logging every tick when no display is attached)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// State retained between ticks.
#[derive(Debug, Clone)]
pub struct PollState {
    pub counters: PriorCounters,
    /// Cumulative CPU ticks per pid from the previous process scan.
    pub process_ticks: HashMap<u32, u64>,
    pub polled_at: SystemTime,
}

#[derive(Debug)]
enum Phase {
    Cold,
    Warm(PollState),
}

#[derive(Debug, Clone)]
pub struct SamplerSettings {
    pub top_n: usize,
    pub max_processes: usize,
    pub sort_by: SortKey,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            max_processes: 4096,
            sort_by: SortKey::Cpu,
        }
    }
}

#[derive(Debug)]
pub struct Sampler {
    sources: ProcSources,
    settings: SamplerSettings,
    phase: Phase,
}

impl Sampler {
    pub fn new(sources: ProcSources, settings: SamplerSettings) -> Self {
        Self {
            sources,
            settings,
            phase: Phase::Cold,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ProcSources::new(&config.sources.proc_root, &config.sources.sys_root),
            SamplerSettings {
                top_n: config.sampling.top_n,
                max_processes: config.sampling.max_processes,
                sort_by: config.sampling.sort_by,
            },
        )
    }

    /// Same sources and settings, back in the cold phase.
    pub fn restarted(&self) -> Self {
        Self::new(self.sources.clone(), self.settings.clone())
    }

    pub fn is_warm(&self) -> bool {
        matches!(self.phase, Phase::Warm(_))
    }

    pub fn poll_state(&self) -> Option<&PollState> {
        match &self.phase {
            Phase::Cold => None,
            Phase::Warm(state) => Some(state),
        }
    }

    /// Run one read-derive-emit cycle. Source failures go to `sink` and leave their
    /// section of the frame empty; they never abort the tick.
    pub fn tick(&mut self, now: SystemTime, sink: &dyn DiagnosticsSink) -> MetricsFrame {
        let report = |e: SourceError| {
            sink.report(&e);
        };

        let cpu = self.sources.read_cpu().map_err(report).ok();
        let memory = self
            .sources
            .read_memory()
            .map_err(report)
            .ok()
            .map(|m| MemoryUsage::from_counters(&m));
        let network = self.sources.read_network().map_err(report).ok();
        let processes = match self.sources.enumerate_processes(self.settings.max_processes) {
            Ok(scan) => {
                for e in &scan.errors {
                    sink.report(e);
                }
                Some(scan.samples)
            }
            Err(e) => {
                report(e);
                None
            }
        };
        let sensors = match self.sources.discover_sensors() {
            Ok(scan) => {
                for e in &scan.errors {
                    sink.report(e);
                }
                Some(scan.readings)
            }
            Err(e) => {
                report(e);
                None
            }
        };

        let prior = self.poll_state();
        let elapsed_secs = prior.and_then(|p| elapsed_secs(p.polled_at, now));
        let current = CurrentCounters { cpu, network };
        let derived = rates::rate(prior.map(|p| &p.counters), &current, elapsed_secs);

        let mut process_ticks = HashMap::new();
        let process_table = processes.map(|samples| {
            let scanned = samples.len();
            let usages: Vec<ProcessUsage> = samples
                .into_iter()
                .map(|s| {
                    let prev_ticks = prior.and_then(|p| p.process_ticks.get(&s.pid).copied());
                    process_ticks.insert(s.pid, s.cpu_ticks);
                    ProcessUsage {
                        pid: s.pid,
                        cpu_percent: rates::process_cpu_percent(
                            prev_ticks,
                            s.cpu_ticks,
                            derived.cpu_total_diff,
                        ),
                        name: s.name,
                        state: s.state,
                        resident_bytes: s.resident_bytes,
                    }
                })
                .collect();
            ProcessTable {
                sort_by: self.settings.sort_by,
                scanned,
                top: ranking::rank(usages, self.settings.sort_by, self.settings.top_n),
            }
        });

        let frame = MetricsFrame {
            timestamp: unix_millis(now),
            elapsed_secs,
            cpu: current.cpu.map(|counters| CpuUsage {
                counters,
                total_ticks: counters.total_ticks(),
                percent: derived.cpu,
            }),
            memory,
            network: derived.network,
            processes: process_table,
            sensors,
        };

        // Rates above were derived against the old state; only now replace it.
        self.phase = Phase::Warm(PollState {
            counters: PriorCounters::from(current),
            process_ticks,
            polled_at: now,
        });
        frame
    }
}

/// Seconds between two wall-clock readings; `None` if the clock did not move forward.
fn elapsed_secs(prev: SystemTime, now: SystemTime) -> Rate {
    now.duration_since(prev)
        .ok()
        .map(|d| d.as_secs_f64())
        .filter(|s| *s > 0.0)
}

fn unix_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}

/// Sampler, sink, channel and shutdown for the worker.
pub struct WorkerDeps {
    pub sampler: Sampler,
    pub sink: Arc<dyn DiagnosticsSink>,
    pub tx: broadcast::Sender<MetricsFrame>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log sampler stats (real seconds).
    pub stats_log_interval_secs: u64,
}

impl From<&AppConfig> for WorkerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            sample_interval_ms: config.sampling.interval_ms,
            stats_log_interval_secs: config.monitoring.stats_log_interval_secs,
        }
    }
}

enum Event {
    Tick,
    Shutdown,
    StatsLog,
}

/// Spawns the tick loop. Missed ticks are skipped, not queued; shutdown is honored only
/// between ticks. A tick that panics drops its frame and the loop carries on with a cold
/// sampler. Resolves to the sampler so callers can inspect the final state.
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<Sampler> {
    let WorkerDeps {
        sampler,
        sink,
        tx,
        shutdown_rx,
    } = deps;
    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        sample_interval_ms = config.sample_interval_ms
    );
    tokio::spawn(run(sampler, sink, tx, shutdown_rx, config).instrument(worker_span))
}

async fn run(
    mut sampler: Sampler,
    sink: Arc<dyn DiagnosticsSink>,
    tx: broadcast::Sender<MetricsFrame>,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    config: WorkerConfig,
) -> Sampler {
    let mut tick = interval(Duration::from_millis(config.sample_interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First stats tick completes immediately; nothing to report yet.
    stats_log_tick.tick().await;

    // Used to replace the sampler if a tick task dies and takes it along.
    let template = sampler.restarted();
    let mut frames_emitted: u64 = 0;
    let mut last_tick_ms: u64 = 0;
    let mut last_no_receivers_warn: Option<Instant> = None;

    loop {
        let event = tokio::select! {
            _ = tick.tick() => Event::Tick,
            _ = &mut shutdown_rx => Event::Shutdown,
            _ = stats_log_tick.tick() => Event::StatsLog,
        };

        match event {
            Event::Tick => {
                let started = Instant::now();
                let tick_sink = sink.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    let frame = sampler.tick(SystemTime::now(), tick_sink.as_ref());
                    (sampler, frame)
                })
                .await;
                let frame = match joined {
                    Ok((returned, frame)) => {
                        sampler = returned;
                        frame
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            operation = "tick",
                            "sampler task failed; restarting from cold"
                        );
                        sampler = template.restarted();
                        continue;
                    }
                };
                last_tick_ms = started.elapsed().as_millis() as u64;
                frames_emitted += 1;

                if tx.send(frame).is_err() {
                    let should_warn = last_no_receivers_warn
                        .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                    if should_warn {
                        tracing::debug!(
                            operation = "broadcast_frame",
                            "No display attached; broadcast channel has no receivers"
                        );
                        last_no_receivers_warn = Some(Instant::now());
                    }
                }
            }
            Event::Shutdown => {
                tracing::debug!("Worker shutting down");
                return sampler;
            }
            Event::StatsLog => {
                tracing::info!(
                    frames_emitted,
                    last_tick_ms,
                    warm = sampler.is_warm(),
                    "sampler stats"
                );
            }
        }
    }
}
