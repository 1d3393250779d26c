// Rate derivation: pure functions over a prior and a current counter snapshot.

use std::collections::HashMap;

use crate::models::{
    CpuCounterSnapshot, CpuPercentages, InterfaceUsage, NetworkInterfaceCounter, NetworkUsage,
    Rate,
};

/// Counters read this tick. A `None` source failed to read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentCounters {
    pub cpu: Option<CpuCounterSnapshot>,
    pub network: Option<Vec<NetworkInterfaceCounter>>,
}

/// Counters retained from the previous tick, network rows keyed by interface name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorCounters {
    pub cpu: Option<CpuCounterSnapshot>,
    pub network: HashMap<String, NetworkInterfaceCounter>,
}

impl From<CurrentCounters> for PriorCounters {
    fn from(current: CurrentCounters) -> Self {
        Self {
            cpu: current.cpu,
            network: current
                .network
                .unwrap_or_default()
                .into_iter()
                .map(|row| (row.name.clone(), row))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRates {
    pub cpu: Option<CpuPercentages>,
    /// Aggregate tick delta, shared with per-process CPU percentages.
    pub cpu_total_diff: Option<u64>,
    pub network: Option<NetworkUsage>,
}

/// Derive all rates for one tick. `prior` is `None` on the first tick, which makes
/// every rate unavailable.
pub fn rate(prior: Option<&PriorCounters>, current: &CurrentCounters, elapsed_secs: Rate) -> DerivedRates {
    let prior_cpu = prior.and_then(|p| p.cpu.as_ref());
    let (cpu, cpu_total_diff) = match (prior_cpu, current.cpu.as_ref()) {
        (Some(prev), Some(curr)) => match cpu_percentages(prev, curr) {
            Some(pct) => (Some(pct), curr.total_ticks().checked_sub(prev.total_ticks())),
            None => (None, None),
        },
        _ => (None, None),
    };

    let empty = HashMap::new();
    let prior_net = prior.map(|p| &p.network).unwrap_or(&empty);
    let network = current
        .network
        .as_ref()
        .map(|rows| network_usage(prior_net, rows, elapsed_secs));

    DerivedRates {
        cpu,
        cpu_total_diff,
        network,
    }
}

/// Percentages of the aggregate tick delta. `None` when no ticks elapsed or any
/// counter went backwards (reset, overflow).
pub fn cpu_percentages(prev: &CpuCounterSnapshot, curr: &CpuCounterSnapshot) -> Option<CpuPercentages> {
    let user = curr.user.checked_sub(prev.user)?;
    let nice = curr.nice.checked_sub(prev.nice)?;
    let system = curr.system.checked_sub(prev.system)?;
    let idle = curr.idle.checked_sub(prev.idle)?;
    let iowait = curr.iowait.checked_sub(prev.iowait)?;
    let irq = curr.irq.checked_sub(prev.irq)?;
    let softirq = curr.softirq.checked_sub(prev.softirq)?;
    let total = curr.total_ticks().checked_sub(prev.total_ticks())?;
    if total == 0 {
        return None;
    }
    let total = total as f64;
    let share = |diff: u64| 100.0 * diff as f64 / total;
    Some(CpuPercentages {
        busy: 100.0 * (1.0 - idle as f64 / total),
        user: share(user),
        nice: share(nice),
        system: share(system),
        iowait: share(iowait),
        irq: share(irq),
        softirq: share(softirq),
    })
}

/// Bytes per second between two cumulative readings.
pub fn byte_rate(prev: u64, curr: u64, elapsed_secs: f64) -> Rate {
    if elapsed_secs <= 0.0 || !elapsed_secs.is_finite() {
        return None;
    }
    let diff = curr.checked_sub(prev)?;
    Some(diff as f64 / elapsed_secs)
}

/// Per-interface and aggregate network rates. Interfaces are matched by name; a row
/// with no prior counterpart reports unavailable rates.
pub fn network_usage(
    prior: &HashMap<String, NetworkInterfaceCounter>,
    current: &[NetworkInterfaceCounter],
    elapsed_secs: Rate,
) -> NetworkUsage {
    let mut total_rx_rate: Rate = None;
    let mut total_tx_rate: Rate = None;
    let mut total_rx_bytes = 0u64;
    let mut total_tx_bytes = 0u64;

    let interfaces = current
        .iter()
        .map(|row| {
            let (rx_rate, tx_rate) = match (prior.get(&row.name), elapsed_secs) {
                (Some(prev), Some(elapsed)) => (
                    byte_rate(prev.rx_bytes, row.rx_bytes, elapsed),
                    byte_rate(prev.tx_bytes, row.tx_bytes, elapsed),
                ),
                _ => (None, None),
            };
            accumulate(&mut total_rx_rate, rx_rate);
            accumulate(&mut total_tx_rate, tx_rate);
            total_rx_bytes = total_rx_bytes.saturating_add(row.rx_bytes);
            total_tx_bytes = total_tx_bytes.saturating_add(row.tx_bytes);
            InterfaceUsage {
                name: row.name.clone(),
                rx_bytes: row.rx_bytes,
                tx_bytes: row.tx_bytes,
                rx_bytes_per_sec: rx_rate,
                tx_bytes_per_sec: tx_rate,
            }
        })
        .collect();

    NetworkUsage {
        interfaces,
        total_rx_bytes_per_sec: total_rx_rate,
        total_tx_bytes_per_sec: total_tx_rate,
        total_rx_bytes,
        total_tx_bytes,
    }
}

fn accumulate(total: &mut Rate, value: Rate) {
    if let Some(v) = value {
        *total = Some(total.unwrap_or(0.0) + v);
    }
}

/// A process's share of all CPU time over the tick. Unavailable when the process has
/// no prior sample, its counter went backwards (pid reuse), or the aggregate delta is unknown.
pub fn process_cpu_percent(prev_ticks: Option<u64>, curr_ticks: u64, cpu_total_diff: Option<u64>) -> Rate {
    let total = cpu_total_diff.filter(|t| *t > 0)?;
    let diff = curr_ticks.checked_sub(prev_ticks?)?;
    Some(100.0 * diff as f64 / total as f64)
}
