// Stateless parsers for kernel text sources. No I/O happens here.

use crate::error::{MetricSource, ParseError};
use crate::models::{CpuCounterSnapshot, MemoryCounters, NetworkInterfaceCounter};

const CPU_FIELDS: usize = 7;
const NET_DEV_HEADER_LINES: usize = 2;
/// Receive block is 8 counters, so tx_bytes is the 9th counter after the name.
const NET_DEV_RX_BYTES: usize = 0;
const NET_DEV_TX_BYTES: usize = 8;

/// Fields pulled out of /proc/<pid>/stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStat {
    pub pid: u32,
    pub name: String,
    pub state: char,
    pub utime: u64,
    pub stime: u64,
}

/// Parse the aggregate `cpu` line of /proc/stat. Per-core `cpuN` lines are ignored,
/// and fields after softirq (steal, guest, guest_nice) are tolerated but not read.
pub fn parse_cpu_stat(text: &str) -> Result<CpuCounterSnapshot, ParseError> {
    let line = text
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new(MetricSource::CpuStat, "no aggregate cpu line"))?;

    let mut values = [0u64; CPU_FIELDS];
    let mut fields = line.split_whitespace().skip(1);
    for (i, slot) in values.iter_mut().enumerate() {
        let raw = fields.next().ok_or_else(|| {
            ParseError::new(
                MetricSource::CpuStat,
                format!("expected {} counters, found {}", CPU_FIELDS, i),
            )
        })?;
        *slot = parse_u64(MetricSource::CpuStat, raw)?;
    }
    let [user, nice, system, idle, iowait, irq, softirq] = values;
    Ok(CpuCounterSnapshot {
        user,
        nice,
        system,
        idle,
        iowait,
        irq,
        softirq,
    })
}

/// Parse /proc/meminfo. MemTotal and MemFree are required; swap lines default to zero.
pub fn parse_meminfo(text: &str) -> Result<MemoryCounters, ParseError> {
    let mut total = None;
    let mut free = None;
    let mut swap_total = None;
    let mut swap_free = None;
    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "SwapTotal" => &mut swap_total,
            "SwapFree" => &mut swap_free,
            _ => continue,
        };
        let raw = rest.split_whitespace().next().ok_or_else(|| {
            ParseError::new(MetricSource::MemInfo, format!("{} has no value", key))
        })?;
        *slot = Some(parse_u64(MetricSource::MemInfo, raw)?);
    }
    Ok(MemoryCounters {
        total_kib: total.ok_or_else(|| ParseError::new(MetricSource::MemInfo, "missing MemTotal"))?,
        free_kib: free.ok_or_else(|| ParseError::new(MetricSource::MemInfo, "missing MemFree"))?,
        swap_total_kib: swap_total.unwrap_or(0),
        swap_free_kib: swap_free.unwrap_or(0),
    })
}

/// Parse /proc/net/dev. Rows that don't look like `<name>: <counters...>` are skipped.
pub fn parse_net_dev(text: &str) -> Result<Vec<NetworkInterfaceCounter>, ParseError> {
    let mut lines = text.lines();
    for _ in 0..NET_DEV_HEADER_LINES {
        if lines.next().is_none() {
            return Err(ParseError::new(MetricSource::NetDev, "missing header lines"));
        }
    }
    Ok(lines.filter_map(parse_net_dev_row).collect())
}

fn parse_net_dev_row(line: &str) -> Option<NetworkInterfaceCounter> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.strip_suffix(':')?;
    if name.is_empty() {
        return None;
    }
    let counters: Vec<u64> = tokens
        .take(NET_DEV_TX_BYTES + 1)
        .map(|t| t.parse().ok())
        .collect::<Option<_>>()?;
    if counters.len() <= NET_DEV_TX_BYTES {
        return None;
    }
    Some(NetworkInterfaceCounter {
        name: name.to_string(),
        rx_bytes: counters[NET_DEV_RX_BYTES],
        tx_bytes: counters[NET_DEV_TX_BYTES],
    })
}

/// Parse /proc/<pid>/stat. The command name sits between the first `(` and the
/// last `)` and may itself contain spaces and parentheses.
pub fn parse_process_stat(text: &str) -> Result<ProcessStat, ParseError> {
    let err = |reason: &str| ParseError::new(MetricSource::ProcessStat, reason);
    let open = text.find('(').ok_or_else(|| err("missing '('"))?;
    let close = text.rfind(')').ok_or_else(|| err("missing ')'"))?;
    if close < open {
        return Err(err("unbalanced parentheses"));
    }
    let pid: u32 = text[..open]
        .trim()
        .parse()
        .map_err(|_| err("pid is not a number"))?;
    if pid == 0 {
        return Err(err("pid must be positive"));
    }
    let name = text[open + 1..close].to_string();

    // After the name: state(0) ppid(1) ... utime(11) stime(12)
    let rest: Vec<&str> = text[close + 1..].split_whitespace().collect();
    if rest.len() < 13 {
        return Err(ParseError::new(
            MetricSource::ProcessStat,
            format!("expected at least 13 fields after name, found {}", rest.len()),
        ));
    }
    let state = rest[0].chars().next().ok_or_else(|| err("empty state"))?;
    Ok(ProcessStat {
        pid,
        name,
        state,
        utime: parse_u64(MetricSource::ProcessStat, rest[11])?,
        stime: parse_u64(MetricSource::ProcessStat, rest[12])?,
    })
}

/// Resident set size from /proc/<pid>/status, in KiB. Kernel threads have no VmRSS line.
pub fn parse_vm_rss_kib(text: &str) -> Result<Option<u64>, ParseError> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let raw = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| ParseError::new(MetricSource::ProcessStatus, "VmRSS has no value"))?;
            return parse_u64(MetricSource::ProcessStatus, raw).map(Some);
        }
    }
    Ok(None)
}

fn parse_u64(origin: MetricSource, raw: &str) -> Result<u64, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::new(origin, format!("not an unsigned integer: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0\n\
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0\n\
intr 1462898\n";

    const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit\n \
face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
lo: 2776770   11307    0    0    0     0          0         0  2776770   11307    0    0    0     0       0          0\n  \
eth0: 1215645    2751    0    0    0     0          0         0  1782404    4324    0    0    0   427       0          0\n";

    #[test]
    fn cpu_line_parses_seven_counters_and_ignores_guest_fields() {
        let c = parse_cpu_stat(PROC_STAT).unwrap();
        assert_eq!(c.user, 10132153);
        assert_eq!(c.nice, 290696);
        assert_eq!(c.system, 3084719);
        assert_eq!(c.idle, 46828483);
        assert_eq!(c.iowait, 16683);
        assert_eq!(c.irq, 0);
        assert_eq!(c.softirq, 25195);
        assert_eq!(
            c.total_ticks(),
            10132153 + 290696 + 3084719 + 46828483 + 16683 + 0 + 25195
        );
    }

    #[test]
    fn cpu_line_skips_per_core_lines() {
        let text = "cpu0 1 1 1 1 1 1 1\ncpu 2 2 2 2 2 2 2\n";
        assert_eq!(parse_cpu_stat(text).unwrap().user, 2);
    }

    #[test]
    fn cpu_line_with_too_few_fields_is_malformed() {
        let err = parse_cpu_stat("cpu 1 2 3 4 5 6\n").unwrap_err();
        assert_eq!(err.origin, MetricSource::CpuStat);
        assert!(err.reason.contains("found 6"));
    }

    #[test]
    fn cpu_line_missing_is_malformed() {
        assert!(parse_cpu_stat("cpu0 1 2 3 4 5 6 7\n").is_err());
        assert!(parse_cpu_stat("").is_err());
    }

    #[test]
    fn cpu_line_with_garbage_counter_is_malformed() {
        assert!(parse_cpu_stat("cpu 1 2 x 4 5 6 7\n").is_err());
    }

    #[test]
    fn net_dev_parses_rows_by_name() {
        let rows = parse_net_dev(NET_DEV).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "lo");
        assert_eq!(rows[1].name, "eth0");
        assert_eq!(rows[1].rx_bytes, 1215645);
        assert_eq!(rows[1].tx_bytes, 1782404);
    }

    #[test]
    fn net_dev_skips_short_or_unnamed_rows() {
        let text = "h1\nh2\n  eth0: 1 2 3\nbogus 1 2 3 4 5 6 7 8 9 10\n  wlan0: 5 0 0 0 0 0 0 0 7 0 0 0 0 0 0 0\n";
        let rows = parse_net_dev(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "wlan0");
        assert_eq!(rows[0].rx_bytes, 5);
        assert_eq!(rows[0].tx_bytes, 7);
    }

    #[test]
    fn net_dev_without_headers_is_malformed() {
        assert!(parse_net_dev("only one line").is_err());
    }

    #[test]
    fn process_stat_name_may_contain_parens_and_spaces() {
        let text = "4242 (my (weird) proc) S 1 4242 4242 0 -1 4194560 500 0 0 0 120 30 0 0 20 0 1 0 100 0 0\n";
        let s = parse_process_stat(text).unwrap();
        assert_eq!(s.pid, 4242);
        assert_eq!(s.name, "my (weird) proc");
        assert_eq!(s.state, 'S');
        assert_eq!(s.utime, 120);
        assert_eq!(s.stime, 30);
    }

    #[test]
    fn process_stat_truncated_is_malformed() {
        assert!(parse_process_stat("12 (sh) S 1 2 3").is_err());
        assert!(parse_process_stat("12 sh S 1 2 3 4 5 6 7 8 9 10 11 12 13").is_err());
    }

    #[test]
    fn vm_rss_is_read_in_kib() {
        let text = "Name:\tbash\nVmPeak:\t  9000 kB\nVmRSS:\t    5120 kB\nThreads:\t1\n";
        assert_eq!(parse_vm_rss_kib(text).unwrap(), Some(5120));
        assert_eq!(parse_vm_rss_kib("Name:\tkthreadd\n").unwrap(), None);
        assert!(parse_vm_rss_kib("VmRSS:\tlots kB\n").is_err());
    }

    #[test]
    fn meminfo_reads_totals_and_swap() {
        let text = "MemTotal:       16318412 kB\nMemFree:         1048576 kB\nMemAvailable:    8000000 kB\nSwapTotal:       2097148 kB\nSwapFree:        2097148 kB\n";
        let m = parse_meminfo(text).unwrap();
        assert_eq!(m.total_kib, 16318412);
        assert_eq!(m.free_kib, 1048576);
        assert_eq!(m.swap_total_kib, 2097148);
        assert_eq!(m.swap_free_kib, 2097148);
    }

    #[test]
    fn meminfo_without_total_is_malformed() {
        assert!(parse_meminfo("MemFree: 10 kB\n").is_err());
    }
}
