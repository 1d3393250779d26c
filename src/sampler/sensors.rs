// Hardware monitor discovery under <sys>/class/hwmon.

use std::path::{Path, PathBuf};

use crate::error::{MetricSource, SourceError};
use crate::models::{SensorKind, SensorReading};

const INPUT_SUFFIX: &str = "_input";

#[derive(Debug, Default)]
pub struct SensorScan {
    pub readings: Vec<SensorReading>,
    pub errors: Vec<SourceError>,
}

/// Walk every `hwmonN` directory and read its temperature and fan inputs.
/// One unreadable sensor or chip never stops the rest of the walk.
pub fn discover(sys_root: &Path) -> Result<SensorScan, SourceError> {
    let hwmon_root = sys_root.join("class").join("hwmon");
    let entries = std::fs::read_dir(&hwmon_root)
        .map_err(|e| SourceError::unavailable(MetricSource::Hwmon, &hwmon_root, &e))?;

    let mut chips: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("hwmon"))
        .map(|entry| entry.path())
        .collect();
    chips.sort_by_key(|p| {
        p.file_name()
            .map(|n| sensor_index(&n.to_string_lossy(), "hwmon"))
            .unwrap_or(u32::MAX)
    });

    let mut scan = SensorScan::default();
    for chip_dir in chips {
        scan_chip(&chip_dir, &mut scan);
    }
    Ok(scan)
}

fn scan_chip(chip_dir: &Path, scan: &mut SensorScan) {
    let entries = match std::fs::read_dir(chip_dir) {
        Ok(e) => e,
        Err(e) => {
            scan.errors
                .push(SourceError::unavailable(MetricSource::Hwmon, chip_dir, &e));
            return;
        }
    };
    let chip = read_trimmed(&chip_dir.join("name"));

    let mut inputs: Vec<(SensorKind, String)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let kind = SensorKind::from_entry_name(&name)?;
            name.ends_with(INPUT_SUFFIX).then_some((kind, name))
        })
        .collect();
    inputs.sort_by(|(ka, a), (kb, b)| {
        prefix_rank(*ka)
            .cmp(&prefix_rank(*kb))
            .then_with(|| sensor_index(a, kind_prefix(*ka)).cmp(&sensor_index(b, kind_prefix(*kb))))
            .then_with(|| a.cmp(b))
    });

    for (kind, name) in inputs {
        let path = chip_dir.join(&name);
        let value = match read_value(&path) {
            Ok(v) => v,
            Err(e) => {
                scan.errors.push(e);
                continue;
            }
        };
        let label = label_file_name(&name).and_then(|f| read_trimmed(&chip_dir.join(f)));
        scan.readings.push(SensorReading {
            kind,
            label,
            chip: chip.clone(),
            value,
            path,
        });
    }
}

/// `temp1_input` -> `temp1_label`. Built from the discovered entry name so drivers with
/// unusual numbering still pair correctly.
pub fn label_file_name(input_name: &str) -> Option<String> {
    input_name
        .strip_suffix("input")
        .map(|stem| format!("{}label", stem))
}

fn read_value(path: &Path) -> Result<i64, SourceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SourceError::unavailable(MetricSource::Hwmon, path, &e))?;
    text.trim()
        .parse::<i64>()
        .map_err(|_| SourceError::MalformedData {
            origin: MetricSource::Hwmon,
            reason: format!("{}: not an integer: {:?}", path.display(), text.trim()),
        })
}

/// Contents without surrounding whitespace; `None` if missing, unreadable or empty.
fn read_trimmed(path: &Path) -> Option<String> {
    let s = std::fs::read_to_string(path).ok()?;
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

fn kind_prefix(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Temperature => "temp",
        SensorKind::Fan => "fan",
    }
}

fn prefix_rank(kind: SensorKind) -> u8 {
    match kind {
        SensorKind::Temperature => 0,
        SensorKind::Fan => 1,
    }
}

/// Numeric index following `prefix` (`temp10_input` -> 10), for natural ordering.
fn sensor_index(name: &str, prefix: &str) -> u32 {
    name.strip_prefix(prefix)
        .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(u32::MAX)
}
