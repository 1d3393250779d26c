// Hardware monitor sensor models

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Fan,
}

impl SensorKind {
    /// Parse from the file-name prefix (`temp1_input` -> Temperature).
    pub fn from_entry_name(name: &str) -> Option<Self> {
        if name.starts_with("temp") {
            Some(SensorKind::Temperature)
        } else if name.starts_with("fan") {
            Some(SensorKind::Fan)
        } else {
            None
        }
    }

    pub fn generic_name(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Fan => "Fan Speed",
        }
    }
}

/// One sensor input. `value` stays in kernel units: millidegrees Celsius or RPM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub kind: SensorKind,
    pub label: Option<String>,
    /// Driver name from the monitor directory's `name` file.
    pub chip: Option<String>,
    pub value: i64,
    pub path: PathBuf,
}

impl SensorReading {
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.kind.generic_name())
    }

    /// Value in display units: °C for temperatures, RPM for fans.
    pub fn human_value(&self) -> f64 {
        match self.kind {
            SensorKind::Temperature => units::millidegrees_to_celsius(self.value),
            SensorKind::Fan => self.value as f64,
        }
    }
}
