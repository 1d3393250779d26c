// Network interface models

use serde::{Deserialize, Serialize};

/// One row of /proc/net/dev. Matched across ticks by `name`, never by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceCounter {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceUsage {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Receive rate in bytes/sec; `None` on the interface's first appearance.
    pub rx_bytes_per_sec: Option<f64>,
    /// Transmit rate in bytes/sec; `None` on the interface's first appearance.
    pub tx_bytes_per_sec: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUsage {
    pub interfaces: Vec<InterfaceUsage>,
    pub total_rx_bytes_per_sec: Option<f64>,
    pub total_tx_bytes_per_sec: Option<f64>,
    pub total_rx_bytes: u64,
    pub total_tx_bytes: u64,
}
