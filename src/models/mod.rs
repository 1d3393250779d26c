// Domain models: raw counter records and the derived frame handed to the display.

mod cpu;
mod frame;
mod memory;
mod network;
mod process;
mod sensor;
pub mod units;

pub use cpu::{CpuCounterSnapshot, CpuPercentages, CpuUsage};
pub use frame::{MetricsFrame, ProcessTable, Rate};
pub use memory::{MemoryCounters, MemoryUsage};
pub use network::{InterfaceUsage, NetworkInterfaceCounter, NetworkUsage};
pub use process::{ProcessSample, ProcessUsage, SortKey};
pub use sensor::{SensorKind, SensorReading};
