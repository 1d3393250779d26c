// Unit conversions for the presentation boundary.

pub fn millidegrees_to_celsius(millideg: i64) -> f64 {
    millideg as f64 / 1000.0
}

pub fn kib_per_sec(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / 1024.0
}

pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
