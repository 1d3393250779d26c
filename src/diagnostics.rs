// Diagnostics sink: receives one event per failed source read.

use crate::error::SourceError;
use std::sync::atomic::{AtomicU64, Ordering};

pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, error: &SourceError);
}

/// Emits each failure as a structured `tracing` warning.
#[derive(Debug, Default)]
pub struct TracingSink {
    reported: AtomicU64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total events reported since startup.
    pub fn reported_total(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }
}

impl DiagnosticsSink for TracingSink {
    fn report(&self, error: &SourceError) {
        self.reported.fetch_add(1, Ordering::Relaxed);
        match error {
            SourceError::SourceUnavailable {
                origin,
                path,
                reason,
            } => {
                tracing::warn!(
                    source = %origin,
                    path = %path.display(),
                    reason = %reason,
                    "metric source unavailable"
                );
            }
            SourceError::MalformedData { origin, reason } => {
                tracing::warn!(source = %origin, reason = %reason, "metric source malformed");
            }
        }
    }
}
