// Worker integration test: spawn the tick loop over a fake tree, receive frames, shut down

mod common;

use common::{FakeHost, RecordingSink};
use hostsampler::diagnostics::DiagnosticsSink;
use hostsampler::error::SourceError;
use hostsampler::worker::{Sampler, SamplerSettings, WorkerConfig, WorkerDeps, spawn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

#[tokio::test]
async fn worker_emits_cold_then_warm_frames_and_stops_on_shutdown() {
    let host = FakeHost::populated();
    let sink = Arc::new(RecordingSink::default());
    let (tx, mut rx) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            sampler: Sampler::new(host.sources(), SamplerSettings::default()),
            sink: sink.clone(),
            tx,
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 20,
            stats_log_interval_secs: 3600,
        },
    );

    let first = rx.recv().await.expect("first frame");
    assert!(first.elapsed_secs.is_none());
    assert!(first.cpu.as_ref().unwrap().percent.is_none());

    let second = rx.recv().await.expect("second frame");
    assert!(second.timestamp >= first.timestamp);
    assert!(second.network.is_some());

    let _ = shutdown_tx.send(());
    let sampler = handle.await.expect("worker task joined");
    assert!(sampler.is_warm());
    assert!(sink.events().is_empty());

    // Sender dropped with the worker.
    while rx.recv().await.is_ok() {}
}

/// Panics on the first report, records the rest.
#[derive(Default)]
struct PanicOnceSink {
    calls: AtomicUsize,
}

impl DiagnosticsSink for PanicOnceSink {
    fn report(&self, _error: &SourceError) {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("sink failure");
        }
    }
}

#[tokio::test]
async fn worker_survives_a_panicking_tick_and_restarts_cold() {
    let host = FakeHost::populated();
    host.remove_proc_file("meminfo");
    let sink = Arc::new(PanicOnceSink::default());
    let (tx, mut rx) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            sampler: Sampler::new(host.sources(), SamplerSettings::default()),
            sink: sink.clone(),
            tx,
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 20,
            stats_log_interval_secs: 3600,
        },
    );

    // First tick panicked and produced nothing; the next one comes from a cold sampler.
    let frame = rx.recv().await.expect("frame after failed tick");
    assert!(frame.elapsed_secs.is_none());
    assert!(frame.memory.is_none());
    assert!(frame.cpu.is_some());
    assert!(sink.calls.load(Ordering::SeqCst) >= 2);

    let _ = shutdown_tx.send(());
    let sampler = handle.await.expect("worker task joined");
    assert!(sampler.is_warm());
}
