use anyhow::Result;
use hostsampler::*;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Frames go to stdout; logs go to stderr so the two never interleave.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        interval_ms = app_config.sampling.interval_ms,
        top_n = app_config.sampling.top_n,
        "Starting {}",
        version::banner()
    );

    let (tx, rx) =
        broadcast::channel::<models::MetricsFrame>(app_config.publishing.broadcast_capacity);
    let sink = Arc::new(diagnostics::TracingSink::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            sampler: worker::Sampler::from_config(&app_config),
            sink: sink.clone(),
            tx,
            shutdown_rx,
        },
        worker::WorkerConfig::from(&app_config),
    );
    let display_handle = tokio::spawn(write_frames(rx));

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    // Worker dropped the sender; the display drains and exits.
    let _ = display_handle.await;
    tracing::info!(
        diagnostics_reported = sink.reported_total(),
        "Shutdown complete"
    );

    Ok(())
}

/// Display collaborator: one JSON object per frame on stdout.
async fn write_frames(mut rx: broadcast::Receiver<models::MetricsFrame>) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                let line = match serde_json::to_string(&frame) {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::warn!(error = %e, "frame serialization failed");
                        continue;
                    }
                };
                let mut out = std::io::stdout().lock();
                if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
                    tracing::debug!("stdout closed; display stopping");
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "display lagging; frames dropped");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
