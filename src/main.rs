use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::{BroadcastStream, LinesStream};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use uwb_tracker::config::{load_config, TrackerConfig};
use uwb_tracker::sample::InputRecord;
use uwb_tracker::tracker::{Tracker, TrackerHandle};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uwb_tracker=info".into()),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => TrackerConfig::default(),
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    info!("uwb-tracker starting, reading JSON lines from stdin");

    let (handle, tracker_task) = Tracker::spawn(&config);

    let renderer = tokio::spawn(log_frames(handle.clone()));

    tokio::select! {
        result = ingest_stdin(&handle) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    handle.shutdown().await?;
    tracker_task.await.context("Tracker task failed")?;
    renderer.abort();

    let metrics = handle.metrics().get_snapshot();
    info!(
        applied = metrics.samples_applied,
        unchanged = metrics.samples_unchanged,
        rejected = metrics.samples_rejected,
        invalid = metrics.samples_invalid,
        frames = metrics.frames_published,
        "uwb-tracker finished"
    );

    Ok(())
}

/// Forward stdin records to the tracker until EOF
async fn ingest_stdin(handle: &TrackerHandle) -> Result<()> {
    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());

    while let Some(line) = lines.next().await {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<InputRecord>(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Malformed input line, skipping");
                continue;
            }
        };

        let result = match record {
            InputRecord::Position(sample) => handle.send_sample(sample).await,
            InputRecord::Metadata { id, metadata } => handle.update_metadata(&id, metadata).await,
        };

        if let Err(e) = result {
            warn!(error = %e, "Input record rejected");
        }
    }

    Ok(())
}

/// Stand-in renderer: logs each published frame
async fn log_frames(handle: TrackerHandle) {
    let mut frames = BroadcastStream::new(handle.subscribe());
    drop(handle);

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => {
                for view in frame.entities.iter().filter(|v| v.dirty) {
                    debug!(
                        entity_id = %view.id,
                        animating = view.animating,
                        "{}",
                        view.summary()
                    );
                }
            }
            Err(e) => warn!(error = %e, "Renderer lagging, frames dropped"),
        }
    }
}
