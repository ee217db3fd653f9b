// Async ingestion and render loop
//
// Producers (receiver threads, network tasks) send commands over a bounded mpsc
// channel; a single task owns the TrackingRegistry, so no lock guards it. The
// render tick only runs while something is animating or waiting to be drawn.

use crate::config::TrackerConfig;
use crate::registry::TrackingRegistry;
use crate::sample::{Metadata, Sample};
use crate::view::Frame;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, MissedTickBehavior};
use tracing::{debug, info, warn};

pub mod metrics;

pub use metrics::{MetricsSnapshot, TrackerMetrics};

/// Render loop and channel sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Tick period while animations are running (~60 fps by default)
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,

    /// Pending commands before producers wait
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Frames buffered per subscriber before the slowest one lags
    #[serde(default = "default_frame_buffer")]
    pub frame_buffer: usize,
}

fn default_frame_interval() -> u64 {
    16
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_frame_buffer() -> usize {
    64
}

impl RenderConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            channel_capacity: default_channel_capacity(),
            frame_buffer: default_frame_buffer(),
        }
    }
}

/// Messages accepted by the tracker loop
#[derive(Debug, Clone)]
pub enum Command {
    Sample(Sample),
    Metadata { id: String, metadata: Metadata },
    Prune,
    Shutdown,
}

/// Cloneable producer/subscriber handle to a running tracker
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    frames: broadcast::Sender<Frame>,
    metrics: TrackerMetrics,
}

impl TrackerHandle {
    /// Queue a sample. Malformed samples are rejected here, before reaching the loop.
    pub async fn send_sample(&self, sample: Sample) -> Result<()> {
        if let Err(e) = sample.validate() {
            self.metrics.record_invalid();
            return Err(e.into());
        }
        self.send(Command::Sample(sample)).await
    }

    pub async fn update_position(&self, id: &str, x: f64, y: f64, z: f64) -> Result<()> {
        self.send_sample(Sample::new(id, x, y, z)).await
    }

    pub async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        self.send(Command::Metadata {
            id: id.to_string(),
            metadata,
        })
        .await
    }

    /// Run an inactivity sweep now instead of waiting for the next interval
    pub async fn prune(&self) -> Result<()> {
        self.send(Command::Prune).await
    }

    /// Ask the loop to stop after the commands already queued
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Subscribe to render frames
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub fn metrics(&self) -> &TrackerMetrics {
        &self.metrics
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("tracker stopped"))
    }
}

/// Single-consumer loop owning the registry
pub struct Tracker {
    registry: TrackingRegistry,
    render: RenderConfig,
    inactivity_timeout: Duration,
    prune_interval: Duration,
    commands: mpsc::Receiver<Command>,
    frames: broadcast::Sender<Frame>,
    metrics: TrackerMetrics,
}

impl Tracker {
    pub fn new(config: &TrackerConfig) -> (Self, TrackerHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.render.channel_capacity.max(1));
        let (frame_tx, _) = broadcast::channel(config.render.frame_buffer.max(1));
        let metrics = TrackerMetrics::new();

        let tracker = Self {
            registry: TrackingRegistry::from_config(config),
            render: config.render.clone(),
            inactivity_timeout: config.registry.inactivity_timeout(),
            prune_interval: config.registry.prune_interval(),
            commands: command_rx,
            frames: frame_tx.clone(),
            metrics: metrics.clone(),
        };

        let handle = TrackerHandle {
            commands: command_tx,
            frames: frame_tx,
            metrics,
        };

        (tracker, handle)
    }

    /// Start the loop on the current tokio runtime
    pub fn spawn(config: &TrackerConfig) -> (TrackerHandle, JoinHandle<()>) {
        let (tracker, handle) = Self::new(config);
        (handle, tokio::spawn(tracker.run()))
    }

    /// Process commands until `Shutdown` or until every handle is dropped
    pub async fn run(mut self) {
        info!(
            max_entities = self.registry.max_entities(),
            frame_interval_ms = self.render.frame_interval().as_millis() as u64,
            "Starting tracker"
        );

        let mut render_timer = interval(self.render.frame_interval());
        // Skip missed ticks so a stalled renderer doesn't cause a burst of frames
        render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut render_armed = false;

        let mut prune_timer = interval_at(
            tokio::time::Instant::now() + self.prune_interval,
            self.prune_interval,
        );
        prune_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let needs_frame = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = render_timer.tick(), if render_armed => {
                    render_armed = self.publish_frame();
                    false
                }
                _ = prune_timer.tick() => self.prune(),
            };

            if needs_frame && !render_armed {
                render_armed = true;
                render_timer.reset();
            }
        }

        info!(entities = self.registry.len(), "Tracker stopped");
    }

    /// Apply one command; true if a frame should be published
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Sample(sample) => match self.registry.apply(&sample, Instant::now()) {
                Ok(outcome) => {
                    self.metrics.record_outcome(outcome);
                    outcome.needs_redraw()
                }
                Err(e) => {
                    warn!(entity_id = %sample.id, error = %e, "Invalid sample, skipping");
                    self.metrics.record_invalid();
                    false
                }
            },
            Command::Metadata { id, metadata } => {
                let found = self.registry.update_metadata(&id, metadata);
                if !found {
                    debug!(entity_id = %id, "Metadata for untracked entity ignored");
                }
                found
            }
            Command::Prune => self.prune(),
            Command::Shutdown => false,
        }
    }

    /// Advance animations and broadcast a frame; true while still animating
    fn publish_frame(&mut self) -> bool {
        let animating = self.registry.update_all_animations_at(Instant::now());
        let frame = Frame::new(self.registry.views());
        let entity_count = frame.entities.len();

        // Send only fails when no renderer is subscribed
        let _ = self.frames.send(frame);
        self.metrics.record_frame();
        self.registry.mark_all_processed();

        debug!(entities = entity_count, animating, "Frame published");
        animating
    }

    fn prune(&mut self) -> bool {
        let removed = self.registry.prune_inactive(self.inactivity_timeout);
        self.metrics.record_pruned(removed.len());
        !removed.is_empty()
    }
}
