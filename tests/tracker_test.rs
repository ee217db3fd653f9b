// Integration tests for the async tracker loop
//
// Each test spawns a tracker on the test runtime, drives it through a handle and
// observes frames on a broadcast subscription.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;
use uwb_tracker::config::TrackerConfig;
use uwb_tracker::entity::Position;
use uwb_tracker::sample::{Metadata, Sample};
use uwb_tracker::tracker::Tracker;
use uwb_tracker::view::Frame;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fast_config() -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.render.frame_interval_ms = 5;
    config.motion.animation_duration_ms = 50;
    config
}

async fn next_frame(rx: &mut broadcast::Receiver<Frame>) -> Frame {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("frame channel closed")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_sample_publishes_frame() {
    let (handle, join) = Tracker::spawn(&fast_config());
    let mut frames = handle.subscribe();

    handle.update_position("AA:BB:CC:DD:EE:01", 3.0, 4.0, 0.0).await.unwrap();

    let frame = next_frame(&mut frames).await;
    let view = frame.entity("AA:BB:CC:DD:EE:01").expect("entity in frame");
    assert_eq!(view.position, Position::new(3.0, 4.0, 0.0));
    assert!(view.dirty);
    assert_eq!(view.label, "E:01");

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_animation_runs_to_target_then_stops() {
    let (handle, join) = Tracker::spawn(&fast_config());
    let mut frames = handle.subscribe();

    handle.update_position("tag", 0.0, 0.0, 0.0).await.unwrap();
    next_frame(&mut frames).await;

    handle.update_position("tag", 100.0, 0.0, 0.0).await.unwrap();

    let mut saw_animating = false;
    let last = loop {
        let frame = next_frame(&mut frames).await;
        if frame.is_animating() {
            saw_animating = true;
            let x = frame.entity("tag").unwrap().position.x;
            assert!((0.0..=37.5).contains(&x));
        } else {
            break frame;
        }
    };

    assert!(saw_animating);
    // Outlier clamped to 50, blended with mean(0, 50)
    assert_eq!(last.entity("tag").unwrap().position, Position::new(37.5, 0.0, 0.0));

    // Render tick is disarmed once idle: no further frames arrive
    let idle = timeout(Duration::from_millis(100), frames.recv()).await;
    assert!(idle.is_err());

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_capacity_rejection_counted() {
    let mut config = fast_config();
    config.registry.max_entities = 1;
    let (handle, join) = Tracker::spawn(&config);
    let mut frames = handle.subscribe();

    handle.update_position("A", 0.0, 0.0, 0.0).await.unwrap();
    handle.update_position("B", 0.0, 0.0, 0.0).await.unwrap();
    handle.shutdown().await.unwrap();
    join.await.unwrap();

    let snapshot = handle.metrics().get_snapshot();
    assert_eq!(snapshot.samples_applied, 1);
    assert_eq!(snapshot.samples_rejected, 1);

    // Anything published only ever carried "A"
    while let Ok(frame) = frames.try_recv() {
        assert!(frame.entity("B").is_none());
    }
}

#[tokio::test]
async fn test_invalid_sample_rejected_at_handle() {
    let (handle, join) = Tracker::spawn(&fast_config());

    let err = handle
        .send_sample(Sample::new("tag", f64::NAN, 0.0, 0.0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("must be finite"));

    assert!(handle.update_position("", 0.0, 0.0, 0.0).await.is_err());
    assert_eq!(handle.metrics().get_snapshot().samples_invalid, 2);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_metadata_reaches_frames() {
    let (handle, join) = Tracker::spawn(&fast_config());
    let mut frames = handle.subscribe();

    handle.update_position("tag", 0.0, 0.0, 0.0).await.unwrap();
    next_frame(&mut frames).await;

    let metadata = Metadata {
        tag: Some("0012345678".to_string()),
        balance: Some(25.0),
    };
    handle.update_metadata("tag", metadata.clone()).await.unwrap();

    let frame = next_frame(&mut frames).await;
    assert_eq!(frame.entity("tag").unwrap().metadata, metadata);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_prune_command_removes_idle_entities() {
    let mut config = fast_config();
    config.registry.inactivity_timeout_seconds = 0;
    let (handle, join) = Tracker::spawn(&config);
    let mut frames = handle.subscribe();

    handle.update_position("tag", 0.0, 0.0, 0.0).await.unwrap();
    next_frame(&mut frames).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.prune().await.unwrap();

    let frame = next_frame(&mut frames).await;
    assert!(frame.entity("tag").is_none());
    assert_eq!(handle.metrics().get_snapshot().entities_pruned, 1);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_periodic_sweep_prunes_idle_entities() {
    let mut config = fast_config();
    config.registry.inactivity_timeout_seconds = 0;
    config.registry.prune_interval_seconds = 1;
    let (handle, join) = Tracker::spawn(&config);
    let mut frames = handle.subscribe();

    handle.update_position("tag", 0.0, 0.0, 0.0).await.unwrap();
    next_frame(&mut frames).await;

    // No explicit prune: the sweep timer fires after one second
    let frame = loop {
        let frame = timeout(Duration::from_secs(3), frames.recv())
            .await
            .expect("sweep did not publish a frame")
            .expect("frame channel closed");
        if frame.entity("tag").is_none() {
            break frame;
        }
    };
    assert!(frame.entities.is_empty());
    assert_eq!(handle.metrics().get_snapshot().entities_pruned, 1);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_oversized_prune_interval_does_not_stop_loop() {
    let mut config = fast_config();
    config.registry.prune_interval_seconds = u64::MAX;
    let (handle, join) = Tracker::spawn(&config);
    let mut frames = handle.subscribe();

    handle.update_position("tag", 1.0, 2.0, 0.0).await.unwrap();
    let frame = next_frame(&mut frames).await;
    assert!(frame.entity("tag").is_some());

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test]
async fn test_send_after_shutdown_fails() {
    let (handle, join) = Tracker::spawn(&fast_config());

    handle.shutdown().await.unwrap();
    join.await.unwrap();

    let err = handle.update_position("tag", 0.0, 0.0, 0.0).await.unwrap_err();
    assert_eq!(err.to_string(), "tracker stopped");
}

#[tokio::test]
async fn test_loop_ends_when_handles_dropped() {
    let (handle, join) = Tracker::spawn(&fast_config());
    let producer = handle.clone();

    producer.update_position("tag", 1.0, 1.0, 0.0).await.unwrap();
    drop(producer);
    drop(handle);

    timeout(Duration::from_secs(2), join)
        .await
        .expect("tracker did not stop")
        .unwrap();
}
