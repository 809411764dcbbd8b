//! Integration tests for delivering engine callbacks from foreign threads

mod helpers;

use std::thread;
use tonearm_common::events::SessionNotification;
use tonearm_session::EngineCallbacks;

use helpers::{controller, drain_notifications};

#[tokio::test]
async fn test_foreign_thread_events_applied_in_emission_order() {
    let (mut controller, engine) = controller();
    let mut rx = controller.subscribe();

    let callbacks = engine.callbacks.clone();
    thread::spawn(move || {
        for volume in 1..=50u16 {
            callbacks.volume_changed(volume);
        }
    })
    .join()
    .unwrap();

    assert_eq!(controller.drain_pending(), 50);

    let volumes: Vec<u16> = drain_notifications(&mut rx)
        .into_iter()
        .map(|n| match n {
            SessionNotification::VolumeChanged { volume } => volume,
            other => panic!("unexpected notification: {other:?}"),
        })
        .collect();
    assert_eq!(volumes, (1..=50).collect::<Vec<_>>());
    assert_eq!(controller.volume(), 50);
}

#[tokio::test]
async fn test_step_waits_for_foreign_event() {
    let (mut controller, engine) = controller();

    let callbacks = engine.callbacks.clone();
    let worker = thread::spawn(move || {
        let track = String::from("spotify:track:later");
        callbacks.changed(&track);
    });

    assert!(controller.step().await);
    worker.join().unwrap();

    assert_eq!(controller.track_id(), "spotify:track:later");
}

#[tokio::test]
async fn test_state_not_touched_before_drain() {
    let (mut controller, engine) = controller();

    engine.callbacks.connected();
    engine.callbacks.changed("t9");

    // Queued but not yet applied on the owning task
    assert_eq!(controller.track_id(), "");

    controller.drain_pending();
    assert_eq!(controller.track_id(), "t9");
}
