//! Integration tests for the registry and broadcast hub working together.

use std::time::Duration;

use partyhub_protocol::{Details, Event, EventKind, JsonCodec, RoomId, UserId, decode_event};
use partyhub_room::{
    Client, Frame, HubHandle, RegistryConfig, RegistryHandle, spawn_hub, spawn_registry,
};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn setup() -> (RegistryHandle, HubHandle) {
    let registry = spawn_registry(RegistryConfig::default());
    let hub = spawn_hub(registry.clone(), JsonCodec);
    (registry, hub)
}

async fn join(
    registry: &RegistryHandle,
    room: &str,
    user: &str,
) -> (Client, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Client::new(UserId::new(user), tx);
    registry
        .register(RoomId::new(room), client.clone())
        .await
        .unwrap();
    (client, rx)
}

async fn recv_event(rx: &mut mpsc::UnboundedReceiver<Frame>) -> Event {
    let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("channel closed");
    decode_event(&JsonCodec, frame.as_bytes()).unwrap()
}

async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<Frame>) {
    let res = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(res.is_err(), "expected no frame, got {res:?}");
}

// =========================================================================
// Registry snapshots
// =========================================================================

#[tokio::test]
async fn test_snapshot_preserves_registration_order() {
    let (registry, _hub) = setup();
    let (_a, _ra) = join(&registry, "r", "alice").await;
    let (_b, _rb) = join(&registry, "r", "bob").await;
    let (_c, _rc) = join(&registry, "r", "carol").await;

    let users: Vec<String> = registry
        .snapshot(RoomId::new("r"))
        .await
        .unwrap()
        .iter()
        .map(|c| c.user_id().to_string())
        .collect();
    assert_eq!(users, vec!["alice", "bob", "carol"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_snapshot_is_exact_under_concurrent_registration() {
    let (registry, _hub) = setup();
    let mut tasks = Vec::new();
    let mut receivers = Vec::new();

    for i in 0..32 {
        let (tx, rx) = mpsc::unbounded_channel();
        receivers.push(rx);
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let client = Client::new(UserId::new(format!("user-{i}")), tx);
            registry.register(RoomId::new("busy"), client).await
        }));
    }

    let mut counts = Vec::new();
    for task in tasks {
        counts.push(task.await.unwrap().unwrap());
    }

    // Every registration saw a distinct count: no insert was lost.
    counts.sort_unstable();
    assert_eq!(counts, (1..=32).collect::<Vec<_>>());

    let snapshot = registry.snapshot(RoomId::new("busy")).await.unwrap();
    assert_eq!(snapshot.len(), 32);
    let mut users: Vec<String> = snapshot.iter().map(|c| c.user_id().to_string()).collect();
    users.sort();
    users.dedup();
    assert_eq!(users.len(), 32);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "one", "alice").await;
    let (_b, mut rb) = join(&registry, "two", "bob").await;

    hub.publish(Event::finish(RoomId::new("one")));

    assert_eq!(recv_event(&mut ra).await.kind(), EventKind::AvoidYurikoFinish);
    assert_silent(&mut rb).await;
}

// =========================================================================
// Delivery rules
// =========================================================================

#[tokio::test]
async fn test_join_is_delivered_to_everyone_including_joiner() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "r", "alice").await;
    let (_b, mut rb) = join(&registry, "r", "bob").await;

    hub.publish(Event::room_join(RoomId::new("r"), UserId::new("bob"), 2));

    for rx in [&mut ra, &mut rb] {
        let event = recv_event(rx).await;
        assert_eq!(event.kind(), EventKind::RoomJoin);
        assert_eq!(event.user_id(), Some(&UserId::new("bob")));
        match event.details() {
            Details::RoomJoin(d) => assert_eq!(d.player_count, 2),
            other => panic!("unexpected details: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_user_event_is_not_echoed_to_sender() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "r", "alice").await;
    let (_b, mut rb) = join(&registry, "r", "bob").await;
    let (_c, mut rc) = join(&registry, "r", "carol").await;

    hub.publish(Event::from_user(
        RoomId::new("r"),
        UserId::new("alice"),
        Details::GameStart,
    ));

    assert_eq!(recv_event(&mut rb).await.kind(), EventKind::GameStartAvoidYuriko);
    assert_eq!(recv_event(&mut rc).await.kind(), EventKind::GameStartAvoidYuriko);
    assert_silent(&mut ra).await;
}

#[tokio::test]
async fn test_events_arrive_in_publish_order() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "r", "alice").await;

    for i in 0..20u8 {
        hub.publish(Event::suspend(RoomId::new("r"), format!("msg-{i}")));
    }

    for i in 0..20u8 {
        match recv_event(&mut ra).await.details() {
            Details::Suspend(d) => assert_eq!(d.message, format!("msg-{i}")),
            other => panic!("unexpected details: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_closed_client_does_not_block_others() {
    let (registry, hub) = setup();
    let (_a, ra) = join(&registry, "r", "alice").await;
    let (_b, mut rb) = join(&registry, "r", "bob").await;

    // Alice's writer is gone but she's still registered.
    drop(ra);

    hub.publish(Event::finish(RoomId::new("r")));
    hub.publish(Event::finish(RoomId::new("r")));

    assert_eq!(recv_event(&mut rb).await.kind(), EventKind::AvoidYurikoFinish);
    assert_eq!(recv_event(&mut rb).await.kind(), EventKind::AvoidYurikoFinish);
}

#[tokio::test]
async fn test_unregistered_client_receives_nothing() {
    let (registry, hub) = setup();
    let (a, mut ra) = join(&registry, "r", "alice").await;
    let (_b, mut rb) = join(&registry, "r", "bob").await;

    registry
        .unregister(RoomId::new("r"), UserId::new("alice"), a.conn_id())
        .await
        .unwrap();
    hub.publish(Event::finish(RoomId::new("r")));

    assert_eq!(recv_event(&mut rb).await.kind(), EventKind::AvoidYurikoFinish);
    assert_silent(&mut ra).await;
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_drains_pending_events() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "r", "alice").await;

    for _ in 0..50 {
        hub.publish(Event::finish(RoomId::new("r")));
    }
    hub.shutdown().await.unwrap();

    let mut received = 0;
    while let Ok(frame) = ra.try_recv() {
        let event = decode_event(&JsonCodec, frame.as_bytes()).unwrap();
        assert_eq!(event.kind(), EventKind::AvoidYurikoFinish);
        received += 1;
    }
    assert_eq!(received, 50);
}

#[tokio::test]
async fn test_publish_after_shutdown_is_dropped() {
    let (registry, hub) = setup();
    let (_a, mut ra) = join(&registry, "r", "alice").await;

    hub.shutdown().await.unwrap();
    hub.publish(Event::finish(RoomId::new("r")));

    assert_silent(&mut ra).await;
    assert!(hub.shutdown().await.is_err());
}
