use huddle_core::{MAX_OCCUPANCY, RoomId};
use huddle_server::Admission;

use crate::integration::{ROOM, create_test_rooms, init_tracing, participant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_joins_never_exceed_capacity() {
    init_tracing();

    let (manager, _signaling, _signal_rx) = create_test_rooms(MAX_OCCUPANCY);
    let room = RoomId::from(ROOM);

    let first = manager.get_room_handle(&room);
    assert!(matches!(
        first.join(participant("host")).await,
        Admission::Admitted(_)
    ));

    // 5 free slots, 10 contenders.
    let mut attempts = Vec::new();
    for i in 0..10 {
        let manager = manager.clone();
        let room = room.clone();
        attempts.push(tokio::spawn(async move {
            let handle = manager.get_room_handle(&room);
            handle.join(participant(&format!("guest-{}", i))).await
        }));
    }

    let mut admitted = 0;
    let mut full = 0;
    for attempt in attempts {
        match attempt.await.expect("join task panicked") {
            Admission::Admitted(_) => admitted += 1,
            Admission::Full => full += 1,
            Admission::Closed => panic!("room must stay open while occupied"),
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(full, 5);
    assert_eq!(manager.occupancy(&room).await, MAX_OCCUPANCY);
}

#[tokio::test]
async fn test_full_room_turns_away_without_notifying() {
    init_tracing();

    let (manager, signaling, _signal_rx) = create_test_rooms(2);
    let handle = manager.get_room_handle(&RoomId::from(ROOM));

    handle.join(participant("a")).await;
    handle.join(participant("b")).await;
    let before = signaling.get_signals().await.len();

    let late = participant("c");
    assert_eq!(handle.join(late.clone()).await, Admission::Full);

    assert_eq!(signaling.get_signals().await.len(), before);
    assert!(
        handle
            .members()
            .await
            .iter()
            .all(|m| m.connection_id != late.connection_id)
    );
}
