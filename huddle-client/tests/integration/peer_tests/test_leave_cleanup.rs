use huddle_client::{LinkEvent, LinkState, TransportState};
use huddle_core::{HandshakeMessage, IceCandidate};

use crate::integration::{create_manager, drain_outbound, init_tracing, participant};
use crate::utils::{MockConnector, TransportCall};

#[tokio::test]
async fn test_departure_drops_link_and_stream() {
    init_tracing();
    let connector = MockConnector::new();
    let (mut peers, mut outbound, _) = create_manager(&connector);
    let b = participant("b");

    peers.on_participant_joined(b.clone()).await;
    peers
        .on_handshake(b.connection_id, HandshakeMessage::Offer { sdp: "o".into() })
        .await;
    peers
        .on_link_event(LinkEvent::RemoteTrack {
            remote: b.connection_id,
            stream_id: "stream-b".into(),
            track_id: "audio".into(),
        })
        .await;
    peers
        .on_link_event(LinkEvent::StateChanged {
            remote: b.connection_id,
            state: TransportState::Connected,
        })
        .await;
    assert_eq!(peers.streaming_count(), 1);
    drain_outbound(&mut outbound);

    peers.on_participant_left(b.connection_id).await;

    assert_eq!(peers.link_count(), 0);
    assert_eq!(peers.streaming_count(), 0);
    assert_eq!(
        connector.calls_for(b.connection_id).last(),
        Some(&TransportCall::Close)
    );

    // Late frames from b are stale.
    peers
        .on_handshake(b.connection_id, HandshakeMessage::Offer { sdp: "o2".into() })
        .await;
    peers
        .on_handshake(
            b.connection_id,
            HandshakeMessage::Candidate {
                candidate: IceCandidate::new("candidate:late"),
            },
        )
        .await;
    peers
        .on_link_event(LinkEvent::LocalCandidate {
            remote: b.connection_id,
            candidate: IceCandidate::new("candidate:mine"),
        })
        .await;

    assert_eq!(peers.link_count(), 0);
    assert!(drain_outbound(&mut outbound).is_empty());
    assert_eq!(
        connector
            .calls_for(b.connection_id)
            .iter()
            .filter(|c| **c == TransportCall::Connect)
            .count(),
        1
    );
}

/// The newcomer disconnects while its offer is still on the way.
#[tokio::test]
async fn test_newcomer_leaves_before_offer_is_answered() {
    let connector = MockConnector::new();
    let (mut peers, mut outbound, _) = create_manager(&connector);
    let b = participant("b");

    peers.on_participant_joined(b.clone()).await;
    assert_eq!(peers.link_state(&b.connection_id), Some(LinkState::AwaitingOffer));

    peers.on_participant_left(b.connection_id).await;
    peers
        .on_handshake(b.connection_id, HandshakeMessage::Offer { sdp: "o".into() })
        .await;

    assert_eq!(peers.link_count(), 0);
    assert!(drain_outbound(&mut outbound).is_empty());
    assert_eq!(
        connector.calls_for(b.connection_id),
        vec![TransportCall::Connect, TransportCall::Close]
    );
}

#[tokio::test]
async fn test_peer_leaves_while_we_await_its_answer() {
    let connector = MockConnector::new();
    let (mut peers, _, _) = create_manager(&connector);
    let a = participant("a");
    let c = participant("c");

    peers.on_roster(vec![a.clone(), c.clone()]).await;
    peers.on_participant_left(a.connection_id).await;
    peers
        .on_handshake(a.connection_id, HandshakeMessage::Answer { sdp: "late".into() })
        .await;

    assert_eq!(peers.link_count(), 1);
    assert_eq!(peers.link_state(&c.connection_id), Some(LinkState::AwaitingAnswer));
}

#[tokio::test]
async fn test_unknown_departure_is_harmless() {
    let connector = MockConnector::new();
    let (mut peers, _, _) = create_manager(&connector);
    let a = participant("a");
    peers.on_roster(vec![a.clone()]).await;

    peers.on_participant_left(participant("ghost").connection_id).await;

    assert_eq!(peers.link_count(), 1);
}

#[tokio::test]
async fn test_teardown_closes_everything() {
    let connector = MockConnector::new();
    let (mut peers, _, _) = create_manager(&connector);
    let a = participant("a");
    let b = participant("b");

    peers.on_roster(vec![a.clone()]).await;
    peers.on_participant_joined(b.clone()).await;

    assert_eq!(peers.teardown().await, 2);
    assert_eq!(peers.link_count(), 0);
    for p in [&a, &b] {
        assert_eq!(
            connector.calls_for(p.connection_id).last(),
            Some(&TransportCall::Close)
        );
    }
    assert_eq!(peers.teardown().await, 0);
}
