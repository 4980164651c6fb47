use huddle_core::{ClientEvent, HandshakeMessage, IceCandidate, ServerEvent};

use crate::integration::{ROOM, create_service, init_tracing, test_config};
use crate::utils::{TestClient, spawn_server, token_for};

#[tokio::test]
async fn test_two_participants_negotiate_and_part() {
    init_tracing();

    let (service, directory) = create_service(&test_config());
    let addr = spawn_server(service).await.expect("server");

    let mut a = TestClient::connect(addr).await.expect("a connects");
    assert!(!a.ice_servers.is_empty());
    a.join(ROOM, Some(token_for("u-a", "Asha"))).await.unwrap();
    assert_eq!(a.recv().await.unwrap(), ServerEvent::ExistingUsers(vec![]));

    let mut b = TestClient::connect(addr).await.expect("b connects");
    b.join(ROOM, Some(token_for("u-b", "Ben"))).await.unwrap();

    let ServerEvent::UserJoined(b_seen_by_a) = a.recv().await.unwrap() else {
        panic!("a should hear about b");
    };
    assert_eq!(b_seen_by_a.display_name, "Ben");
    assert_eq!(b_seen_by_a.participant_id.0, "u-b");

    let ServerEvent::ExistingUsers(roster) = b.recv().await.unwrap() else {
        panic!("b should get the roster");
    };
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].display_name, "Asha");
    let a_id = roster[0].connection_id;
    let b_id = b_seen_by_a.connection_id;

    // b is the newcomer, so b offers.
    b.send(&ClientEvent::Signal {
        to: a_id,
        data: HandshakeMessage::Offer { sdp: "v=0 offer".into() },
    })
    .await
    .unwrap();
    b.send(&ClientEvent::Signal {
        to: a_id,
        data: HandshakeMessage::Candidate {
            candidate: IceCandidate::new("candidate:1 1 udp 1 10.0.0.2 5000 typ host"),
        },
    })
    .await
    .unwrap();

    assert_eq!(
        a.recv().await.unwrap(),
        ServerEvent::Signal {
            from: b_id,
            data: HandshakeMessage::Offer { sdp: "v=0 offer".into() },
        }
    );
    assert!(matches!(
        a.recv().await.unwrap(),
        ServerEvent::Signal { from, data: HandshakeMessage::Candidate { .. } } if from == b_id
    ));

    a.send(&ClientEvent::Signal {
        to: b_id,
        data: HandshakeMessage::Answer { sdp: "v=0 answer".into() },
    })
    .await
    .unwrap();
    assert_eq!(
        b.recv().await.unwrap(),
        ServerEvent::Signal {
            from: a_id,
            data: HandshakeMessage::Answer { sdp: "v=0 answer".into() },
        }
    );

    b.close().await.unwrap();
    assert_eq!(
        a.recv().await.unwrap(),
        ServerEvent::UserLeft { connection_id: b_id }
    );

    assert_eq!(directory.attendees(&ROOM.into()).len(), 2);
    a.close().await.unwrap();
}

#[tokio::test]
async fn test_rejected_join_keeps_socket_open() {
    init_tracing();

    let (service, _) = create_service(&test_config());
    let addr = spawn_server(service).await.expect("server");

    let mut a = TestClient::connect(addr).await.expect("a connects");
    a.send(&serde_json::from_str::<ClientEvent>(
        r#"{ "event": "join-room", "data": { "roomId": "65f1c2a9b4e8d7a6c5b4a3f2" } }"#,
    )
    .unwrap())
    .await
    .unwrap();

    let event = a.recv().await.unwrap();
    assert_eq!(
        event.rejection(),
        Some(huddle_core::JoinRejection::AuthRequired)
    );

    a.join(ROOM, Some(token_for("u-a", "Asha"))).await.unwrap();
    assert_eq!(a.recv().await.unwrap(), ServerEvent::ExistingUsers(vec![]));
    a.expect_silence(100).await.unwrap();
}
