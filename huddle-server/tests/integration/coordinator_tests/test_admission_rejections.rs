use std::sync::Arc;

use huddle_core::{JoinRejection, RoomId, ServerEvent};
use huddle_server::ServerConfig;

use crate::integration::{
    ROOM, create_service, create_service_with, drain_events, init_tracing, open_connection,
    test_config,
};
use crate::utils::{OfflineDirectory, token_for};

#[tokio::test]
async fn test_missing_or_blank_credential_requires_auth() {
    init_tracing();
    let (service, _) = create_service(&test_config());
    let (id, _rx) = open_connection(&service);

    let err = service.join(id, RoomId::from(ROOM), None).await.unwrap_err();
    assert_eq!(err, JoinRejection::AuthRequired);

    let err = service
        .join(id, RoomId::from(ROOM), Some("  ".into()))
        .await
        .unwrap_err();
    assert_eq!(err, JoinRejection::AuthRequired);
}

#[tokio::test]
async fn test_bad_credential_is_rejected() {
    init_tracing();
    let (service, _) = create_service(&test_config());
    let (id, _rx) = open_connection(&service);

    let err = service
        .join(id, RoomId::from(ROOM), Some("forged".into()))
        .await
        .unwrap_err();
    assert_eq!(err, JoinRejection::InvalidCredential);
}

#[tokio::test]
async fn test_room_reference_must_be_well_formed_and_known() {
    init_tracing();
    let (service, directory) = create_service(&test_config());
    let (id, _rx) = open_connection(&service);
    let token = Some(token_for("u1", "Asha"));

    for bad in ["", "test-session-123", "not a room at all"] {
        let err = service
            .join(id, RoomId::from(bad), token.clone())
            .await
            .unwrap_err();
        assert_eq!(err, JoinRejection::InvalidRoom, "room {:?}", bad);
    }

    let unknown = RoomId::from("000000000000000000000000");
    let err = service.join(id, unknown.clone(), token).await.unwrap_err();
    assert_eq!(err, JoinRejection::RoomNotFound);
    assert!(directory.attendees(&unknown).is_empty());
    assert_eq!(service.rooms().room_count(), 0);
}

#[tokio::test]
async fn test_directory_outage_refuses_admission() {
    init_tracing();
    let service = create_service_with(&test_config(), Arc::new(OfflineDirectory));
    let (id, _rx) = open_connection(&service);

    let err = service
        .join(id, RoomId::from(ROOM), Some(token_for("u1", "Asha")))
        .await
        .unwrap_err();
    assert_eq!(err, JoinRejection::Unavailable);
}

#[tokio::test]
async fn test_dev_room_is_opt_in() {
    init_tracing();
    let token = Some(token_for("u1", "Asha"));

    let (strict, _) = create_service(&test_config());
    let (id, _rx) = open_connection(&strict);
    assert_eq!(
        strict
            .join(id, RoomId::from("test-session-123"), token.clone())
            .await
            .unwrap_err(),
        JoinRejection::InvalidRoom
    );

    let config = ServerConfig {
        dev_room: Some(RoomId::from("test-session-123")),
        ..test_config()
    };
    let (relaxed, directory) = create_service(&config);
    let (id, _rx) = open_connection(&relaxed);
    let handle = relaxed
        .join(id, RoomId::from("test-session-123"), token)
        .await
        .expect("dev room admits without lookup");

    assert_eq!(handle.room_id(), &RoomId::from("test-session-123"));
    assert!(directory.attendees(&RoomId::from("test-session-123")).is_empty());
}

#[tokio::test]
async fn test_second_join_on_same_connection_is_refused() {
    init_tracing();
    let (service, _) = create_service(&test_config());
    let (id, _rx) = open_connection(&service);
    let token = Some(token_for("u1", "Asha"));

    service
        .join(id, RoomId::from(ROOM), token.clone())
        .await
        .expect("first join");
    let err = service
        .join(id, RoomId::from(ROOM), token)
        .await
        .unwrap_err();

    assert_eq!(err, JoinRejection::AlreadyJoined);
    assert_eq!(service.rooms().occupancy(&RoomId::from(ROOM)).await, 1);
}

#[tokio::test]
async fn test_rejections_reach_the_client_as_events() {
    init_tracing();
    let config = ServerConfig {
        max_occupancy: 1,
        ..test_config()
    };
    let (service, _) = create_service(&config);
    let (first, mut first_rx) = open_connection(&service);
    let (second, mut second_rx) = open_connection(&service);
    let (third, mut third_rx) = open_connection(&service);

    let join = |token: Option<String>| {
        serde_json::from_value(serde_json::json!({
            "event": "join-room",
            "data": { "roomId": ROOM, "token": token }
        }))
        .unwrap()
    };

    service
        .handle_event(first, join(Some(token_for("u1", "Asha"))))
        .await;
    service
        .handle_event(second, join(Some(token_for("u2", "Ben"))))
        .await;
    service.handle_event(third, join(None)).await;

    assert_eq!(drain_events(&mut first_rx), vec![ServerEvent::ExistingUsers(vec![])]);
    assert_eq!(drain_events(&mut second_rx), vec![ServerEvent::RoomFull]);
    assert_eq!(
        drain_events(&mut third_rx),
        vec![ServerEvent::rejected(JoinRejection::AuthRequired)]
    );
}
