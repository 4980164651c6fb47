use huddle_core::ServerEvent;
use huddle_server::ServerConfig;

use crate::integration::{ROOM, create_service, init_tracing, test_config};
use crate::utils::{TestClient, spawn_server, token_for};

#[tokio::test]
async fn test_latecomer_gets_room_full_and_is_not_announced() {
    init_tracing();

    let config = ServerConfig {
        max_occupancy: 2,
        ..test_config()
    };
    let (service, _) = create_service(&config);
    let addr = spawn_server(service.clone()).await.expect("server");

    let mut a = TestClient::connect(addr).await.unwrap();
    a.join(ROOM, Some(token_for("u-a", "Asha"))).await.unwrap();
    a.recv().await.unwrap();

    let mut b = TestClient::connect(addr).await.unwrap();
    b.join(ROOM, Some(token_for("u-b", "Ben"))).await.unwrap();
    b.recv().await.unwrap();
    a.recv().await.unwrap();

    let mut c = TestClient::connect(addr).await.unwrap();
    c.join(ROOM, Some(token_for("u-c", "Chen"))).await.unwrap();
    assert_eq!(c.recv().await.unwrap(), ServerEvent::RoomFull);

    a.expect_silence(100).await.unwrap();
    b.expect_silence(100).await.unwrap();
    assert_eq!(service.rooms().occupancy(&ROOM.into()).await, 2);

    // A slot opens up: a fresh connection gets in.
    b.close().await.unwrap();
    assert!(matches!(a.recv().await.unwrap(), ServerEvent::UserLeft { .. }));

    let mut d = TestClient::connect(addr).await.unwrap();
    d.join(ROOM, Some(token_for("u-c", "Chen"))).await.unwrap();
    let ServerEvent::ExistingUsers(roster) = d.recv().await.unwrap() else {
        panic!("d should be admitted");
    };
    assert_eq!(roster.len(), 1);
}
