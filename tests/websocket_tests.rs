use futures::StreamExt;
use notify_relay::{
    build_router,
    models::{
        notification::{Notification, NotificationType},
        websocket::{ServerEvent, ANONYMOUS_IDENTITY},
    },
    AppState, Config,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
    MaybeTlsStream, WebSocketStream,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (Arc<AppState>, SocketAddr) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(AppState::new(Config::default()).unwrap());
    let app = build_router(state.clone()).unwrap();
    let server = axum::Server::from_tcp(listener).unwrap().serve(app.into_make_service());
    tokio::spawn(server);

    (state, addr)
}

async fn open(addr: SocketAddr, cookie: Option<&str>) -> Client {
    let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
    if let Some(cookie) = cookie {
        request
            .headers_mut()
            .insert("Cookie", HeaderValue::from_str(cookie).unwrap());
    }

    let (client, _) = connect_async(request).await.unwrap();
    client
}

async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let message = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_connected(client: &mut Client) -> String {
    match next_event(client).await {
        ServerEvent::Connected { user_id, .. } => user_id.to_string(),
        other => panic!("expected connected event, got {:?}", other),
    }
}

async fn expect_notification(client: &mut Client) -> Notification {
    match next_event(client).await {
        ServerEvent::Notification(notification) => notification,
        other => panic!("expected notification, got {:?}", other),
    }
}

async fn wait_for_connections(state: &AppState, user_id: &str, expected: usize) {
    for _ in 0..100 {
        let count = state
            .websocket_service
            .connections_of(user_id)
            .map(|set| set.len())
            .unwrap_or(0);
        if count == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("user {} never reached {} connection(s)", user_id, expected);
}

#[tokio::test]
async fn two_tabs_receive_targeted_notifications_until_one_closes() {
    let (state, addr) = start_server().await;

    let mut tab_a = open(addr, Some("theme=dark; user-id=u1")).await;
    let mut tab_b = open(addr, Some("user-id=u1")).await;
    assert_eq!(expect_connected(&mut tab_a).await, "u1");
    assert_eq!(expect_connected(&mut tab_b).await, "u1");

    let first = Notification::new(NotificationType::System, "N", "first", None);
    assert_eq!(state.websocket_service.notify_user("u1", &first), 2);
    assert_eq!(expect_notification(&mut tab_a).await, first);
    assert_eq!(expect_notification(&mut tab_b).await, first);

    tab_b.close(None).await.unwrap();
    wait_for_connections(&state, "u1", 1).await;

    let second = Notification::new(NotificationType::System, "N2", "second", None);
    assert_eq!(state.websocket_service.notify_user("u1", &second), 1);
    assert_eq!(expect_notification(&mut tab_a).await, second);

    tab_a.close(None).await.unwrap();
    wait_for_connections(&state, "u1", 0).await;
    assert!(state.websocket_service.connections_of("u1").is_none());
}

#[tokio::test]
async fn connection_without_cookie_is_anonymous_and_gets_broadcasts() {
    let (state, addr) = start_server().await;

    let mut client = open(addr, None).await;
    assert_eq!(expect_connected(&mut client).await, ANONYMOUS_IDENTITY);

    let notification = Notification::new(NotificationType::System, "Todos", "broadcast", None);
    assert_eq!(state.websocket_service.notify_all(&notification), 1);
    assert_eq!(expect_notification(&mut client).await, notification);
}
