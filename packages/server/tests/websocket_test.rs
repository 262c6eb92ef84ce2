//! Integration tests: the router runs in-process on an ephemeral port and is
//! driven over real WebSocket and HTTP connections.

use std::{collections::BTreeSet, net::SocketAddr, sync::Arc, time::Duration};

use cohort_chat_server::{
    domain::{CohortId, Identity, IdentityDirectory, Role, UserId},
    infrastructure::{
        auth::{HmacTokenCodec, TokenClaims, TokenIdentityResolver},
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryIdentityDirectory, InMemoryMessageRepository},
    },
    ui::{AppState, Server},
};
use cohort_chat_shared::time::{Clock, SystemClock};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message, client::IntoClientRequest, http::header::AUTHORIZATION},
};

const SECRET: &[u8] = b"integration-secret";
const TIMEOUT: Duration = Duration::from_secs(2);

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    codec: HmacTokenCodec,
}

impl TestServer {
    async fn start() -> Self {
        let directory: Arc<dyn IdentityDirectory> = Arc::new(InMemoryIdentityDirectory::new(vec![
            identity("alice", Role::Student, &["cohort-1"]),
            identity("bob", Role::Student, &["cohort-1"]),
            identity("carol", Role::Student, &["cohort-2"]),
            identity("fran", Role::Facilitator, &["cohort-1"]),
        ]));
        let codec = HmacTokenCodec::new(SECRET).unwrap();
        let clock = Arc::new(SystemClock);
        let resolver = Arc::new(TokenIdentityResolver::new(
            codec.clone(),
            directory.clone(),
            clock.clone(),
        ));
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryMessageRepository::new()),
            directory,
            resolver,
            Arc::new(WebSocketMessagePusher::new()),
            clock,
        ));
        let router = Server::new(state).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestServer { addr, codec }
    }

    fn token(&self, user: &str) -> String {
        self.codec
            .sign(&TokenClaims {
                sub: user.to_string(),
                exp: SystemClock.now_secs() + 3600,
            })
            .unwrap()
    }

    fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect and consume the initial activeUsers event.
    async fn connect(&self, user: &str) -> Ws {
        let (mut ws, _) = connect_async(self.ws_url(&self.token(user))).await.unwrap();
        let first = next_event(&mut ws).await;
        assert_eq!(first["type"], "activeUsers");
        ws
    }

    async fn connect_and_join(&self, user: &str, cohort_id: &str) -> Ws {
        let mut ws = self.connect(user).await;
        send(&mut ws, json!({"type": "joinCohort", "cohortId": cohort_id})).await;
        let ack = next_of_type(&mut ws, "joinedCohort").await;
        assert_eq!(ack["cohortId"], cohort_id);
        ws
    }
}

fn identity(id: &str, role: Role, cohorts: &[&str]) -> Identity {
    Identity {
        id: UserId::new(id.to_string()).unwrap(),
        name: format!("{id} (name)"),
        avatar: None,
        role,
        cohorts: cohorts
            .iter()
            .map(|c| CohortId::new(c.to_string()).unwrap())
            .collect::<BTreeSet<_>>(),
    }
}

async fn send(ws: &mut Ws, event: Value) {
    ws.send(Message::text(event.to_string())).await.unwrap();
}

/// Next JSON event, skipping control frames.
async fn next_event(ws: &mut Ws) -> Value {
    loop {
        let frame = tokio::time::timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn next_of_type(ws: &mut Ws, event_type: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["type"] == event_type {
            return event;
        }
    }
}

#[tokio::test]
async fn test_message_reaches_every_member_and_history() {
    // テスト項目: 送信したメッセージが送信者を含むメンバー全員に同じ ID で届き、履歴にも残る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_join("alice", "cohort-1").await;
    let mut bob = server.connect_and_join("bob", "cohort-1").await;

    // when (操作):
    send(
        &mut alice,
        json!({"type": "sendMessage", "cohortId": "cohort-1", "content": "hello"}),
    )
    .await;

    // then (期待する結果):
    let to_alice = next_of_type(&mut alice, "newMessage").await;
    let to_bob = next_of_type(&mut bob, "newMessage").await;
    assert_eq!(to_alice["message"]["id"], to_bob["message"]["id"]);
    assert_eq!(to_bob["message"]["content"], "hello");
    assert_eq!(to_bob["message"]["sender"]["name"], "alice (name)");

    let history: Value = reqwest::Client::new()
        .get(server.http_url("/api/cohorts/cohort-1/messages"))
        .bearer_auth(server.token("bob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["cohortId"], "cohort-1");
    assert_eq!(history["messages"][0]["id"], to_bob["message"]["id"]);
}

#[tokio::test]
async fn test_handshake_rejects_bad_credentials() {
    // テスト項目: 無効・欠落したトークンではアップグレード前に 401 で拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let forged = HmacTokenCodec::new(b"other-secret")
        .unwrap()
        .sign(&TokenClaims {
            sub: "alice".to_string(),
            exp: SystemClock.now_secs() + 3600,
        })
        .unwrap();
    let expired = server
        .codec
        .sign(&TokenClaims {
            sub: "alice".to_string(),
            exp: SystemClock.now_secs() - 1,
        })
        .unwrap();
    let urls = vec![
        format!("ws://{}/ws", server.addr),
        server.ws_url("garbage"),
        server.ws_url(&forged),
        server.ws_url(&expired),
        server.ws_url(&server.token("mallory")),
    ];

    for url in urls {
        // when (操作):
        let result = connect_async(url.as_str()).await;

        // then (期待する結果):
        match result {
            Err(WsError::Http(response)) => assert_eq!(response.status(), 401, "url: {url}"),
            Err(e) => panic!("expected a 401 handshake failure for {url}, got {e}"),
            Ok(_) => panic!("handshake for {url} unexpectedly succeeded"),
        }
    }
}

#[tokio::test]
async fn test_bearer_header_is_accepted_at_handshake() {
    // テスト項目: Authorization ヘッダーのトークンでも接続できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut request = format!("ws://{}/ws", server.addr)
        .into_client_request()
        .unwrap();
    request.headers_mut().insert(
        AUTHORIZATION,
        format!("Bearer {}", server.token("alice")).parse().unwrap(),
    );

    // when (操作):
    let (mut ws, _) = connect_async(request).await.unwrap();

    // then (期待する結果):
    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "activeUsers");
    assert_eq!(event["users"][0]["id"], "alice");
}

#[tokio::test]
async fn test_typing_is_relayed_to_others_only() {
    // テスト項目: 入力中シグナルは送信者以外に届き、送信者には返らない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_join("alice", "cohort-1").await;
    let mut bob = server.connect_and_join("bob", "cohort-1").await;

    // when (操作):
    send(
        &mut bob,
        json!({"type": "typing", "cohortId": "cohort-1", "isTyping": true}),
    )
    .await;

    // then (期待する結果):
    let typing = next_of_type(&mut alice, "userTyping").await;
    assert_eq!(typing["userId"], "bob");
    assert_eq!(typing["isTyping"], true);

    // bob の次のイベントは自分の userTyping ではなく alice のメッセージ
    send(
        &mut alice,
        json!({"type": "sendMessage", "cohortId": "cohort-1", "content": "seen you"}),
    )
    .await;
    let next = next_event(&mut bob).await;
    assert_eq!(next["type"], "newMessage");
}

#[tokio::test]
async fn test_presence_follows_connections() {
    // テスト項目: 接続・切断に応じて activeUsers が全接続に通知される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;

    // when (操作):
    let carol = server.connect("carol").await;

    // then (期待する結果):
    let online = next_of_type(&mut alice, "activeUsers").await;
    assert_eq!(online["users"].as_array().unwrap().len(), 2);

    let presence: Value = reqwest::Client::new()
        .get(server.http_url("/api/presence"))
        .bearer_auth(server.token("alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(presence["users"].as_array().unwrap().len(), 2);

    // when (操作):
    drop(carol);

    // then (期待する結果):
    let after = next_of_type(&mut alice, "activeUsers").await;
    assert_eq!(after["users"], json!([{"id": "alice", "name": "alice (name)", "avatar": null, "role": "student"}]));
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    // テスト項目: 解析できないフレームはエラーを返すだけで接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;

    // when (操作):
    alice.send(Message::text("not json")).await.unwrap();

    // then (期待する結果):
    let error = next_of_type(&mut alice, "error").await;
    assert_eq!(error["code"], "VALIDATION");

    send(&mut alice, json!({"type": "joinCohort", "cohortId": "cohort-1"})).await;
    let ack = next_of_type(&mut alice, "joinedCohort").await;
    assert_eq!(ack["cohortId"], "cohort-1");
}

#[tokio::test]
async fn test_moderation_over_the_wire() {
    // テスト項目: student のピン留めは拒否され、facilitator のピン留めと削除は全員に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_join("alice", "cohort-1").await;
    let mut fran = server.connect_and_join("fran", "cohort-1").await;
    send(
        &mut alice,
        json!({"type": "sendMessage", "cohortId": "cohort-1", "content": "pin me"}),
    )
    .await;
    let message = next_of_type(&mut alice, "newMessage").await;
    let message_id = message["message"]["id"].clone();
    next_of_type(&mut fran, "newMessage").await;

    // when (操作):
    send(
        &mut alice,
        json!({"type": "pinMessage", "messageId": message_id, "cohortId": "cohort-1"}),
    )
    .await;
    let denied = next_of_type(&mut alice, "error").await;
    send(
        &mut fran,
        json!({"type": "pinMessage", "messageId": message_id, "cohortId": "cohort-1"}),
    )
    .await;
    let pinned = next_of_type(&mut alice, "messagePinned").await;
    send(
        &mut fran,
        json!({"type": "deleteMessage", "messageId": message_id, "cohortId": "cohort-1"}),
    )
    .await;
    let deleted = next_of_type(&mut alice, "messageDeleted").await;

    // then (期待する結果):
    assert_eq!(denied["code"], "FORBIDDEN");
    assert_eq!(pinned["isPinned"], true);
    assert_eq!(deleted, json!({"type": "messageDeleted", "messageId": message_id}));
}

#[tokio::test]
async fn test_http_endpoints_require_credentials() {
    // テスト項目: ヘルスチェックは認証不要、履歴と presence は Bearer トークンが必要
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let health = client.get(server.http_url("/api/health")).send().await.unwrap();
    let history = client
        .get(server.http_url("/api/cohorts/cohort-1/messages"))
        .send()
        .await
        .unwrap();
    let foreign = client
        .get(server.http_url("/api/cohorts/cohort-1/messages"))
        .bearer_auth(server.token("carol"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health.status(), 200);
    assert_eq!(health.json::<Value>().await.unwrap(), json!({"status": "ok"}));
    assert_eq!(history.status(), 401);
    assert_eq!(foreign.status(), 403);
    assert_eq!(foreign.json::<Value>().await.unwrap()["code"], "FORBIDDEN");
}
