//! WebSocket gateway integration tests.
//!
//! Drives full games through `/ws` with real clients.

mod fixtures;

use std::time::Duration;

use fixtures::{TestServer, slow_config};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use sketchbluff_server::domain::{GameConfig, PromptBank};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A player's connection
struct Client {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    async fn connect(server: &TestServer) -> Self {
        let (ws, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        Self { ws }
    }

    async fn send(&mut self, value: Value) {
        self.ws
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("Failed to send");
    }

    async fn recv(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("Timed out waiting for a message")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON");
            }
        }
    }

    /// Skip messages until one of the given `type` arrives.
    async fn recv_type(&mut self, kind: &str) -> Value {
        loop {
            let value = self.recv().await;
            if value["type"] == kind {
                return value;
            }
        }
    }

    /// Skip messages until `phase-started` for the given phase arrives.
    async fn recv_phase(&mut self, phase: &str) -> Value {
        loop {
            let value = self.recv_type("phase-started").await;
            if value["phase"] == phase {
                return value;
            }
        }
    }

    /// Join and return the player id the server assigned.
    async fn join(&mut self, code: &str, name: &str, team: &str) -> String {
        self.send(json!({
            "type": "join-session",
            "code": code,
            "player_name": name,
            "team_name": team,
        }))
        .await;
        let joined = self.recv_type("joined").await;
        assert_eq!(joined["code"], code);
        joined["player_id"].as_str().unwrap().to_string()
    }

    async fn close(mut self) {
        self.ws.close(None).await.expect("Failed to close");
    }
}

async fn create_session(client: &mut Client) -> String {
    client.send(json!({"type": "create-session"})).await;
    let created = client.recv_type("session-created").await;
    created["code"].as_str().unwrap().to_string()
}

fn score_of(results: &Value, player_id: &str) -> u64 {
    results["scores"]
        .as_array()
        .unwrap()
        .iter()
        .find(|line| line["player_id"] == player_id)
        .and_then(|line| line["score"].as_u64())
        .expect("player missing from scores")
}

#[tokio::test]
async fn test_two_player_game_end_to_end() {
    // テスト項目: 作成 → 2 人参加 → 開始 → 描画 → 相互投票 → 正解 → 結果の得点
    // given (前提条件): お題は 1 つだけなので両者とも同じお題を描く
    let port = 19090;
    let prompts = PromptBank::new(["Giraffe"]).unwrap();
    let server = TestServer::start_with(port, prompts, slow_config()).await;
    let mut alice = Client::connect(&server).await;
    let mut bob = Client::connect(&server).await;

    let code = create_session(&mut alice).await;
    let alice_id = alice.join(&code, "Alice", "A").await;
    let bob_id = bob.join(&code, "Bob", "B").await;
    let roster = alice.recv_type("roster-changed").await;
    assert!(roster["players"].as_array().is_some_and(|p| !p.is_empty()));

    // when (操作):
    alice.send(json!({"type": "start-game"})).await;
    for client in [&mut alice, &mut bob] {
        let drawing = client.recv_phase("drawing").await;
        assert_eq!(drawing["prompt"], "Giraffe");
    }

    alice
        .send(json!({"type": "submit-drawing", "drawing": "alice-strokes"}))
        .await;
    bob.send(json!({"type": "submit-drawing", "drawing": "bob-strokes"}))
        .await;
    let voting = alice.recv_phase("voting").await;
    assert_eq!(voting["candidates"].as_array().unwrap().len(), 2);
    bob.recv_phase("voting").await;

    alice
        .send(json!({"type": "submit-votes", "owners": [bob_id.clone()]}))
        .await;
    bob.send(json!({"type": "submit-votes", "owners": [alice_id.clone()]}))
        .await;

    // 同票は先に割り当てられた alice の絵が勝つ
    let guessing = alice.recv_phase("guessing").await;
    let candidates = guessing["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["owner"], alice_id.as_str());
    assert!(candidates[0].get("prompt").is_none());
    bob.recv_phase("guessing").await;

    let mut guesses = serde_json::Map::new();
    guesses.insert(alice_id.clone(), json!("Giraffe"));
    for client in [&mut alice, &mut bob] {
        client
            .send(json!({"type": "submit-guesses", "guesses": guesses.clone()}))
            .await;
    }

    // then (期待する結果):
    let results = alice.recv_phase("results").await;
    assert_eq!(score_of(&results, &alice_id), 15);
    assert_eq!(score_of(&results, &bob_id), 5);
    assert_eq!(results["reveals"][0]["prompt"], "Giraffe");
    assert_eq!(results["reveals"][0]["owner"], alice_id.as_str());

    let bob_results = bob.recv_phase("results").await;
    assert_eq!(bob_results["scores"], results["scores"]);
}

#[tokio::test]
async fn test_join_unknown_session_reports_error() {
    // テスト項目: 存在しないコードへの参加は session-not-found が返る
    // given (前提条件):
    let port = 19091;
    let server = TestServer::start(port).await;
    let mut client = Client::connect(&server).await;

    // when (操作):
    client
        .send(json!({
            "type": "join-session",
            "code": "ZZZZ",
            "player_name": "Alice",
            "team_name": "A",
        }))
        .await;

    // then (期待する結果):
    let error = client.recv_type("error").await;
    assert_eq!(error["reason"], "session-not-found");
}

#[tokio::test]
async fn test_action_before_join_and_malformed_message() {
    // テスト項目: 参加前の操作は not-in-session、壊れた JSON は invalid-message
    // given (前提条件):
    let port = 19092;
    let server = TestServer::start(port).await;
    let mut client = Client::connect(&server).await;

    // when (操作):
    client.send(json!({"type": "start-game"})).await;
    let not_in_session = client.recv_type("error").await;
    client.send(json!({"type": "dance"})).await;
    let invalid = client.recv_type("error").await;

    // then (期待する結果):
    assert_eq!(not_in_session["reason"], "not-in-session");
    assert_eq!(invalid["reason"], "invalid-message");
}

#[tokio::test]
async fn test_start_with_one_player_is_ignored() {
    // テスト項目: 1 人での開始要求は無視され、待機状態のまま
    // given (前提条件):
    let port = 19093;
    let server = TestServer::start(port).await;
    let http = reqwest::Client::new();
    let mut alice = Client::connect(&server).await;
    let code = create_session(&mut alice).await;
    alice.join(&code, "Alice", "A").await;

    // when (操作):
    alice.send(json!({"type": "start-game"})).await;
    // 後続の往復で先行メッセージの処理完了を待つ
    alice.send(json!({"type": "create-session"})).await;
    alice.recv_type("session-created").await;

    // then (期待する結果):
    let detail: Value = http
        .get(format!("{}/api/sessions/{}", server.base_url(), code))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(detail["phase"], "waiting");
    assert_eq!(detail["roster"]["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_last_disconnect_destroys_session() {
    // テスト項目: 最後のプレイヤーが切断するとセッションは破棄される
    // given (前提条件):
    let port = 19094;
    let server = TestServer::start(port).await;
    let http = reqwest::Client::new();
    let mut alice = Client::connect(&server).await;
    let code = create_session(&mut alice).await;
    alice.join(&code, "Alice", "A").await;

    // when (操作):
    alice.close().await;

    // then (期待する結果): 切断処理は非同期なので少し待ちながら確認
    let url = format!("{}/api/sessions/{}", server.base_url(), code);
    let mut status = 0;
    for _ in 0..50 {
        status = http
            .get(&url)
            .send()
            .await
            .expect("Failed to send request")
            .status()
            .as_u16();
        if status == 404 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_drawing_timeout_moves_to_voting() {
    // テスト項目: 誰も描かなくても描画時間切れで投票フェーズに進む
    // given (前提条件):
    let port = 19095;
    let config = GameConfig {
        drawing: Duration::from_millis(200),
        ..slow_config()
    };
    let server = TestServer::start_with(port, PromptBank::default(), config).await;
    let mut alice = Client::connect(&server).await;
    let mut bob = Client::connect(&server).await;
    let code = create_session(&mut alice).await;
    alice.join(&code, "Alice", "A").await;
    bob.join(&code, "Bob", "B").await;

    // when (操作):
    bob.send(json!({"type": "start-game"})).await;
    alice.recv_phase("drawing").await;

    // then (期待する結果):
    let voting = alice.recv_phase("voting").await;
    assert_eq!(voting["candidates"], json!([]));
}

#[tokio::test]
async fn test_failed_join_keeps_current_session() {
    // テスト項目: 進行中のセッションから存在しないコードへ参加しようとしても、元のセッションに残る
    // given (前提条件):
    let port = 19096;
    let server = TestServer::start_with(port, PromptBank::default(), slow_config()).await;
    let http = reqwest::Client::new();
    let mut alice = Client::connect(&server).await;
    let mut bob = Client::connect(&server).await;
    let code = create_session(&mut alice).await;
    let alice_id = alice.join(&code, "Alice", "A").await;
    bob.join(&code, "Bob", "B").await;
    alice.send(json!({"type": "start-game"})).await;
    alice.recv_phase("drawing").await;

    // when (操作):
    alice
        .send(json!({
            "type": "join-session",
            "code": "ZZZZ",
            "player_name": "Alice",
            "team_name": "A",
        }))
        .await;
    let error = alice.recv_type("error").await;

    // then (期待する結果):
    assert_eq!(error["reason"], "session-not-found");
    let detail: Value = http
        .get(format!("{}/api/sessions/{}", server.base_url(), code))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(detail["phase"], "drawing");
    let players = detail["roster"]["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().any(|p| p["id"] == alice_id.as_str()));

    // 元のセッションでの提出も引き続き受け付けられる
    alice
        .send(json!({"type": "submit-drawing", "drawing": "alice-strokes"}))
        .await;
    bob.send(json!({"type": "submit-drawing", "drawing": "bob-strokes"}))
        .await;
    alice.recv_phase("voting").await;
}

#[tokio::test]
async fn test_switching_sessions_leaves_the_previous_one() {
    // テスト項目: 別のセッションへの参加に成功すると、元のセッションからは抜ける
    // given (前提条件):
    let port = 19097;
    let server = TestServer::start(port).await;
    let http = reqwest::Client::new();
    let mut alice = Client::connect(&server).await;
    let mut bob = Client::connect(&server).await;
    let first = create_session(&mut alice).await;
    let second = create_session(&mut alice).await;
    alice.join(&first, "Alice", "A").await;
    bob.join(&first, "Bob", "B").await;

    // when (操作):
    alice.join(&second, "Alice", "A").await;

    // then (期待する結果): 切り替えの完了を後続の往復で待ってから確認
    alice.send(json!({"type": "create-session"})).await;
    alice.recv_type("session-created").await;
    let detail: Value = http
        .get(format!("{}/api/sessions/{}", server.base_url(), first))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(detail["roster"]["players"].as_array().unwrap().len(), 1);
}
