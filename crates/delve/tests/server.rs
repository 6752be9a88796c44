//! Integration tests for the Delve server, handler, and full connection flow.

use std::time::Duration;

use delve::prelude::*;
use delve_world::{Cell, Grid, Layout};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

/// A line-framed TCP client that has already read its id greeting.
struct Client {
    id: u64,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("should connect");
        let (read, writer) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("greeting");
        let id = line.trim().parse().expect("greeting is a decimal id");
        Self { id, reader, writer }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("send");
    }

    /// Reads one response line, or `None` once the server hung up.
    async fn recv(&mut self) -> Option<Value> {
        let mut line = String::new();
        let n = tokio::time::timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("response within 5s")
            .expect("read");
        (n > 0).then(|| serde_json::from_str(&line).expect("response is JSON"))
    }

    async fn request(&mut self, command: Value) -> Value {
        self.send_raw(&command.to_string()).await;
        self.recv().await.expect("server answered")
    }

    async fn state(&mut self) -> Value {
        self.request(json!({"type": "get_state"})).await
    }

    async fn step(&mut self, direction: &str) -> Value {
        self.request(json!({"type": "move", "direction": direction})).await
    }

    /// This client's own column, from a fresh `get_state`.
    async fn col(&mut self) -> u64 {
        let state = self.state().await;
        me(&state)["position"]["col"].as_u64().expect("col")
    }
}

fn me(view: &Value) -> &Value {
    view["players"]
        .as_array()
        .expect("players")
        .iter()
        .find(|p| p["is_you"] == json!(true))
        .expect("own entry")
}

/// Starts a server on a random port and returns the address.
async fn start(builder: DelveServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");
    let addr = server.local_addr().expect("should have local addr").to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn start_default() -> String {
    start(DelveServerBuilder::new()).await
}

/// 1x3 main area `[T5, entrance, _]`, whose only spawn cell is column 2,
/// and a 1x2 room `[_, T7]`.
fn corridor() -> World {
    let mut main = Grid::new(1, 3);
    main.set(Position::new(0, 0), Cell::Treasure(5));
    main.set(Position::new(0, 1), Cell::RoomEntrance);
    let mut room = Grid::new(1, 2);
    room.set(Position::new(0, 1), Cell::Treasure(7));
    World::new(Layout {
        main,
        room,
        entrance: Position::new(0, 1),
        total_treasures: 2,
    })
}

/// 1x3 main area `[_, entrance, _]`: two spawn cells either side of the
/// entrance. 1x2 room `[_, T7]`.
fn lobby() -> World {
    let mut main = Grid::new(1, 3);
    main.set(Position::new(0, 1), Cell::RoomEntrance);
    let mut room = Grid::new(1, 2);
    room.set(Position::new(0, 1), Cell::Treasure(7));
    World::new(Layout {
        main,
        room,
        entrance: Position::new(0, 1),
        total_treasures: 1,
    })
}

/// Moves a `lobby()` client from its spawn cell onto the entrance.
async fn walk_to_entrance(client: &mut Client) {
    let dir = if client.col().await == 0 { "right" } else { "left" };
    let view = client.step(dir).await;
    assert_eq!(view["status"], "ok");
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test]
async fn test_connect_greets_with_decimal_id() {
    let addr = start_default().await;

    let client = Client::connect(&addr).await;

    assert!((1000..=9999).contains(&client.id));
}

#[tokio::test]
async fn test_get_state_returns_flattened_view() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;

    let state = client.state().await;

    assert_eq!(state["status"], "ok");
    let grid = state["grid"].as_array().unwrap();
    assert_eq!(grid.len(), 8);
    assert!(grid.iter().all(|row| row.as_array().unwrap().len() == 8));
    assert_eq!(state["treasures_left"], 20);
    assert_eq!(state["room_treasures_left"], 5);
    assert_eq!(state["in_room"], false);
    assert_eq!(me(&state)["id"], client.id);
    assert_eq!(me(&state)["score"], 0);
}

#[tokio::test]
async fn test_two_clients_see_each_other() {
    let addr = start_default().await;
    let mut a = Client::connect(&addr).await;
    let b = Client::connect(&addr).await;

    let state = a.state().await;

    let players = state["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    let other = players.iter().find(|p| p["is_you"] == false).unwrap();
    assert_eq!(other["id"], b.id);
    let (row, col) = (
        other["position"]["row"].as_u64().unwrap() as usize,
        other["position"]["col"].as_u64().unwrap() as usize,
    );
    assert_eq!(state["grid"][row][col], json!({"kind": "player", "id": b.id}));
}

#[tokio::test]
async fn test_disconnect_removes_player_from_world() {
    let addr = start_default().await;
    let mut a = Client::connect(&addr).await;
    let b = Client::connect(&addr).await;
    assert_eq!(a.state().await["players"].as_array().unwrap().len(), 2);

    drop(b);

    let mut remaining = 2;
    for _ in 0..100 {
        remaining = a.state().await["players"].as_array().unwrap().len();
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn test_malformed_payload_drops_client() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;

    client.send_raw("this is not json").await;

    assert_eq!(client.recv().await, None);
}

#[tokio::test]
async fn test_idle_client_is_dropped() {
    let addr = start(DelveServerBuilder::new().idle_timeout(Duration::from_millis(100))).await;
    let mut client = Client::connect(&addr).await;

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(client.recv().await, None);
}

// =========================================================================
// Commands
// =========================================================================

#[tokio::test]
async fn test_unknown_command_returns_invalid_command() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;

    let response = client.request(json!({"type": "dance"})).await;

    assert_eq!(response, json!({"status": "error", "message": "invalid command"}));
}

#[tokio::test]
async fn test_object_without_string_type_is_invalid_command_and_client_stays() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;
    let invalid = json!({"status": "error", "message": "invalid command"});

    client.send_raw(r#"{"direction":"up"}"#).await;
    assert_eq!(client.recv().await, Some(invalid.clone()));
    client.send_raw(r#"{"type":7}"#).await;
    assert_eq!(client.recv().await, Some(invalid));

    assert_eq!(client.state().await["status"], "ok");
}

#[tokio::test]
async fn test_non_string_direction_is_rejected_and_client_stays() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;
    let before = me(&client.state().await)["position"].clone();

    let response = client.request(json!({"type": "move", "direction": 5})).await;
    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().starts_with("invalid direction"));

    let state = client.state().await;
    assert_eq!(state["status"], "ok");
    assert_eq!(me(&state)["position"], before);
}

#[tokio::test]
async fn test_bad_direction_is_rejected_and_client_stays() {
    let addr = start_default().await;
    let mut client = Client::connect(&addr).await;

    let response = client.step("sideways").await;
    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().contains("sideways"));

    assert_eq!(client.state().await["status"], "ok");
}

#[tokio::test]
async fn test_enter_room_away_from_entrance_is_rejected() {
    let addr = start(DelveServerBuilder::new().world(corridor())).await;
    let mut client = Client::connect(&addr).await;

    let response = client.request(json!({"type": "enter_room"})).await;

    assert_eq!(
        response,
        json!({"status": "error", "message": "you are not at the treasure room entrance"})
    );
}

#[tokio::test]
async fn test_second_enter_room_is_busy() {
    let addr = start(DelveServerBuilder::new().world(lobby())).await;
    let mut a = Client::connect(&addr).await;
    let mut b = Client::connect(&addr).await;

    walk_to_entrance(&mut a).await;
    let entered = a.request(json!({"type": "enter_room"})).await;
    assert_eq!(entered["status"], "success");
    assert_eq!(entered["state"]["in_room"], true);

    walk_to_entrance(&mut b).await;
    let busy = b.request(json!({"type": "enter_room"})).await;

    assert_eq!(
        busy,
        json!({"status": "error", "message": "the treasure room is occupied by another player"})
    );
}

#[tokio::test]
async fn test_room_lease_expires_over_the_wire() {
    let addr = start(
        DelveServerBuilder::new()
            .world(lobby())
            .room_config(RoomConfig {
                time_limit: Duration::from_millis(100),
                ..RoomConfig::default()
            }),
    )
    .await;
    let mut client = Client::connect(&addr).await;
    walk_to_entrance(&mut client).await;
    assert_eq!(
        client.request(json!({"type": "enter_room"})).await["status"],
        "success"
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = client.state().await;
    assert_eq!(state["in_room"], false);
    assert_eq!(me(&state)["position"], json!({"row": 0, "col": 1}));
    let left = client.request(json!({"type": "leave_room"})).await;
    assert_eq!(left["status"], "error");
}

// =========================================================================
// Full game
// =========================================================================

#[tokio::test]
async fn test_full_game_ends_with_winner() {
    let addr = start(DelveServerBuilder::new().world(corridor())).await;
    let mut client = Client::connect(&addr).await;
    assert_eq!(client.col().await, 2);

    assert_eq!(client.step("left").await["status"], "ok");

    let entered = client.request(json!({"type": "enter_room"})).await;
    assert_eq!(entered["status"], "success");
    assert_eq!(entered["state"]["grid"], json!([[{"kind": "you"}, {"kind": "treasure", "value": 7}]]));

    let picked = client.step("right").await;
    assert_eq!(picked["score"], 7);
    assert_eq!(picked["room_treasures_left"], 0);
    assert_eq!(picked["treasures_left"], 1);

    let left = client.request(json!({"type": "leave_room"})).await;
    assert_eq!(left["status"], "success");
    assert_eq!(left["state"]["in_room"], false);
    // The emptied room's entrance is gone.
    assert_eq!(left["state"]["grid"][0][1], json!({"kind": "you"}));

    let last = client.step("left").await;
    let expected = json!({
        "status": "game_over",
        "winner": client.id,
        "tied": [],
        "score": 12
    });
    assert_eq!(last, expected);
    assert_eq!(client.state().await, expected);
}

// =========================================================================
// WebSocket
// =========================================================================

#[tokio::test]
async fn test_websocket_client_round_trip() {
    let server = DelveServerBuilder::new()
        .bind("127.0.0.1:0")
        .build_websocket()
        .await
        .expect("server should build");
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");

    let greeting = ws.next().await.unwrap().unwrap();
    let id: u64 = greeting.to_text().unwrap().parse().unwrap();

    ws.send(Message::text(json!({"type": "get_state"}).to_string()))
        .await
        .unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    let state: Value = serde_json::from_str(reply.to_text().unwrap()).unwrap();

    assert_eq!(state["status"], "ok");
    assert_eq!(me(&state)["id"], id);
}
