use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::{RwLock, mpsc};
use tracing_subscriber::EnvFilter;

use danks_core::net::messages::{
    ClientMessage, CreateRoomResponseMsg, JoinRoomResponseMsg, RoomDeletedMsg, RoomUpdateMsg,
    StoreMessage,
};
use danks_core::net::protocol::{
    MAX_MESSAGE_SIZE, PROTOCOL_VERSION, decode_client_message, encode_store_message,
};
use danks_game::GameState;

use danks_relay::config::RelayConfig;
use danks_relay::store::{RoomDoc, RoomEvent, RoomStore, SharedRoomStore, SubscriptionId};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RelayConfig::load();
    config.validate();

    let store: SharedRoomStore = Arc::new(RwLock::new(RoomStore::new(config.max_rooms)));

    let app = Router::new()
        .route("/rooms", axum::routing::get(rooms_ws_handler))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {e}", config.listen_addr));

    tracing::info!(
        "Danks room service listening on {} (max rooms: {})",
        config.listen_addr,
        config.max_rooms
    );

    axum::serve(listener, app)
        .await
        .expect("Room service error");
}

async fn rooms_ws_handler(
    ws: WebSocketUpgrade,
    State(store): State<SharedRoomStore>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, store))
}

async fn handle_socket(socket: WebSocket, store: SharedRoomStore) {
    let (ws_sender, mut ws_receiver) = socket.split();

    // Outbound channel is bounded so a slow client cannot exhaust memory.
    let (tx, rx) = mpsc::channel::<Vec<u8>>(256);
    spawn_socket_writer(ws_sender, rx);

    let mut rate_limiter = RateLimiter::new(50.0, 50.0);
    // A connection participates in at most one room at a time.
    let mut subscription: Option<(String, SubscriptionId)> = None;

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let data = match msg {
            Message::Binary(d) => d.to_vec(),
            Message::Close(_) => break,
            _ => continue,
        };

        if data.is_empty() {
            continue;
        }
        if data.len() > MAX_MESSAGE_SIZE {
            tracing::warn!(size = data.len(), "Oversized message dropped");
            continue;
        }
        if !rate_limiter.allow() {
            tracing::warn!("Client rate limited");
            continue;
        }

        let msg = match decode_client_message(&data) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "Undecodable client message dropped");
                continue;
            },
        };

        match msg {
            ClientMessage::CreateRoom(m) => {
                if m.protocol_version != PROTOCOL_VERSION {
                    send_create_response(&tx, Err("protocol version mismatch".to_string()));
                    continue;
                }
                let state = match rmp_serde::from_slice::<GameState>(&m.state_data) {
                    Ok(s) => s,
                    Err(e) => {
                        send_create_response(&tx, Err(format!("bad game state: {e}")));
                        continue;
                    },
                };
                let code = m.room_code.clone();
                let doc = RoomDoc::new(code.clone(), m.player_id.clone(), state);
                let result = store.write().await.create_room(doc);
                match result {
                    Ok(()) => {
                        tracing::info!(room_code = %code, "Room created");
                        send_create_response(&tx, Ok(code.clone()));
                        subscribe_connection(&store, &code, &tx, &mut subscription).await;
                    },
                    Err(e) => send_create_response(&tx, Err(e.to_string())),
                }
            },
            ClientMessage::JoinRoom(m) => {
                if m.protocol_version != PROTOCOL_VERSION {
                    send_join_response(&tx, Err("protocol version mismatch".to_string()));
                    continue;
                }
                let result = store.write().await.join_room(&m.room_code, &m.player_id);
                match result {
                    Ok(doc) => {
                        tracing::info!(room_code = %m.room_code, "Participant joined room");
                        send_join_response(&tx, Ok(doc));
                        subscribe_connection(&store, &m.room_code, &tx, &mut subscription).await;
                    },
                    Err(e) => send_join_response(&tx, Err(e.to_string())),
                }
            },
            ClientMessage::PublishState(m) => {
                let state = match rmp_serde::from_slice::<GameState>(&m.state_data) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(room_code = %m.room_code, error = %e, "Bad snapshot dropped");
                        continue;
                    },
                };
                // Don't echo the snapshot back to the connection that
                // published it.
                let source = subscription
                    .as_ref()
                    .filter(|(code, _)| code == &m.room_code)
                    .map(|(_, id)| *id);
                if !store
                    .write()
                    .await
                    .publish_from(&m.room_code, state, source)
                {
                    tracing::warn!(room_code = %m.room_code, "Publish to missing room dropped");
                }
            },
            ClientMessage::LeaveRoom(m) => {
                store.write().await.leave_room(&m.room_code, &m.player_id);
            },
            ClientMessage::DeleteRoom(m) => {
                tracing::info!(room_code = %m.room_code, "Room deleted by creator");
                store.write().await.delete_room(&m.room_code);
            },
        }
    }

    // Connection gone: stop its subscription. The room itself stays; only
    // an explicit DeleteRoom removes it.
    if let Some((code, id)) = subscription {
        store.write().await.unsubscribe(&code, id);
    }
}

/// Subscribe this connection to a room and forward its events as
/// `RoomUpdate`/`RoomDeleted` wire messages.
async fn subscribe_connection(
    store: &SharedRoomStore,
    room_code: &str,
    tx: &mpsc::Sender<Vec<u8>>,
    subscription: &mut Option<(String, SubscriptionId)>,
) {
    // Replace any previous subscription for this connection.
    if let Some((old_code, old_id)) = subscription.take() {
        store.write().await.unsubscribe(&old_code, old_id);
    }
    let Some((id, events)) = store.write().await.subscribe(room_code) else {
        return;
    };
    *subscription = Some((room_code.to_string(), id));
    spawn_event_forwarder(room_code.to_string(), events, tx.clone());
}

/// Forward a subscription's event stream to the connection's writer.
fn spawn_event_forwarder(
    room_code: String,
    mut events: mpsc::UnboundedReceiver<RoomEvent>,
    tx: mpsc::Sender<Vec<u8>>,
) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let msg = match event {
                RoomEvent::Updated(doc) => match rmp_serde::to_vec(&doc) {
                    Ok(doc_data) => StoreMessage::RoomUpdate(RoomUpdateMsg { doc_data }),
                    Err(e) => {
                        tracing::error!(room = %room_code, error = %e, "Failed to encode room doc");
                        continue;
                    },
                },
                RoomEvent::Deleted => StoreMessage::RoomDeleted(RoomDeletedMsg {
                    room_code: room_code.clone(),
                }),
            };
            match encode_store_message(&msg) {
                Ok(data) => {
                    if tx.send(data).await.is_err() {
                        break;
                    }
                },
                Err(e) => {
                    tracing::error!(room = %room_code, error = %e, "Failed to encode store message");
                },
            }
        }
    });
}

fn send_create_response(tx: &mpsc::Sender<Vec<u8>>, result: Result<String, String>) {
    let msg = match result {
        Ok(code) => StoreMessage::CreateRoomResponse(CreateRoomResponseMsg {
            success: true,
            room_code: Some(code),
            error: None,
        }),
        Err(e) => StoreMessage::CreateRoomResponse(CreateRoomResponseMsg {
            success: false,
            room_code: None,
            error: Some(e),
        }),
    };
    send_store_message(tx, &msg);
}

fn send_join_response(tx: &mpsc::Sender<Vec<u8>>, result: Result<RoomDoc, String>) {
    let msg = match result {
        Ok(doc) => match rmp_serde::to_vec(&doc) {
            Ok(doc_data) => StoreMessage::JoinRoomResponse(JoinRoomResponseMsg {
                success: true,
                room_status: Some(doc.status),
                doc_data: Some(doc_data),
                error: None,
            }),
            Err(e) => StoreMessage::JoinRoomResponse(JoinRoomResponseMsg {
                success: false,
                room_status: None,
                doc_data: None,
                error: Some(format!("encode error: {e}")),
            }),
        },
        Err(e) => StoreMessage::JoinRoomResponse(JoinRoomResponseMsg {
            success: false,
            room_status: None,
            doc_data: None,
            error: Some(e),
        }),
    };
    send_store_message(tx, &msg);
}

fn send_store_message(tx: &mpsc::Sender<Vec<u8>>, msg: &StoreMessage) {
    match encode_store_message(msg) {
        Ok(data) => {
            if let Err(e) = tx.try_send(data) {
                tracing::debug!(error = %e, "Dropping response to slow client");
            }
        },
        Err(e) => tracing::error!(error = %e, "Failed to encode response"),
    }
}

fn spawn_socket_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Vec<u8>>,
) {
    tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            if ws_sender.send(Message::Binary(data.into())).await.is_err() {
                break;
            }
        }
    });
}

/// Per-connection token-bucket rate limiter.
struct RateLimiter {
    tokens: f64,
    last_refill: tokio::time::Instant,
    max_tokens: f64,
    refill_rate: f64,
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: tokio::time::Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    fn allow(&mut self) -> bool {
        let now = tokio::time::Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
