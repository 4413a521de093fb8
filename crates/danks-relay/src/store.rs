use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};

use danks_core::room::{ROOM_CAPACITY, RoomStatus};
use danks_core::time::timestamp_now;
use danks_game::GameState;

/// The replicated room document: one per room code, exchanged whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDoc {
    pub room_code: String,
    /// Opaque participant ids in join order; the first entry is player 1.
    pub players: Vec<String>,
    pub game_state: Option<GameState>,
    pub host: String,
    pub created_at: String,
    pub status: RoomStatus,
}

impl RoomDoc {
    /// A fresh room document with the creator as sole participant.
    pub fn new(room_code: String, host_id: String, game_state: GameState) -> Self {
        Self {
            room_code,
            players: vec![host_id.clone()],
            game_state: Some(game_state),
            host: host_id,
            created_at: timestamp_now(),
            status: RoomStatus::Waiting,
        }
    }
}

/// Pushed to every subscriber on every change to the room document,
/// including its deletion.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    Updated(RoomDoc),
    Deleted,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CreateRoomError {
    AlreadyExists,
    LimitReached,
}

impl std::fmt::Display for CreateRoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "Room already exists"),
            Self::LimitReached => write!(f, "Maximum room limit reached"),
        }
    }
}

impl std::error::Error for CreateRoomError {}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinRoomError {
    NotFound,
    Full,
}

impl std::fmt::Display for JoinRoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Room not found"),
            Self::Full => write!(f, "Room is full"),
        }
    }
}

impl std::error::Error for JoinRoomError {}

pub type SubscriptionId = u64;

struct RoomEntry {
    doc: RoomDoc,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<RoomEvent>>,
}

impl RoomEntry {
    /// Push the current document to every live subscriber except the
    /// change's source, dropping any whose receiver has gone away. A
    /// subscription observes remote changes only; its own writes it
    /// already knows about.
    fn notify_except(&mut self, source: Option<SubscriptionId>) {
        let doc = self.doc.clone();
        self.subscribers.retain(|&id, tx| {
            if Some(id) == source {
                return true;
            }
            tx.send(RoomEvent::Updated(doc.clone())).is_ok()
        });
    }
}

/// In-memory store of room documents keyed by room code, with push-based
/// subscriptions. Writes are whole-document replacements; the last publish
/// wins, with no diffing or conflict resolution.
pub struct RoomStore {
    rooms: HashMap<String, RoomEntry>,
    next_subscription: SubscriptionId,
    max_rooms: usize,
}

impl RoomStore {
    pub fn new(max_rooms: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            next_subscription: 1,
            max_rooms,
        }
    }

    /// Create a room from a complete document. The code comes from the
    /// client; collisions are reported, not resolved.
    pub fn create_room(&mut self, doc: RoomDoc) -> Result<(), CreateRoomError> {
        if self.rooms.len() >= self.max_rooms {
            return Err(CreateRoomError::LimitReached);
        }
        if self.rooms.contains_key(&doc.room_code) {
            return Err(CreateRoomError::AlreadyExists);
        }
        self.rooms.insert(
            doc.room_code.clone(),
            RoomEntry {
                doc,
                subscribers: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Join an existing room as the second participant. Flips the room to
    /// `Playing` and returns the updated document.
    pub fn join_room(&mut self, code: &str, player_id: &str) -> Result<RoomDoc, JoinRoomError> {
        let entry = self.rooms.get_mut(code).ok_or(JoinRoomError::NotFound)?;
        if entry.doc.players.len() >= ROOM_CAPACITY {
            return Err(JoinRoomError::Full);
        }
        entry.doc.players.push(player_id.to_string());
        entry.doc.status = RoomStatus::Playing;
        entry.notify_except(None);
        Ok(entry.doc.clone())
    }

    /// Subscribe to a room's changes. The current document is delivered
    /// immediately; every subsequent change (including deletion) follows.
    /// Returns `None` when the room does not exist.
    pub fn subscribe(
        &mut self,
        code: &str,
    ) -> Option<(SubscriptionId, mpsc::UnboundedReceiver<RoomEvent>)> {
        let entry = self.rooms.get_mut(code)?;
        let id = self.next_subscription;
        self.next_subscription += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(RoomEvent::Updated(entry.doc.clone()));
        entry.subscribers.insert(id, tx);
        Some((id, rx))
    }

    /// Stop a subscription. Safe to call after the room is gone.
    pub fn unsubscribe(&mut self, code: &str, id: SubscriptionId) {
        if let Some(entry) = self.rooms.get_mut(code) {
            entry.subscribers.remove(&id);
        }
    }

    /// Replace the room's game state with a new whole-state snapshot.
    /// Best-effort: returns false when the room no longer exists, and the
    /// caller is expected to log and move on rather than retry.
    pub fn publish(&mut self, code: &str, state: GameState) -> bool {
        self.publish_from(code, state, None)
    }

    /// `publish`, with the writer's own subscription excluded from the
    /// resulting notification.
    pub fn publish_from(
        &mut self,
        code: &str,
        state: GameState,
        source: Option<SubscriptionId>,
    ) -> bool {
        let Some(entry) = self.rooms.get_mut(code) else {
            return false;
        };
        entry.doc.status = if state.game_over {
            RoomStatus::Finished
        } else {
            RoomStatus::Playing
        };
        entry.doc.game_state = Some(state);
        entry.notify_except(source);
        true
    }

    /// Remove a participant (non-host voluntary exit). The host leaves by
    /// deleting the room instead.
    pub fn leave_room(&mut self, code: &str, player_id: &str) {
        if let Some(entry) = self.rooms.get_mut(code) {
            entry.doc.players.retain(|p| p != player_id);
            entry.notify_except(None);
        }
    }

    /// Delete a room, notifying every subscriber before it disappears.
    pub fn delete_room(&mut self, code: &str) {
        if let Some(mut entry) = self.rooms.remove(code) {
            for (_, tx) in entry.subscribers.drain() {
                let _ = tx.send(RoomEvent::Deleted);
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<RoomDoc> {
        self.rooms.get(code).map(|e| e.doc.clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[cfg(test)]
    fn subscriber_count(&self, code: &str) -> usize {
        self.rooms.get(code).map_or(0, |e| e.subscribers.len())
    }
}

/// Shared store behind an async RwLock.
pub type SharedRoomStore = Arc<RwLock<RoomStore>>;
