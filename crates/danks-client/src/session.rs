use danks_core::player::generate_player_id;
use danks_core::room::{RoomStatus, generate_room_code};
use danks_game::GameState;
use danks_relay::store::{CreateRoomError, JoinRoomError, RoomDoc, RoomEvent};

use crate::adapter::{ReplicationAdapter, Subscription};

/// Attempts to find an unused room code before giving up.
const CREATE_ATTEMPTS: usize = 8;

/// Which screen the player is on. Transitions only happen through
/// `Session` methods; there is no ambient screen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Lobby,
    InGame,
}

/// User-visible failures of the menu flows. State is unchanged when one of
/// these is returned.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    MissingName,
    MissingRoomCode,
    RoomNotFound,
    RoomFull,
    RoomUnavailable,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Please enter your name"),
            Self::MissingRoomCode => write!(f, "Please enter a room code"),
            Self::RoomNotFound => write!(f, "Room not found"),
            Self::RoomFull => write!(f, "Room is full"),
            Self::RoomUnavailable => write!(f, "Failed to create room"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<JoinRoomError> for SessionError {
    fn from(e: JoinRoomError) -> Self {
        match e {
            JoinRoomError::NotFound => Self::RoomNotFound,
            JoinRoomError::Full => Self::RoomFull,
        }
    }
}

/// One participant's menu → lobby → game session. Owns the identity the
/// participant plays under and drives all screen transitions.
pub struct Session {
    adapter: ReplicationAdapter,
    screen: Screen,
    player_id: Option<String>,
    room_code: Option<String>,
    player_index: Option<usize>,
    is_host: bool,
    notice: Option<String>,
}

impl Session {
    pub fn new(adapter: ReplicationAdapter) -> Self {
        Self {
            adapter,
            screen: Screen::Menu,
            player_id: None,
            room_code: None,
            player_index: None,
            is_host: false,
            notice: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn room_code(&self) -> Option<&str> {
        self.room_code.as_deref()
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn player_index(&self) -> Option<usize> {
        self.player_index
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Consume the pending user-facing notice, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Create a room and enter its lobby as host. Generates the room code
    /// and player id, rolls fresh terrain, and subscribes to the room.
    pub async fn create_room(
        &mut self,
        display_name: &str,
    ) -> Result<Subscription, SessionError> {
        if display_name.trim().is_empty() {
            return Err(SessionError::MissingName);
        }

        let player_id = generate_player_id();
        let state = GameState::new_random(["Player 1", "Player 2"]);

        // The code is generated client-side; on the rare collision, roll a
        // new one and try again.
        let mut code = None;
        for _ in 0..CREATE_ATTEMPTS {
            let candidate = generate_room_code();
            let doc = RoomDoc::new(candidate.clone(), player_id.clone(), state.clone());
            match self.adapter.create_room(doc).await {
                Ok(()) => {
                    code = Some(candidate);
                    break;
                },
                Err(CreateRoomError::AlreadyExists) => continue,
                Err(CreateRoomError::LimitReached) => {
                    return Err(SessionError::RoomUnavailable);
                },
            }
        }
        let code = code.ok_or(SessionError::RoomUnavailable)?;

        let subscription = self
            .adapter
            .subscribe(&code)
            .await
            .ok_or(SessionError::RoomUnavailable)?;

        self.screen = Screen::Lobby;
        self.player_id = Some(player_id);
        self.room_code = Some(code);
        self.player_index = Some(0);
        self.is_host = true;
        Ok(subscription)
    }

    /// Join an existing room by code and enter its lobby.
    pub async fn join_room(
        &mut self,
        display_name: &str,
        room_code: &str,
    ) -> Result<Subscription, SessionError> {
        if display_name.trim().is_empty() {
            return Err(SessionError::MissingName);
        }
        let code = room_code.trim().to_uppercase();
        if code.is_empty() {
            return Err(SessionError::MissingRoomCode);
        }

        let player_id = generate_player_id();
        let doc = self.adapter.join_room(&code, &player_id).await?;

        let subscription = self
            .adapter
            .subscribe(&code)
            .await
            .ok_or(SessionError::RoomNotFound)?;

        self.screen = Screen::Lobby;
        self.player_index = doc.players.iter().position(|p| p == &player_id);
        self.player_id = Some(player_id);
        self.room_code = Some(code);
        self.is_host = false;
        Ok(subscription)
    }

    /// React to a room change. Lobby flips to the game once the room is
    /// playing; a deleted room forces everyone back to the menu.
    pub fn on_room_event(&mut self, event: &RoomEvent) {
        match event {
            RoomEvent::Updated(doc) => {
                if self.screen == Screen::Lobby
                    && doc.status == RoomStatus::Playing
                    && doc.game_state.is_some()
                {
                    self.screen = Screen::InGame;
                }
            },
            RoomEvent::Deleted => {
                self.notice = Some("Room was deleted".to_string());
                self.reset_to_menu();
            },
        }
    }

    /// Voluntary exit. The host deletes the room (everyone else observes
    /// the deletion); a guest just removes itself.
    pub async fn leave(&mut self) {
        if let Some(code) = self.room_code.take() {
            if self.is_host {
                self.adapter.delete_room(&code).await;
            } else if let Some(pid) = &self.player_id {
                self.adapter.leave_room(&code, pid).await;
            }
        }
        self.reset_to_menu();
    }

    fn reset_to_menu(&mut self) {
        self.screen = Screen::Menu;
        self.player_id = None;
        self.room_code = None;
        self.player_index = None;
        self.is_host = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danks_relay::store::RoomStore;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn adapter() -> ReplicationAdapter {
        ReplicationAdapter::new(Arc::new(RwLock::new(RoomStore::new(10))))
    }

    #[tokio::test]
    async fn create_requires_display_name() {
        let mut session = Session::new(adapter());
        let err = session.create_room("  ").await.unwrap_err();
        assert_eq!(err, SessionError::MissingName);
        assert_eq!(session.screen(), Screen::Menu);
    }

    #[tokio::test]
    async fn create_enters_lobby_as_host() {
        let mut session = Session::new(adapter());
        let mut sub = session.create_room("Alice").await.unwrap();

        assert_eq!(session.screen(), Screen::Lobby);
        assert!(session.is_host());
        assert_eq!(session.player_index(), Some(0));
        assert!(session.room_code().is_some());

        match sub.events.recv().await.unwrap() {
            RoomEvent::Updated(doc) => {
                assert_eq!(doc.status, RoomStatus::Waiting);
                assert_eq!(doc.players.len(), 1);
                assert!(doc.game_state.is_some());
            },
            other => panic!("Expected initial doc, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_requires_name_and_code() {
        let mut session = Session::new(adapter());
        assert_eq!(
            session.join_room("", "ABCD").await.unwrap_err(),
            SessionError::MissingName
        );
        assert_eq!(
            session.join_room("Bob", "   ").await.unwrap_err(),
            SessionError::MissingRoomCode
        );
        assert_eq!(session.screen(), Screen::Menu);
    }

    #[tokio::test]
    async fn join_unknown_room_fails() {
        let mut session = Session::new(adapter());
        assert_eq!(
            session.join_room("Bob", "ZZZZ").await.unwrap_err(),
            SessionError::RoomNotFound
        );
        assert_eq!(session.screen(), Screen::Menu);
    }

    #[tokio::test]
    async fn join_full_room_fails() {
        let shared = adapter();
        let mut host = Session::new(shared.clone());
        host.create_room("Alice").await.unwrap();
        let code = host.room_code().unwrap().to_string();

        let mut guest = Session::new(shared.clone());
        guest.join_room("Bob", &code).await.unwrap();

        let mut third = Session::new(shared);
        assert_eq!(
            third.join_room("Carol", &code).await.unwrap_err(),
            SessionError::RoomFull
        );
    }

    #[tokio::test]
    async fn join_starts_the_game_for_both_sides() {
        let shared = adapter();
        let mut host = Session::new(shared.clone());
        let mut host_sub = host.create_room("Alice").await.unwrap();
        let _ = host_sub.events.recv().await; // initial doc
        let code = host.room_code().unwrap().to_string();

        let mut guest = Session::new(shared);
        // Codes are normalized, so lowercase entry works.
        let mut guest_sub = guest
            .join_room("Bob", &code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(guest.player_index(), Some(1));

        // Host sees the join push and moves into the game.
        let event = host_sub.events.recv().await.unwrap();
        host.on_room_event(&event);
        assert_eq!(host.screen(), Screen::InGame);

        // Guest's initial doc already has the room playing.
        let event = guest_sub.events.recv().await.unwrap();
        guest.on_room_event(&event);
        assert_eq!(guest.screen(), Screen::InGame);
    }

    #[tokio::test]
    async fn host_leave_deletes_room_and_evicts_guest() {
        let shared = adapter();
        let mut host = Session::new(shared.clone());
        let _host_sub = host.create_room("Alice").await.unwrap();
        let code = host.room_code().unwrap().to_string();

        let mut guest = Session::new(shared.clone());
        let mut guest_sub = guest.join_room("Bob", &code).await.unwrap();
        let _ = guest_sub.events.recv().await; // initial doc

        host.leave().await;
        assert_eq!(host.screen(), Screen::Menu);

        let event = guest_sub.events.recv().await.unwrap();
        assert_eq!(event, RoomEvent::Deleted);
        guest.on_room_event(&event);
        assert_eq!(guest.screen(), Screen::Menu);
        assert_eq!(guest.take_notice().as_deref(), Some("Room was deleted"));
    }

    #[tokio::test]
    async fn guest_leave_keeps_room_alive() {
        let shared = adapter();
        let mut host = Session::new(shared.clone());
        let _host_sub = host.create_room("Alice").await.unwrap();
        let code = host.room_code().unwrap().to_string();

        let mut guest = Session::new(shared.clone());
        let _guest_sub = guest.join_room("Bob", &code).await.unwrap();
        guest.leave().await;

        let doc = shared.room(&code).await.unwrap();
        assert_eq!(doc.players.len(), 1);
    }
}
