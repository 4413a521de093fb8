use std::sync::Arc;

use tokio::sync::mpsc;

use danks_game::GameState;
use danks_relay::store::{
    CreateRoomError, JoinRoomError, RoomDoc, RoomEvent, SharedRoomStore, SubscriptionId,
};

/// A live subscription to one room's change stream. Events keep arriving
/// until `unsubscribe` is called, the subscription is dropped (the closed
/// channel is pruned on the next notification), or the room is deleted.
pub struct Subscription {
    pub room_code: String,
    pub events: mpsc::UnboundedReceiver<RoomEvent>,
    id: SubscriptionId,
    store: SharedRoomStore,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("room_code", &self.room_code)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stop receiving events. No callback fires after this returns.
    pub async fn unsubscribe(self) {
        self.store
            .write()
            .await
            .unsubscribe(&self.room_code, self.id);
    }
}

/// The client's gateway to the shared room-document store. Publishes are
/// best-effort: a failed write is logged and superseded by the next tick's
/// publish, never retried.
#[derive(Clone)]
pub struct ReplicationAdapter {
    store: SharedRoomStore,
}

impl ReplicationAdapter {
    pub fn new(store: SharedRoomStore) -> Self {
        Self { store }
    }

    pub async fn create_room(&self, doc: RoomDoc) -> Result<(), CreateRoomError> {
        self.store.write().await.create_room(doc)
    }

    pub async fn join_room(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<RoomDoc, JoinRoomError> {
        self.store.write().await.join_room(room_code, player_id)
    }

    /// Subscribe to a room. `None` when the room does not exist.
    pub async fn subscribe(&self, room_code: &str) -> Option<Subscription> {
        let (id, events) = self.store.write().await.subscribe(room_code)?;
        Some(Subscription {
            room_code: room_code.to_string(),
            events,
            id,
            store: Arc::clone(&self.store),
        })
    }

    /// Replace the room's snapshot. Failure (room gone) is logged and
    /// swallowed; local play continues optimistically.
    pub async fn publish(&self, room_code: &str, state: GameState) {
        if !self.store.write().await.publish(room_code, state) {
            tracing::warn!(room = room_code, "Publish failed, room is gone");
        }
    }

    /// `publish` with the writer's own subscription left out of the
    /// notification; subscriptions carry remote changes only.
    pub async fn publish_from(
        &self,
        room_code: &str,
        state: GameState,
        source: SubscriptionId,
    ) {
        if !self
            .store
            .write()
            .await
            .publish_from(room_code, state, Some(source))
        {
            tracing::warn!(room = room_code, "Publish failed, room is gone");
        }
    }

    pub async fn leave_room(&self, room_code: &str, player_id: &str) {
        self.store.write().await.leave_room(room_code, player_id);
    }

    pub async fn delete_room(&self, room_code: &str) {
        self.store.write().await.delete_room(room_code);
    }

    pub async fn room(&self, room_code: &str) -> Option<RoomDoc> {
        self.store.read().await.get(room_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danks_relay::store::RoomStore;
    use tokio::sync::RwLock;

    fn adapter() -> ReplicationAdapter {
        ReplicationAdapter::new(Arc::new(RwLock::new(RoomStore::new(10))))
    }

    fn make_doc(code: &str) -> RoomDoc {
        RoomDoc::new(
            code.to_string(),
            "player_1_aaaaaaaa".to_string(),
            GameState::new(1, ["Player 1", "Player 2"]),
        )
    }

    #[tokio::test]
    async fn create_subscribe_publish_delete_flow() {
        let adapter = adapter();
        adapter.create_room(make_doc("ABCD")).await.unwrap();

        let mut sub = adapter.subscribe("ABCD").await.unwrap();
        match sub.events.recv().await.unwrap() {
            RoomEvent::Updated(doc) => assert_eq!(doc.room_code, "ABCD"),
            other => panic!("Expected initial doc, got {other:?}"),
        }

        let mut state = GameState::new(1, ["Player 1", "Player 2"]);
        state.current_player = 1;
        adapter.publish("ABCD", state).await;
        match sub.events.recv().await.unwrap() {
            RoomEvent::Updated(doc) => {
                assert_eq!(doc.game_state.unwrap().current_player, 1);
            },
            other => panic!("Expected Updated, got {other:?}"),
        }

        adapter.delete_room("ABCD").await;
        assert_eq!(sub.events.recv().await.unwrap(), RoomEvent::Deleted);
        assert!(adapter.room("ABCD").await.is_none());
    }

    #[tokio::test]
    async fn publish_to_missing_room_is_swallowed() {
        let adapter = adapter();
        // Does not panic or error; the failure is logged and dropped.
        adapter
            .publish("ZZZZ", GameState::new(1, ["A", "B"]))
            .await;
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let adapter = adapter();
        adapter.create_room(make_doc("ABCD")).await.unwrap();
        let sub = adapter.subscribe("ABCD").await.unwrap();
        sub.unsubscribe().await;
        // A later publish reaches nobody; nothing to assert beyond not
        // panicking, the store prunes closed channels.
        adapter
            .publish("ABCD", GameState::new(1, ["A", "B"]))
            .await;
    }
}
