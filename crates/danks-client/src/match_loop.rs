use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use danks_game::controls::{self, Action};
use danks_game::{GameState, is_authority, sim};
use danks_relay::store::RoomEvent;

use crate::adapter::{ReplicationAdapter, Subscription};
use crate::clock::TickSource;

/// Why a match loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    /// Someone landed a direct hit.
    GameOver,
    /// The room disappeared under us (host left).
    RoomDeleted,
    /// The tick source ran dry (manual clocks only).
    ClockStopped,
}

/// Final result of a match loop, including the last snapshot seen.
#[derive(Debug)]
pub struct MatchOutcome {
    pub end: MatchEnd,
    pub winner: Option<String>,
    pub state: GameState,
}

/// Drives one participant's side of a match: steps and publishes while
/// this peer holds authority, passively applies snapshots otherwise, and
/// pushes validated local actions to the room.
pub struct MatchRuntime {
    adapter: ReplicationAdapter,
    room_code: String,
    player_index: usize,
    state: GameState,
    rng: StdRng,
}

impl MatchRuntime {
    pub fn new(
        adapter: ReplicationAdapter,
        room_code: String,
        player_index: usize,
        state: GameState,
    ) -> Self {
        Self {
            adapter,
            room_code,
            player_index,
            state,
            rng: StdRng::seed_from_u64(rand::rng().random()),
        }
    }

    /// Run until the game ends, the room is deleted, or the tick source
    /// stops. One simulation step per tick, whole-snapshot publish on
    /// every local change.
    pub async fn run(
        mut self,
        mut ticks: TickSource,
        mut subscription: Subscription,
        mut actions: mpsc::UnboundedReceiver<Action>,
    ) -> MatchOutcome {
        let source = subscription.id();
        let mut actions_open = true;
        loop {
            tokio::select! {
                alive = ticks.tick() => {
                    if !alive {
                        return self.finish(MatchEnd::ClockStopped);
                    }
                    if is_authority(&self.state, self.player_index) {
                        let next = sim::step(&self.state, &mut self.rng);
                        if next != self.state {
                            self.state = next;
                            self.adapter
                                .publish_from(&self.room_code, self.state.clone(), source)
                                .await;
                        }
                    }
                    if self.state.game_over {
                        return self.finish(MatchEnd::GameOver);
                    }
                },
                event = subscription.events.recv() => {
                    match event {
                        Some(RoomEvent::Updated(doc)) => {
                            // Passive application: the last published
                            // snapshot simply wins.
                            if let Some(state) = doc.game_state {
                                self.state = state;
                            }
                            if self.state.game_over {
                                return self.finish(MatchEnd::GameOver);
                            }
                        },
                        Some(RoomEvent::Deleted) | None => {
                            return self.finish(MatchEnd::RoomDeleted);
                        },
                    }
                },
                action = actions.recv(), if actions_open => {
                    match action {
                        Some(action) => {
                            // Out-of-turn and in-flight attempts fall out
                            // here as Nones; that is normal, not an error.
                            if let Some(next) =
                                controls::apply(&self.state, self.player_index, action)
                            {
                                self.state = next;
                                self.adapter
                                    .publish_from(&self.room_code, self.state.clone(), source)
                                    .await;
                            }
                        },
                        None => actions_open = false,
                    }
                },
            }
        }
    }

    fn finish(self, end: MatchEnd) -> MatchOutcome {
        MatchOutcome {
            end,
            winner: self.state.winner.clone(),
            state: self.state,
        }
    }
}
