use crate::entities::GameState;

/// Whether this participant should be stepping the simulation and
/// publishing snapshots. True on the player's own turn (including while
/// their shot is in flight, since the turn only advances on resolution)
/// or while an explosion or feedback text is still animating.
///
/// Known race, inherited by design: when both peers observe a lingering
/// effect, both briefly claim authority and the store's last publish
/// wins. There is no leasing or conflict resolution beyond that.
pub fn is_authority(state: &GameState, player_index: usize) -> bool {
    state.current_player == player_index
        || state.explosion.is_some()
        || state.feedback.is_some()
}
