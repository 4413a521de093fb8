use serde::{Deserialize, Serialize};

use crate::CANVAS_WIDTH;
use crate::entities::{GameState, Projectile, TANK_WIDTH};

/// Horizontal distance a tank moves per action.
pub const MOVE_STEP: f32 = 5.0;
/// Degrees the aim changes per action.
pub const ANGLE_STEP: f32 = 2.0;
/// Power percentage points per action.
pub const POWER_STEP: f32 = 2.0;
/// Power percentage bounds.
pub const MIN_POWER: f32 = 10.0;
pub const MAX_POWER: f32 = 100.0;
/// Aim angle bounds in degrees.
pub const MAX_ANGLE: f32 = 180.0;
/// Muzzle speed is `power / POWER_TO_SPEED`.
pub const POWER_TO_SPEED: f32 = 5.0;

/// A turn action entered by the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RaiseAngle,
    LowerAngle,
    RaisePower,
    LowerPower,
    Fire,
}

/// Apply a turn action for `player`. Returns the successor state, or
/// `None` when the action is not currently allowed: it is not that
/// player's turn, a shot is in flight, or the game is over. Rejection
/// leaves the caller's state untouched; out-of-turn attempts are normal
/// and never an error.
pub fn apply(state: &GameState, player: usize, action: Action) -> Option<GameState> {
    if state.game_over
        || state.projectile.is_some()
        || player >= state.tanks.len()
        || player != state.current_player
    {
        return None;
    }

    let mut next = state.clone();
    let GameState {
        tanks,
        terrain,
        projectile,
        ..
    } = &mut next;
    let tank = &mut tanks[player];

    match action {
        Action::MoveLeft => {
            tank.x = (tank.x - MOVE_STEP).max(TANK_WIDTH);
            tank.settle(terrain);
        },
        Action::MoveRight => {
            tank.x = (tank.x + MOVE_STEP).min(CANVAS_WIDTH - TANK_WIDTH);
            tank.settle(terrain);
        },
        Action::RaiseAngle => tank.angle = (tank.angle + ANGLE_STEP).min(MAX_ANGLE),
        Action::LowerAngle => tank.angle = (tank.angle - ANGLE_STEP).max(0.0),
        Action::RaisePower => tank.power = (tank.power + POWER_STEP).min(MAX_POWER),
        Action::LowerPower => tank.power = (tank.power - POWER_STEP).max(MIN_POWER),
        Action::Fire => {
            let speed = tank.power / POWER_TO_SPEED;
            let angle = tank.angle.to_radians();
            *projectile = Some(Projectile {
                x: tank.x,
                y: tank.y + tank.height / 2.0,
                vx: angle.cos() * speed,
                vy: -angle.sin() * speed,
            });
        },
    }

    Some(next)
}
