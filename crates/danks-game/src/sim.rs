use rand::Rng;

use crate::entities::{Explosion, GameState, ShotFeedback};
use crate::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Downward acceleration applied to the projectile each tick.
pub const GRAVITY: f32 = 0.3;
/// Wind-to-horizontal-velocity coupling per tick.
pub const WIND_FACTOR: f32 = 0.01;
/// Upward drift of feedback text per tick.
const FEEDBACK_RISE: f32 = 0.5;
/// Terrain impacts within this horizontal distance of an enemy tank earn
/// near-miss feedback.
pub const NEAR_MISS_RADIUS: f32 = 80.0;
/// Ticks a near-miss message stays on screen.
const NEAR_MISS_LIFE: u32 = 60;
/// Ticks the direct-hit message stays on screen.
const DIRECT_HIT_LIFE: u32 = 80;

/// Advance the game by one tick. Pure and total: reads the previous
/// snapshot and returns a brand-new one; the input is never mutated. The
/// rng is only consulted when an explosion is spawned, so only the
/// authoritative peer ever rolls particles.
pub fn step<R: Rng>(state: &GameState, rng: &mut R) -> GameState {
    let mut next = state.clone();

    update_explosion(&mut next);
    update_feedback(&mut next);

    // Tank y is derived state: re-anchor to the terrain before any
    // collision math so a stale y can never leak between frames.
    {
        let GameState { tanks, terrain, .. } = &mut next;
        for tank in tanks.iter_mut() {
            tank.settle(terrain);
        }
    }

    let Some(mut projectile) = next.projectile.take() else {
        return next;
    };

    projectile.vy += GRAVITY;
    projectile.vx += next.wind * WIND_FACTOR;
    projectile.x += projectile.vx;
    projectile.y += projectile.vy;

    let shooter = next.current_player;

    // Left, right, or bottom of the field: a plain miss. Shots may fly
    // above the top edge freely.
    if projectile.x < 0.0 || projectile.x > CANVAS_WIDTH || projectile.y > CANVAS_HEIGHT {
        next.current_player = (shooter + 1) % next.tanks.len();
        return next;
    }

    // Tank hit is resolved before terrain, so an impact landing inside an
    // enemy footprint at ground level counts as a hit, not a near miss.
    if let Some(victim) = hit_enemy_tank(&next, shooter, projectile.x, projectile.y) {
        next.explosion = Some(Explosion::spawn(projectile.x, projectile.y, rng));
        next.feedback = Some(ShotFeedback {
            message: "DIRECT HIT!".to_string(),
            x: projectile.x,
            y: next.tanks[victim].y - 40.0,
            life: DIRECT_HIT_LIFE,
        });
        next.game_over = true;
        next.winner = Some(next.tanks[shooter].name.clone());
        return next;
    }

    let ground = next.terrain.height_at(projectile.x);
    if projectile.y >= ground {
        next.feedback = near_miss_feedback(&next, shooter, projectile.x, ground);
        next.current_player = (shooter + 1) % next.tanks.len();
        return next;
    }

    next.projectile = Some(projectile);
    next
}

/// Decay explosion particles; clear the explosion once the last one dies.
fn update_explosion(state: &mut GameState) {
    let Some(explosion) = state.explosion.as_mut() else {
        return;
    };
    for p in &mut explosion.particles {
        p.x += p.vx;
        p.y += p.vy;
        p.vy += GRAVITY * 0.5;
        p.life -= 1.0;
    }
    explosion.particles.retain(|p| p.life > 0.0);
    if explosion.particles.is_empty() {
        state.explosion = None;
    }
}

/// Count down feedback text while drifting it upward.
fn update_feedback(state: &mut GameState) {
    let Some(feedback) = state.feedback.as_mut() else {
        return;
    };
    feedback.life = feedback.life.saturating_sub(1);
    feedback.y -= FEEDBACK_RISE;
    if feedback.life == 0 {
        state.feedback = None;
    }
}

/// Index of the enemy tank whose bounding box contains the point, if any.
/// The shooter's own tank is never a target.
fn hit_enemy_tank(state: &GameState, shooter: usize, x: f32, y: f32) -> Option<usize> {
    state
        .tanks
        .iter()
        .enumerate()
        .find(|(i, tank)| *i != shooter && tank.contains(x, y))
        .map(|(i, _)| i)
}

/// Tiered feedback for a terrain impact near (but not on) an enemy tank.
fn near_miss_feedback(
    state: &GameState,
    shooter: usize,
    impact_x: f32,
    ground: f32,
) -> Option<ShotFeedback> {
    let distance = state
        .tanks
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != shooter)
        .map(|(_, tank)| (tank.x - impact_x).abs())
        .fold(f32::INFINITY, f32::min);

    if distance >= NEAR_MISS_RADIUS {
        return None;
    }
    let message = if distance < 30.0 {
        "SO CLOSE!"
    } else if distance < 50.0 {
        "CLOSE!"
    } else {
        "Getting Warm..."
    };
    Some(ShotFeedback {
        message: message.to_string(),
        x: impact_x,
        y: ground - 20.0,
        life: NEAR_MISS_LIFE,
    })
}
