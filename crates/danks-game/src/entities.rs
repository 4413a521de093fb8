use rand::Rng;
use serde::{Deserialize, Serialize};

use danks_core::player::PlayerColor;

use crate::terrain::Terrain;
use crate::{CANVAS_WIDTH, terrain};

/// Tank hull width in world units.
pub const TANK_WIDTH: f32 = 30.0;
/// Tank hull height in world units.
pub const TANK_HEIGHT: f32 = 20.0;

/// Particles spawned per explosion.
pub const EXPLOSION_PARTICLES: usize = 30;

/// Ember colors cycled through explosion particles.
const EMBER_PALETTE: [[u8; 3]; 4] = [
    [255, 100, 0],
    [255, 150, 0],
    [255, 200, 0],
    [255, 50, 0],
];

/// One player's tank. `y` is derived from the terrain height at `x` and is
/// re-derived whenever `x` changes; it is never authoritative on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub x: f32,
    pub y: f32,
    /// Aim angle in degrees, 0 = firing right, 180 = firing left.
    pub angle: f32,
    /// Shot power percentage in [10, 100].
    pub power: f32,
    pub color: PlayerColor,
    pub name: String,
    pub width: f32,
    pub height: f32,
}

impl Tank {
    pub fn new(x: f32, angle: f32, name: &str, color: PlayerColor, terrain: &Terrain) -> Self {
        let mut tank = Self {
            x,
            y: 0.0,
            angle,
            power: 50.0,
            color,
            name: name.to_string(),
            width: TANK_WIDTH,
            height: TANK_HEIGHT,
        };
        tank.settle(terrain);
        tank
    }

    /// Re-derive `y` so the tank sits on the terrain surface.
    pub fn settle(&mut self, terrain: &Terrain) {
        self.y = terrain.height_at(self.x) - self.height;
    }

    /// Whether a point is inside the tank's bounding box.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x - self.width / 2.0
            && x <= self.x + self.width / 2.0
            && y >= self.y
            && y <= self.y + self.height
    }
}

/// The single shot in flight. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: [u8; 3],
    pub size: f32,
}

/// A burst of particles marking a direct hit. Cleared once every particle
/// has expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub particles: Vec<ExplosionParticle>,
}

impl Explosion {
    /// Spawn a ring of particles around the impact point with jittered
    /// direction, speed, lifetime, and size.
    pub fn spawn<R: Rng>(x: f32, y: f32, rng: &mut R) -> Self {
        let particles = (0..EXPLOSION_PARTICLES)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / EXPLOSION_PARTICLES as f32
                    + rng.random_range(-0.25..0.25f32);
                let speed = rng.random_range(2.0..6.0f32);
                let life = rng.random_range(40.0..60.0f32);
                ExplosionParticle {
                    x,
                    y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    life,
                    max_life: life,
                    color: EMBER_PALETTE[rng.random_range(0..EMBER_PALETTE.len())],
                    size: rng.random_range(3.0..6.0f32),
                }
            })
            .collect();
        Self { particles }
    }
}

/// Floating text shown when a shot lands near (or on) a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotFeedback {
    pub message: String,
    pub x: f32,
    pub y: f32,
    /// Remaining ticks before the text vanishes.
    pub life: u32,
}

/// The aggregate game snapshot: the sole unit of replication. Every tick
/// produces a brand-new value derived from the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub tanks: [Tank; 2],
    pub current_player: usize,
    pub projectile: Option<Projectile>,
    pub terrain: Terrain,
    pub game_over: bool,
    pub winner: Option<String>,
    /// Horizontal wind. Present in the schema; zero in the default setup.
    pub wind: f32,
    pub explosion: Option<Explosion>,
    pub feedback: Option<ShotFeedback>,
}

impl GameState {
    /// Fresh game: terrain rolled from `seed`, tanks at 20% and 80% of the
    /// field aimed at each other, player 1 to move.
    pub fn new(seed: u64, names: [&str; 2]) -> Self {
        let terrain = Terrain::generate(seed);
        let tanks = [
            Tank::new(
                CANVAS_WIDTH * 0.2,
                45.0,
                names[0],
                PlayerColor::PALETTE[0],
                &terrain,
            ),
            Tank::new(
                CANVAS_WIDTH * 0.8,
                135.0,
                names[1],
                PlayerColor::PALETTE[1],
                &terrain,
            ),
        ];
        Self {
            tanks,
            current_player: 0,
            projectile: None,
            terrain,
            game_over: false,
            winner: None,
            wind: 0.0,
            explosion: None,
            feedback: None,
        }
    }

    /// Fresh game with a random terrain seed.
    pub fn new_random(names: [&str; 2]) -> Self {
        Self::new(terrain::random_seed(), names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_game_defaults() {
        let state = GameState::new(1, ["Player 1", "Player 2"]);
        assert_eq!(state.tanks[0].x, CANVAS_WIDTH * 0.2);
        assert_eq!(state.tanks[1].x, CANVAS_WIDTH * 0.8);
        assert_eq!(state.tanks[0].angle, 45.0);
        assert_eq!(state.tanks[1].angle, 135.0);
        assert_eq!(state.tanks[0].power, 50.0);
        assert_eq!(state.current_player, 0);
        assert!(state.projectile.is_none());
        assert!(state.explosion.is_none());
        assert!(state.feedback.is_none());
        assert!(!state.game_over);
        assert!(state.winner.is_none());
        assert_eq!(state.wind, 0.0);
    }

    #[test]
    fn tanks_sit_on_terrain() {
        let state = GameState::new(5, ["A", "B"]);
        for tank in &state.tanks {
            assert_eq!(tank.y, state.terrain.height_at(tank.x) - tank.height);
        }
    }

    #[test]
    fn tank_contains_its_own_box() {
        let state = GameState::new(5, ["A", "B"]);
        let tank = &state.tanks[0];
        assert!(tank.contains(tank.x, tank.y + 1.0));
        assert!(tank.contains(tank.x - tank.width / 2.0, tank.y));
        assert!(tank.contains(tank.x + tank.width / 2.0, tank.y + tank.height));
        assert!(!tank.contains(tank.x + tank.width, tank.y));
        assert!(!tank.contains(tank.x, tank.y - 1.0));
    }

    #[test]
    fn explosion_spawn_particle_count_and_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let explosion = Explosion::spawn(100.0, 200.0, &mut rng);
        assert_eq!(explosion.particles.len(), EXPLOSION_PARTICLES);
        for p in &explosion.particles {
            assert_eq!(p.x, 100.0);
            assert_eq!(p.y, 200.0);
            assert!((40.0..60.0).contains(&p.life));
            assert_eq!(p.life, p.max_life);
            assert!((3.0..6.0).contains(&p.size));
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((2.0..6.01).contains(&speed), "speed {speed} out of range");
        }
    }

    #[test]
    fn snapshot_roundtrips_through_messagepack() {
        let mut state = GameState::new(11, ["Alice", "Bob"]);
        let mut rng = StdRng::seed_from_u64(4);
        state.projectile = Some(Projectile {
            x: 300.0,
            y: 150.0,
            vx: 7.0,
            vy: -3.0,
        });
        state.explosion = Some(Explosion::spawn(300.0, 150.0, &mut rng));
        state.feedback = Some(ShotFeedback {
            message: "CLOSE!".to_string(),
            x: 310.0,
            y: 140.0,
            life: 42,
        });

        let bytes = rmp_serde::to_vec(&state).unwrap();
        let back: GameState = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(state, back, "Snapshot must survive a serde round-trip");
    }
}
