use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Number of height samples spanning the playfield width.
pub const TERRAIN_SAMPLES: usize = 101;

/// Lowest point terrain can reach (y axis points down, so this is the
/// numerically largest height value).
pub const TERRAIN_FLOOR: f32 = CANVAS_HEIGHT * 0.9;
/// Highest point terrain can reach.
pub const TERRAIN_CEILING: f32 = CANVAS_HEIGHT * 0.3;

/// A fixed height profile, generated once per game and immutable after.
/// Impacts never deform it; terrain is collision-and-cosmetics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    heights: Vec<f32>,
}

impl Terrain {
    /// Generate a height profile from a seed: a baseline at 0.7×height
    /// minus three sinusoids with per-game random phase, amplitude, and
    /// frequency, clamped to [0.3×height, 0.9×height]. The same seed
    /// reproduces the same profile.
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let offset1 = rng.random_range(0.0..std::f32::consts::TAU);
        let offset2 = rng.random_range(0.0..std::f32::consts::TAU);
        let offset3 = rng.random_range(0.0..std::f32::consts::TAU);
        let amp1 = rng.random_range(30.0..70.0f32);
        let amp2 = rng.random_range(20.0..50.0f32);
        let amp3 = rng.random_range(25.0..60.0f32);
        let freq1 = rng.random_range(0.008..0.012f32);
        let freq2 = rng.random_range(0.015..0.025f32);
        let freq3 = rng.random_range(0.004..0.007f32);

        let sample_width = CANVAS_WIDTH / (TERRAIN_SAMPLES - 1) as f32;
        let heights = (0..TERRAIN_SAMPLES)
            .map(|i| {
                let x = i as f32 * sample_width;
                let y = CANVAS_HEIGHT * 0.7
                    - (x * freq1 + offset1).sin() * amp1
                    - (x * freq2 + offset2).sin() * amp2
                    - (x * freq3 + offset3).cos() * amp3;
                y.clamp(TERRAIN_CEILING, TERRAIN_FLOOR)
            })
            .collect();

        Self { heights }
    }

    /// Terrain height at a continuous x coordinate: nearest-sample lookup,
    /// not interpolation. Out-of-range x clamps to the edge samples.
    pub fn height_at(&self, x: f32) -> f32 {
        let index = ((x / CANVAS_WIDTH) * (self.heights.len() - 1) as f32).floor() as i64;
        let index = index.clamp(0, self.heights.len() as i64 - 1) as usize;
        self.heights[index]
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}

/// Roll a fresh terrain seed. Terrain is intentionally non-reproducible
/// across games; reproducibility within a game comes from replicating the
/// generated profile, not the seed.
pub fn random_seed() -> u64 {
    rand::rng().random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_generation() {
        let a = Terrain::generate(42);
        let b = Terrain::generate(42);
        assert_eq!(a, b, "Same seed must produce same terrain");
    }

    #[test]
    fn different_seeds_different_terrain() {
        let a = Terrain::generate(42);
        let b = Terrain::generate(123);
        assert_ne!(a, b, "Different seeds should produce different terrain");
    }

    #[test]
    fn sample_count() {
        assert_eq!(Terrain::generate(7).heights().len(), TERRAIN_SAMPLES);
    }

    #[test]
    fn heights_stay_in_bounds() {
        for seed in 0..50 {
            let terrain = Terrain::generate(seed);
            for (i, &h) in terrain.heights().iter().enumerate() {
                assert!(
                    (TERRAIN_CEILING..=TERRAIN_FLOOR).contains(&h),
                    "seed {seed} sample {i}: height {h} out of bounds"
                );
            }
        }
    }

    #[test]
    fn height_at_clamps_out_of_range_x() {
        let terrain = Terrain::generate(9);
        assert_eq!(terrain.height_at(-50.0), terrain.heights()[0]);
        assert_eq!(
            terrain.height_at(CANVAS_WIDTH + 50.0),
            terrain.heights()[TERRAIN_SAMPLES - 1]
        );
    }

    #[test]
    fn height_at_edge_samples() {
        let terrain = Terrain::generate(9);
        assert_eq!(terrain.height_at(0.0), terrain.heights()[0]);
        assert_eq!(
            terrain.height_at(CANVAS_WIDTH),
            terrain.heights()[TERRAIN_SAMPLES - 1]
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn height_at_returns_a_sample(
                seed in 0u64..500,
                x in 0.0f32..=1200.0
            ) {
                let terrain = Terrain::generate(seed);
                let h = terrain.height_at(x);
                prop_assert!(terrain.heights().contains(&h));
                prop_assert!((TERRAIN_CEILING..=TERRAIN_FLOOR).contains(&h));
            }

            #[test]
            fn height_at_is_idempotent_per_x(
                seed in 0u64..100,
                x in 0.0f32..=1200.0
            ) {
                let terrain = Terrain::generate(seed);
                prop_assert_eq!(terrain.height_at(x), terrain.height_at(x));
            }
        }
    }
}
