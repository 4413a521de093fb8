use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tank/avatar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Predefined palette. The first two entries are the player-1/player-2
    /// defaults.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 83,
            g: 152,
            b: 255,
        }, // Blue
        PlayerColor {
            r: 255,
            g: 87,
            b: 87,
        }, // Red
        PlayerColor {
            r: 255,
            g: 195,
            b: 18,
        }, // Yellow
        PlayerColor {
            r: 46,
            g: 213,
            b: 115,
        }, // Green
        PlayerColor {
            r: 130,
            g: 88,
            b: 255,
        }, // Purple
        PlayerColor {
            r: 255,
            g: 148,
            b: 77,
        }, // Orange
    ];
}

/// Generate an opaque participant id: Unix timestamp plus a random hex
/// suffix. Uniqueness is best-effort, not guaranteed.
pub fn generate_player_id() -> String {
    let suffix: u32 = rand::rng().random();
    format!("player_{}_{suffix:08x}", crate::time::unix_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_ids_have_expected_shape() {
        let id = generate_player_id();
        assert!(id.starts_with("player_"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<u64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn player_ids_differ() {
        // Same-second collisions are defeated by the random suffix.
        let a = generate_player_id();
        let b = generate_player_id();
        assert_ne!(a, b);
    }

    #[test]
    fn default_color_is_first_palette_entry() {
        assert_eq!(PlayerColor::default(), PlayerColor::PALETTE[0]);
    }
}
