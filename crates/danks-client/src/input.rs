use danks_game::controls::Action;

/// The keys the game binds. Arrows move and aim, W/S set power, Space
/// fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    W,
    S,
    Space,
}

impl Key {
    /// Parse a DOM-style key name as delivered by keyboard events.
    /// Unbound keys map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "w" | "W" => Some(Self::W),
            "s" | "S" => Some(Self::S),
            " " | "Space" => Some(Self::Space),
            _ => None,
        }
    }
}

/// Translate a bound key into its turn action.
pub fn action_for(key: Key) -> Action {
    match key {
        Key::ArrowLeft => Action::MoveLeft,
        Key::ArrowRight => Action::MoveRight,
        Key::ArrowUp => Action::RaiseAngle,
        Key::ArrowDown => Action::LowerAngle,
        Key::W => Action::RaisePower,
        Key::S => Action::LowerPower,
        Key::Space => Action::Fire,
    }
}
