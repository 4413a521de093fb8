use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rooms hold exactly two participants.
pub const ROOM_CAPACITY: usize = 2;

/// Length of a shareable room code.
pub const ROOM_CODE_LEN: usize = 4;

/// Room-code alphabet: uppercase letters and digits minus the visually
/// confusable I, O, 0, and 1.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Lifecycle of a room document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Generate a random 4-character room code.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether a string is a well-formed room code.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN
        && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert!(is_valid_room_code(&code), "Invalid room code: {code}");
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid_room_code(""));
        assert!(!is_valid_room_code("ABC"));
        assert!(!is_valid_room_code("ABCDE"));
    }

    #[test]
    fn rejects_confusable_characters() {
        assert!(!is_valid_room_code("AB0C"));
        assert!(!is_valid_room_code("AB1C"));
        assert!(!is_valid_room_code("ABIC"));
        assert!(!is_valid_room_code("ABOC"));
        assert!(!is_valid_room_code("abcd"));
    }

    #[test]
    fn accepts_alphabet_members() {
        assert!(is_valid_room_code("ABCD"));
        assert!(is_valid_room_code("2345"));
        assert!(is_valid_room_code("WXYZ"));
    }
}
