//! Room identity helpers.
//!
//! A room id is only a partition key. Every layer that talks to the room
//! store normalizes it the same way, so callers pass the raw user input.

/// Room used when the supplied id is blank.
pub const DEFAULT_ROOM: &str = "general";

/// Trim, lower-case, and default a raw room id.
pub fn normalize_room_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_ROOM.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_room_id("  Team-X "), "team-x");
    }

    #[test]
    fn blank_falls_back_to_default() {
        assert_eq!(normalize_room_id(""), DEFAULT_ROOM);
        assert_eq!(normalize_room_id(" \t "), DEFAULT_ROOM);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_room_id(" Marketing ");
        assert_eq!(normalize_room_id(&once), once);
    }
}
