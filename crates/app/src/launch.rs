//! Room identity carried in links.

use reqwest::Url;

/// Extract a room from the launch argument.
///
/// A URL contributes its `room` query parameter (and nothing if it has
/// none); any other non-blank argument is taken as a bare room name.
pub fn parse_launch_room(arg: &str) -> Option<String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }

    match Url::parse(arg) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url
            .query_pairs()
            .find(|(key, _)| key == "room")
            .map(|(_, value)| value.trim().to_string())
            .filter(|room| !room.is_empty()),
        _ => Some(arg.to_string()),
    }
}

/// Build `<base>?room=<room>`.
pub fn share_link(base: &str, room: &str) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().clear().append_pair("room", room);
            url.to_string()
        }
        Err(e) => {
            tracing::warn!(base, error = %e, "Share base is not a URL, appending query");
            format!("{base}?room={room}")
        }
    }
}
