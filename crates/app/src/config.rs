use std::path::PathBuf;
use std::time::Duration;

use assetroom_assist::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use assetroom_assist::GeminiConfig;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the local key files (default: `./.assetroom`).
    pub data_dir: PathBuf,
    /// Room server base URL. Unset means rooms live in an in-process hub.
    pub room_server_url: Option<String>,
    /// Content assist settings.
    pub gemini: GeminiConfig,
    /// Base of the link produced by "share room" (default: `http://localhost:5173/`).
    pub share_base_url: String,
    /// How long a toast stays visible (default: 3 s).
    pub toast_duration: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                      |
    /// |----------------------------|----------------------------------------------|
    /// | `ASSETROOM_DATA_DIR`       | `./.assetroom`                               |
    /// | `ROOM_SERVER_URL`          | unset (in-process hub)                       |
    /// | `GEMINI_API_KEY`/`API_KEY` | unset (content assist disabled)              |
    /// | `GEMINI_MODEL`             | `gemini-3-flash-preview`                     |
    /// | `GEMINI_BASE_URL`          | `https://generativelanguage.googleapis.com`  |
    /// | `SHARE_BASE_URL`           | `http://localhost:5173/`                     |
    /// | `TOAST_DURATION_MS`        | `3000`                                       |
    pub fn from_env() -> Self {
        let data_dir = std::env::var("ASSETROOM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.assetroom"));

        let room_server_url = non_blank_var("ROOM_SERVER_URL");

        let api_key = non_blank_var("GEMINI_API_KEY")
            .or_else(|| non_blank_var("API_KEY"))
            .unwrap_or_default();

        let gemini = GeminiConfig {
            api_key,
            model: non_blank_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: non_blank_var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        };

        let share_base_url = non_blank_var("SHARE_BASE_URL")
            .unwrap_or_else(|| "http://localhost:5173/".into());

        let toast_ms: u64 = std::env::var("TOAST_DURATION_MS")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("TOAST_DURATION_MS must be a valid u64");

        Self {
            data_dir,
            room_server_url,
            gemini,
            share_base_url,
            toast_duration: Duration::from_millis(toast_ms),
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
