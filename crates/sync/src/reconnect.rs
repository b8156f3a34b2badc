//! Exponential-backoff reconnection for the room snapshot stream.
//!
//! When the stream to a room server drops, [`connect_with_backoff`] keeps
//! retrying with increasing delays until either a connection is established
//! or the [`CancellationToken`] is triggered.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

pub type RoomStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay, clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Connect to `url`, retrying with exponential backoff.
///
/// The first attempt is immediate. Returns `None` if `cancel` fires first.
pub async fn connect_with_backoff(
    url: &str,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<RoomStream> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            result = connect_async(url) => {
                match result {
                    Ok((stream, _response)) => {
                        tracing::info!(url, attempt, "Room stream connected");
                        return Some(stream);
                    }
                    Err(e) => {
                        tracing::warn!(
                            url,
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            "Room stream attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let config = ReconnectConfig::default();
        assert_eq!(next_delay(Duration::from_secs(1), &config), Duration::from_secs(2));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = ReconnectConfig {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(next_delay(Duration::from_secs(8), &config), Duration::from_secs(10));
    }

    #[test]
    fn full_backoff_sequence() {
        let config = ReconnectConfig::default();
        let mut delay = config.initial_delay;

        for expected_secs in [1, 2, 4, 8, 16, 30, 30] {
            assert_eq!(delay.as_secs(), expected_secs);
            delay = next_delay(delay, &config);
        }
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_connecting() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            connect_with_backoff("ws://127.0.0.1:9/unused", &ReconnectConfig::default(), &cancel)
                .await;
        assert!(result.is_none());
    }
}
