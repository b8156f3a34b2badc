/// Asset identifiers are opaque strings (UUID v4 when minted locally).
pub type AssetId = String;

/// Creation timestamps are milliseconds since the Unix epoch.
pub type TimestampMillis = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> TimestampMillis {
    chrono::Utc::now().timestamp_millis()
}

/// Mint a fresh asset identifier.
pub fn new_asset_id() -> AssetId {
    uuid::Uuid::new_v4().to_string()
}
