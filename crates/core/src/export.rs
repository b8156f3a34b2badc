//! Clipboard text for bulk copy.

use crate::asset::Asset;

/// Placed between record blocks in a bulk copy.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Render one asset with the fixed bulk-copy template.
pub fn format_block(asset: &Asset) -> String {
    format!(
        "📌 {} ({})\n💡 {}\n💬 {}\n💰 {}",
        asset.name, asset.sku, asset.tagline, asset.caption, asset.price
    )
}

/// Render several assets, in the given order, joined by [`BLOCK_SEPARATOR`].
pub fn format_bulk<'a>(assets: impl IntoIterator<Item = &'a Asset>) -> String {
    assets
        .into_iter()
        .map(format_block)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}
