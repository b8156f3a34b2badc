//! Search-as-you-type over the asset list.

use crate::asset::Asset;

/// Returns `true` if the asset's name, tagline, or SKU contains `query`,
/// ignoring case.
pub fn matches_query(asset: &Asset, query: &str) -> bool {
    let needle = query.to_lowercase();
    [&asset.name, &asset.tagline, &asset.sku]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Filter a collection by `query`, preserving order.
///
/// An empty query returns every asset. The input is never modified.
///
/// # Examples
///
/// ```
/// use assetroom_core::asset::Asset;
/// use assetroom_core::search::filter_assets;
///
/// let assets = vec![
///     Asset { name: "Coffee Beans".into(), ..Default::default() },
///     Asset { name: "Tea".into(), sku: "TB-1".into(), ..Default::default() },
/// ];
/// assert_eq!(filter_assets(&assets, "coffee").len(), 1);
/// assert_eq!(filter_assets(&assets, "tb-").len(), 1);
/// assert_eq!(filter_assets(&assets, "").len(), 2);
/// ```
pub fn filter_assets<'a>(assets: &'a [Asset], query: &str) -> Vec<&'a Asset> {
    if query.is_empty() {
        return assets.iter().collect();
    }
    assets.iter().filter(|a| matches_query(a, query)).collect()
}
