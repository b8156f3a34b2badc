//! The asset record, its editable draft, and the category set.
//!
//! Assets serialize with camelCase keys. Every field except `id` falls back
//! to its default when missing, so partial room documents (merge writes) and
//! older local blobs still load. A record without an `id` does not decode.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::types::{AssetId, TimestampMillis};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Product category shown on the card badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Culinary,
    Fashion,
    Electronics,
    Services,
    #[default]
    General,
}

impl Category {
    /// All categories in form order.
    pub const ALL: [Category; 5] = [
        Category::Culinary,
        Category::Fashion,
        Category::Electronics,
        Category::Services,
        Category::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Culinary => "Culinary",
            Category::Fashion => "Fashion",
            Category::Electronics => "Electronics",
            Category::Services => "Services",
            Category::General => "General",
        }
    }

    /// Case-insensitive lookup. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Category> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A single marketing / inventory record.
///
/// `id` is required on decode; every other field defaults when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    /// Always serialized (as `null` when absent) so a merge write clears it.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    /// Visual prompt for an image generator.
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub tagline: String,
    /// Free-text product description fed to content assist.
    #[serde(default)]
    pub product_info: String,
    /// Social media caption.
    #[serde(default)]
    pub caption: String,
    /// Free text, never parsed as a number.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub created_at: TimestampMillis,
}

/// Treat `""` and `null` image links alike.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

impl Asset {
    /// Build a full record from a validated draft plus identity.
    pub fn from_draft(draft: AssetDraft, id: AssetId, created_at: TimestampMillis) -> Self {
        Self {
            id,
            sku: draft.sku,
            name: draft.name,
            image_url: draft.image_url,
            prompt: draft.prompt,
            tagline: draft.tagline,
            product_info: draft.product_info,
            caption: draft.caption,
            price: draft.price,
            category: draft.category,
            created_at,
        }
    }

    /// All fields except `id`, as stored in a room document.
    pub fn to_document(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut doc = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        doc.remove("id");
        doc
    }

    /// Rebuild a record from a room document, taking `id` from the key.
    ///
    /// Any `id` stored inside the document is ignored.
    pub fn from_document(
        id: &str,
        doc: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let mut doc = doc.clone();
        doc.insert("id".into(), serde_json::Value::String(id.to_string()));
        serde_json::from_value(serde_json::Value::Object(doc))
    }
}

/// Order a collection newest first (descending `created_at`, then `id`).
pub fn sort_newest_first(assets: &mut [Asset]) {
    assets.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ---------------------------------------------------------------------------
// AssetDraft
// ---------------------------------------------------------------------------

/// Editable form payload: an asset without identity or creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetDraft {
    pub sku: String,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(url(message = "Image link must be a valid URL"))]
    pub image_url: Option<String>,
    pub prompt: String,
    pub tagline: String,
    pub product_info: String,
    pub caption: String,
    pub price: String,
    pub category: Category,
}

impl AssetDraft {
    /// Normalize and validate the draft for saving.
    ///
    /// The name is trimmed and a blank image link becomes `None` before the
    /// validation rules run.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        self.image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        self.validate()
            .map_err(|errors| CoreError::Validation(first_message(&errors)))?;
        Ok(self)
    }
}

impl From<&Asset> for AssetDraft {
    fn from(asset: &Asset) -> Self {
        Self {
            sku: asset.sku.clone(),
            name: asset.name.clone(),
            image_url: asset.image_url.clone(),
            prompt: asset.prompt.clone(),
            tagline: asset.tagline.clone(),
            product_info: asset.product_info.clone(),
            caption: asset.caption.clone(),
            price: asset.price.clone(),
            category: asset.category,
        }
    }
}

/// Pick a stable, human-readable message out of a validation failure.
fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    for field in ["name", "image_url"] {
        if let Some(error) = fields.get(field).and_then(|errs| errs.first()) {
            return error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"));
        }
    }
    errors.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn widget() -> Asset {
        Asset {
            id: "a-1".into(),
            sku: "W1".into(),
            name: "Widget".into(),
            price: "Rp 10.000".into(),
            category: Category::Fashion,
            created_at: 1_700_000_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(widget()).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(json["productInfo"], "");
        assert_eq!(json["category"], "Fashion");
        assert_eq!(json["imageUrl"], serde_json::Value::Null);
    }

    #[test]
    fn unknown_category_falls_back_to_general() {
        let asset: Asset =
            serde_json::from_value(serde_json::json!({"id": "x", "name": "n", "category": "Kitchen"}))
                .unwrap();
        assert_eq!(asset.category, Category::General);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("electronics"), Some(Category::Electronics));
        assert_eq!(Category::parse(" SERVICES "), Some(Category::Services));
        assert_eq!(Category::parse("toys"), None);
    }

    #[test]
    fn document_excludes_id_and_round_trips_through_key() {
        let asset = widget();
        let doc = asset.to_document();
        assert!(!doc.contains_key("id"));

        let rebuilt = Asset::from_document("a-1", &doc).unwrap();
        assert_eq!(rebuilt, asset);
    }

    #[test]
    fn from_document_prefers_key_over_embedded_id() {
        let mut doc = widget().to_document();
        doc.insert("id".into(), serde_json::json!("spoofed"));
        let rebuilt = Asset::from_document("real", &doc).unwrap();
        assert_eq!(rebuilt.id, "real");
    }

    #[test]
    fn cleared_image_is_sent_in_document() {
        let mut asset = widget();
        asset.image_url = None;
        let doc = asset.to_document();
        assert_eq!(doc.get("imageUrl"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn empty_image_string_decodes_as_none() {
        let doc = serde_json::json!({"name": "n", "imageUrl": ""});
        let asset = Asset::from_document("p", doc.as_object().unwrap()).unwrap();
        assert_eq!(asset.image_url, None);
    }

    #[test]
    fn record_without_id_does_not_decode() {
        let result = serde_json::from_value::<Asset>(serde_json::json!({"name": "n"}));
        assert!(result.is_err());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let doc = serde_json::json!({"name": "Only name"});
        let asset = Asset::from_document("p", doc.as_object().unwrap()).unwrap();
        assert_eq!(asset.name, "Only name");
        assert_eq!(asset.created_at, 0);
        assert_eq!(asset.category, Category::General);
    }

    #[test]
    fn sort_orders_newest_first() {
        let mut assets = vec![
            Asset { id: "old".into(), created_at: 1, ..Default::default() },
            Asset { id: "new".into(), created_at: 3, ..Default::default() },
            Asset { id: "mid".into(), created_at: 2, ..Default::default() },
        ];
        sort_newest_first(&mut assets);
        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn blank_name_is_rejected() {
        let draft = AssetDraft { name: "   ".into(), ..Default::default() };
        assert_matches!(
            draft.validated(),
            Err(CoreError::Validation(msg)) if msg == "Product name is required"
        );
    }

    #[test]
    fn name_is_the_only_required_field() {
        let draft = AssetDraft { name: "  Widget ".into(), ..Default::default() };
        let draft = draft.validated().unwrap();
        assert_eq!(draft.name, "Widget");
        assert!(draft.sku.is_empty());
    }

    #[test]
    fn blank_image_url_becomes_none() {
        let draft = AssetDraft {
            name: "Widget".into(),
            image_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(draft.validated().unwrap().image_url, None);
    }

    #[test]
    fn malformed_image_url_is_rejected() {
        let draft = AssetDraft {
            name: "Widget".into(),
            image_url: Some("not a link".into()),
            ..Default::default()
        };
        assert_matches!(draft.validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn draft_from_asset_keeps_editable_fields() {
        let asset = widget();
        let draft = AssetDraft::from(&asset);
        let back = Asset::from_draft(draft, asset.id.clone(), asset.created_at);
        assert_eq!(back, asset);
    }
}
