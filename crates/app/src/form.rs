//! State of the create/edit form.

use assetroom_core::asset::{Asset, AssetDraft, Category};
use assetroom_core::types::{AssetId, TimestampMillis};

/// Identity reused when saving an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub id: AssetId,
    pub created_at: TimestampMillis,
}

/// An open form: a draft plus, when editing, the record it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub editing: Option<EditTarget>,
    pub draft: AssetDraft,
}

impl FormState {
    pub fn new_asset() -> Self {
        Self::default()
    }

    pub fn edit(asset: &Asset) -> Self {
        Self {
            editing: Some(EditTarget {
                id: asset.id.clone(),
                created_at: asset.created_at,
            }),
            draft: AssetDraft::from(asset),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    /// Set one draft field by its short name.
    ///
    /// Accepted names: `sku`, `name`, `image`, `prompt`, `tagline`, `info`,
    /// `caption`, `price`, `category`.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        let draft = &mut self.draft;
        match field {
            "sku" => draft.sku = value.to_string(),
            "name" => draft.name = value.to_string(),
            "image" => draft.image_url = Some(value.to_string()).filter(|v| !v.trim().is_empty()),
            "prompt" => draft.prompt = value.to_string(),
            "tagline" => draft.tagline = value.to_string(),
            "info" => draft.product_info = value.to_string(),
            "caption" => draft.caption = value.to_string(),
            "price" => draft.price = value.to_string(),
            "category" => {
                draft.category = Category::parse(value).ok_or_else(|| {
                    let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
                    format!("Unknown category '{value}' (one of {})", names.join(", "))
                })?;
            }
            other => return Err(format!("Unknown field '{other}'")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_form_keeps_identity() {
        let asset = Asset {
            id: "a".into(),
            name: "Widget".into(),
            created_at: 42,
            ..Default::default()
        };
        let form = FormState::edit(&asset);
        assert_eq!(form.editing, Some(EditTarget { id: "a".into(), created_at: 42 }));
        assert_eq!(form.draft.name, "Widget");
    }

    #[test]
    fn set_field_maps_short_names() {
        let mut form = FormState::new_asset();
        form.set_field("info", "Iced coffee").unwrap();
        form.set_field("category", "culinary").unwrap();
        form.set_field("image", "  ").unwrap();

        assert_eq!(form.draft.product_info, "Iced coffee");
        assert_eq!(form.draft.category, Category::Culinary);
        assert_eq!(form.draft.image_url, None);
        assert!(form.set_field("category", "toys").is_err());
        assert!(form.set_field("colour", "red").is_err());
    }
}
