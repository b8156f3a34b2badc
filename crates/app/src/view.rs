//! Plain-text rendering of the controller state for the terminal client.

use std::fmt::Write as _;

use assetroom_core::asset::Asset;

use crate::controller::{AppController, Mode};
use crate::form::FormState;
use crate::toast::Toast;

/// Header line: mode badge and, in a room, its id.
pub fn header(mode: &Mode) -> String {
    match mode {
        Mode::Local => "AssetRoom  [LOCAL]  records stay on this device".to_string(),
        Mode::ConnectingToRoom { room } => format!("AssetRoom  [CONNECTING]  room: {room}"),
        Mode::SyncedToRoom { room } => format!("AssetRoom  [TEAM]  room: {room}"),
    }
}

/// One record as a card. `index` is the 1-based position used by commands.
pub fn card(index: usize, asset: &Asset, selected: bool) -> String {
    let mark = if selected { "[x]" } else { "[ ]" };
    let mut out = format!("{mark} {index:>3}. {}", asset.name);
    if !asset.sku.is_empty() {
        let _ = write!(out, "  ({})", asset.sku);
    }
    let _ = write!(out, "  #{}", asset.category);
    if !asset.price.is_empty() {
        let _ = write!(out, "  {}", asset.price);
    }

    for (label, value) in [
        ("tagline", asset.tagline.as_str()),
        ("caption", asset.caption.as_str()),
        ("prompt", asset.prompt.as_str()),
    ] {
        if !value.trim().is_empty() {
            let _ = write!(out, "\n       {label}: {value}");
        }
    }
    if let Some(url) = &asset.image_url {
        let _ = write!(out, "\n       image: {url}");
    }
    out
}

/// Search and selection summary.
pub fn toolbar(search: &str, shown: usize, total: usize, selected: usize) -> String {
    let mut out = if search.is_empty() {
        format!("{total} assets")
    } else {
        format!("{shown} of {total} assets match \"{search}\"")
    };
    if selected > 0 {
        let _ = write!(out, "  |  {selected} selected (copy to export)");
    }
    out
}

pub fn toasts(items: &[Toast]) -> String {
    items
        .iter()
        .map(|t| format!("({}) {}", t.kind, t.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The open form with its current draft values.
pub fn form(state: &FormState) -> String {
    let d = &state.draft;
    let title = if state.is_edit() { "Edit asset" } else { "New asset" };
    let rows = [
        ("sku", d.sku.as_str()),
        ("name", d.name.as_str()),
        ("image", d.image_url.as_deref().unwrap_or("")),
        ("category", d.category.as_str()),
        ("price", d.price.as_str()),
        ("info", d.product_info.as_str()),
        ("tagline", d.tagline.as_str()),
        ("caption", d.caption.as_str()),
        ("prompt", d.prompt.as_str()),
    ];

    let mut out = format!("== {title} ==");
    for (name, value) in rows {
        let _ = write!(out, "\n  {name:<9}{value}");
    }
    out.push_str("\n  (set <field> <value>, generate, save, cancel)");
    out
}

/// Full screen for the controller's current state.
pub fn screen(app: &AppController) -> String {
    let mut out = header(app.mode());
    out.push('\n');

    if let Some(state) = app.form() {
        out.push_str(&form(state));
    } else if app.is_loading() {
        out.push_str("Loading assets...");
    } else {
        let visible = app.visible_assets();
        out.push_str(&toolbar(
            app.search(),
            visible.len(),
            app.assets().len(),
            app.selected_count(),
        ));

        if visible.is_empty() {
            out.push_str(if app.assets().is_empty() {
                "\nNo assets yet. Type `new` to add one."
            } else {
                "\nNothing matches the search."
            });
        }
        for (i, asset) in visible.iter().enumerate() {
            out.push('\n');
            out.push_str(&card(i + 1, asset, app.is_selected(&asset.id)));
        }
    }

    let notes = toasts(app.toasts());
    if !notes.is_empty() {
        out.push('\n');
        out.push_str(&notes);
    }
    out
}

#[cfg(test)]
mod tests {
    use assetroom_core::asset::Category;

    use super::*;
    use crate::toast::ToastKind;

    fn widget() -> Asset {
        Asset {
            id: "a".into(),
            sku: "W1".into(),
            name: "Widget".into(),
            tagline: "Always fresh".into(),
            price: "Rp 10.000".into(),
            category: Category::Culinary,
            ..Default::default()
        }
    }

    #[test]
    fn header_shows_room() {
        assert!(header(&Mode::Local).contains("LOCAL"));
        let synced = header(&Mode::SyncedToRoom { room: "team-x".into() });
        assert!(synced.contains("TEAM") && synced.contains("team-x"));
    }

    #[test]
    fn card_skips_empty_fields() {
        let text = card(1, &widget(), true);
        assert!(text.starts_with("[x]   1. Widget  (W1)"));
        assert!(text.contains("tagline: Always fresh"));
        assert!(!text.contains("caption:"));
        assert!(!text.contains("image:"));
    }

    #[test]
    fn toolbar_reports_matches_and_selection() {
        assert_eq!(toolbar("", 3, 3, 0), "3 assets");
        assert_eq!(
            toolbar("wid", 1, 3, 2),
            "1 of 3 assets match \"wid\"  |  2 selected (copy to export)"
        );
    }

    #[test]
    fn toasts_render_kind_and_message() {
        let items = [Toast {
            id: 1,
            kind: ToastKind::Success,
            message: "Saved locally".into(),
        }];
        assert_eq!(toasts(&items), "(success) Saved locally");
    }

    #[test]
    fn form_title_reflects_edit() {
        assert!(form(&FormState::new_asset()).starts_with("== New asset =="));
        assert!(form(&FormState::edit(&widget())).starts_with("== Edit asset =="));
    }
}
