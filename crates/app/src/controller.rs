//! Application controller.
//!
//! [`AppController`] is the single owner of client state: the record
//! collection, the selection, the persistence [`Mode`], the open form and
//! the notification stack. It is the only place that decides whether a write
//! goes to the local record store or to the room.
//!
//! Asynchronous results (room snapshots, late delete failures, toast
//! expiries) arrive as [`AppEvent`]s on the controller's own channel and are
//! applied through [`AppController::handle_event`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use assetroom_assist::{AssistError, ContentAssist};
use assetroom_core::asset::{Asset, AssetDraft};
use assetroom_core::error::CoreError;
use assetroom_core::export::format_bulk;
use assetroom_core::room::normalize_room_id;
use assetroom_core::search::filter_assets;
use assetroom_core::types::{new_asset_id, now_millis, AssetId};
use assetroom_store::records::LocalRecordStore;
use assetroom_sync::{RoomSync, SnapshotCallback, Subscription};
use tokio::sync::mpsc;

use crate::clipboard::Clipboard;
use crate::form::FormState;
use crate::launch;
use crate::toast::{Toast, ToastKind, ToastQueue};

// ---------------------------------------------------------------------------
// Mode, events, alerts
// ---------------------------------------------------------------------------

/// Where records are read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Local record store only.
    Local,
    /// Subscribed to `room`, first snapshot not yet received.
    ConnectingToRoom { room: String },
    /// Subscribed to `room` and showing its snapshots.
    SyncedToRoom { room: String },
}

impl Mode {
    pub fn room(&self) -> Option<&str> {
        match self {
            Mode::Local => None,
            Mode::ConnectingToRoom { room } | Mode::SyncedToRoom { room } => Some(room.as_str()),
        }
    }
}

/// Asynchronous input to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A room snapshot from subscription `generation`.
    Snapshot { generation: u64, assets: Vec<Asset> },
    /// A fire-and-forget room delete failed.
    RemoteDeleteFailed { asset_id: AssetId, message: String },
    /// Toast `id` reached the end of its display time.
    ToastExpired(u64),
}

/// A blocking message the user must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Collaborators the controller drives.
#[derive(Clone)]
pub struct AppServices {
    pub records: LocalRecordStore,
    pub sync: Arc<dyn RoomSync>,
    pub assist: Arc<dyn ContentAssist>,
    pub clipboard: Arc<dyn Clipboard>,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub share_base_url: String,
    pub toast_duration: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            share_base_url: "http://localhost:5173/".into(),
            toast_duration: Duration::from_secs(3),
        }
    }
}

pub struct AppController {
    services: AppServices,
    settings: ControllerSettings,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    mode: Mode,
    assets: Vec<Asset>,
    loading: bool,
    search: String,
    selected: HashSet<AssetId>,
    form: Option<FormState>,
    toasts: ToastQueue,
    alert: Option<Alert>,

    subscription: Option<Subscription>,
    /// Bumped on every subscription change; snapshots from older
    /// generations are dropped.
    generation: u64,
}

impl AppController {
    pub fn new(services: AppServices, settings: ControllerSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            services,
            settings,
            events_tx,
            events_rx,
            mode: Mode::Local,
            assets: Vec::new(),
            loading: true,
            search: String::new(),
            selected: HashSet::new(),
            form: None,
            toasts: ToastQueue::new(),
            alert: None,
            subscription: None,
            generation: 0,
        }
    }

    // ---- read access ----

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn room(&self) -> Option<&str> {
        self.mode.room()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The whole collection in display order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// The collection filtered by the current search query.
    pub fn visible_assets(&self) -> Vec<&Asset> {
        filter_assets(&self.assets, &self.search)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn toasts(&self) -> &[Toast] {
        self.toasts.items()
    }

    /// Take the pending blocking alert, acknowledging it.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    // ---- lifecycle ----

    /// Enter the initial mode.
    ///
    /// A launch room wins over a remembered one; with neither the local
    /// collection is loaded.
    pub async fn start(&mut self, launch_room: Option<String>) {
        if let Some(raw) = launch_room.filter(|r| !r.trim().is_empty()) {
            self.join_room(&raw).await;
            self.toast(ToastKind::Info, format!("Joined team room: {}", normalize_room_id(&raw)));
        } else if let Some(room) = self.services.records.load_room() {
            tracing::info!(room = %room, "Rejoining remembered room");
            self.join_room(&room).await;
        } else {
            self.load_local();
        }
    }

    /// Switch to `raw` (normalized), replacing any current subscription.
    pub async fn join_room(&mut self, raw: &str) {
        let room = normalize_room_id(raw);
        self.release_subscription().await;

        self.generation += 1;
        self.mode = Mode::ConnectingToRoom { room: room.clone() };
        self.loading = true;
        self.assets.clear();
        self.close_collection_views();

        if let Err(e) = self.services.records.save_room(&room) {
            tracing::warn!(room = %room, error = %e, "Failed to remember room");
        }

        let tx = self.events_tx.clone();
        let generation = self.generation;
        let on_change: SnapshotCallback = Arc::new(move |assets| {
            let _ = tx.send(AppEvent::Snapshot { generation, assets });
        });

        let subscription = self.services.sync.subscribe(&room, on_change).await;
        self.subscription = Some(subscription);
        tracing::info!(room = %room, generation, "Joining room");
    }

    /// Return to local mode and forget the room.
    pub async fn leave_room(&mut self) {
        if self.mode == Mode::Local {
            return;
        }
        self.release_subscription().await;
        self.generation += 1;

        if let Err(e) = self.services.records.clear_room() {
            tracing::warn!(error = %e, "Failed to forget room");
        }

        self.mode = Mode::Local;
        self.close_collection_views();
        self.load_local();
        tracing::info!("Left room, back to local records");
    }

    /// Release the subscription. Call before dropping the controller.
    pub async fn shutdown(&mut self) {
        self.release_subscription().await;
    }

    /// A form or selection belongs to the collection it was opened on.
    fn close_collection_views(&mut self) {
        self.form = None;
        self.selected.clear();
    }

    async fn release_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release().await;
        }
    }

    fn load_local(&mut self) {
        self.assets = self.services.records.load_assets();
        self.loading = false;
    }

    // ---- events ----

    /// Wait for the next asynchronous event.
    pub async fn recv_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    /// Apply every event already queued. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Snapshot { generation, assets } => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "Dropping stale snapshot");
                    return;
                }
                let room = match &self.mode {
                    Mode::Local => return,
                    Mode::ConnectingToRoom { room } | Mode::SyncedToRoom { room } => room.clone(),
                };
                tracing::debug!(room = %room, count = assets.len(), "Room snapshot applied");
                self.assets = assets;
                self.loading = false;
                self.mode = Mode::SyncedToRoom { room };
            }
            AppEvent::RemoteDeleteFailed { asset_id, message } => {
                tracing::error!(asset_id = %asset_id, error = %message, "Room delete failed");
                self.toast(ToastKind::Error, "Delete failed on the room server");
            }
            AppEvent::ToastExpired(id) => self.toasts.dismiss(id),
        }
    }

    // ---- notifications ----

    /// Show a toast that dismisses itself after the configured duration.
    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let id = self.toasts.push(kind, message);
        let tx = self.events_tx.clone();
        let duration = self.settings.toast_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(AppEvent::ToastExpired(id));
        });
    }

    fn block(&mut self, message: impl Into<String>) {
        self.alert = Some(Alert {
            message: message.into(),
        });
    }

    // ---- form ----

    pub fn open_new_form(&mut self) {
        self.form = Some(FormState::new_asset());
    }

    pub fn open_edit_form(&mut self, id: &str) -> Result<(), CoreError> {
        let asset = self
            .assets
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Asset",
                id: id.to_string(),
            })?;
        self.form = Some(FormState::edit(asset));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Save the open form's draft.
    pub async fn save(&mut self) -> Option<Asset> {
        let draft = self.form.as_ref()?.draft.clone();
        self.save_draft(draft).await
    }

    /// Validate and write `draft`, as an edit when the open form is editing.
    ///
    /// New records get a fresh id and timestamp; edits keep both. Returns the
    /// written record, or `None` after raising an alert or error toast.
    pub async fn save_draft(&mut self, draft: AssetDraft) -> Option<Asset> {
        let draft = match draft.validated() {
            Ok(draft) => draft,
            Err(e) => {
                self.block(validation_message(e));
                return None;
            }
        };

        let editing = self.form.as_ref().and_then(|f| f.editing.clone());
        let is_edit = editing.is_some();
        let (id, created_at) = match editing {
            Some(target) => (target.id, target.created_at),
            None => (new_asset_id(), now_millis()),
        };
        let asset = Asset::from_draft(draft, id, created_at);

        let saved = match self.mode.room().map(str::to_string) {
            Some(room) => self.save_to_room(&room, &asset, is_edit).await,
            None => self.save_locally(&asset, is_edit),
        };

        if saved {
            self.form = None;
            Some(asset)
        } else {
            if let Some(form) = self.form.as_mut() {
                form.draft = AssetDraft::from(&asset);
            }
            None
        }
    }

    async fn save_to_room(&mut self, room: &str, asset: &Asset, is_edit: bool) -> bool {
        match self.services.sync.upsert(room, asset).await {
            Ok(()) => {
                let message = if is_edit { "Room record updated" } else { "Saved to room" };
                self.toast(ToastKind::Success, message);
                true
            }
            Err(e) => {
                tracing::error!(room, asset_id = %asset.id, error = %e, "Room save failed");
                self.toast(ToastKind::Error, "Room save failed. Check the room server connection.");
                false
            }
        }
    }

    fn save_locally(&mut self, asset: &Asset, is_edit: bool) -> bool {
        let mut next = self.assets.clone();
        match next.iter_mut().find(|a| a.id == asset.id) {
            Some(existing) => *existing = asset.clone(),
            None => next.insert(0, asset.clone()),
        }

        match self.services.records.save_assets(&next) {
            Ok(()) => {
                self.assets = next;
                let message = if is_edit { "Local record updated" } else { "Saved locally" };
                self.toast(ToastKind::Success, message);
                true
            }
            Err(e) => {
                tracing::error!(asset_id = %asset.id, error = %e, "Local save failed");
                self.toast(ToastKind::Error, "Could not write local records");
                false
            }
        }
    }

    /// Delete a record.
    ///
    /// In a room the delete is sent in the background; a failure arrives
    /// later as [`AppEvent::RemoteDeleteFailed`].
    pub fn delete(&mut self, id: &str) {
        self.selected.remove(id);

        match self.mode.room().map(str::to_string) {
            Some(room) => {
                let sync = Arc::clone(&self.services.sync);
                let tx = self.events_tx.clone();
                let asset_id = id.to_string();
                tokio::spawn(async move {
                    if let Err(e) = sync.delete(&room, &asset_id).await {
                        let _ = tx.send(AppEvent::RemoteDeleteFailed {
                            asset_id,
                            message: e.to_string(),
                        });
                    }
                });
            }
            None => {
                let next: Vec<Asset> = self.assets.iter().filter(|a| a.id != id).cloned().collect();
                if let Err(e) = self.services.records.save_assets(&next) {
                    tracing::error!(asset_id = id, error = %e, "Local delete failed");
                    self.toast(ToastKind::Error, "Could not write local records");
                    return;
                }
                self.assets = next;
            }
        }

        self.toast(ToastKind::Info, "Asset deleted");
    }

    /// Ask content assist to fill the open form from its product info.
    ///
    /// Suggestions replace tagline, caption and prompt when non-empty; the
    /// price is only filled when the form has none.
    pub async fn generate_copy(&mut self) {
        let Some(product_info) = self.form.as_ref().map(|f| f.draft.product_info.clone()) else {
            return;
        };
        if product_info.trim().is_empty() {
            self.block("Enter a short description under product info so content assist has a reference.");
            return;
        }

        let assist = Arc::clone(&self.services.assist);
        match assist.generate(&product_info).await {
            Ok(suggestion) => {
                let Some(form) = self.form.as_mut() else {
                    return;
                };
                let draft = &mut form.draft;
                for (field, value) in [
                    (&mut draft.tagline, suggestion.tagline),
                    (&mut draft.caption, suggestion.caption),
                    (&mut draft.prompt, suggestion.prompt),
                ] {
                    if !value.trim().is_empty() {
                        *field = value;
                    }
                }
                if draft.price.trim().is_empty() {
                    draft.price = suggestion.suggested_price;
                }
            }
            Err(AssistError::NotConfigured) => {
                self.block(AssistError::NotConfigured.to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Content assist failed");
                self.block("Content assist is busy. Try again or fill the fields manually.");
            }
        }
    }

    // ---- search and selection ----

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // ---- clipboard ----

    /// Copy every selected record, in display order, as one text block.
    ///
    /// Returns the number of records copied. The selection is cleared on
    /// success.
    pub fn bulk_copy(&mut self) -> usize {
        let chosen: Vec<&Asset> = self
            .assets
            .iter()
            .filter(|a| self.selected.contains(&a.id))
            .collect();
        if chosen.is_empty() {
            return 0;
        }
        let count = chosen.len();
        let text = format_bulk(chosen);

        match self.services.clipboard.write_text(&text) {
            Ok(()) => {
                self.toast(ToastKind::Success, format!("{count} assets copied"));
                self.selected.clear();
                count
            }
            Err(e) => {
                tracing::error!(error = %e, "Bulk copy failed");
                self.toast(ToastKind::Error, "Copy failed");
                0
            }
        }
    }

    pub fn copy_field(&mut self, label: &str, text: &str) {
        match self.services.clipboard.write_text(text) {
            Ok(()) => self.toast(ToastKind::Success, format!("{label} copied")),
            Err(e) => {
                tracing::error!(label, error = %e, "Copy failed");
                self.toast(ToastKind::Error, "Copy failed");
            }
        }
    }

    /// Copy a link that opens the current room. `None` in local mode.
    pub fn share_link(&mut self) -> Option<String> {
        let room = self.mode.room()?.to_string();
        let link = launch::share_link(&self.settings.share_base_url, &room);
        match self.services.clipboard.write_text(&link) {
            Ok(()) => self.toast(ToastKind::Success, "Team link copied. Share it with your team."),
            Err(e) => {
                tracing::error!(error = %e, "Copy failed");
                self.toast(ToastKind::Error, "Copy failed");
            }
        }
        Some(link)
    }
}

fn validation_message(error: CoreError) -> String {
    match error {
        CoreError::Validation(message) => message,
        other => other.to_string(),
    }
}
