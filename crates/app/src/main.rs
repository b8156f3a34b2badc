use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetroom_app::clipboard::FileClipboard;
use assetroom_app::config::AppConfig;
use assetroom_app::controller::{AppController, AppServices, ControllerSettings};
use assetroom_app::{launch, view};
use assetroom_assist::GeminiClient;
use assetroom_events::RoomHub;
use assetroom_store::{FileKeyValueStore, LocalRecordStore};
use assetroom_sync::{InProcessRoomSync, RemoteRoomSync, RoomSync};

const HELP: &str = "\
commands:
  new                      open an empty form
  edit <n>                 edit card n
  set <field> <value>      set a form field (sku name image category price info tagline caption prompt)
  generate                 fill tagline, caption, prompt and price from info
  save | cancel            close the form
  delete <n>               delete card n
  search [query]           filter by name, tagline or SKU
  select <n>               toggle card n in the selection
  clear                    clear the selection
  copy                     copy the selected cards
  copyfield <n> <field>    copy one field of card n (tagline caption prompt)
  join <room> | leave      switch between a team room and local records
  share                    copy the team room link
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetroom_app=info,assetroom_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Loaded client configuration");

    // --- Services ---
    let kv = FileKeyValueStore::open(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;

    let sync: Arc<dyn RoomSync> = match &config.room_server_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote room server");
            Arc::new(RemoteRoomSync::new(url).context("invalid ROOM_SERVER_URL")?)
        }
        None => {
            tracing::info!("No room server configured, rooms are in-process");
            Arc::new(InProcessRoomSync::new(Arc::new(RoomHub::new())))
        }
    };

    let assist = GeminiClient::new(config.gemini.clone());
    if !assist.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, content assist is disabled");
    }

    let clipboard = FileClipboard::new(config.data_dir.join("clipboard.txt"));
    tracing::info!(path = %clipboard.path().display(), "Clipboard file");

    let services = AppServices {
        records: LocalRecordStore::new(Arc::new(kv)),
        sync,
        assist: Arc::new(assist),
        clipboard: Arc::new(clipboard),
    };
    let settings = ControllerSettings {
        share_base_url: config.share_base_url.clone(),
        toast_duration: config.toast_duration,
    };

    // --- Start ---
    let launch_room = std::env::args().nth(1).and_then(|arg| launch::parse_launch_room(&arg));
    let mut app = AppController::new(services, settings);
    app.start(launch_room).await;
    app.drain_events();
    println!("{}\n\n{HELP}", view::screen(&app));

    // --- Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if !run_command(&mut app, line.trim()).await {
                    break;
                }
                app.drain_events();
            }
            Some(event) = app.recv_event() => {
                app.handle_event(event);
                app.drain_events();
            }
        }

        if let Some(alert) = app.take_alert() {
            println!("!! {alert}");
        }
        println!("{}", view::screen(&app));
    }

    app.shutdown().await;
    tracing::info!("Client shut down");
    Ok(())
}

/// Execute one command line. Returns `false` to quit.
async fn run_command(app: &mut AppController, line: &str) -> bool {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "" => {}
        "quit" | "exit" => return false,
        "help" => println!("{HELP}"),
        "new" => app.open_new_form(),
        "edit" => {
            if let Some(id) = card_id(app, rest) {
                if let Err(e) = app.open_edit_form(&id) {
                    println!("{e}");
                }
            }
        }
        "set" => {
            let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
            match app.form_mut() {
                Some(form) => {
                    if let Err(e) = form.set_field(field, value.trim()) {
                        println!("{e}");
                    }
                }
                None => println!("No form open. Type `new` first."),
            }
        }
        "generate" => app.generate_copy().await,
        "save" => {
            app.save().await;
        }
        "cancel" => app.close_form(),
        "delete" => {
            if let Some(id) = card_id(app, rest) {
                app.delete(&id);
            }
        }
        "search" => app.set_search(rest),
        "select" => {
            if let Some(id) = card_id(app, rest) {
                app.toggle_selected(&id);
            }
        }
        "clear" => app.clear_selection(),
        "copy" => {
            if app.bulk_copy() == 0 {
                println!("Nothing selected.");
            }
        }
        "copyfield" => {
            let (n, field) = rest.split_once(' ').unwrap_or((rest, ""));
            let Some(id) = card_id(app, n) else {
                return true;
            };
            let Some(asset) = app.assets().iter().find(|a| a.id == id).cloned() else {
                return true;
            };
            let (label, text) = match field.trim() {
                "tagline" => ("Tagline", asset.tagline),
                "caption" => ("Caption", asset.caption),
                "prompt" => ("Prompt", asset.prompt),
                other => {
                    println!("Cannot copy field '{other}'");
                    return true;
                }
            };
            app.copy_field(label, &text);
        }
        "join" => {
            if rest.is_empty() {
                println!("Usage: join <room>");
            } else {
                app.join_room(rest).await;
            }
        }
        "leave" => app.leave_room().await,
        "share" => match app.share_link() {
            Some(link) => println!("{link}"),
            None => println!("Join a room first."),
        },
        other => println!("Unknown command '{other}'. Type `help`."),
    }
    true
}

/// Resolve a 1-based card number against the visible list.
fn card_id(app: &AppController, arg: &str) -> Option<String> {
    let visible = app.visible_assets();
    match arg.parse::<usize>() {
        Ok(n) if (1..=visible.len()).contains(&n) => Some(visible[n - 1].id.clone()),
        _ => {
            println!("No card '{arg}'");
            None
        }
    }
}
