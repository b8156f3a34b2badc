//! Durable change journal.
//!
//! [`ChangeJournal`] subscribes to a [`RoomHub`](crate::RoomHub) change feed
//! and appends every received [`RoomChange`] as one JSON line. On startup the
//! server replays the file to rebuild the hub. It runs as a long-lived
//! background task and shuts down when the bus sender is dropped.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;

use crate::bus::RoomChange;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Journal I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode change: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Background service that appends room changes to a JSON-lines file.
pub struct ChangeJournal;

impl ChangeJournal {
    /// Run the journal loop.
    ///
    /// The loop exits when the channel is closed (i.e. the hub is dropped).
    pub async fn run(path: PathBuf, mut receiver: broadcast::Receiver<RoomChange>) {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    if let Err(e) = Self::append(&path, &change).await {
                        tracing::error!(
                            error = %e,
                            seq = change.seq,
                            room = %change.room,
                            "Failed to journal change"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Change journal lagged, some changes were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Room hub closed, change journal shutting down");
                    break;
                }
            }
        }
    }

    /// Append a single change as one line.
    pub async fn append(path: &Path, change: &RoomChange) -> Result<(), JournalError> {
        let io_err = |source| JournalError::Io { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut line = serde_json::to_vec(change)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_err)?;
        file.write_all(&line).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }

    /// Read every change recorded in `path`, in file order.
    ///
    /// A missing file is an empty journal. Lines that fail to decode (for
    /// example a torn final write) are skipped with a warning.
    pub async fn replay(path: &Path) -> Result<Vec<RoomChange>, JournalError> {
        let file = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(JournalError::Io { path: path.to_path_buf(), source }),
        };

        let mut lines = BufReader::new(file).lines();
        let mut changes = Vec::new();
        let mut line_no = 0usize;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|source| JournalError::Io { path: path.to_path_buf(), source })?
        {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RoomChange>(&line) {
                Ok(change) => changes.push(change),
                Err(e) => tracing::warn!(line = line_no, error = %e, "Skipping malformed journal line"),
            }
        }

        tracing::info!(path = %path.display(), changes = changes.len(), "Journal replayed");
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::bus::ChangeKind;
    use crate::hub::RoomHub;

    fn upsert(seq: u64, id: &str, name: &str) -> RoomChange {
        let fields = json!({ "name": name }).as_object().cloned().unwrap();
        RoomChange::new(seq, "r", id, ChangeKind::Upsert { fields })
    }

    #[tokio::test]
    async fn missing_file_replays_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let changes = ChangeJournal::replay(&dir.path().join("none.jsonl")).await.unwrap();
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn appended_changes_replay_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rooms.jsonl");

        ChangeJournal::append(&path, &upsert(1, "a", "A")).await.unwrap();
        ChangeJournal::append(&path, &RoomChange::new(2, "r", "a", ChangeKind::Delete))
            .await
            .unwrap();

        let changes = ChangeJournal::replay(&path).await.unwrap();
        let seqs: Vec<_> = changes.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, [1, 2]);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.jsonl");
        ChangeJournal::append(&path, &upsert(1, "a", "A")).await.unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(b"{\"seq\": 2, \"room\n\n").await.unwrap();
        drop(file);

        ChangeJournal::append(&path, &upsert(3, "b", "B")).await.unwrap();

        let changes = ChangeJournal::replay(&path).await.unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].asset_id, "b");
    }

    #[tokio::test]
    async fn run_journals_hub_changes_until_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.jsonl");

        let hub = RoomHub::new();
        let task = tokio::spawn(ChangeJournal::run(path.clone(), hub.subscribe()));

        let fields = json!({ "name": "Widget", "createdAt": 5 }).as_object().cloned().unwrap();
        hub.upsert("Team", "w", fields).unwrap();
        hub.delete("team", "w");
        drop(hub);
        task.await.unwrap();

        let changes = ChangeJournal::replay(&path).await.unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].room, "team");

        let restored = RoomHub::from_changes(changes);
        assert!(restored.snapshot("team").is_empty());
    }
}
