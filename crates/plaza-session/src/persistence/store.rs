//! Snapshot file storage with backup-before-overwrite.
//!
//! Writes go to a `.tmp` sibling and are renamed into place, so the primary
//! file is never left half-written. Before each overwrite the previous
//! primary is copied to the backup path, unless it no longer parses.
//! Loading reads the primary and, if that fails, the backup exactly once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use plaza_common::PersistenceError;

use super::snapshot::Snapshot;

/// Where a recovered snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Primary,
    Backup,
    /// Neither file could be read.
    Empty,
}

#[derive(Debug)]
pub struct Recovered {
    pub snapshot: Option<Snapshot>,
    pub source: SnapshotSource,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    primary: PathBuf,
    backup: PathBuf,
}

impl SnapshotStore {
    pub fn new(primary: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            backup: backup.into(),
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Persist `snapshot`, refreshing the backup from the current primary first.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.primary.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        match read_snapshot(&self.primary) {
            Ok(_) => self.refresh_backup(),
            Err(PersistenceError::Read { ref source, .. })
                if source.kind() == ErrorKind::NotFound => {}
            // A corrupt primary must not replace what may be the only good copy.
            Err(e) => tracing::warn!(error = %e, "Keeping existing backup, primary is unreadable"),
        }

        let tmp_path = self.primary.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| write_error(&tmp_path, e))?;

        if let Err(e) = std::fs::rename(&tmp_path, &self.primary) {
            tracing::warn!(error = %e, "Atomic rename failed, falling back to direct write");
            let _ = std::fs::remove_file(&tmp_path);
            std::fs::write(&self.primary, &json).map_err(|e| write_error(&self.primary, e))?;
        }

        tracing::debug!(
            path = %self.primary.display(),
            participants = snapshot.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Load the primary snapshot, falling back to the backup once.
    pub fn load(&self) -> Recovered {
        match read_snapshot(&self.primary) {
            Ok(snapshot) => {
                return Recovered {
                    snapshot: Some(snapshot),
                    source: SnapshotSource::Primary,
                }
            }
            Err(e) => log_read_failure(&e, "primary"),
        }

        match read_snapshot(&self.backup) {
            Ok(snapshot) => {
                tracing::warn!(path = %self.backup.display(), "Recovered snapshot from backup");
                Recovered {
                    snapshot: Some(snapshot),
                    source: SnapshotSource::Backup,
                }
            }
            Err(e) => {
                log_read_failure(&e, "backup");
                Recovered {
                    snapshot: None,
                    source: SnapshotSource::Empty,
                }
            }
        }
    }

    fn refresh_backup(&self) {
        if let Some(parent) = self.backup.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::copy(&self.primary, &self.backup) {
            tracing::warn!(
                path = %self.backup.display(),
                error = %e,
                "Failed to refresh snapshot backup"
            );
        }
    }
}

/// Read and parse one snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, PersistenceError> {
    let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| PersistenceError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn log_read_failure(error: &PersistenceError, which: &str) {
    match error {
        PersistenceError::Read { source, .. } if source.kind() == ErrorKind::NotFound => {
            tracing::info!(snapshot = which, "No snapshot file found");
        }
        _ => tracing::warn!(snapshot = which, error = %error, "Snapshot read failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, Position};
    use chrono::Utc;
    use plaza_common::ParticipantId;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(
            dir.path().join("state").join("offline.json"),
            dir.path().join("state").join("offline.backup.json"),
        )
    }

    fn offline(id: &str) -> Participant {
        let now = Utc::now();
        Participant {
            id: ParticipantId::from(id),
            name: id.into(),
            position: Position::new(100.0, 200.0),
            variant: "#96CEB4".into(),
            size: 48.0,
            online: false,
            last_active_at: now,
            disconnected_at: Some(now),
            client_meta: None,
        }
    }

    fn snapshot_of(ids: &[&str]) -> Snapshot {
        Snapshot::capture(ids.iter().map(|id| offline(id)), Utc::now())
    }

    #[test]
    fn save_creates_dirs_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let snapshot = snapshot_of(&["a", "b"]);
        store.save(&snapshot).unwrap();

        let recovered = store.load();
        assert_eq!(recovered.source, SnapshotSource::Primary);
        assert_eq!(recovered.snapshot.unwrap(), snapshot);
        assert!(!store.primary().with_extension("json.tmp").exists());
    }

    #[test]
    fn first_save_has_no_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&snapshot_of(&["a"])).unwrap();
        assert!(!store.backup().exists());
    }

    #[test]
    fn save_copies_previous_primary_to_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = snapshot_of(&["a"]);
        store.save(&first).unwrap();
        store.save(&snapshot_of(&["a", "b"])).unwrap();

        let backup = read_snapshot(store.backup()).unwrap();
        assert_eq!(backup, first);
        assert_eq!(read_snapshot(store.primary()).unwrap().len(), 2);
    }

    #[test]
    fn corrupt_primary_falls_back_to_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = snapshot_of(&["a"]);
        store.save(&first).unwrap();
        store.save(&snapshot_of(&["a", "b"])).unwrap();
        std::fs::write(store.primary(), "{ not json").unwrap();

        let recovered = store.load();
        assert_eq!(recovered.source, SnapshotSource::Backup);
        assert_eq!(recovered.snapshot.unwrap(), first);
    }

    #[test]
    fn save_over_corrupt_primary_keeps_good_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = snapshot_of(&["a"]);
        store.save(&first).unwrap();
        store.save(&snapshot_of(&["a", "b"])).unwrap();
        std::fs::write(store.primary(), "{ not json").unwrap();

        let recovered = store.load().snapshot.unwrap();
        store.save(&recovered).unwrap();

        assert_eq!(read_snapshot(store.backup()).unwrap(), first);
        assert_eq!(read_snapshot(store.primary()).unwrap(), first);
    }

    #[test]
    fn positions_reload_bit_for_bit() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut p = offline("a");
        p.position = Position::new(0.1 + 0.2, 2164.0160113569154);
        let snapshot = Snapshot::capture(vec![p.clone()], Utc::now());
        store.save(&snapshot).unwrap();

        let loaded = read_snapshot(store.primary()).unwrap().into_participants();
        assert_eq!(loaded[0].position.x.to_bits(), p.position.x.to_bits());
        assert_eq!(loaded[0].position.y.to_bits(), p.position.y.to_bits());
    }

    #[test]
    fn both_corrupt_gives_empty_without_retrying() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.primary().parent().unwrap()).unwrap();
        std::fs::write(store.primary(), "garbage").unwrap();
        std::fs::write(store.backup(), "more garbage").unwrap();

        let recovered = store.load();
        assert_eq!(recovered.source, SnapshotSource::Empty);
        assert!(recovered.snapshot.is_none());
    }

    #[test]
    fn missing_files_give_empty() {
        let dir = TempDir::new().unwrap();
        let recovered = store_in(&dir).load();
        assert_eq!(recovered.source, SnapshotSource::Empty);
    }

    #[test]
    fn read_snapshot_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }

    #[test]
    fn save_into_unwritable_location_is_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = SnapshotStore::new(blocker.join("offline.json"), blocker.join("b.json"));

        let err = store.save(&snapshot_of(&["a"])).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
