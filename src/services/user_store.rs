use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::error::StoreError;
use crate::models::{Snapshot, UserRecord};

/// Ordered user list backed by a JSON array file.
///
/// Every successful mutation persists the whole list and then publishes the
/// new snapshot, serialized as a wire payload, to all subscribers.
///
/// Other processes (the `users` CLI) may rewrite the file. Mutations re-read
/// it first so their edits are kept, and [`UserStore::watch_file`] publishes
/// them without waiting for a local mutation.
#[derive(Clone)]
pub struct UserStore {
    users: Arc<Mutex<Vec<UserRecord>>>,
    path: Option<PathBuf>,
    tx: broadcast::Sender<String>,
}

impl UserStore {
    /// A store that never touches disk.
    pub fn in_memory(capacity: usize) -> Self {
        Self::from_parts(Vec::new(), None, capacity)
    }

    /// Load users from `path`. A missing file yields an empty store; the file
    /// is created on the first mutation.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, StoreError> {
        let path = path.into();
        let users = if path.exists() {
            read_users_file(&path)?
        } else {
            tracing::info!(path = %path.display(), "users file not found, starting empty");
            Vec::new()
        };
        Ok(Self::from_parts(users, Some(path), capacity))
    }

    fn from_parts(users: Vec<UserRecord>, path: Option<PathBuf>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            users: Arc::new(Mutex::new(users)),
            path,
            tx,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.lock().clone())
    }

    pub fn snapshot_json(&self) -> Result<String, StoreError> {
        Ok(self.snapshot().to_json()?)
    }

    /// Receive every snapshot published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Append a record. Duplicates are allowed.
    pub fn insert(&self, record: UserRecord) -> Result<Snapshot, StoreError> {
        let mut users = self.lock();
        self.sync_from_disk(&mut users)?;
        let mut next = users.clone();
        next.push(record);
        self.commit(&mut users, next)
    }

    /// Remove every record with `email`. Returns how many were removed;
    /// nothing is persisted or published when there was no match.
    pub fn remove(&self, email: &str) -> Result<usize, StoreError> {
        let mut users = self.lock();
        self.sync_from_disk(&mut users)?;
        let next: Vec<UserRecord> = users.iter().filter(|u| u.email != email).cloned().collect();
        let removed = users.len() - next.len();
        if removed > 0 {
            self.commit(&mut users, next)?;
        }
        Ok(removed)
    }

    /// Replace the whole list.
    pub fn replace(&self, records: Vec<UserRecord>) -> Result<Snapshot, StoreError> {
        let mut users = self.lock();
        self.commit(&mut users, records)
    }

    /// Pick up changes another process wrote to the users file, publishing
    /// the reloaded snapshot. Returns whether anything changed.
    pub fn reload(&self) -> Result<bool, StoreError> {
        let mut users = self.lock();
        self.sync_from_disk(&mut users)
    }

    /// Poll the users file every `interval` until `shutdown` reads `true`.
    /// A file that fails to parse is logged and the current list kept.
    pub async fn watch_file(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let Some(path) = self.path.clone() else {
            return;
        };
        tracing::info!(path = %path.display(), ?interval, "watching users file");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = stopped(&mut shutdown) => break,
                _ = ticker.tick() => {
                    match self.reload() {
                        Ok(true) => {
                            tracing::info!(path = %path.display(), "users file changed on disk")
                        }
                        Ok(false) => {}
                        Err(e) => tracing::warn!(%e, "ignoring unreadable users file"),
                    }
                }
            }
        }
        tracing::debug!(path = %path.display(), "stopped watching users file");
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UserRecord>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Runs with the lock held so published snapshots follow mutation order.
    fn commit(
        &self,
        users: &mut MutexGuard<'_, Vec<UserRecord>>,
        next: Vec<UserRecord>,
    ) -> Result<Snapshot, StoreError> {
        let snapshot = Snapshot::new(next);
        let payload = snapshot.to_json()?;
        if let Some(path) = &self.path {
            write_users_file(path, &snapshot)?;
        }
        **users = snapshot.records.clone();
        self.publish(payload, snapshot.len());
        Ok(snapshot)
    }

    // A missing file means nothing was written yet, not that every user left.
    fn sync_from_disk(
        &self,
        users: &mut MutexGuard<'_, Vec<UserRecord>>,
    ) -> Result<bool, StoreError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        let on_disk = read_users_file(path)?;
        if on_disk == **users {
            return Ok(false);
        }
        let payload = Snapshot::new(on_disk.clone()).to_json()?;
        let count = on_disk.len();
        **users = on_disk;
        self.publish(payload, count);
        Ok(true)
    }

    fn publish(&self, payload: String, users: usize) {
        match self.tx.send(payload) {
            Ok(receivers) => tracing::debug!(receivers, users, "published snapshot"),
            Err(_) => tracing::debug!(users, "no subscribers for snapshot"),
        }
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}

fn read_users_file(path: &Path) -> Result<Vec<UserRecord>, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write through a temp file in the same directory, then rename over the
/// target so readers never see a partial file.
fn write_users_file(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), snapshot)?;
    tmp.as_file_mut().write_all(b"\n")?;
    tmp.persist(path).map_err(|e| StoreError::Persist(e.error))?;
    Ok(())
}
