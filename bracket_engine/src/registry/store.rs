//! Checkpoint storage for tournaments and points.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    points::PointsLedger,
    tournament::{GuildId, Tournament},
};

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for snapshot store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the registry persists at a checkpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub saved_at: DateTime<Utc>,
    pub tournaments: HashMap<GuildId, Tournament>,
    pub points: PointsLedger,
}

impl RegistrySnapshot {
    pub fn new(tournaments: HashMap<GuildId, Tournament>, points: PointsLedger) -> Self {
        Self {
            saved_at: Utc::now(),
            tournaments,
            points,
        }
    }
}

/// Where checkpoints go
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Latest snapshot, or `None` if nothing was saved yet
    async fn load(&self) -> StoreResult<Option<RegistrySnapshot>>;

    async fn save(&self, snapshot: &RegistrySnapshot) -> StoreResult<()>;
}

/// JSON file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Option<RegistrySnapshot>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        log::debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }
}

/// In-process store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<RegistrySnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> StoreResult<Option<RegistrySnapshot>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> StoreResult<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{Entrant, Mode, TournamentMetadata};
    use uuid::Uuid;

    fn sample_snapshot() -> RegistrySnapshot {
        let mut tournament = Tournament::new();
        tournament
            .configure(Mode::Solo, 8, TournamentMetadata::titled("Cup"))
            .unwrap();
        tournament.register(Entrant::member(1, "alice")).unwrap();

        let mut points = PointsLedger::new();
        points.award(7, 1, 100);

        RegistrySnapshot::new(HashMap::from([(7, tournament)]), points)
    }

    #[tokio::test]
    async fn test_json_store_missing_file() {
        let path = std::env::temp_dir().join(format!("bracket-{}.json", Uuid::new_v4()));
        let store = JsonFileStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("bracket-{}", Uuid::new_v4()));
        let store = JsonFileStore::new(dir.join("snapshot.json"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.points, snapshot.points);
        assert_eq!(loaded.saved_at, snapshot.saved_at);
        assert_eq!(
            loaded.tournaments[&7].roster(),
            snapshot.tournaments[&7].roster()
        );
        assert!(!store.temp_path().exists());

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let path = std::env::temp_dir().join(format!("bracket-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::Serialization(_))
        ));
        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&sample_snapshot()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.points.balance(7, 1), 100);
    }
}
