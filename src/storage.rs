use crate::errors::{SourceError, StoreError};
use crate::models::{Tag, TaskData, TaskRecord};
use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    future::Future,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tokio::fs;
use tracing::error;

/// Client-scoped key/value store that survives restarts.
///
/// Reads come from memory; writes reach the backing medium before `set`
/// resolves.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Preferences kept as a flat JSON object on disk, written through on every set.
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
    writes: tokio::sync::Mutex<()>,
}

impl FilePreferences {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_preferences(&path).await;
        Self {
            path,
            values: Mutex::new(values),
            writes: tokio::sync::Mutex::new(()),
        }
    }
}

async fn load_preferences(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            BTreeMap::new()
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Held across the write so files land in the order sets were made.
        let _writing = self.writes.lock().await;
        let payload = {
            let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
            values.insert(key.to_string(), value.to_string());
            serde_json::to_vec_pretty(&*values)?
        };
        fs::write(&self.path, payload)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Where task and tag rows come from.
pub trait TaskSource: Send + Sync + 'static {
    fn fetch_tasks(
        &self,
        user_id: &str,
        year: i32,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, SourceError>> + Send;

    /// All of the user's tags, ordered by name.
    fn fetch_tags(&self, user_id: &str) -> impl Future<Output = Result<Vec<Tag>, SourceError>> + Send;
}

pub struct JsonTaskSource {
    path: PathBuf,
}

impl JsonTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<TaskData, SourceError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(TaskData::default()),
            Err(source) => Err(SourceError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl TaskSource for JsonTaskSource {
    async fn fetch_tasks(&self, user_id: &str, year: i32) -> Result<Vec<TaskRecord>, SourceError> {
        let data = self.load().await?;
        Ok(data
            .tasks
            .into_iter()
            .filter(|task| task.user_id == user_id && task.year == year)
            .collect())
    }

    async fn fetch_tags(&self, user_id: &str) -> Result<Vec<Tag>, SourceError> {
        let data = self.load().await?;
        let mut tags: Vec<Tag> = data
            .tags
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.tag)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}
