//! Preference store
//!
//! Preferences are a single live value: readers subscribe to a stream that
//! starts with the current value and follows every update.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use super::model::{FilterPreferences, SortOrder};
use crate::Result;

/// Live preference value, starting with the current one
pub type PreferenceStream = BoxStream<'static, FilterPreferences>;

/// Storage interface for the filter preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Subscribe to the live preferences
    fn current(&self) -> PreferenceStream;

    /// Read the preferences once
    fn get(&self) -> FilterPreferences;

    /// Persist a new sort order
    async fn update_sort_order(&self, sort_order: SortOrder) -> Result<()>;

    /// Persist the "hide completed" switch
    async fn update_hide_completed(&self, hide_completed: bool) -> Result<()>;
}

/// Preference store persisted as a small JSON file
#[derive(Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    value: Arc<watch::Sender<FilterPreferences>>,
    /// Serializes read-modify-write updates
    write_lock: Arc<Mutex<()>>,
}

impl FilePreferenceStore {
    /// Open the store, falling back to `defaults` when no file exists yet
    pub async fn new(path: impl Into<PathBuf>, defaults: FilterPreferences) -> Result<Self> {
        let path = path.into();
        let value = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            defaults
        };

        info!("Loaded preferences {:?} from {:?}", value, path);
        let (value, _) = watch::channel(value);

        Ok(Self {
            path,
            value: Arc::new(value),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn update(&self, change: impl FnOnce(&mut FilterPreferences)) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut next = *self.value.borrow();
        change(&mut next);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&next)?).await?;

        debug!("Preferences updated to {:?}", next);
        self.value.send_if_modified(|current| {
            let modified = *current != next;
            *current = next;
            modified
        });
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    fn current(&self) -> PreferenceStream {
        WatchStream::new(self.value.subscribe()).boxed()
    }

    fn get(&self) -> FilterPreferences {
        *self.value.borrow()
    }

    async fn update_sort_order(&self, sort_order: SortOrder) -> Result<()> {
        self.update(|prefs| prefs.sort_order = sort_order).await
    }

    async fn update_hide_completed(&self, hide_completed: bool) -> Result<()> {
        self.update(|prefs| prefs.hide_completed = hide_completed)
            .await
    }
}
