//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk and notifies open queries after
//! every committed change.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{QueryParams, Task};
use super::repository::{TaskStore, TaskStream};
use crate::{Error, Result};

/// File-based task store using JSON
#[derive(Clone)]
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: Arc<RwLock<HashMap<Uuid, Task>>>,
    /// Bumped after every committed write
    revision: Arc<watch::Sender<u64>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content)?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        info!("Loaded {} tasks from {:?}", cache.len(), path);
        let (revision, _) = watch::channel(0);

        Ok(Self {
            path,
            cache: Arc::new(RwLock::new(cache)),
            revision: Arc::new(revision),
        })
    }

    /// Apply a change to a copy of the cache, persist it, then publish it.
    ///
    /// The cache is left untouched if the change or the write fails.
    async fn commit<R>(
        &self,
        change: impl FnOnce(&mut HashMap<Uuid, Task>) -> Result<R>,
    ) -> Result<R> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        let result = change(&mut next)?;
        self.persist(&next).await?;
        *cache = next;
        drop(cache);

        self.revision.send_modify(|rev| *rev += 1);
        Ok(result)
    }

    /// Persist a task map to disk
    async fn persist(&self, tasks: &HashMap<Uuid, Task>) -> Result<()> {
        let mut tasks: Vec<&Task> = tasks.values().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn query(&self, params: QueryParams) -> Result<TaskStream> {
        debug!("Opening task query {:?}", params);
        let cache = Arc::clone(&self.cache);
        let changes = WatchStream::new(self.revision.subscribe());

        let stream = changes.then(move |_| {
            let cache = Arc::clone(&cache);
            let params = params.clone();
            async move {
                let cache = cache.read().await;
                Ok::<_, Error>(params.apply(cache.values()))
            }
        });
        Ok(stream.boxed())
    }

    async fn insert(&self, task: Task) -> Result<()> {
        debug!("Inserting task {}", task.id);
        self.commit(|tasks| {
            tasks.insert(task.id, task);
            Ok(())
        })
        .await
    }

    async fn update(&self, task: Task) -> Result<()> {
        if self.cache.read().await.get(&task.id) == Some(&task) {
            return Ok(());
        }
        debug!("Updating task {}", task.id);
        self.commit(|tasks| match tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task;
                Ok(())
            }
            None => Err(Error::TaskNotFound(task.id.to_string())),
        })
        .await
    }

    async fn delete(&self, task: &Task) -> Result<bool> {
        if !self.cache.read().await.contains_key(&task.id) {
            return Ok(false);
        }
        debug!("Deleting task {}", task.id);
        self.commit(|tasks| Ok(tasks.remove(&task.id).is_some()))
            .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let cache = self.cache.read().await;
        Ok(cache.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }
}
