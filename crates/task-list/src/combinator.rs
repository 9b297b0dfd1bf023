//! Live task list
//!
//! Joins the search text with the filter preferences and keeps exactly one
//! task query open for the latest combination. A background driver owns the
//! state: every input change bumps the query generation, aborts the
//! previous query and spawns a new one. Results tagged with an older
//! generation are discarded, so a slow query can never overwrite the list of
//! a newer one.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use todo_core::preferences::{FilterPreferences, PreferenceStream};
use todo_core::task::{QueryParams, Task, TaskStore};

/// The task list matching one set of query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListSnapshot {
    /// Generation of the query that produced this list
    pub generation: u64,
    pub params: QueryParams,
    pub tasks: Vec<Task>,
}

/// Current snapshot followed by every newer one
pub type SnapshotStream = BoxStream<'static, Arc<TaskListSnapshot>>;

/// Owns the query driver; dropping it cancels the driver and its query
pub struct QueryCombinator {
    search_term: watch::Sender<String>,
    snapshot: watch::Receiver<Option<Arc<TaskListSnapshot>>>,
    driver: JoinHandle<()>,
}

impl QueryCombinator {
    /// Start the driver on the current tokio runtime
    ///
    /// No snapshot is published until `preferences` yields its first value.
    pub fn spawn(tasks: Arc<dyn TaskStore>, preferences: PreferenceStream) -> Self {
        Self::spawn_with_search_term(tasks, preferences, String::new())
    }

    /// Start the driver with a search text restored from a previous session
    pub fn spawn_with_search_term(
        tasks: Arc<dyn TaskStore>,
        preferences: PreferenceStream,
        initial_term: String,
    ) -> Self {
        let (search_term, search_rx) = watch::channel(initial_term.clone());
        let (snapshot_tx, snapshot) = watch::channel(None);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            tasks,
            search_term: initial_term,
            preferences: None,
            generation: 0,
            in_flight: None,
            results_tx,
            snapshot: snapshot_tx,
        };
        let driver = tokio::spawn(driver.run(search_rx, preferences, results_rx));

        Self {
            search_term,
            snapshot,
            driver,
        }
    }

    /// Replace the search text
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.search_term.send_replace(term.into());
    }

    pub fn search_term(&self) -> String {
        self.search_term.borrow().clone()
    }

    /// The current snapshot, if the first query has produced one
    pub fn current(&self) -> Option<Arc<TaskListSnapshot>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshots
    ///
    /// Intermediate snapshots may be skipped when a newer one replaces them
    /// before the subscriber polls; the latest is always delivered.
    pub fn snapshots(&self) -> SnapshotStream {
        WatchStream::new(self.snapshot.clone())
            .filter_map(|snapshot| async move { snapshot })
            .boxed()
    }
}

impl Drop for QueryCombinator {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct QueryResult {
    generation: u64,
    params: QueryParams,
    tasks: Vec<Task>,
}

struct Driver {
    tasks: Arc<dyn TaskStore>,
    search_term: String,
    /// `None` until the preference stream yields
    preferences: Option<FilterPreferences>,
    generation: u64,
    in_flight: Option<AbortOnDrop>,
    results_tx: mpsc::UnboundedSender<QueryResult>,
    snapshot: watch::Sender<Option<Arc<TaskListSnapshot>>>,
}

impl Driver {
    async fn run(
        mut self,
        mut search_rx: watch::Receiver<String>,
        mut preferences: PreferenceStream,
        mut results_rx: mpsc::UnboundedReceiver<QueryResult>,
    ) {
        let mut preferences_open = true;

        loop {
            tokio::select! {
                changed = search_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.search_term = search_rx.borrow_and_update().clone();
                    self.reissue();
                }
                prefs = preferences.next(), if preferences_open => match prefs {
                    Some(prefs) => {
                        self.preferences = Some(prefs);
                        self.reissue();
                    }
                    None => {
                        debug!("Preference stream ended");
                        preferences_open = false;
                    }
                },
                Some(result) = results_rx.recv() => self.publish(result),
            }
        }

        debug!("Query driver stopped at generation {}", self.generation);
    }

    /// Start a query for the current inputs, superseding the previous one
    fn reissue(&mut self) {
        let Some(preferences) = self.preferences else {
            return;
        };
        let params = QueryParams::new(self.search_term.clone(), preferences);

        self.generation += 1;
        let generation = self.generation;
        debug!(generation, ?params, "Issuing task query");

        // Replacing the guard aborts the superseded query
        self.in_flight = None;

        let tasks = Arc::clone(&self.tasks);
        let results = self.results_tx.clone();
        let handle = tokio::spawn(async move {
            let mut stream = match tasks.query(params.clone()).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(generation, "Failed to open task query: {}", e);
                    return;
                }
            };
            while let Some(item) = stream.next().await {
                match item {
                    Ok(tasks) => {
                        let result = QueryResult {
                            generation,
                            params: params.clone(),
                            tasks,
                        };
                        if results.send(result).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(generation, "Task query failed: {}", e),
                }
            }
        });
        self.in_flight = Some(AbortOnDrop(handle));
    }

    fn publish(&mut self, result: QueryResult) {
        if result.generation != self.generation {
            debug!(
                stale = result.generation,
                current = self.generation,
                "Discarding stale query result"
            );
            return;
        }

        self.snapshot.send_replace(Some(Arc::new(TaskListSnapshot {
            generation: result.generation,
            params: result.params,
            tasks: result.tasks,
        })));
    }
}
