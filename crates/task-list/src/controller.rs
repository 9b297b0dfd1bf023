//! List screen controller
//!
//! Maps user actions on the task list onto the task and preference stores
//! and the UI event queue. Persistence always happens before the event it
//! triggers, and a failed write sends nothing.

use std::sync::Arc;

use tracing::{debug, info};

use todo_core::preferences::{
    FilePreferenceStore, FilterPreferences, PreferenceStore, PreferenceStream, SortOrder,
};
use todo_core::task::{FileTaskStore, Task, TaskStore};
use todo_core::TodoConfig;

use crate::combinator::{QueryCombinator, SnapshotStream, TaskListSnapshot};
use crate::error::Result;
use crate::event::{EditResult, EventQueue, EventStream, UiEvent};

/// Façade of one list screen session
pub struct ListController {
    tasks: Arc<dyn TaskStore>,
    preferences: Arc<dyn PreferenceStore>,
    combinator: QueryCombinator,
    events: EventQueue,
}

impl ListController {
    /// Start a session over the given stores
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(tasks: Arc<dyn TaskStore>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self::restore(tasks, preferences, String::new())
    }

    /// Start a session with the search text saved by [`ListController::close`]
    pub fn restore(
        tasks: Arc<dyn TaskStore>,
        preferences: Arc<dyn PreferenceStore>,
        search_term: impl Into<String>,
    ) -> Self {
        let search_term = search_term.into();
        info!("List session started with search term {:?}", search_term);
        let combinator = QueryCombinator::spawn_with_search_term(
            Arc::clone(&tasks),
            preferences.current(),
            search_term,
        );

        Self {
            tasks,
            preferences,
            combinator,
            events: EventQueue::new(),
        }
    }

    /// Start a session over the file stores in the configured data directory
    pub async fn open(config: &TodoConfig) -> Result<Self> {
        let tasks = FileTaskStore::new(config.tasks_path()).await?;
        let preferences =
            FilePreferenceStore::new(config.preferences_path(), config.default_preferences)
                .await?;
        Ok(Self::new(Arc::new(tasks), Arc::new(preferences)))
    }

    /// End the session, cancelling any outstanding query
    ///
    /// Returns the search text so the next session can be restored with it.
    pub fn close(self) -> String {
        let search_term = self.combinator.search_term();
        info!("List session closed at search term {:?}", search_term);
        search_term
    }

    // Read side

    pub fn snapshots(&self) -> SnapshotStream {
        self.combinator.snapshots()
    }

    pub fn current_snapshot(&self) -> Option<Arc<TaskListSnapshot>> {
        self.combinator.current()
    }

    /// Take the UI event stream (can only be called once)
    pub fn take_events(&mut self) -> Option<EventStream> {
        self.events.take_receiver()
    }

    pub fn preferences(&self) -> PreferenceStream {
        self.preferences.current()
    }

    pub fn current_preferences(&self) -> FilterPreferences {
        self.preferences.get()
    }

    // User actions

    pub fn set_search_term(&self, text: impl Into<String>) {
        self.combinator.set_search_term(text);
    }

    pub async fn set_sort_order(&self, sort_order: SortOrder) -> Result<()> {
        self.preferences.update_sort_order(sort_order).await?;
        Ok(())
    }

    pub async fn set_hide_completed(&self, hide_completed: bool) -> Result<()> {
        self.preferences.update_hide_completed(hide_completed).await?;
        Ok(())
    }

    pub fn select_task(&self, task: Task) -> Result<()> {
        self.events.send(UiEvent::NavigateToEdit(task))
    }

    /// Persist the checkbox state of a task
    ///
    /// A task that is no longer stored is left alone.
    pub async fn set_task_completed(&self, task: &Task, completed: bool) -> Result<()> {
        debug!("Marking task {} completed={}", task.id, completed);
        match self
            .tasks
            .update(task.clone().with_completed(completed))
            .await
        {
            Ok(()) => Ok(()),
            Err(todo_core::Error::TaskNotFound(id)) => {
                debug!("Task {} is gone, ignoring checkbox change", id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a task and offer to undo it
    ///
    /// The deletion is final; undo re-inserts the task value. A task that
    /// was already gone still gets the undo offer.
    pub async fn delete_task(&self, task: Task) -> Result<()> {
        if !self.tasks.delete(&task).await? {
            debug!("Task {} was already deleted", task.id);
        }
        self.events.send(UiEvent::ShowUndoDelete(task))
    }

    /// Restore a deleted task, overwriting any task with the same ID
    pub async fn undo_delete(&self, task: Task) -> Result<()> {
        debug!("Restoring task {}", task.id);
        self.tasks.insert(task).await?;
        Ok(())
    }

    pub fn request_add_task(&self) -> Result<()> {
        self.events.send(UiEvent::NavigateToAdd)
    }

    /// Confirm what the add/edit screen saved
    pub fn report_edit_result(&self, result: EditResult) -> Result<()> {
        self.events.send(UiEvent::ShowSavedConfirmation(
            result.confirmation_message().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::time::Duration;
    use tempfile::TempDir;
    use todo_core::task::{QueryParams, TaskStream};
    use uuid::Uuid;

    use crate::ListError;

    async fn create_test_controller() -> (ListController, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = TodoConfig::default().with_data_dir(temp_dir.path());
        let controller = ListController::open(&config).await.unwrap();
        (controller, temp_dir)
    }

    /// Store whose writes always fail
    struct BrokenStore;

    fn broken() -> todo_core::Error {
        todo_core::Error::Storage("disk full".to_string())
    }

    #[async_trait]
    impl TaskStore for BrokenStore {
        async fn query(&self, _params: QueryParams) -> todo_core::Result<TaskStream> {
            Ok(futures::stream::pending().boxed())
        }

        async fn insert(&self, _task: Task) -> todo_core::Result<()> {
            Err(broken())
        }

        async fn update(&self, _task: Task) -> todo_core::Result<()> {
            Err(broken())
        }

        async fn delete(&self, _task: &Task) -> todo_core::Result<bool> {
            Err(broken())
        }

        async fn get(&self, _id: Uuid) -> todo_core::Result<Option<Task>> {
            Ok(None)
        }

        async fn list(&self) -> todo_core::Result<Vec<Task>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_navigation_events() {
        let (mut controller, _temp) = create_test_controller().await;
        let mut events = controller.take_events().unwrap();

        let task = Task::new("Edit me");
        controller.request_add_task().unwrap();
        controller.select_task(task.clone()).unwrap();
        controller.report_edit_result(EditResult::Updated).unwrap();

        assert_eq!(events.next().await, Some(UiEvent::NavigateToAdd));
        assert_eq!(events.next().await, Some(UiEvent::NavigateToEdit(task)));
        assert_eq!(
            events.next().await,
            Some(UiEvent::ShowSavedConfirmation("Task updated".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_sends_undo_after_removal() {
        let (mut controller, _temp) = create_test_controller().await;
        let mut events = controller.take_events().unwrap();

        let task = Task::new("Swipe me");
        controller.undo_delete(task.clone()).await.unwrap();
        controller.delete_task(task.clone()).await.unwrap();

        let event = events.next().await.unwrap();
        assert_eq!(event, UiEvent::ShowUndoDelete(task.clone()));
        assert!(controller.tasks.get(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_twice_offers_undo_both_times() {
        let (mut controller, _temp) = create_test_controller().await;
        let mut events = controller.take_events().unwrap();

        let task = Task::new("Swiped twice");
        controller.undo_delete(task.clone()).await.unwrap();

        controller.delete_task(task.clone()).await.unwrap();
        controller.delete_task(task.clone()).await.unwrap();

        assert_eq!(events.next().await, Some(UiEvent::ShowUndoDelete(task.clone())));
        let second = tokio::time::timeout(Duration::from_millis(500), events.next())
            .await
            .expect("second undo offer missing");
        assert_eq!(second, Some(UiEvent::ShowUndoDelete(task.clone())));
        assert!(controller.tasks.get(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checking_a_deleted_task_is_ignored() {
        let (controller, _temp) = create_test_controller().await;

        let task = Task::new("Already gone");
        controller.set_task_completed(&task, true).await.unwrap();

        assert!(controller.tasks.get(task.id).await.unwrap().is_none());
        assert!(controller.tasks.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_term_survives_restore() {
        let temp_dir = TempDir::new().unwrap();
        let tasks: Arc<dyn TaskStore> =
            Arc::new(FileTaskStore::new(temp_dir.path().join("tasks.json")).await.unwrap());
        let preferences: Arc<dyn PreferenceStore> = Arc::new(
            FilePreferenceStore::new(
                temp_dir.path().join("preferences.json"),
                FilterPreferences::default(),
            )
            .await
            .unwrap(),
        );
        tasks.insert(Task::new("Buy milk")).await.unwrap();
        tasks.insert(Task::new("Call mom")).await.unwrap();

        let controller = ListController::new(Arc::clone(&tasks), Arc::clone(&preferences));
        controller.set_search_term("milk");
        let saved = controller.close();
        assert_eq!(saved, "milk");

        let restored = ListController::restore(tasks, preferences, saved);
        let mut snapshots = restored.snapshots();
        let first = tokio::time::timeout(Duration::from_secs(2), snapshots.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.params.search_term, "milk");
        assert_eq!(first.tasks.len(), 1);
        assert_eq!(first.tasks[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_failed_delete_sends_no_event() {
        let temp_dir = TempDir::new().unwrap();
        let preferences = FilePreferenceStore::new(
            temp_dir.path().join("preferences.json"),
            FilterPreferences::default(),
        )
        .await
        .unwrap();
        let mut controller = ListController::new(Arc::new(BrokenStore), Arc::new(preferences));
        let mut events = controller.take_events().unwrap();

        let task = Task::new("Stuck");
        assert!(controller.delete_task(task.clone()).await.is_err());
        assert!(controller.set_task_completed(&task, true).await.is_err());
        assert!(controller.undo_delete(task).await.is_err());

        let nothing = tokio::time::timeout(Duration::from_millis(50), events.next()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn test_set_task_completed_is_idempotent() {
        let (controller, _temp) = create_test_controller().await;

        let task = Task::new("Check me");
        controller.undo_delete(task.clone()).await.unwrap();

        controller.set_task_completed(&task, true).await.unwrap();
        let after_first = controller.tasks.list().await.unwrap();
        controller.set_task_completed(&task, true).await.unwrap();
        let after_second = controller.tasks.list().await.unwrap();

        assert_eq!(after_first, after_second);
        assert!(after_second[0].completed);
    }

    #[tokio::test]
    async fn test_preference_updates_are_persisted() {
        let (controller, _temp) = create_test_controller().await;

        controller.set_sort_order(SortOrder::ByName).await.unwrap();
        controller.set_hide_completed(true).await.unwrap();

        assert_eq!(
            controller.current_preferences(),
            FilterPreferences {
                sort_order: SortOrder::ByName,
                hide_completed: true,
            }
        );
        let mut prefs = controller.preferences();
        assert!(prefs.next().await.unwrap().hide_completed);
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped_is_reported() {
        let (mut controller, _temp) = create_test_controller().await;
        drop(controller.take_events());

        assert!(matches!(
            controller.request_add_task(),
            Err(ListError::EventConsumerClosed)
        ));
    }
}
