//! One-shot UI events for the list screen

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use todo_core::task::Task;

use crate::error::{ListError, Result};

/// Intents the screen acts on exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Open the add/edit screen for a new task
    NavigateToAdd,
    /// Open the add/edit screen for an existing task
    NavigateToEdit(Task),
    /// Offer to undo the deletion of a task
    ShowUndoDelete(Task),
    /// Confirm that the add/edit screen saved a task
    ShowSavedConfirmation(String),
}

/// Outcome reported by the add/edit screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditResult {
    Added,
    Updated,
}

impl EditResult {
    pub fn confirmation_message(&self) -> &'static str {
        match self {
            Self::Added => "Task added",
            Self::Updated => "Task updated",
        }
    }
}

/// Consumer side of the event queue
pub type EventStream = UnboundedReceiverStream<UiEvent>;

/// FIFO queue of UI events with a single consumer
///
/// The queue is unbounded: `send` never waits and never drops. Events sent
/// before the consumer is taken are buffered until it is.
#[derive(Debug)]
pub struct EventQueue {
    tx: mpsc::UnboundedSender<UiEvent>,
    rx: Option<mpsc::UnboundedReceiver<UiEvent>>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx: Some(rx) }
    }

    /// Queue an event for the consumer
    pub fn send(&self, event: UiEvent) -> Result<()> {
        debug!("Queueing UI event {:?}", event);
        self.tx.send(event).map_err(|e| {
            warn!("Dropped UI event {:?}: consumer is gone", e.0);
            ListError::EventConsumerClosed
        })
    }

    /// Take the consumer stream (can only be called once)
    pub fn take_receiver(&mut self) -> Option<EventStream> {
        self.rx.take().map(UnboundedReceiverStream::new)
    }
}
