//! Admin/control handle for a running session.

use std::sync::Arc;

use arena_core::data::ConditionId;
use arena_core::events::EventCategory;
use arena_core::session::{ArenaId, SessionStatus};
use tokio::sync::{mpsc, watch};

use crate::error::ServerError;

/// Testing interventions applied at the next round boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Replace the active condition.
    ForceCondition(ConditionId),
    /// Use this category for the next sub-event.
    ForceCategory(EventCategory),
}

/// Cheap, cloneable handle to a session task.
///
/// Dropping every handle does not stop the session; use [`SessionHandle::cancel`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    arena: ArenaId,
    serial: u64,
    cancel: Arc<watch::Sender<bool>>,
    commands: mpsc::UnboundedSender<ControlCommand>,
    status: watch::Receiver<SessionStatus>,
}

/// Task-side ends of the handle's channels.
#[derive(Debug)]
pub(crate) struct SessionChannels {
    pub(crate) cancel: watch::Receiver<bool>,
    pub(crate) commands: mpsc::UnboundedReceiver<ControlCommand>,
    pub(crate) status: watch::Sender<SessionStatus>,
}

impl SessionHandle {
    pub(crate) fn new(arena: ArenaId, serial: u64) -> (Self, SessionChannels) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SessionStatus::Recruiting);
        (
            Self {
                arena,
                serial,
                cancel: Arc::new(cancel_tx),
                commands: command_tx,
                status: status_rx,
            },
            SessionChannels {
                cancel: cancel_rx,
                commands: command_rx,
                status: status_tx,
            },
        )
    }

    /// Arena the session runs in.
    pub const fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Registry serial distinguishing successive sessions in one arena.
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Current status. Reads `Cancelled` as soon as a cancel is requested
    /// on a session that has not yet reached a terminal state.
    pub fn status(&self) -> SessionStatus {
        let published = *self.status.borrow();
        if !published.is_terminal() && self.cancel_requested() {
            SessionStatus::Cancelled
        } else {
            published
        }
    }

    /// Whether the task has published a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status.borrow().is_terminal()
    }

    /// Request cancellation. Interrupts a pacing delay immediately; a round
    /// already executing completes first. Idempotent.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether cancellation has been requested.
    pub fn cancel_requested(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Force a condition from the next round.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::SessionClosed`] if the task has exited.
    pub fn force_condition(&self, id: ConditionId) -> Result<(), ServerError> {
        self.send(ControlCommand::ForceCondition(id))
    }

    /// Force the category of the next sub-event.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::SessionClosed`] if the task has exited.
    pub fn force_category(&self, category: EventCategory) -> Result<(), ServerError> {
        self.send(ControlCommand::ForceCategory(category))
    }

    fn send(&self, command: ControlCommand) -> Result<(), ServerError> {
        self.commands
            .send(command)
            .map_err(|_| ServerError::SessionClosed(self.arena))
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Wait until the session reaches a terminal state and return it.
    pub async fn wait_finished(&self) -> SessionStatus {
        let mut status = self.status.clone();
        let waited = status.wait_for(|s| s.is_terminal()).await.map(|s| *s);
        waited.unwrap_or_else(|_| *status.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_visible_to_task() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        assert!(!*channels.cancel.borrow());
        handle.cancel();
        handle.cancel();
        assert!(*channels.cancel.borrow());
        assert!(handle.cancel_requested());
    }

    #[test]
    fn test_commands_queue_in_order() {
        let (handle, mut channels) = SessionHandle::new(ArenaId(1), 0);
        handle
            .force_category(EventCategory::Alliance)
            .unwrap();
        handle
            .force_condition(ConditionId::new("earthquake"))
            .unwrap();

        assert_eq!(
            channels.commands.try_recv().unwrap(),
            ControlCommand::ForceCategory(EventCategory::Alliance)
        );
        assert_eq!(
            channels.commands.try_recv().unwrap(),
            ControlCommand::ForceCondition(ConditionId::new("earthquake"))
        );
    }

    #[test]
    fn test_commands_fail_after_task_exit() {
        let (handle, channels) = SessionHandle::new(ArenaId(4), 0);
        drop(channels);
        assert!(matches!(
            handle.force_category(EventCategory::Survival),
            Err(ServerError::SessionClosed(ArenaId(4)))
        ));
    }

    #[test]
    fn test_status_follows_task() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        assert_eq!(handle.status(), SessionStatus::Recruiting);
        channels.status.send_replace(SessionStatus::Finished);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_status_reads_cancelled_right_after_cancel() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        channels.status.send_replace(SessionStatus::Active);
        handle.cancel();

        assert_eq!(handle.status(), SessionStatus::Cancelled);
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_cancel_after_finish_keeps_finished() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        channels.status.send_replace(SessionStatus::Finished);
        handle.cancel();
        assert_eq!(handle.status(), SessionStatus::Finished);
    }

    #[tokio::test]
    async fn test_wait_finished_returns_terminal_status() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        let waiter = tokio::spawn({
            let handle = handle.clone();
            async move { handle.wait_finished().await }
        });
        channels.status.send_replace(SessionStatus::Cancelled);
        assert_eq!(waiter.await.unwrap(), SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_wait_finished_after_task_dropped() {
        let (handle, channels) = SessionHandle::new(ArenaId(1), 0);
        drop(channels);
        assert_eq!(handle.wait_finished().await, SessionStatus::Recruiting);
    }
}
