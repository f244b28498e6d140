//! Session registry: the only state shared between session tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arena_core::session::ArenaId;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ServerError;
use crate::handle::SessionHandle;

/// Maps arena ids to running sessions.
///
/// Cloning shares the same map. Callers only ever receive cloned handles,
/// never references into the map.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<ArenaId, SessionHandle>>>,
    serials: Arc<AtomicU64>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_serial(&self) -> u64 {
        self.serials.fetch_add(1, Ordering::Relaxed)
    }

    /// Register `handle` for its arena.
    ///
    /// A terminal session left behind in the same arena is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ArenaBusy`] if the arena has a live session.
    pub fn register(&self, handle: SessionHandle) -> Result<(), ServerError> {
        let mut sessions = self.sessions.lock();
        let arena = handle.arena();
        if let Some(existing) = sessions.get(&arena) {
            if !existing.is_finished() {
                return Err(ServerError::ArenaBusy(arena));
            }
        }
        debug!(%arena, serial = handle.serial(), "Session registered");
        sessions.insert(arena, handle);
        Ok(())
    }

    /// Handle for `arena`, if registered.
    pub fn lookup(&self, arena: ArenaId) -> Option<SessionHandle> {
        self.sessions.lock().get(&arena).cloned()
    }

    /// Remove `arena` if it still holds the session with `serial`.
    ///
    /// Returns whether an entry was removed.
    pub fn deregister(&self, arena: ArenaId, serial: u64) -> bool {
        let mut sessions = self.sessions.lock();
        match sessions.get(&arena) {
            Some(handle) if handle.serial() == serial => {
                sessions.remove(&arena);
                debug!(%arena, serial, "Session deregistered");
                true
            }
            _ => false,
        }
    }

    /// Registered arenas, sorted.
    pub fn arenas(&self) -> Vec<ArenaId> {
        let mut arenas: Vec<ArenaId> = self.sessions.lock().keys().copied().collect();
        arenas.sort_unstable();
        arenas
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Request cancellation of every registered session.
    pub fn cancel_all(&self) {
        for handle in self.sessions.lock().values() {
            handle.cancel();
        }
    }
}
