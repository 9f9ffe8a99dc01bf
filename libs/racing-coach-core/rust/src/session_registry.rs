//! Thread-safe registry for the currently active session (C3).
//!
//! Handlers query this instead of coupling to the collector. Grounded
//! directly on the original `SessionRegistry`: a single current-session slot
//! plus a by-id map of every session seen, protected by one lock.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;
use uuid::Uuid;

use crate::model::SessionFrame;

#[derive(Default)]
struct State {
    current: Option<SessionFrame>,
    sessions: HashMap<Uuid, SessionFrame>,
}

/// Thread-safe `session_id -> SessionFrame` map plus a single current-session
/// slot. The only shared mutable state outside the event bus — constructed
/// and passed explicitly, never a process-global singleton.
pub struct SessionRegistry {
    state: Mutex<State>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Register a session as the active one. If another session is already
    /// active, it is replaced (logged as a warning) but stays queryable by
    /// id via `get_session`.
    pub fn start_session(&self, session: SessionFrame) {
        let mut state = self.state.lock().unwrap();
        if let Some(current) = &state.current {
            warn!(
                new_session = %session.session_id,
                active_session = %current.session_id,
                "starting new session while another is still active"
            );
        }
        state.sessions.insert(session.session_id, session.clone());
        state.current = Some(session);
    }

    /// Mark a session as ended. A no-op (logged) if `session_id` does not
    /// match the current slot.
    pub fn end_session(&self, session_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        match &state.current {
            None => {
                warn!(%session_id, "end_session called but no session is active");
            }
            Some(current) if current.session_id != session_id => {
                warn!(
                    %session_id,
                    active_session = %current.session_id,
                    "end_session called for a session that isn't active"
                );
            }
            Some(_) => {
                state.current = None;
            }
        }
    }

    pub fn get_current_session(&self) -> Option<SessionFrame> {
        self.state.lock().unwrap().current.clone()
    }

    pub fn get_session(&self, session_id: Uuid) -> Option<SessionFrame> {
        self.state.lock().unwrap().sessions.get(&session_id).cloned()
    }

    pub fn has_active_session(&self) -> bool {
        self.state.lock().unwrap().current.is_some()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
