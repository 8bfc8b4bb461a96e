//! Explicit authenticated-session handle.
//!
//! The current user is threaded into every orchestrator call as a value
//! rather than read from ambient shared state. The handle is acquired once at
//! sign-in, cloned freely, and dropped at sign-out; nothing in the engine
//! caches it.

use uuid::Uuid;

/// Identity of the signed-in user on whose behalf orchestrator calls run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Uuid,
    display_name: String,
}

impl SessionContext {
    /// Create a handle for a freshly authenticated user.
    pub fn sign_in(user_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    /// Identity of the session user.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Display name resolved at sign-in.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
