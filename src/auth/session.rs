//! Session store and per-request session handles.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DispatchError;

/// Session attribute holding the authenticated [`SessionUser`].
pub const USER_ATTRIBUTE: &str = "user";

/// Session attribute flagging an administrator.
pub const ADMIN_ATTRIBUTE: &str = "is_admin";

/// Identity stored in the session after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Backing storage for sessions.
///
/// Implementations synchronize internally; callers treat each method as one
/// atomic step and add no locking of their own.
pub trait SessionStore: Send + Sync {
    /// Create an empty session and return its id.
    fn create(&self) -> String;

    /// Whether the session exists and has not expired. Extends its lifetime.
    fn touch(&self, id: &str) -> bool;

    /// Read an attribute.
    fn get_attribute(&self, id: &str, key: &str) -> Option<Value>;

    /// Write an attribute. Returns `false` if the session is gone.
    fn set_attribute(&self, id: &str, key: &str, value: Value) -> bool;

    /// Remove an attribute.
    fn remove_attribute(&self, id: &str, key: &str);

    /// Drop the session and all its attributes.
    fn invalidate(&self, id: &str);
}

struct SessionEntry {
    attributes: HashMap<String, Value>,
    expires_at: Instant,
}

/// Thread-safe in-memory session store with idle expiry.
pub struct MemorySessionStore {
    /// Map of session id -> entry.
    sessions: Mutex<HashMap<String, SessionEntry>>,
    /// Idle time-to-live.
    ttl: Duration,
}

impl MemorySessionStore {
    /// Create a new session store with the given idle TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionEntry>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(), // Recover from mutex poisoning
        }
    }

    /// Get the current number of stored sessions (for monitoring).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force cleanup of expired sessions.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.lock().retain(|_, entry| entry.expires_at > now);
    }

    /// Start a background cleanup task.
    ///
    /// This spawns a tokio task that periodically drops expired sessions.
    pub fn start_cleanup_task(self: &Arc<Self>, interval: Duration) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;
                store.cleanup();
            }
        });
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let entry = SessionEntry {
            attributes: HashMap::new(),
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().insert(id.clone(), entry);
        id
    }

    fn touch(&self, id: &str) -> bool {
        let mut sessions = self.lock();
        let now = Instant::now();
        match sessions.get_mut(id) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + self.ttl;
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    fn get_attribute(&self, id: &str, key: &str) -> Option<Value> {
        let sessions = self.lock();
        sessions
            .get(id)
            .filter(|entry| entry.expires_at > Instant::now())
            .and_then(|entry| entry.attributes.get(key).cloned())
    }

    fn set_attribute(&self, id: &str, key: &str, value: Value) -> bool {
        match self.lock().get_mut(id) {
            Some(entry) => {
                entry.attributes.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    fn remove_attribute(&self, id: &str, key: &str) {
        if let Some(entry) = self.lock().get_mut(id) {
            entry.attributes.remove(key);
        }
    }

    fn invalidate(&self, id: &str) {
        self.lock().remove(id);
    }
}

/// Handle to one live session.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub(crate) fn new(id: String, store: Arc<dyn SessionStore>) -> Self {
        Self { id, store }
    }

    /// The session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read a raw attribute.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get_attribute(&self.id, key)
    }

    /// Read and deserialize an attribute. Undecodable values read as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Serialize and write an attribute.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DispatchError> {
        let value = serde_json::to_value(value)?;
        if self.store.set_attribute(&self.id, key, value) {
            Ok(())
        } else {
            Err(DispatchError::Session {
                message: format!("Session {} no longer exists", self.id),
            })
        }
    }

    /// Remove an attribute.
    pub fn remove(&self, key: &str) {
        self.store.remove_attribute(&self.id, key);
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<SessionUser> {
        self.get_as(USER_ATTRIBUTE)
    }

    /// Whether the session carries the administrator flag.
    pub fn is_admin(&self) -> bool {
        self.get(ADMIN_ATTRIBUTE)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    /// Drop the session and everything it holds.
    pub fn invalidate(self) {
        self.store.invalidate(&self.id);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}
