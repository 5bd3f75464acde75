//! In-memory browser-session store.
//!
//! Sessions are keyed by an opaque token carried in a cookie. Handlers load
//! a snapshot of the record, mutate it through the typed cache views, and
//! write it back before the response is sent. Concurrent requests sharing one
//! browser session are not isolated from each other: the store is
//! last-write-wins, and request-identifier uniqueness bounds the damage of an
//! interleaving to unrelated entries.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

/// Session key holding the current subject identifier.
pub const SUBJECT_ID_KEY: &str = "_fedgate_subject_id";

/// Name of the browser session cookie.
pub const SESSION_COOKIE: &str = "fedgate_session";

/// Opaque browser-session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Parses a token from its cookie representation.
    ///
    /// Returns `None` unless the value is a well-formed 32-character hex
    /// token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        if token.len() == 32 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(token.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Extracts the session token from a `Cookie` request header value.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header.split(';').find_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            if name == SESSION_COOKIE {
                Self::from_token(value.trim())
            } else {
                None
            }
        })
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the `Set-Cookie` header value for this session.
    #[must_use]
    pub fn cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.0
        )
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A snapshot of one browser session's key/value record.
///
/// Mutations mark the record dirty; the store only persists dirty records, so
/// a request that writes nothing leaves no session behind.
#[derive(Debug, Clone, Default)]
pub struct Session {
    values: HashMap<String, Value>,
    dirty: bool,
}

impl Session {
    /// Reads a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Writes a raw value and marks the record dirty.
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    /// Removes a raw value, marking the record dirty if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Whether the record has unpersisted mutations.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The authenticated subject, if any.
    #[must_use]
    pub fn subject_id(&self) -> Option<String> {
        self.get(SUBJECT_ID_KEY)
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Marks the session authenticated as `subject_id`.
    pub fn set_subject_id(&mut self, subject_id: &str) {
        self.set(SUBJECT_ID_KEY, Value::String(subject_id.to_string()));
    }

    /// Clears the authenticated subject.
    pub fn clear_subject_id(&mut self) {
        self.remove(SUBJECT_ID_KEY);
    }
}

/// In-memory session store.
///
/// Load returns a snapshot (lazily creating an empty one), save overwrites
/// whatever is stored. There is no cross-request locking discipline; see the
/// crate docs for the concurrency model.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<SessionId, HashMap<String, Value>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the session identified by the request's `Cookie` header.
    ///
    /// Returns the session id, a snapshot of its record, and whether the id
    /// was freshly generated (no valid cookie, or unknown token).
    pub fn open(&self, cookie_header: Option<&str>) -> (SessionId, Session, bool) {
        if let Some(id) = cookie_header.and_then(SessionId::from_cookie_header) {
            let guard = self.inner.read().expect("session store lock poisoned");
            if let Some(values) = guard.get(&id) {
                return (
                    id.clone(),
                    Session {
                        values: values.clone(),
                        dirty: false,
                    },
                    false,
                );
            }
            tracing::debug!(session_id = %id, "session token unknown, starting fresh");
        }

        (SessionId::generate(), Session::default(), true)
    }

    /// Persists a session snapshot if it carries mutations.
    ///
    /// Last write wins: a concurrent save under the same id is overwritten
    /// wholesale.
    pub fn save(&self, id: &SessionId, session: &Session) {
        if !session.dirty {
            return;
        }
        let mut guard = self.inner.write().expect("session store lock poisoned");
        guard.insert(id.clone(), session.values.clone());
    }

    /// Whether a session record exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.inner
            .read()
            .expect("session store lock poisoned")
            .contains_key(id)
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().expect("session store lock poisoned").len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
