//! Cached identity records.
//!
//! After a successful assertion the validated subject and attributes are
//! cached in the session so "who is logged in" and attribute lookups never
//! re-enter the protocol layer. Records optionally carry a `NotOnOrAfter`
//! deadline; lookups enforce it unless the caller asks for the diagnostic
//! bypass.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Session;

/// Session key holding the identity cache.
pub const IDENTITY_CACHE_KEY: &str = "_fedgate_identities";

/// A cached identity: subject, asserted attributes and validity deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// The IdP-asserted subject identifier.
    pub subject_id: String,

    /// Asserted attributes, name to list of values.
    pub attributes: HashMap<String, Vec<String>>,

    /// Deadline after which the record is no longer served.
    pub not_on_or_after: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    /// Whether the record is past its deadline at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.not_on_or_after.is_some_and(|deadline| now >= deadline)
    }
}

/// Typed view over the session's identity cache.
pub struct IdentityCache<'a> {
    session: &'a mut Session,
}

impl<'a> IdentityCache<'a> {
    /// Opens the view over a session record.
    pub fn view(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Looks up the cached identity for a subject.
    ///
    /// With `check_not_on_or_after` set, an expired record is treated as
    /// absent. Diagnostic callers pass `false` to see the record regardless.
    #[must_use]
    pub fn get(&self, subject_id: &str, check_not_on_or_after: bool) -> Option<IdentityRecord> {
        let record = self.read().remove(subject_id)?;
        if check_not_on_or_after && record.is_expired_at(Utc::now()) {
            return None;
        }
        Some(record)
    }

    /// Stores or replaces the record for its subject.
    pub fn put(&mut self, record: IdentityRecord) {
        let mut map = self.read();
        map.insert(record.subject_id.clone(), record);
        self.write(&map);
    }

    /// Invalidates the record for a subject, as on logout.
    pub fn remove(&mut self, subject_id: &str) {
        let mut map = self.read();
        if map.remove(subject_id).is_some() {
            self.write(&map);
        }
    }

    fn read(&self) -> HashMap<String, IdentityRecord> {
        self.session
            .get(IDENTITY_CACHE_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    fn write(&mut self, map: &HashMap<String, IdentityRecord>) {
        if let Ok(value) = serde_json::to_value(map) {
            self.session.set(IDENTITY_CACHE_KEY, value);
        }
    }
}
