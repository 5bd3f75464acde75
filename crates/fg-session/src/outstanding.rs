//! Outstanding-query tracking.
//!
//! When a login redirect is issued, the request identifier and the caller's
//! desired post-login destination are recorded here. The matching assertion
//! consumes the entry exactly once; an identifier is never consumed twice and
//! never silently overwritten by an unrelated request.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{SessionError, SessionResult};
use crate::store::Session;

/// Session key holding the outstanding-query map.
pub const OUTSTANDING_QUERIES_KEY: &str = "_fedgate_outstanding_queries";

/// Typed view over the session's outstanding-query map.
pub struct OutstandingQueries<'a> {
    session: &'a mut Session,
}

impl<'a> OutstandingQueries<'a> {
    /// Opens the view over a session record.
    pub fn view(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// All in-flight request identifiers with their destinations.
    #[must_use]
    pub fn all(&self) -> HashMap<String, String> {
        self.session
            .get(OUTSTANDING_QUERIES_KEY)
            .map(decode_map)
            .unwrap_or_default()
    }

    /// Records a new outstanding query.
    ///
    /// Re-using an identifier that is still outstanding is refused rather
    /// than overwritten.
    pub fn insert(&mut self, request_id: &str, destination: &str) -> SessionResult<()> {
        let mut map = self.all();
        if map.contains_key(request_id) {
            return Err(SessionError::DuplicateRequestId(request_id.to_string()));
        }
        map.insert(request_id.to_string(), destination.to_string());
        self.write(&map);
        Ok(())
    }

    /// Consumes an outstanding query, returning its destination.
    ///
    /// Idempotent: an identifier that is absent (already consumed, or never
    /// issued) yields `None` and leaves the map untouched.
    pub fn remove(&mut self, request_id: &str) -> Option<String> {
        let mut map = self.all();
        let destination = map.remove(request_id)?;
        self.write(&map);
        Some(destination)
    }

    /// Number of in-flight queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether no queries are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&mut self, map: &HashMap<String, String>) {
        let encoded = map
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        self.session
            .set(OUTSTANDING_QUERIES_KEY, Value::Object(encoded));
    }
}

fn decode_map(value: &Value) -> HashMap<String, String> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
