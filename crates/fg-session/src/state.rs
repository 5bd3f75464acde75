//! Opaque protocol-state persistence.
//!
//! The protocol engine owns a state blob this layer cannot interpret. The
//! only obligation here is durable, ordered persistence: a handler loads the
//! blob, lets the engine mutate it, and syncs it back to the session before
//! the HTTP response goes out, because the next request in the exchange
//! depends on it being present.

use serde_json::Value;

use crate::store::Session;

/// Session key holding the protocol-state blob.
pub const PROTOCOL_STATE_KEY: &str = "_fedgate_state";

/// The engine-owned state blob, opaque to this layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolStateBlob(pub Value);

impl ProtocolStateBlob {
    /// Whether the blob carries any state at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.0, Value::Null)
    }
}

/// Typed view over the session's protocol-state entry.
pub struct StateCache<'a> {
    session: &'a mut Session,
}

impl<'a> StateCache<'a> {
    /// Opens the view over a session record.
    pub fn view(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Loads the current blob, empty if none was ever stored.
    #[must_use]
    pub fn load(&self) -> ProtocolStateBlob {
        self.session
            .get(PROTOCOL_STATE_KEY)
            .map(|v| ProtocolStateBlob(v.clone()))
            .unwrap_or_default()
    }

    /// Writes the blob back to the session.
    pub fn sync(&mut self, blob: &ProtocolStateBlob) {
        self.session.set(PROTOCOL_STATE_KEY, blob.0.clone());
    }
}
