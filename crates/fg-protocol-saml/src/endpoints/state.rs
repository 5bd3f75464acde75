//! Shared endpoint state and session plumbing.

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use fg_core::config::SpConfig;
use fg_core::event::EventEmitter;
use fg_session::{Session, SessionId, SessionStore};

use crate::backend::AuthenticationBackend;
use crate::engine::SamlEngine;

/// State shared by all SP endpoint handlers.
#[derive(Clone)]
pub struct SpState {
    /// Service provider configuration.
    pub config: Arc<SpConfig>,

    /// The protocol engine.
    pub engine: Arc<dyn SamlEngine>,

    /// The authentication backend.
    pub backend: Arc<dyn AuthenticationBackend>,

    /// Browser-session store.
    pub sessions: Arc<SessionStore>,

    /// Audit event fan-out.
    pub events: Arc<EventEmitter>,
}

impl SpState {
    /// Creates the endpoint state.
    pub fn new(
        config: SpConfig,
        engine: Arc<dyn SamlEngine>,
        backend: Arc<dyn AuthenticationBackend>,
        events: EventEmitter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            backend,
            sessions: Arc::new(SessionStore::new()),
            events: Arc::new(events),
        }
    }

    /// Opens the browser session named by the request's cookie.
    pub fn open_session(&self, headers: &HeaderMap) -> SessionHandle {
        let cookie_header = headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok());
        let (id, record, fresh) = self.sessions.open(cookie_header);
        SessionHandle { id, record, fresh }
    }

    /// Persists the session snapshot (no-op while the record is clean).
    pub fn persist(&self, handle: &SessionHandle) {
        self.sessions.save(&handle.id, &handle.record);
    }

    /// Finalizes a response for a session.
    ///
    /// A freshly created session that was actually persisted gets its cookie
    /// set; a session that wrote nothing leaves no trace on the response.
    pub fn respond(&self, handle: &SessionHandle, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if handle.fresh && self.sessions.contains(&handle.id) {
            if let Ok(value) = HeaderValue::from_str(&handle.id.cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// One request's view of its browser session.
pub struct SessionHandle {
    /// The session token.
    pub id: SessionId,

    /// Snapshot of the session record.
    pub record: Session,

    /// Whether the token was generated for this request.
    pub fresh: bool,
}
