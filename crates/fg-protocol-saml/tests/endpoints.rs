//! Endpoint behavior tests.
//!
//! Drives the SP router with a scripted protocol engine, so every branch of
//! the endpoint state machines is exercised without real SAML documents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use fg_core::config::{IdpEntry, SpConfig};
use fg_core::event::EventEmitter;
use fg_protocol_saml::backend::{AuthenticationBackend, Principal};
use fg_protocol_saml::endpoints::{saml_router, SpState};
use fg_protocol_saml::engine::{
    EngineHttpResponse, LogoutRequestOutcome, LogoutStatus, PreparedAuthn, SamlEngine, SessionInfo,
    ValidatedResponse,
};
use fg_protocol_saml::error::{SpError, SpResult};
use fg_session::{
    OutstandingQueries, ProtocolStateBlob, Session, SessionId, StateCache,
};

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Engine whose next outcome per operation is scripted by the test.
#[derive(Default)]
struct ScriptedEngine {
    prepare: Mutex<Option<SpResult<PreparedAuthn>>>,
    response: Mutex<Option<SpResult<ValidatedResponse>>>,
    logout: Mutex<Option<SpResult<EngineHttpResponse>>>,
    logout_response: Mutex<Option<SpResult<LogoutStatus>>>,
    logout_request: Mutex<Option<SpResult<LogoutRequestOutcome>>>,
    /// Outstanding map observed by the last `process_response` call.
    observed_outstanding: Mutex<Option<HashMap<String, String>>>,
}

impl ScriptedEngine {
    fn take<T>(slot: &Mutex<Option<SpResult<T>>>, op: &str) -> SpResult<T> {
        slot.lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| panic!("engine call {op} was not scripted"))
    }
}

#[async_trait]
impl SamlEngine for ScriptedEngine {
    async fn prepare_authentication(
        &self,
        _idp_entity_id: Option<&str>,
        _relay_state: &str,
        _state: &mut ProtocolStateBlob,
    ) -> SpResult<PreparedAuthn> {
        Self::take(&self.prepare, "prepare_authentication")
    }

    async fn process_response(
        &self,
        _saml_response: &str,
        outstanding: &HashMap<String, String>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<ValidatedResponse> {
        *self.observed_outstanding.lock().unwrap() = Some(outstanding.clone());
        state.0 = json!({"engine": "response"});
        Self::take(&self.response, "process_response")
    }

    async fn global_logout(
        &self,
        _subject_id: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<EngineHttpResponse> {
        state.0 = json!({"engine": "global_logout"});
        Self::take(&self.logout, "global_logout")
    }

    async fn process_logout_response(
        &self,
        _saml_response: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutStatus> {
        state.0 = json!({"engine": "logout_response"});
        Self::take(&self.logout_response, "process_logout_response")
    }

    async fn process_logout_request(
        &self,
        _saml_request: &str,
        _relay_state: Option<&str>,
        _subject_id: Option<&str>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutRequestOutcome> {
        state.0 = json!({"engine": "logout_request"});
        Self::take(&self.logout_request, "process_logout_request")
    }

    fn entity_descriptor(&self, valid_for_hours: u32) -> SpResult<String> {
        Ok(format!(
            "<md:EntityDescriptor validForHours=\"{valid_for_hours}\"/>"
        ))
    }
}

/// Backend resolving every subject to a principal of the same name.
struct AllowBackend;

#[async_trait]
impl AuthenticationBackend for AllowBackend {
    async fn authenticate(
        &self,
        session_info: &SessionInfo,
        _attribute_mapping: &fg_core::config::AttributeMapping,
        _create_unknown_user: bool,
    ) -> SpResult<Option<Principal>> {
        Ok(Some(Principal {
            username: session_info.name_id.clone(),
        }))
    }
}

/// Backend that never resolves a principal.
struct DenyBackend;

#[async_trait]
impl AuthenticationBackend for DenyBackend {
    async fn authenticate(
        &self,
        _session_info: &SessionInfo,
        _attribute_mapping: &fg_core::config::AttributeMapping,
        _create_unknown_user: bool,
    ) -> SpResult<Option<Principal>> {
        Ok(None)
    }
}

// ============================================================================
// Harness
// ============================================================================

fn idp(n: u32) -> IdpEntry {
    IdpEntry {
        entity_id: format!("https://idp{n}.example.com"),
        display_name: format!("IdP number {n}"),
        sso_url: format!("https://idp{n}.example.com/sso"),
        slo_url: format!("https://idp{n}.example.com/slo"),
    }
}

struct TestEnv {
    app: Router,
    state: SpState,
    engine: Arc<ScriptedEngine>,
}

impl TestEnv {
    fn new(config: SpConfig) -> Self {
        Self::with_backend(config, Arc::new(AllowBackend))
    }

    fn with_backend(config: SpConfig, backend: Arc<dyn AuthenticationBackend>) -> Self {
        let engine = Arc::new(ScriptedEngine::default());
        let state = SpState::new(config, engine.clone(), backend, EventEmitter::new());
        let app = saml_router().with_state(state.clone());
        Self { app, state, engine }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(
        &self,
        uri: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> axum::response::Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Creates a session directly in the store, returning its cookie header.
    fn seed_session(&self, mutate: impl FnOnce(&mut Session)) -> String {
        let (id, mut session, _) = self.state.sessions.open(None);
        mutate(&mut session);
        self.state.sessions.save(&id, &session);
        format!("fedgate_session={}", id.as_str())
    }

    /// Loads the session snapshot behind a cookie header.
    fn load_session(&self, cookie: &str) -> Session {
        let (_, session, fresh) = self.state.sessions.open(Some(cookie));
        assert!(!fresh, "expected an existing session for {cookie}");
        session
    }
}

fn session_cookie(response: &axum::response::Response) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let token = value.split(';').next()?;
    SessionId::from_cookie_header(token).map(|id| format!("fedgate_session={}", id.as_str()))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn validated(in_response_to: Option<&str>, name_id: &str) -> ValidatedResponse {
    ValidatedResponse {
        in_response_to: in_response_to.map(String::from),
        session_info: SessionInfo {
            name_id: name_id.to_string(),
            issuer: "https://idp1.example.com".to_string(),
            attributes: HashMap::from([("uid".to_string(), vec![name_id.to_string()])]),
            session_index: Some("_sess1".to_string()),
            not_on_or_after: None,
        },
    }
}

// ============================================================================
// Login initiation
// ============================================================================

#[tokio::test]
async fn login_with_multiple_idps_and_no_selection_shows_discovery() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1), idp(2)]));

    let response = env.get("/saml2/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    // Terminal response: nothing was written, so no session exists.
    assert!(env.state.sessions.is_empty());

    let body = body_string(response).await;
    assert!(body.contains("IdP number 1"));
    assert!(body.contains("IdP number 2"));
}

#[tokio::test]
async fn login_with_single_idp_redirects_and_records_outstanding_query() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    *env.engine.prepare.lock().unwrap() = Some(Ok(PreparedAuthn {
        request_id: "_req1".to_string(),
        location: "https://idp1.example.com/sso?SAMLRequest=abc".to_string(),
    }));

    let response = env.get("/saml2/login?next=/dashboard", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://idp1.example.com/sso?SAMLRequest=abc"
    );

    // Exactly one outstanding entry, keyed by the issued request id.
    let cookie = session_cookie(&response).expect("redirect must establish a session");
    let mut session = env.load_session(&cookie);
    let queries = OutstandingQueries::view(&mut session).all();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries.get("_req1").map(String::as_str), Some("/dashboard"));
}

#[tokio::test]
async fn login_while_authenticated_shows_notice_and_sends_nothing() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));

    let response = env.get("/saml2/login?next=/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/dashboard"));
}

#[tokio::test]
async fn login_with_unresolvable_idp_yields_diagnostic_page() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    *env.engine.prepare.lock().unwrap() = Some(Err(SpError::Configuration(
        "unable to determine which identity provider to use".to_string(),
    )));

    let response = env.get("/saml2/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    let body = body_string(response).await;
    assert!(body.contains("Sign-in unavailable"));
}

#[tokio::test]
async fn login_next_parameter_is_policy_checked() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    *env.engine.prepare.lock().unwrap() = Some(Ok(PreparedAuthn {
        request_id: "_req1".to_string(),
        location: "https://idp1.example.com/sso?SAMLRequest=abc".to_string(),
    }));

    let response = env
        .get("/saml2/login?next=https://evil.example.com", None)
        .await;
    assert!(response.status().is_redirection());

    let cookie = session_cookie(&response).unwrap();
    let mut session = env.load_session(&cookie);
    let queries = OutstandingQueries::view(&mut session).all();
    // The external destination fell back to the landing URL.
    assert_eq!(queries.get("_req1").map(String::as_str), Some("/"));
}

// ============================================================================
// Assertion consumer
// ============================================================================

#[tokio::test]
async fn acs_without_payload_is_bad_request_and_mutates_nothing() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));

    let response = env
        .post_form("/saml2/acs", "RelayState=%2Fdashboard", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(env.state.sessions.is_empty());
}

#[tokio::test]
async fn acs_rejects_non_post_methods() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let response = env.get("/saml2/acs", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn acs_engine_rejection_is_bad_request_and_writes_nothing() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| {
        OutstandingQueries::view(s).insert("_req1", "/dashboard").unwrap();
    });
    *env.engine.response.lock().unwrap() = Some(Err(SpError::Validation(
        "signature did not verify".to_string(),
    )));

    let response = env
        .post_form("/saml2/acs", "SAMLResponse=abc", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut session = env.load_session(&cookie);
    assert!(session.subject_id().is_none());
    // The outstanding entry survives an engine rejection.
    assert_eq!(OutstandingQueries::view(&mut session).len(), 1);
}

#[tokio::test]
async fn acs_success_consumes_the_matching_outstanding_query() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| {
        let mut queries = OutstandingQueries::view(s);
        queries.insert("_req1", "/dashboard").unwrap();
        queries.insert("_req2", "/other").unwrap();
    });
    *env.engine.response.lock().unwrap() =
        Some(Ok(validated(Some("_req1"), "user@example.com")));

    let response = env
        .post_form(
            "/saml2/acs",
            "SAMLResponse=abc&RelayState=%2Fdashboard",
            Some(&cookie),
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );

    let mut session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));

    // The consumed identifier is gone; the unrelated one is untouched.
    let queries = OutstandingQueries::view(&mut session).all();
    assert!(!queries.contains_key("_req1"));
    assert_eq!(queries.get("_req2").map(String::as_str), Some("/other"));

    // Round-trip: the engine saw exactly the identifiers that were outstanding.
    let observed = env.engine.observed_outstanding.lock().unwrap().clone().unwrap();
    assert!(observed.contains_key("_req1"));
    assert!(observed.contains_key("_req2"));
}

#[tokio::test]
async fn acs_defaults_to_site_root_without_relay_state() {
    let mut config = SpConfig::for_testing(vec![idp(1)]);
    config.allow_unsolicited = true;
    let env = TestEnv::new(config);
    *env.engine.response.lock().unwrap() = Some(Ok(validated(None, "user@example.com")));

    let response = env.post_form("/saml2/acs", "SAMLResponse=abc", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn acs_relay_state_is_policy_checked() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| {
        OutstandingQueries::view(s).insert("_req1", "/dashboard").unwrap();
    });
    *env.engine.response.lock().unwrap() =
        Some(Ok(validated(Some("_req1"), "user@example.com")));

    let response = env
        .post_form(
            "/saml2/acs",
            "SAMLResponse=abc&RelayState=https%3A%2F%2Fevil.example.com",
            Some(&cookie),
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn acs_unsolicited_response_is_rejected_by_default() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    *env.engine.response.lock().unwrap() = Some(Ok(validated(None, "user@example.com")));

    let response = env.post_form("/saml2/acs", "SAMLResponse=abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn acs_backend_refusal_is_diagnostic_not_error() {
    let env = TestEnv::with_backend(
        SpConfig::for_testing(vec![idp(1)]),
        Arc::new(DenyBackend),
    );
    let cookie = env.seed_session(|s| {
        OutstandingQueries::view(s).insert("_req1", "/dashboard").unwrap();
    });
    *env.engine.response.lock().unwrap() =
        Some(Ok(validated(Some("_req1"), "stranger@example.com")));

    let response = env
        .post_form("/saml2/acs", "SAMLResponse=abc", Some(&cookie))
        .await;
    // Deliberately 200 with a diagnostic page, to keep the browser flow alive.
    assert_eq!(response.status(), StatusCode::OK);

    let mut session = env.load_session(&cookie);
    assert!(session.subject_id().is_none());
    // The exchange still consumed the outstanding entry.
    assert!(OutstandingQueries::view(&mut session).is_empty());
}

// ============================================================================
// Logout initiation
// ============================================================================

#[tokio::test]
async fn logout_redirects_and_persists_engine_state_first() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout.lock().unwrap() = Some(Ok(EngineHttpResponse::redirect(
        "https://idp1.example.com/slo?SAMLRequest=xyz",
    )));

    let response = env.get("/saml2/logout", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://idp1.example.com/slo?SAMLRequest=xyz"
    );

    let mut session = env.load_session(&cookie);
    // Still authenticated until the logout response comes back.
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
    assert_eq!(
        StateCache::view(&mut session).load().0,
        json!({"engine": "global_logout"})
    );
}

#[tokio::test]
async fn logout_without_location_header_is_fatal() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout.lock().unwrap() = Some(Ok(EngineHttpResponse {
        status: 302,
        headers: vec![("Content-Type".to_string(), "text/html".to_string())],
        body: String::new(),
    }));

    let response = env.get("/saml2/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn logout_without_session_is_forbidden() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let response = env.get("/saml2/logout", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Logout responder, mode A (SP-initiated completion)
// ============================================================================

#[tokio::test]
async fn logout_service_mode_a_success_clears_session_and_redirects() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_response.lock().unwrap() = Some(Ok(LogoutStatus::Success));

    let response = env.get("/saml2/ls?SAMLResponse=abc", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let session = env.load_session(&cookie);
    assert!(session.subject_id().is_none());
}

#[tokio::test]
async fn logout_service_mode_a_failure_keeps_session_and_shows_page() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_response.lock().unwrap() = Some(Ok(LogoutStatus::Failed));

    let response = env.get("/saml2/ls?SAMLResponse=abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());

    let mut session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
    // Protocol state was persisted despite the failure.
    assert_eq!(
        StateCache::view(&mut session).load().0,
        json!({"engine": "logout_response"})
    );
}

#[tokio::test]
async fn logout_service_mode_a_engine_error_still_persists_state() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_response.lock().unwrap() = Some(Err(SpError::Validation(
        "undecodable logout response".to_string(),
    )));

    let response = env.get("/saml2/ls?SAMLResponse=abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
    assert_eq!(
        StateCache::view(&mut session).load().0,
        json!({"engine": "logout_response"})
    );
}

// ============================================================================
// Logout responder, mode B (IdP-initiated)
// ============================================================================

#[tokio::test]
async fn logout_service_mode_b_success_clears_session_and_redirects() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_request.lock().unwrap() = Some(Ok(LogoutRequestOutcome {
        response: Some(EngineHttpResponse::redirect(
            "https://idp1.example.com/slo?SAMLResponse=ok",
        )),
        success: true,
    }));

    let response = env.get("/saml2/ls?SAMLRequest=abc", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://idp1.example.com/slo?SAMLResponse=ok"
    );

    let session = env.load_session(&cookie);
    assert!(session.subject_id().is_none());
}

#[tokio::test]
async fn logout_service_mode_b_soft_failure_redirects_without_clearing() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_request.lock().unwrap() = Some(Ok(LogoutRequestOutcome {
        response: Some(EngineHttpResponse::redirect(
            "https://idp1.example.com/slo?SAMLResponse=denied",
        )),
        success: false,
    }));

    let response = env.get("/saml2/ls?SAMLRequest=abc", Some(&cookie)).await;

    // The one branch that redirects while preserving authentication state.
    assert!(response.status().is_redirection());
    let session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn logout_service_mode_b_empty_response_is_generic_failure() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    *env.engine.logout_request.lock().unwrap() = Some(Ok(LogoutRequestOutcome {
        response: None,
        success: false,
    }));

    let response = env.get("/saml2/ls?SAMLRequest=abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());

    let session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
}

// ============================================================================
// Logout responder, parameter dispatch
// ============================================================================

#[tokio::test]
async fn logout_service_without_parameters_is_not_found() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));

    // Anonymous caller.
    let response = env.get("/saml2/ls", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Authenticated caller: same outcome, session untouched.
    let cookie = env.seed_session(|s| s.set_subject_id("user@example.com"));
    let response = env.get("/saml2/ls", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let session = env.load_session(&cookie);
    assert_eq!(session.subject_id().as_deref(), Some("user@example.com"));
}

// ============================================================================
// Metadata and attribute echo
// ============================================================================

#[tokio::test]
async fn metadata_is_served_as_xml() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));

    let response = env.get("/saml2/metadata", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml; charset=utf8"
    );

    let body = body_string(response).await;
    // The configured validity window reached the engine.
    assert!(body.contains("validForHours=\"24\""));
}

#[tokio::test]
async fn attributes_requires_authentication() {
    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let response = env.get("/saml2/attributes", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/saml2/login"
    );
}

#[tokio::test]
async fn attributes_renders_cached_identity_even_when_expired() {
    use fg_session::{IdentityCache, IdentityRecord};

    let env = TestEnv::new(SpConfig::for_testing(vec![idp(1)]));
    let cookie = env.seed_session(|s| {
        s.set_subject_id("user@example.com");
        IdentityCache::view(s).put(IdentityRecord {
            subject_id: "user@example.com".to_string(),
            attributes: HashMap::from([("uid".to_string(), vec!["jdoe".to_string()])]),
            // Already expired; the echo endpoint bypasses the deadline.
            not_on_or_after: Some(chrono::Utc::now() - chrono::Duration::minutes(5)),
        });
    });

    let response = env.get("/saml2/attributes", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("jdoe"));
}
