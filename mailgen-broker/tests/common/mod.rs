//! Common test utilities for broker integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use axum_test::TestServer;
use mailgen_broker::store::{SessionRecord, StoreResult};
use mailgen_broker::{
    routes, AppState, BrokerError, CompletionApi, DeliveryReceipt, IdentityProvider,
    InMemorySessionRepository, MailApi, SessionId, SessionRepository, TokenListener,
};
use mailgen_core::{CompletionRequest, Identity, RefreshedTokens};
use reqwest::Url;
use serde_json::{json, Value};

pub const GOOD_CODE: &str = "good-code";
pub const SESSION_SECRET: &str = "test-session-secret";

pub fn test_identity() -> Identity {
    Identity {
        id: "108".to_string(),
        display_name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        access_token: "access-1".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: None,
    }
}

/// Identity provider that accepts exactly one authorization code
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    pub exchanges: Arc<AtomicUsize>,
}

impl MockIdentityProvider {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn consent_url(&self, csrf_state: &str) -> Result<String, BrokerError> {
        Ok(format!(
            "https://accounts.example.test/auth?access_type=offline&prompt=consent&state={}",
            csrf_state
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, BrokerError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code == GOOD_CODE {
            Ok(test_identity())
        } else {
            Err(BrokerError::upstream(
                "invalid_grant",
                json!({ "error": "invalid_grant" }),
            ))
        }
    }
}

/// Completion API returning a canned payload and recording requests
#[derive(Clone)]
pub struct MockCompletion {
    pub response: Arc<RwLock<Result<Value, (String, Value)>>>,
    pub requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            response: Arc::new(RwLock::new(Ok(chat_payload("Hello")))),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn respond_with(&self, payload: Value) {
        *self.response.write().unwrap() = Ok(payload);
    }

    pub fn fail_with(&self, message: &str, details: Value) {
        *self.response.write().unwrap() = Err((message.to_string(), details));
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionApi for MockCompletion {
    fn model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Value, BrokerError> {
        self.requests.write().unwrap().push(request.clone());
        let response = self.response.read().unwrap().clone();
        response.map_err(|(message, details)| BrokerError::upstream(message, details))
    }
}

/// OpenAI-style chat completion payload
pub fn chat_payload(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// A captured send: the identity used and the raw message
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub identity: Identity,
    pub raw: String,
}

/// Mail API that captures sends and can rotate tokens or fail
#[derive(Clone)]
pub struct MockMailer {
    pub sent: Arc<RwLock<Vec<SentMessage>>>,
    pub rotate: Arc<RwLock<Option<RefreshedTokens>>>,
    pub failure: Arc<RwLock<Option<Value>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            rotate: Arc::new(RwLock::new(None)),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Emit `tokens` as a rotation event during every following send
    pub fn rotate_tokens(&self, tokens: RefreshedTokens) {
        *self.rotate.write().unwrap() = Some(tokens);
    }

    pub fn stop_rotating(&self) {
        *self.rotate.write().unwrap() = None;
    }

    /// Fail sends with `payload` as the provider error
    pub fn fail_with(&self, payload: Value) {
        *self.failure.write().unwrap() = Some(payload);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl MailApi for MockMailer {
    async fn send_raw(
        &self,
        identity: &Identity,
        raw: &str,
        on_tokens: &TokenListener<'_>,
    ) -> Result<DeliveryReceipt, BrokerError> {
        let rotation = self.rotate.read().unwrap().clone();
        if let Some(tokens) = rotation {
            on_tokens(&tokens);
        }

        let count = {
            let mut sent = self.sent.write().unwrap();
            sent.push(SentMessage {
                identity: identity.clone(),
                raw: raw.to_string(),
            });
            sent.len()
        };

        let failure = self.failure.read().unwrap().clone();
        if let Some(payload) = failure {
            return Err(BrokerError::upstream("Insufficient Permission", payload));
        }

        Ok(DeliveryReceipt {
            id: format!("msg-{}", count),
            thread_id: Some(format!("thread-{}", count)),
            label_ids: vec!["SENT".to_string()],
        })
    }
}

/// Session repository whose destroy always fails
#[derive(Default)]
pub struct FailingDestroyRepository {
    inner: InMemorySessionRepository,
}

impl SessionRepository for FailingDestroyRepository {
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        self.inner.get(id)
    }

    fn put(&self, record: SessionRecord) -> StoreResult<()> {
        self.inner.put(record)
    }

    fn mutate(&self, id: &SessionId, f: &mut dyn FnMut(&mut SessionRecord)) -> StoreResult<bool> {
        self.inner.mutate(id, f)
    }

    fn destroy(&self, _id: &SessionId) -> StoreResult<()> {
        Err(BrokerError::Session("store unavailable".to_string()))
    }

    fn prune_pending(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        self.inner.prune_pending(cutoff)
    }
}

pub type TestState<S> = AppState<S, MockIdentityProvider, MockCompletion, MockMailer>;

/// Test server plus handles on its mocks
pub struct TestContext<S = InMemorySessionRepository> {
    pub server: TestServer,
    pub state: Arc<TestState<S>>,
    pub identity_provider: MockIdentityProvider,
    pub completion: MockCompletion,
    pub mailer: MockMailer,
}

/// Create a test server with in-memory sessions and mock providers
pub fn create_test_server() -> TestContext {
    create_test_server_with_sessions(InMemorySessionRepository::new())
}

/// Create a test server over a specific session repository
pub fn create_test_server_with_sessions<S>(sessions: S) -> TestContext<S>
where
    S: SessionRepository + 'static,
{
    let identity_provider = MockIdentityProvider::default();
    let completion = MockCompletion::new();
    let mailer = MockMailer::new();

    let state = Arc::new(AppState::new(
        SESSION_SECRET,
        sessions,
        identity_provider.clone(),
        completion.clone(),
        mailer.clone(),
    ));

    let app = routes::create_router(state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    TestContext {
        server,
        state,
        identity_provider,
        completion,
        mailer,
    }
}

pub fn session_cookie(value: &str) -> cookie::Cookie<'static> {
    cookie::Cookie::new(routes::SESSION_COOKIE, value.to_string())
}

/// Start the handshake; returns the session cookie and the CSRF state
pub async fn start_auth(server: &TestServer) -> (String, String) {
    let response = server.get("/auth/google").await;
    assert_eq!(response.status_code(), 302);

    let location = response.header("location");
    let url = Url::parse(location.to_str().unwrap()).unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .expect("No state in consent URL");

    let cookie = response
        .maybe_cookie(routes::SESSION_COOKIE)
        .expect("No session cookie")
        .value()
        .to_string();

    (cookie, state)
}

/// Sign in through the full handshake and return the session cookie
pub async fn sign_in(server: &TestServer) -> String {
    let (cookie, state) = start_auth(server).await;

    let response = server
        .get(&format!(
            "/auth/google/callback?code={}&state={}",
            GOOD_CODE, state
        ))
        .add_cookie(session_cookie(&cookie))
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "/index.html");

    cookie
}

/// Session id behind a signed cookie value
pub fn session_id_from_cookie<S>(state: &TestState<S>, cookie_value: &str) -> SessionId {
    use tower_cookies::cookie::CookieJar;

    let mut jar = CookieJar::new();
    jar.add_original(tower_cookies::Cookie::new(
        routes::SESSION_COOKIE,
        cookie_value.to_string(),
    ));
    let verified = jar
        .signed(&state.cookie_key)
        .get(routes::SESSION_COOKIE)
        .expect("Cookie signature invalid");
    SessionId(verified.value().to_string())
}
