#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use bankgate::application::manager::ResourceManager;
use bankgate::application::user_service::{UserService, UserUseCase};
use bankgate::config::AccessPolicy;
use bankgate::domain::session::{Principal, SessionState};
use bankgate::domain::user::User;
use bankgate::error::{BankError, Result};
use bankgate::infrastructure::in_memory::InMemorySessionStore;
use bankgate::interfaces::http::session::SESSION_HEADER;
use bankgate::interfaces::http::{AppState, create_router};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

/// What the scripted use case answers with.
pub enum Script {
    Ok,
    Found(User),
    Missing,
    Reject(&'static str),
    Fail(&'static str),
}

/// A use case that records how often it was called and answers from a script.
pub struct ScriptedUserUseCase {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedUserUseCase {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<Option<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Ok | Script::Missing => Ok(None),
            Script::Found(user) => Ok(Some(user.clone())),
            Script::Reject(message) => Err(BankError::application(*message)),
            Script::Fail(detail) => Err(BankError::storage(*detail)),
        }
    }
}

#[async_trait]
impl UserUseCase for ScriptedUserUseCase {
    async fn add_user(&self, _user: User, _principal: Option<&Principal>) -> Result<()> {
        self.answer().map(|_| ())
    }

    async fn update_user(&self, _user: User, _principal: Option<&Principal>) -> Result<()> {
        self.answer().map(|_| ())
    }

    async fn get_user_by_username(&self, _username: &str) -> Result<Option<User>> {
        self.answer()
    }

    async fn delete_user(&self, _username: &str) -> Result<()> {
        self.answer().map(|_| ())
    }
}

pub const ALICE_SESSION: &str = "session-alice";
pub const BOB_SESSION: &str = "session-bob";
pub const WRONG_TYPE_SESSION: &str = "session-wrong-type";
pub const NO_USERNAME_SESSION: &str = "session-no-username";

/// Session store pre-filled with two valid and two broken sessions.
pub async fn sessions() -> Arc<InMemorySessionStore> {
    let store = InMemorySessionStore::new();
    store
        .insert(ALICE_SESSION, SessionState::for_user("alice"))
        .await;
    store.insert(BOB_SESSION, SessionState::for_user("bob")).await;

    let mut wrong_type = SessionState::new();
    wrong_type.insert("Username", 1234);
    store.insert(WRONG_TYPE_SESSION, wrong_type).await;

    let mut no_username = SessionState::new();
    no_username.insert("Role", "customer");
    store.insert(NO_USERNAME_SESSION, no_username).await;

    Arc::new(store)
}

pub async fn app_with(users: Arc<dyn UserUseCase>, policy: AccessPolicy) -> Router {
    create_router(AppState::new(users, policy), sessions().await)
}

/// Router over real in-memory repositories.
pub async fn in_memory_app(policy: AccessPolicy) -> Router {
    let manager = Arc::new(ResourceManager::in_memory());
    let users = UserService::new(manager).bind_writes_to_principal(policy.bind_writes_to_principal);
    app_with(Arc::new(users), policy).await
}

pub fn alice() -> User {
    User::new("alice", "Alice A", "alice@bank.test")
}

pub fn alice_json() -> String {
    r#"{"username":"alice","fullName":"Alice A","email":"alice@bank.test"}"#.to_string()
}

pub async fn send(
    app: &Router,
    method: Method,
    session: Option<&str>,
    body: Option<String>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri("/user");
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// Checks that a response body never mixes success and failure fields.
pub fn assert_envelope_exclusive(body: &serde_json::Value) {
    let success = body["success"].as_bool().expect("success flag");
    if success {
        assert!(body.get("errorMessage").is_none(), "{body}");
    } else {
        assert!(body.get("data").is_none(), "{body}");
        assert!(body.get("errorMessage").is_some(), "{body}");
    }
}
