use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Session key under which the authentication layer stores the caller's username.
pub const USERNAME_KEY: &str = "Username";

/// The identifier of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque per-request session values, as loaded from the session store.
///
/// Serializes as a plain JSON object, e.g. `{"Username": "alice"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState {
    values: HashMap<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Builds a session holding only the username entry.
    pub fn for_user(username: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.insert(USERNAME_KEY, username.into());
        state
    }
}

/// Outcome of looking up the caller's identity in session state.
///
/// `Absent` and `WrongType` both mean the caller is unauthenticated; they are
/// kept apart so diagnostics can tell a missing login from a corrupted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Found(Principal),
    Absent,
    WrongType,
}

impl SessionLookup {
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Self::Found(principal) => Some(principal),
            Self::Absent | Self::WrongType => None,
        }
    }
}

/// Reads the caller's username from session state. Never fails, only reports.
pub fn resolve_identity(session: Option<&SessionState>) -> SessionLookup {
    match session.and_then(|state| state.get(USERNAME_KEY)) {
        None | Some(Value::Null) => SessionLookup::Absent,
        Some(Value::String(username)) => SessionLookup::Found(Principal::new(username.clone())),
        Some(_) => SessionLookup::WrongType,
    }
}
