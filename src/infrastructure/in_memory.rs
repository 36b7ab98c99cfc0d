use crate::domain::merchant::Merchant;
use crate::domain::payment::Payment;
use crate::domain::ports::{MerchantRepository, PaymentRepository, SessionStore, UserRepository};
use crate::domain::session::SessionState;
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory user repository keyed by username.
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn create(&self, user: User) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.entry(user.username.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(true)
            }
        }
    }

    async fn replace(&self, expected: &User, user: User) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&expected.username) {
            Some(current) if current == expected && user.username == expected.username => {
                *current = user;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn delete(&self, username: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(username).is_some())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMerchantRepository {
    merchants: Arc<RwLock<HashMap<String, Merchant>>>,
}

impl InMemoryMerchantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MerchantRepository for InMemoryMerchantRepository {
    async fn save(&self, merchant: Merchant) -> Result<()> {
        let mut merchants = self.merchants.write().await;
        merchants.insert(merchant.id.clone(), merchant);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.get(id).cloned())
    }

    async fn all(&self) -> Result<Vec<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|payment| payment.username == username)
            .cloned()
            .collect())
    }
}

/// Session store for tests and single-process deployments.
///
/// Sessions are written by whatever authenticates callers; this crate only
/// reads them. A store can be seeded from a JSON file mapping session ids to
/// session objects.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `{"<session id>": {"Username": "..."}, ...}` from `path`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let sessions: HashMap<String, SessionState> = serde_json::from_slice(&bytes)?;
        Ok(Self {
            sessions: Arc::new(RwLock::new(sessions)),
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn insert(&self, session_id: impl Into<String>, state: SessionState) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.into(), state);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }
}
