use super::merchant::Merchant;
use super::payment::Payment;
use super::session::SessionState;
use super::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: User) -> Result<()>;
    /// Stores `user` only when its username is free. Returns `false` if taken.
    async fn create(&self, user: User) -> Result<bool>;
    /// Overwrites the stored record only while it still equals `expected`.
    /// Returns `false` if it changed or disappeared in the meantime.
    async fn replace(&self, expected: &User, user: User) -> Result<bool>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Returns `false` when no user was stored under `username`.
    async fn delete(&self, username: &str) -> Result<bool>;
}

#[async_trait]
pub trait MerchantRepository: Send + Sync {
    async fn save(&self, merchant: Merchant) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Merchant>>;
    async fn all(&self) -> Result<Vec<Merchant>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn save(&self, payment: Payment) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>>;
    async fn find_by_username(&self, username: &str) -> Result<Vec<Payment>>;
}

/// Backend holding per-request session state, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>>;
}

/// Hands out the shared repositories that use cases run against.
///
/// The set of repositories is closed: one accessor per kind, no lookup by name.
pub trait RepositoryProvider: Send + Sync {
    fn user_repo(&self) -> Result<Arc<dyn UserRepository>>;
    fn merchant_repo(&self) -> Result<Arc<dyn MerchantRepository>>;
    fn payment_repo(&self) -> Result<Arc<dyn PaymentRepository>>;
}

/// Builds one repository instance; invoked at most once per resource manager.
pub type RepositoryFactory<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;
