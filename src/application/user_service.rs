use crate::domain::ports::RepositoryProvider;
use crate::domain::session::Principal;
use crate::domain::user::User;
use crate::error::{BankError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// User operations reachable from the HTTP layer.
///
/// Business-rule rejections come back as [`BankError::Application`]; an
/// absent user on lookup is `Ok(None)`, not an error. Writes receive the
/// caller's principal when a session resolved one.
#[async_trait]
pub trait UserUseCase: Send + Sync {
    async fn add_user(&self, user: User, principal: Option<&Principal>) -> Result<()>;
    async fn update_user(&self, user: User, principal: Option<&Principal>) -> Result<()>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn delete_user(&self, username: &str) -> Result<()>;
}

/// Attempts at an update before giving up on a record that keeps changing.
const MAX_UPDATE_ATTEMPTS: usize = 5;

pub struct UserService {
    repositories: Arc<dyn RepositoryProvider>,
    bind_writes_to_principal: bool,
}

impl UserService {
    pub fn new(repositories: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repositories,
            bind_writes_to_principal: false,
        }
    }

    /// Rejects writes that carry no principal or target a user other than it.
    pub fn bind_writes_to_principal(mut self, enabled: bool) -> Self {
        self.bind_writes_to_principal = enabled;
        self
    }

    fn check_principal(&self, user: &User, principal: Option<&Principal>) -> Result<()> {
        if !self.bind_writes_to_principal {
            return Ok(());
        }
        match principal {
            Some(principal) if principal.as_str() == user.username => Ok(()),
            _ => Err(BankError::application("Cannot modify another user's data")),
        }
    }
}

#[async_trait]
impl UserUseCase for UserService {
    async fn add_user(&self, user: User, principal: Option<&Principal>) -> Result<()> {
        self.check_principal(&user, principal)?;

        if self.repositories.user_repo()?.create(user).await? {
            Ok(())
        } else {
            Err(BankError::application("Username already exists"))
        }
    }

    async fn update_user(&self, mut user: User, principal: Option<&Principal>) -> Result<()> {
        self.check_principal(&user, principal)?;

        let repo = self.repositories.user_repo()?;
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let Some(existing) = repo.find_by_username(&user.username).await? else {
                return Err(BankError::application("User not found"));
            };
            user.balance = existing.balance;
            if repo.replace(&existing, user.clone()).await? {
                return Ok(());
            }
            tracing::debug!(username = %user.username, "User changed during update, retrying");
        }
        Err(BankError::application(
            "User was modified concurrently, please retry",
        ))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.repositories
            .user_repo()?
            .find_by_username(username)
            .await
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        if self.repositories.user_repo()?.delete(username).await? {
            Ok(())
        } else {
            Err(BankError::application("User not found"))
        }
    }
}
