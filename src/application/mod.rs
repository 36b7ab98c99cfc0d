//! Application layer: the lazily built repositories and the use cases that run on them.
//!
//! [`manager::ResourceManager`] owns one construction gate per repository kind
//! and is shared by every request. Use cases such as [`user_service::UserService`]
//! reach repositories only through the [`crate::domain::ports::RepositoryProvider`] seam.

pub mod manager;
pub mod user_service;
