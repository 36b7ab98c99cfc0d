//! Domain types and the ports the rest of the crate is written against.

pub mod merchant;
pub mod money;
pub mod payment;
pub mod ports;
pub mod session;
pub mod user;
