//! Application operations. Handlers in `web` translate HTTP to and from these.

pub mod auth;
pub mod comparison;
pub mod history;
pub mod reports;
pub mod token;

pub use token::{TokenError, TokenSigner};
