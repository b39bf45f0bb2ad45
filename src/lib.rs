//! DDNS Gate
//!
//! An authenticating front door for dynamic DNS updates.
//!
//! Clients speak the common dyndns2 `/nic/update` protocol. Every request is authenticated
//! against salted password hashes from a JSON configuration, the caller's originating address is
//! worked out from the connection and the `X-Forwarded-For` header, and updates for hostnames
//! the caller owns are handed to an [`UpdateExecutor`][update::UpdateExecutor].
//!
//! The configuration is loaded and checked once at startup (see [`Config::validate`]) and is
//! read-only afterwards.
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod auth;
pub mod client_addr;
pub mod config;
pub mod error;
pub mod update;

pub use api::new as new_http;
pub use auth::{AuthGate, Outcome};
pub use config::{Config, Shared};
pub use update::LoggingExecutor;
