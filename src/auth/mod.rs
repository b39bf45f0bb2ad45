//! Request authentication.
//!
//! [`credentials`] finds a username and password in a request, [`password`] checks a password
//! against a stored hash, and [`AuthGate`] combines the two with the loaded
//! [`Config`][crate::config::Config] to reach an [`Outcome`].

pub mod credentials;
mod gate;
pub mod password;

pub use credentials::{Credentials, FormValues};
pub use gate::{AuthGate, Outcome, BADAUTH};
