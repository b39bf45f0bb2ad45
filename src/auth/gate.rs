use crate::auth::credentials::{self, Credentials, FormValues};
use crate::auth::password;
use crate::config::Shared;
use axum::http::HeaderMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Response body for every authentication failure. The reason is only ever logged.
pub const BADAUTH: &str = "badauth";

/// The terminal state of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoCredentials,
    UnknownUser(String),
    BadPassword(String),
    Authenticated(String),
}

impl Outcome {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated(_))
    }

    fn log(&self) {
        match self {
            Outcome::Authenticated(_) => info!("{self}"),
            _ => warn!("{self}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoCredentials => write!(f, "Request without credentials"),
            Outcome::UnknownUser(user) => {
                write!(f, "User {user} not found in local database.")
            }
            Outcome::BadPassword(user) => write!(
                f,
                "Password for user {user} does not match password from local database."
            ),
            Outcome::Authenticated(user) => write!(f, "User {user} authenticated for updates."),
        }
    }
}

/// Decides whether an update request comes from a known user with the right password.
///
/// At most [`ServerSettings::max_concurrent_verifications`][crate::config::ServerSettings]
/// hashes are verified at once; further requests wait for a free slot.
#[derive(Clone)]
pub struct AuthGate {
    config: Shared,
    verifications: Arc<Semaphore>,
}

impl AuthGate {
    #[must_use]
    pub fn new(config: Shared) -> Self {
        let permits = config.server.max_concurrent_verifications.max(1);
        AuthGate {
            config,
            verifications: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Authenticate one request and write its audit log line.
    ///
    /// Hash verification is CPU bound and runs on the blocking pool. Unknown users are checked
    /// against a decoy hash so they take about as long to reject as a wrong password.
    pub async fn authenticate(&self, headers: &HeaderMap, form: &FormValues) -> Outcome {
        let outcome = match credentials::extract(headers, form) {
            None => Outcome::NoCredentials,
            Some(creds) => self.check(creds).await,
        };
        outcome.log();
        outcome
    }

    async fn check(&self, creds: Credentials) -> Outcome {
        let Credentials { username, password } = creds;
        let stored = self.config.password_hash(&username).map(str::to_string);
        let known = stored.is_some();

        let permit = match self.verifications.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                error!("password verification for {username} failed: {err}");
                return Outcome::BadPassword(username);
            }
        };
        let verified = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            match stored {
                Some(hash) => password::verify(&password, &hash),
                None => {
                    password::verify_decoy(&password);
                    false
                }
            }
        })
        .await
        .unwrap_or_else(|err| {
            error!("password verification for {username} failed: {err}");
            false
        });

        match (known, verified) {
            (false, _) => Outcome::UnknownUser(username),
            (true, false) => Outcome::BadPassword(username),
            (true, true) => Outcome::Authenticated(username),
        }
    }
}
