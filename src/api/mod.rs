//! HTTP API for dynamic DNS updates.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/nic/update` (GET, POST)
//!
//!   The path can be changed with [`ServerSettings::update_path`][crate::config::ServerSettings].
//!
//!   Credentials are read from a `Basic` `Authorization` header, or else from `username` and
//!   `password` form fields. Form fields may be sent in the query string or, for `POST`, as an
//!   `application/x-www-form-urlencoded` body. The `hostname` field holds one or more comma
//!   separated hostnames to update.
//!
//!   ```bash
//!   ❯ curl -u alice:secret 'http://localhost:12345/nic/update?hostname=home.example.com'
//!   good 203.0.113.5
//!   ```
//!
//!   Responses are plain text return codes:
//!
//!   | Body              | Status | Meaning                                                      |
//!   |-------------------|--------|--------------------------------------------------------------|
//!   | `badauth`         | 200    | missing credentials, unknown user, or wrong password         |
//!   | `notfqdn`         | 200    | no `hostname` given                                          |
//!   | `nohost`          | 200    | a hostname is invalid, unknown, or owned by another user     |
//!   | `dnserr`          | 500    | the update executor failed                                   |
//!   | `good <address>`  | 200    | update handed off for the resolved client address            |
//!   | `good`            | 200    | update handed off, but no client address could be resolved   |
//!
//!   The reason for a `badauth` is only written to the log.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::{new, router};
