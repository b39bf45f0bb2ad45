//! Credential extraction.
//!
//! A request may carry credentials in a `Basic` `Authorization` header or in `username` and
//! `password` form fields. Each encoding is a [`CredentialSource`]; the sources are tried in
//! [`SOURCES`] order and the first one yielding credentials wins. A source that finds something
//! malformed simply yields nothing.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

/// Decoded form-encoded request parameters (query string and body).
pub type FormValues = HashMap<String, String>;

const BASIC_PREFIX: &str = "Basic ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    BasicAuthHeader,
    FormFields,
}

pub const SOURCES: [CredentialSource; 2] =
    [CredentialSource::BasicAuthHeader, CredentialSource::FormFields];

impl CredentialSource {
    #[must_use]
    pub fn extract(self, headers: &HeaderMap, form: &FormValues) -> Option<Credentials> {
        match self {
            CredentialSource::BasicAuthHeader => Self::basic_auth(headers),
            CredentialSource::FormFields => Self::form_fields(form),
        }
    }

    fn basic_auth(headers: &HeaderMap) -> Option<Credentials> {
        let encoded = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix(BASIC_PREFIX)?;
        let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn form_fields(form: &FormValues) -> Option<Credentials> {
        let username = form.get("username").filter(|v| !v.is_empty())?;
        let password = form.get("password").filter(|v| !v.is_empty())?;
        Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        })
    }
}

/// Find the request's credentials, trying each of the [`SOURCES`] in turn.
#[must_use]
pub fn extract(headers: &HeaderMap, form: &FormValues) -> Option<Credentials> {
    SOURCES
        .iter()
        .find_map(|source| source.extract(headers, form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn basic(userpass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(userpass));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    fn form(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn creds(username: &str, password: &str) -> Option<Credentials> {
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[test]
    fn basic_auth_header_wins_over_form_fields() {
        let fields = form(&[("username", "bob"), ("password", "hunter2")]);
        assert_eq!(extract(&basic("alice:secret"), &fields), creds("alice", "secret"));
        assert_eq!(
            extract(&basic("alice:secret"), &FormValues::new()),
            creds("alice", "secret")
        );
    }

    #[test]
    fn password_may_contain_colons() {
        assert_eq!(
            extract(&basic("alice:s3:cr:et"), &FormValues::new()),
            creds("alice", "s3:cr:et")
        );
    }

    #[test]
    fn form_fields_without_header() {
        let fields = form(&[("username", "bob"), ("password", "hunter2")]);
        assert_eq!(extract(&HeaderMap::new(), &fields), creds("bob", "hunter2"));
    }

    #[test]
    fn nothing_found_when_both_channels_are_empty() {
        assert_eq!(extract(&HeaderMap::new(), &FormValues::new()), None);
        let fields = form(&[("username", ""), ("password", "")]);
        assert_eq!(extract(&HeaderMap::new(), &fields), None);
    }

    #[test]
    fn form_fields_need_both_parts() {
        let only_user = form(&[("username", "bob"), ("password", "")]);
        assert_eq!(extract(&HeaderMap::new(), &only_user), None);
        let only_pass = form(&[("password", "hunter2")]);
        assert_eq!(extract(&HeaderMap::new(), &only_pass), None);
    }

    #[test]
    fn malformed_basic_auth_falls_through_to_form_fields() {
        let fields = form(&[("username", "bob"), ("password", "hunter2")]);

        let mut bad_base64 = HeaderMap::new();
        bad_base64.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64"));
        assert_eq!(extract(&bad_base64, &fields), creds("bob", "hunter2"));

        assert_eq!(extract(&basic("no-colon-here"), &fields), creds("bob", "hunter2"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract(&headers, &FormValues::new()), None);
        assert_eq!(
            CredentialSource::BasicAuthHeader.extract(&headers, &FormValues::new()),
            None
        );
    }
}
