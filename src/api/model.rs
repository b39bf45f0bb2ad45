use crate::auth::{FormValues, BADAUTH};
use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::str::FromStr;
use trust_dns_client::rr::{LowerName, Name};

/// Protocol-level result of an update request, rendered as a plain-text dyndns2 return code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum UpdateResponse {
    BadAuth,
    NotFqdn,
    NoHost,
    DnsErr,
    Good(Option<String>),
}

impl UpdateResponse {
    fn body(&self) -> String {
        match self {
            UpdateResponse::BadAuth => BADAUTH.to_string(),
            UpdateResponse::NotFqdn => "notfqdn".to_string(),
            UpdateResponse::NoHost => "nohost".to_string(),
            UpdateResponse::DnsErr => "dnserr".to_string(),
            UpdateResponse::Good(None) => "good".to_string(),
            UpdateResponse::Good(Some(address)) => format!("good {address}"),
        }
    }
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        let status = match self {
            UpdateResponse::DnsErr => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        };
        (status, self.body()).into_response()
    }
}

/// Combine query string and body form values. Body values take precedence.
pub(super) fn merge_form(query: FormValues, body: Option<FormValues>) -> FormValues {
    let mut form = query;
    if let Some(body) = body {
        form.extend(body);
    }
    form
}

/// Split the comma separated `hostname` parameter. Blank entries are dropped.
pub(super) fn parse_hostnames(value: &str) -> Result<Vec<LowerName>, Error> {
    value
        .split(',')
        .map(str::trim)
        .filter(|hostname| !hostname.is_empty())
        .map(|hostname| {
            Name::from_str(hostname)
                .map(LowerName::from)
                .map_err(|err| Error::InvalidHostname(hostname.to_string(), err))
        })
        .collect()
}
