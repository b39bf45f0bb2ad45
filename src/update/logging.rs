use crate::error::Error;
use crate::update::{UpdateExecutor, UpdateRequest};
use std::sync::Mutex;

/// An [`UpdateExecutor`] that only records what it was asked to do: each request is logged and
/// the most recent one is kept for inspection.
#[derive(Default, Debug)]
pub struct LoggingExecutor {
    last: Mutex<Option<UpdateRequest>>,
}

impl LoggingExecutor {
    #[must_use]
    pub fn last_request(&self) -> Option<UpdateRequest> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait::async_trait]
impl UpdateExecutor for LoggingExecutor {
    async fn update(&self, request: UpdateRequest) -> Result<(), Error> {
        let hostnames: Vec<String> = request
            .hostnames
            .iter()
            .map(|(hostname, _)| hostname.to_string())
            .collect();
        tracing::info!(
            "update for {} by {}: {}",
            hostnames.join(","),
            request.user,
            request.address.as_deref().unwrap_or("<no address>")
        );
        let mut last = self
            .last
            .lock()
            .map_err(|_| Error::Update("update log poisoned".to_string()))?;
        *last = Some(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyDescriptor;
    use std::str::FromStr;
    use trust_dns_client::rr::{LowerName, Name};

    #[tokio::test]
    async fn keeps_the_last_request() {
        let executor = LoggingExecutor::default();
        assert_eq!(executor.last_request(), None);

        let key = KeyDescriptor {
            key: Some("c2VjcmV0".to_string()),
            filename: None,
        };
        for address in ["192.0.2.1", "192.0.2.2"] {
            let request = UpdateRequest {
                user: "alice".to_string(),
                address: Some(address.to_string()),
                hostnames: vec![(
                    LowerName::from(Name::from_str("home.example.com").unwrap()),
                    key.clone(),
                )],
            };
            executor.update(request).await.unwrap();
        }

        let last = executor.last_request().unwrap();
        assert_eq!(last.address.as_deref(), Some("192.0.2.2"));
        assert_eq!(last.hostnames.len(), 1);
    }
}
