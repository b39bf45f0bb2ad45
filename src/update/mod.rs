//! Hand-off of authenticated updates.
//!
//! Once a request is authenticated and every requested hostname is confirmed to belong to the
//! caller, an [`UpdateRequest`] is passed to an [`UpdateExecutor`]. Applying it to DNS is the
//! executor's business.

use crate::config::KeyDescriptor;
use crate::error::Error;
use std::sync::Arc;
use trust_dns_client::rr::LowerName;

pub mod logging;

#[allow(clippy::module_name_repetitions)]
pub use logging::LoggingExecutor;

/// `DynUpdateExecutor` is a type alias for an [`UpdateExecutor`] shared between all request
/// handlers through an [`Arc`].
#[allow(clippy::module_name_repetitions)]
pub type DynUpdateExecutor = Arc<dyn UpdateExecutor + Send + Sync>;

/// One authenticated update: the hostnames to point at `address`, with the key to sign each
/// change with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct UpdateRequest {
    pub user: String,
    pub address: Option<String>,
    pub hostnames: Vec<(LowerName, KeyDescriptor)>,
}

#[async_trait::async_trait]
#[allow(clippy::module_name_repetitions)]
pub trait UpdateExecutor {
    /// Apply an authenticated update.
    async fn update(&self, request: UpdateRequest) -> Result<(), Error>;
}
