//! External action gateway
//!
//! Performs the side-effecting work behind each quick action. The controller
//! only sees the [`ActionGateway`] trait, so the simulated and networked
//! backends are interchangeable.

mod error;
mod http;
mod simulated;
mod types;

#[allow(unused_imports)] // Public API re-exports
pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
#[allow(unused_imports)] // Public API re-exports
pub use simulated::{is_transaction_hash, random_transaction_hash, SimulatedGateway};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Capability that performs one action per call
#[async_trait]
pub trait ActionGateway: Send + Sync {
    /// Perform the action; a single attempt, no retries
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: ActionGateway + ?Sized> ActionGateway for Arc<T> {
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError> {
        (**self).perform(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Logging wrapper for action gateways
pub struct LoggingGateway {
    inner: Arc<dyn ActionGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn ActionGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActionGateway for LoggingGateway {
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.perform(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    backend = self.inner.name(),
                    action = %request.kind(),
                    duration_ms = %duration.as_millis(),
                    transaction_hash = outcome.transaction_hash().unwrap_or("-"),
                    "Action completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.inner.name(),
                    action = %request.kind(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Action failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
