//! Verification link delivery.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use coledzh_shop_core::Email;

/// Delivery failed in the outbound channel.
#[derive(Debug, Error)]
#[error("verification delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Sends email verification links to newly registered users.
#[async_trait]
pub trait VerificationSender: Send + Sync {
    /// Deliver `link` to `to`.
    async fn send_verification(&self, to: &Email, link: &str) -> Result<(), DeliveryError>;
}

/// Writes verification links to the log. Used until a mail relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogVerificationSender;

#[async_trait]
impl VerificationSender for LogVerificationSender {
    async fn send_verification(&self, to: &Email, link: &str) -> Result<(), DeliveryError> {
        info!(email = %to, link, "verification link issued");
        Ok(())
    }
}
