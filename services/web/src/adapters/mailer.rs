//! services/web/src/adapters/mailer.rs
//!
//! A `MailService` that writes outgoing mail to the application log instead of
//! delivering it. Operators copy the confirmation link from the log file.

use async_trait::async_trait;
use summarizer_core::ports::{MailService, PortResult};
use tracing::info;

#[derive(Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailService for LogMailer {
    async fn send_confirmation(&self, to: &str, confirm_url: &str) -> PortResult<()> {
        info!(to, confirm_url, "Confirmation email queued");
        Ok(())
    }
}
