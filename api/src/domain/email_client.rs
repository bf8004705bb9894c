use crate::utils::error_chain_fmt;
use async_trait::async_trait;
use std::time::Duration;

#[derive(thiserror::Error)]
pub enum NotificationError {
    #[error("The email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("The email provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    TransportError(#[from] anyhow::Error),
}

impl std::fmt::Debug for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait EmailClient {
    async fn send_email_to(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), NotificationError>;
}
