use std::future::Future;

use log::*;
use rand::Rng;
use thiserror::Error;

/// A fully rendered message, ready to hand to a mail provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Mail transport is unavailable: {0}")]
    Unavailable(String),
}

/// The delivery seam for outbound email. Implementations make a single attempt; retries are the dispatcher's job.
pub trait MailTransport {
    fn send_mail(&self, mail: &OutboundMail) -> impl Future<Output = Result<MailReceipt, TransportError>> + Send;
}

/// A transport that writes every message to the log instead of sending it. Used when no mail provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    async fn send_mail(&self, mail: &OutboundMail) -> Result<MailReceipt, TransportError> {
        let message_id = format!("log-{:016x}", rand::thread_rng().gen::<u64>());
        info!("📧️ [{message_id}] From: {} To: {} Subject: {}", mail.from, mail.to, mail.subject);
        trace!("📧️ [{message_id}] {}", mail.html);
        Ok(MailReceipt { message_id })
    }
}
