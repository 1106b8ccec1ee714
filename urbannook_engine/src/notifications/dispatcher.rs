use std::{env, time::Duration};

use log::*;
use serde::Serialize;

use crate::{
    envelope::{BAD_REQUEST, INTERNAL_SERVER_ERROR, OK},
    notifications::{
        templates::Notification,
        transport::{MailTransport, OutboundMail},
    },
};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 1000;
const DEFAULT_FROM_ADDRESS: &str = "UrbanNook <orders@urbannook.in>";

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Total delivery attempts, including the first.
    pub max_attempts: u32,
    /// Wait before the second attempt. Each further attempt waits twice as long as the one before.
    pub base_backoff: Duration,
    pub from_address: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn from_env_or_default() -> Self {
        let from_address = env::var("UN_MAIL_FROM").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            info!("🪛️ UN_MAIL_FROM is not set. Using {DEFAULT_FROM_ADDRESS}");
            DEFAULT_FROM_ADDRESS.to_string()
        });
        let backoff_ms = env::var("UN_MAIL_BACKOFF_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for UN_MAIL_BACKOFF_MS ({s}): {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_BACKOFF_MS);
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, base_backoff: Duration::from_millis(backoff_ms), from_address }
    }

    pub fn with_base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// The wait after failed attempt number `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// The outcome of a single [`NotificationDispatcher::send`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub message_id: Option<String>,
}

impl DispatchResult {
    fn delivered(message_id: String) -> Self {
        Self { success: true, status_code: OK, message: "Email sent successfully".into(), message_id: Some(message_id) }
    }

    fn failed<S: Into<String>>(status_code: u16, message: S) -> Self {
        Self { success: false, status_code, message: message.into(), message_id: None }
    }
}

/// Renders notifications and delivers them with bounded retries.
///
/// `send` never returns an error. Every failure is folded into the [`DispatchResult`].
pub struct NotificationDispatcher<T> {
    transport: T,
    config: DispatchConfig,
}

impl<T: MailTransport> NotificationDispatcher<T> {
    pub fn new(transport: T, config: DispatchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn send(&self, recipient: &str, notification: &Notification) -> DispatchResult {
        let kind = notification.kind();
        let recipient = recipient.trim();
        if recipient.is_empty() {
            warn!("📧️ Cannot send {kind} email without a recipient");
            return DispatchResult::failed(BAD_REQUEST, "Recipient email address is required");
        }
        let rendered = match notification.render() {
            Ok(r) => r,
            Err(e) => {
                warn!("📧️ Not sending {kind} email to {recipient}. {e}");
                return DispatchResult::failed(BAD_REQUEST, e.to_string());
            },
        };
        let mail = OutboundMail {
            from: self.config.from_address.clone(),
            to: recipient.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        };
        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.transport.send_mail(&mail).await {
                Ok(receipt) => {
                    info!("📧️ {kind} email sent to {recipient} on attempt {attempt} ({})", receipt.message_id);
                    return DispatchResult::delivered(receipt.message_id);
                },
                Err(e) if attempt < max_attempts => {
                    let wait = self.config.backoff_after(attempt);
                    warn!(
                        "📧️ Attempt {attempt}/{max_attempts} to send {kind} email to {recipient} failed: {e}. Retrying \
                         in {}ms",
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                },
                Err(e) => {
                    error!("📧️ Giving up on {kind} email to {recipient} after {attempt} attempts. Last error: {e}");
                },
            }
        }
        DispatchResult::failed(INTERNAL_SERVER_ERROR, format!("Failed to send email after {max_attempts} attempts"))
    }
}
