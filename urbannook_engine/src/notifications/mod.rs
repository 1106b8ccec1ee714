//! Customer email notifications: templates, a pluggable transport, a retrying dispatcher and the outbox hook that
//! runs delivery in the background.
mod dispatcher;
mod outbox;
mod templates;
mod transport;

pub use dispatcher::{DispatchConfig, DispatchResult, NotificationDispatcher};
pub use outbox::{dispatch_hook, NotificationOutbox, NotificationRequest, OutboxWorker};
pub use templates::{status_label, Notification, NotificationKind, RenderError, RenderedMail, STORE_NAME};
pub use transport::{LogMailTransport, MailReceipt, MailTransport, OutboundMail, TransportError};
