use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

const OUTBOX_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub(crate) enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("mail outbox is full")]
    OutboxFull,

    #[error("mail outbox is closed")]
    OutboxClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MailMessage {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

#[async_trait]
pub(crate) trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of an SMTP relay.
#[derive(Debug, Clone)]
pub(crate) struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub(crate) fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::Delivery("recipient is empty".to_string()));
        }

        info!(
            from = %self.sender,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "outgoing mail"
        );
        Ok(())
    }
}

/// Hands messages to a background delivery task, so enqueueing never waits
/// on the transport.
#[derive(Debug, Clone)]
pub(crate) struct MailOutbox {
    sender: mpsc::Sender<MailMessage>,
}

impl MailOutbox {
    pub(crate) fn channel() -> (Self, mpsc::Receiver<MailMessage>) {
        let (sender, receiver) = mpsc::channel(OUTBOX_CAPACITY);
        (Self { sender }, receiver)
    }

    /// Starts the delivery task on the current runtime.
    pub(crate) fn spawn<M: Mailer + 'static>(mailer: M) -> Self {
        let (outbox, receiver) = Self::channel();
        tokio::spawn(deliver(mailer, receiver));
        outbox
    }

    pub(crate) fn enqueue(&self, message: MailMessage) -> Result<(), MailError> {
        self.sender.try_send(message).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => MailError::OutboxFull,
            mpsc::error::TrySendError::Closed(_) => MailError::OutboxClosed,
        })
    }
}

/// Sends queued messages until every `MailOutbox` handle is dropped.
pub(crate) async fn deliver<M: Mailer>(mailer: M, mut receiver: mpsc::Receiver<MailMessage>) {
    while let Some(message) = receiver.recv().await {
        let to = message.to.clone();
        if let Err(err) = mailer.send(message).await {
            warn!(error = %err, to = %to, "mail delivery failed");
        }
    }
}
