use async_trait::async_trait;

use super::{Notification, Notifier, NotifyError};

/// Used when SMTP is not configured: notifications only reach the log
pub struct LogNotifier {
    action_base_url: String,
}

impl LogNotifier {
    pub fn new(action_base_url: impl Into<String>) -> Self {
        Self {
            action_base_url: action_base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            kind = ?notification.kind,
            subject = notification.subject(),
            "Would send notification: {}",
            notification.body(&self.action_base_url).trim_end()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
