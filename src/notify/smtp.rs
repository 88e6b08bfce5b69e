//! SMTP notifier using lettre

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Notification, Notifier, NotifyError};
use crate::config::EmailConfig;

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    action_base_url: String,
}

impl SmtpNotifier {
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        let (username, password) = match (&config.username, &config.password) {
            (Some(username), Some(password)) => (username.clone(), password.clone()),
            _ => {
                return Err(NotifyError::InvalidConfiguration(
                    "EMAIL_USER and EMAIL_PASS are required for SMTP".to_string(),
                ))
            }
        };

        let from = format!("\"{}\" <{}>", config.from_name, username)
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidConfiguration(format!("Invalid from address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::InvalidConfiguration(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from,
            action_base_url: config.action_base_url.clone(),
        })
    }

    fn build_message(&self, notification: &Notification, to: Mailbox) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body(&self.action_base_url))
            .map_err(|e| NotifyError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        // Identities are email-like subjects; anything else has no mailbox to deliver to
        let to = match notification.recipient.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(_) => {
                tracing::debug!(
                    recipient = %notification.recipient,
                    "No deliverable address for notification, skipping"
                );
                return Ok(());
            }
        };

        let email = self.build_message(notification, to)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        tracing::info!(recipient = %notification.recipient, kind = ?notification.kind, "Notification email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationContext, NotificationKind};

    fn email_config() -> EmailConfig {
        EmailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("forum@example.com".to_string()),
            password: Some("secret".to_string()),
            from_name: "Forum".to_string(),
            action_base_url: "https://forum.example.com/forum".to_string(),
        }
    }

    #[test]
    fn requires_credentials() {
        let mut config = email_config();
        config.password = None;
        assert!(matches!(
            SmtpNotifier::from_config(&config),
            Err(NotifyError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn builds_plain_text_message() {
        let notifier = SmtpNotifier::from_config(&email_config()).unwrap();
        let notification = Notification {
            kind: NotificationKind::NewComment,
            recipient: "author@example.com".to_string(),
            context: NotificationContext {
                post_id: 3,
                post_title: "Hello".to_string(),
                comment_content: Some("Great post".to_string()),
                recipient_name: Some("Author".to_string()),
            },
        };

        let to = notification.recipient.parse::<Mailbox>().unwrap();
        let message = notifier.build_message(&notification, to).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New Comment on Your Post"));
        assert!(raw.contains("To: author@example.com"));
    }

    #[tokio::test]
    async fn skips_recipients_without_address() {
        let notifier = SmtpNotifier::from_config(&email_config()).unwrap();
        let notification = Notification {
            kind: NotificationKind::Mention,
            recipient: "bob".to_string(),
            context: NotificationContext {
                post_id: 3,
                post_title: "Hello".to_string(),
                comment_content: Some("hi @bob".to_string()),
                recipient_name: None,
            },
        };
        assert!(notifier.notify(&notification).await.is_ok());
    }
}
