//! Fire-and-forget notifications for new posts, new comments and @mentions.
//!
//! Delivery never affects the request that triggered it: `dispatch` spawns the
//! sends onto the runtime and only logs failures.

pub mod log;
pub mod smtp;

pub use self::log::LogNotifier;
pub use self::smtp::SmtpNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewPost,
    NewComment,
    Mention,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContext {
    pub post_id: i32,
    pub post_title: String,
    pub comment_content: Option<String>,
    /// Display name used in the greeting, when known
    pub recipient_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// User identifier (or username, for mentions) of the recipient
    pub recipient: String,
    pub context: NotificationContext,
}

impl Notification {
    pub fn subject(&self) -> &'static str {
        match self.kind {
            NotificationKind::NewPost => "New Forum Post",
            NotificationKind::NewComment => "New Comment on Your Post",
            NotificationKind::Mention => "You were mentioned in a comment",
        }
    }

    /// Plain-text body with a link to the post under `action_base_url`
    pub fn body(&self, action_base_url: &str) -> String {
        let comment = self.context.comment_content.as_deref().unwrap_or_default();
        let summary = match self.kind {
            NotificationKind::NewPost => format!(
                "A new post \"{}\" has been created in the forum. Join the discussion!",
                self.context.post_title
            ),
            NotificationKind::NewComment => {
                format!("Someone has commented on a post you're following: \"{}\"", comment)
            }
            NotificationKind::Mention => format!("You've been mentioned in a comment: \"{}\"", comment),
        };
        let name = self.context.recipient_name.as_deref().unwrap_or(&self.recipient);

        format!(
            "Hi {},\n\n{}\n\nView in Forum: {}/{}\n",
            name, summary, action_base_url, self.context.post_id
        )
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Delivery channel for notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// Send notifications in the background; failures are logged and swallowed
pub fn dispatch(notifier: Arc<dyn Notifier>, notifications: Vec<Notification>) {
    if notifications.is_empty() {
        return;
    }

    tokio::spawn(async move {
        let sends = notifications.iter().map(|n| notifier.notify(n));
        let results = futures::future::join_all(sends).await;

        for (notification, result) in notifications.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(
                    notifier = notifier.name(),
                    recipient = %notification.recipient,
                    kind = ?notification.kind,
                    "Notification failed: {}",
                    e
                );
            }
        }
    });
}

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("mention pattern is valid"));

/// Distinct `@username` mentions in order of first appearance
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for capture in MENTION.captures_iter(content) {
        let name = &capture[1];
        if !mentions.iter().any(|m| m == name) {
            mentions.push(name.to_string());
        }
    }
    mentions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn context() -> NotificationContext {
        NotificationContext {
            post_id: 7,
            post_title: "Hello".to_string(),
            comment_content: Some("nice @bob".to_string()),
            recipient_name: None,
        }
    }

    #[test]
    fn extracts_distinct_mentions_in_order() {
        assert_eq!(
            extract_mentions("hey @alice and @bob_2, @alice again"),
            vec!["alice", "bob_2"]
        );
        assert!(extract_mentions("no mentions, just an email a @ b").is_empty());
    }

    #[test]
    fn body_links_to_post() {
        let notification = Notification {
            kind: NotificationKind::Mention,
            recipient: "bob".to_string(),
            context: context(),
        };
        let body = notification.body("https://forum.example.com/forum");
        assert!(body.starts_with("Hi bob,"));
        assert!(body.contains("You've been mentioned in a comment: \"nice @bob\""));
        assert!(body.contains("https://forum.example.com/forum/7"));
        assert_eq!(notification.subject(), "You were mentioned in a comment");
    }

    #[test]
    fn greeting_prefers_display_name() {
        let mut ctx = context();
        ctx.recipient_name = Some("Alice".to_string());
        let notification = Notification {
            kind: NotificationKind::NewComment,
            recipient: "alice@example.com".to_string(),
            context: ctx,
        };
        assert!(notification.body("http://x").starts_with("Hi Alice,"));
    }

    struct FailingNotifier {
        attempts: Mutex<u32>,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            *self.attempts.lock().unwrap() += 1;
            Err(NotifyError::SendFailed("smtp down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        let notifier = Arc::new(FailingNotifier {
            attempts: Mutex::new(0),
        });
        let notification = Notification {
            kind: NotificationKind::NewPost,
            recipient: "a@example.com".to_string(),
            context: context(),
        };

        dispatch(notifier.clone(), vec![notification.clone(), notification]);

        for _ in 0..50 {
            if *notifier.attempts.lock().unwrap() == 2 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("notifications were not attempted");
    }
}
