#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Duration as TokenTtl;
use serde_json::Value;

use forum_api::auth::{Claims, JwtVerifier};
use forum_api::database::MemoryForumRepository;
use forum_api::middleware::RateLimiter;
use forum_api::notify::{Notification, Notifier, NotifyError};
use forum_api::{build_router, AppState, ForumSettings};

pub const SECRET: &str = "integration-test-secret";

/// Keeps every notification so tests can assert on them
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications are dispatched in the background; poll until `count` arrived
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let sent = self.sent();
            if sent.len() >= count || Instant::now() > deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// One isolated server per test: its own storage, limiter and port
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub notifier: Arc<RecordingNotifier>,
    verifier: JwtVerifier,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(ForumSettings::default()).await
    }

    pub async fn start_with(settings: ForumSettings) -> Result<Self> {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(
            Arc::new(MemoryForumRepository::new()),
            notifier.clone(),
            Arc::new(RateLimiter::new()),
            Arc::new(JwtVerifier::new(SECRET)),
            settings,
        );

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .ok();
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            notifier,
            verifier: JwtVerifier::new(SECRET),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer header value for `subject`, valid for an hour
    pub fn bearer(&self, subject: &str) -> String {
        let token = self
            .verifier
            .issue(subject, TokenTtl::hours(1))
            .expect("token should sign");
        format!("Bearer {}", token)
    }

    pub fn expired_bearer(&self, subject: &str) -> String {
        let mut claims = Claims::new(subject, TokenTtl::hours(1));
        claims.exp = chrono::Utc::now().timestamp() - 60;
        let token = self.verifier.encode(&claims).expect("token should sign");
        format!("Bearer {}", token)
    }

    /// POST /posts as `subject`, returning the created post
    pub async fn create_post(&self, subject: &str, title: &str, content: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/posts"))
            .header("Authorization", self.bearer(subject))
            .json(&serde_json::json!({ "title": title, "content": content }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create post failed: {}", res.status());
        let body = res.json::<Value>().await?;
        Ok(body["post"].clone())
    }

    /// POST /posts/:id/comments as `subject`, returning the created comment
    pub async fn create_comment(&self, subject: &str, post_id: i64, content: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url(&format!("/posts/{}/comments", post_id)))
            .header("Authorization", self.bearer(subject))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create comment failed: {}", res.status());
        let body = res.json::<Value>().await?;
        Ok(body["comment"].clone())
    }
}
