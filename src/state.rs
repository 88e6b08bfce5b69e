use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::config::AppConfig;
use crate::database::ForumRepository;
use crate::middleware::RateLimiter;
use crate::notify::Notifier;

/// Request-facing knobs derived from `AppConfig`
#[derive(Debug, Clone)]
pub struct ForumSettings {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub new_post_recipients: Vec<String>,
    pub trust_forwarded_for: bool,
    pub max_request_size_bytes: usize,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ForumSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            new_post_recipients: Vec::new(),
            trust_forwarded_for: false,
            max_request_size_bytes: 1024 * 1024,
            enable_cors: true,
            cors_origins: Vec::new(),
        }
    }
}

impl ForumSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_page_size: config.api.default_page_size,
            max_page_size: config.api.max_page_size,
            new_post_recipients: config.notifications.new_post_recipients.clone(),
            trust_forwarded_for: config.api.trust_forwarded_for,
            max_request_size_bytes: config.api.max_request_size_bytes,
            enable_cors: config.security.enable_cors,
            cors_origins: config.security.cors_origins.clone(),
        }
    }
}

/// Everything a request needs, injected once at startup
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ForumRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub rate_limiter: Arc<RateLimiter>,
    pub verifier: Arc<JwtVerifier>,
    pub settings: Arc<ForumSettings>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ForumRepository>,
        notifier: Arc<dyn Notifier>,
        rate_limiter: Arc<RateLimiter>,
        verifier: Arc<JwtVerifier>,
        settings: ForumSettings,
    ) -> Self {
        Self {
            repository,
            notifier,
            rate_limiter,
            verifier,
            settings: Arc::new(settings),
        }
    }
}
