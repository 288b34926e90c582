//! Configuration module for handling environment variables and .env files

use crate::error::{RedmedError, Result};
use crate::models::Credentials;
use log::info;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_USER_AGENT: &str = "redmedia/0.1";

/// Remote endpoints a client talks to. Each client owns its own copy so
/// several clients can point at different hosts at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL of the OAuth API (`/api/submit`, `/api/media/asset.json`, ...)
    pub base_url: String,
    /// Full URL of the token exchange
    pub token_url: String,
    /// Scheme prepended to the scheme-relative upload URL from a lease
    pub upload_scheme: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            upload_scheme: "https".to_string(),
        }
    }
}

impl Endpoints {
    /// Endpoints rooted at a single host, as a local test server exposes them.
    pub fn with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            base_url: base.to_string(),
            token_url: format!("{}/api/v1/access_token", base),
            upload_scheme: "https".to_string(),
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Application configuration derived from environment variables and .env file
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Reddit API credentials
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    pub user_agent: String,
    pub endpoints: Endpoints,

    /// Overall deadline applied to each CLI operation
    pub timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
            timeout: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(_) => info!("Loaded environment from .env file"),
            Err(_) => info!("No .env file found, using system environment variables only"),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup; `load` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.client_id = lookup("REDDIT_CLIENT_ID");
        config.client_secret = lookup("REDDIT_CLIENT_SECRET");
        config.username = lookup("REDDIT_USERNAME");
        config.password = lookup("REDDIT_PASSWORD");

        if let Some(user_agent) = lookup("REDDIT_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(base_url) = lookup("REDDIT_BASE_URL") {
            config.endpoints.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(token_url) = lookup("REDDIT_TOKEN_URL") {
            config.endpoints.token_url = token_url;
        }

        if let Some(secs) = lookup("REDDIT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.timeout = Some(Duration::from_secs(secs));
            }
        }

        config
    }

    /// Credentials for the password grant, naming the first missing variable.
    pub fn credentials(&self) -> Result<Credentials> {
        fn require(value: &Option<String>, name: &str) -> Result<String> {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    RedmedError::Config(format!("{} environment variable must be set", name))
                })
        }

        Ok(Credentials {
            client_id: require(&self.client_id, "REDDIT_CLIENT_ID")?,
            client_secret: require(&self.client_secret, "REDDIT_CLIENT_SECRET")?,
            username: require(&self.username, "REDDIT_USERNAME")?,
            password: require(&self.password, "REDDIT_PASSWORD")?,
            user_agent: self.user_agent.clone(),
        })
    }
}
