use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::{AccessToken, Credentials, TokenResponse};
use log::debug;
use reqwest::{header, Client};

/// Exchanges script-app credentials for a bearer token (password grant).
///
/// Tokens are not cached: every top-level operation asks for a fresh one.
#[derive(Clone)]
pub struct TokenManager {
    http: Client,
    token_url: String,
}

impl TokenManager {
    pub fn new(http: Client, token_url: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
        }
    }

    pub async fn acquire_token(
        &self,
        credentials: &Credentials,
        ctx: &Context,
    ) -> Result<AccessToken> {
        let params = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        // Script apps authenticate with client_id:client_secret
        let auth = base64::encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let res = ctx
            .run(
                self.http
                    .post(&self.token_url)
                    .header(header::USER_AGENT, &credentials.user_agent)
                    .header(header::AUTHORIZATION, format!("Basic {}", auth))
                    .form(&params)
                    .send(),
            )
            .await?
            .map_err(|e| RedmedError::Auth(format!("Request error: {}", e)))?;

        let status = res.status();
        let body = ctx
            .run(res.text())
            .await?
            .map_err(|e| RedmedError::Auth(format!("Request error: {}", e)))?;

        if !status.is_success() {
            return Err(RedmedError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RedmedError::Auth(format!("Parse error: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(RedmedError::Auth(error));
        }

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                debug!("Password grant succeeded for {}", credentials.username);
                Ok(AccessToken::new(token))
            }
            _ => Err(RedmedError::Auth("no token in response".to_string())),
        }
    }
}
