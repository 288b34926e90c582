//! Reddit media client: authenticate, upload, submit, and wait for completion.

pub mod completion;
pub mod gallery;
pub(crate) mod http;
pub mod submit;
pub mod token;
pub mod upload;

use crate::config::{AppConfig, Endpoints};
use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::{
    AccessToken, Credentials, GalleryRequest, ImageRequest, SubmissionRequest, VideoRequest,
};
use completion::{CompletionDialer, CompletionWaiter};
use gallery::GalleryOrchestrator;
use log::{debug, info};
use reqwest::Client;
use submit::SubmissionSubmitter;
use token::TokenManager;
use upload::AssetUploader;

/// Client for image, video and gallery submissions.
///
/// Holds one outbound HTTP client and one dialer configuration, shared by
/// every upload of an operation. The access token is refreshed at the start
/// of each public call, before any concurrent work begins.
pub struct RedditMediaClient {
    http: Client,
    credentials: Credentials,
    endpoints: Endpoints,
    dialer: CompletionDialer,
    access_token: Option<AccessToken>,
}

impl RedditMediaClient {
    pub fn new(
        user_agent: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Credentials {
            client_id: client_id.into(),
            client_secret: secret.into(),
            username: username.into(),
            password: password.into(),
            user_agent: user_agent.into(),
        };
        Self::with_credentials(credentials)
    }

    pub fn with_credentials(credentials: Credentials) -> Result<Self> {
        Ok(Self {
            http: Self::get_client(&credentials.user_agent)?,
            credentials,
            endpoints: Endpoints::default(),
            dialer: CompletionDialer::default(),
            access_token: None,
        })
    }

    /// Create a client from a configuration object
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        debug!(
            "Creating RedditMediaClient with user_agent: {}",
            config.user_agent
        );
        Ok(Self::with_credentials(config.credentials()?)?.with_endpoints(config.endpoints.clone()))
    }

    /// Replace the outbound transport (timeouts, proxies, TLS settings).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Replace the completion-channel dialer.
    pub fn with_dialer(mut self, dialer: CompletionDialer) -> Self {
        self.dialer = dialer;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Whether a token was acquired by the last operation.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn get_client(user_agent: &str) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RedmedError::Config(format!("building HTTP client: {}", e)))
    }

    /// Post a single image and return its fullname.
    pub async fn submit_image(&mut self, request: &ImageRequest, ctx: &Context) -> Result<String> {
        self.submit(&SubmissionRequest::Image(request.clone()), ctx)
            .await
    }

    /// Post a single video (with optional poster) and return its fullname.
    pub async fn submit_video(&mut self, request: &VideoRequest, ctx: &Context) -> Result<String> {
        self.submit(&SubmissionRequest::Video(request.clone()), ctx)
            .await
    }

    /// Post a gallery of images and return its fullname.
    pub async fn submit_gallery(
        &mut self,
        request: &GalleryRequest,
        ctx: &Context,
    ) -> Result<String> {
        self.submit(&SubmissionRequest::Gallery(request.clone()), ctx)
            .await
    }

    /// Run any submission end to end. Identical requests produce separate posts.
    pub async fn submit(&mut self, request: &SubmissionRequest, ctx: &Context) -> Result<String> {
        request.validate()?;

        let token = self.refresh_token(ctx).await?;
        let uploader = AssetUploader::new(
            self.http.clone(),
            self.endpoints.clone(),
            self.credentials.user_agent.clone(),
            token.clone(),
        );
        let submitter = SubmissionSubmitter::new(
            self.http.clone(),
            self.endpoints.clone(),
            self.credentials.user_agent.clone(),
            token,
            CompletionWaiter::new(self.dialer.clone()),
        );
        let settings = request.settings();

        match request {
            SubmissionRequest::Image(req) => {
                let media = uploader.upload(&req.path, ctx).await?;
                submitter
                    .submit_media("image", settings, &media, None, ctx)
                    .await
            }
            SubmissionRequest::Video(req) => {
                let media = uploader.upload(&req.path, ctx).await?;
                let poster = match req.thumbnail_path.as_deref() {
                    Some(thumb) => Some(uploader.upload(thumb, ctx).await?),
                    None => None,
                };
                submitter
                    .submit_media(req.kind.as_str(), settings, &media, poster.as_ref(), ctx)
                    .await
            }
            SubmissionRequest::Gallery(req) => {
                let assets = GalleryOrchestrator::new(uploader)
                    .upload_all(&req.paths, ctx)
                    .await?;
                submitter.submit_gallery(settings, &assets, ctx).await
            }
        }
    }

    async fn refresh_token(&mut self, ctx: &Context) -> Result<AccessToken> {
        let manager = TokenManager::new(self.http.clone(), self.endpoints.token_url.clone());
        let token = manager.acquire_token(&self.credentials, ctx).await?;
        info!("Authenticated as {}", self.credentials.username);
        self.access_token = Some(token.clone());
        Ok(token)
    }
}
