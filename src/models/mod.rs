use serde::Deserialize;
use std::fmt;

pub mod requests;

pub use requests::{
    Flair, GalleryRequest, ImageRequest, PostSettings, SubmissionRequest, VideoKind, VideoRequest,
};

/// Script-app credentials used for the password grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Short-lived bearer token. Never logged or persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// An uploaded media asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Opaque media id, referenced by gallery items
    pub id: String,
    /// Storage URL reported by the upload endpoint
    pub location: String,
    /// Websocket address announcing when a post using this asset is ready
    pub completion_channel: Option<String>,
}

// Wire types

#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AssetLeaseResponse {
    pub args: LeaseArgs,
    pub asset: LeaseAsset,
}

/// Upload target and the form fields that must be replayed verbatim.
#[derive(Deserialize, Debug)]
pub struct LeaseArgs {
    /// Scheme-relative upload URL, e.g. `//bucket.s3.amazonaws.com`
    pub action: String,
    #[serde(default)]
    pub fields: Vec<LeaseField>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LeaseField {
    pub name: String,
    pub value: String,
}

#[derive(Deserialize, Debug)]
pub struct LeaseAsset {
    pub asset_id: String,
    #[serde(default)]
    pub websocket_url: Option<String>,
}

/// XML body returned by the storage endpoint after a successful upload.
#[derive(Deserialize, Debug)]
pub struct StoragePostResponse {
    #[serde(rename = "Location", default)]
    pub location: String,
}

#[derive(Deserialize, Debug)]
pub struct GalleryPostResponse {
    pub json: GalleryPostBody,
}

#[derive(Deserialize, Debug)]
pub struct GalleryPostBody {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: Option<GalleryPostData>,
}

#[derive(Deserialize, Debug)]
pub struct GalleryPostData {
    #[serde(default)]
    pub id: Option<String>,
}

/// One message from the completion channel.
#[derive(Deserialize, Debug, Default)]
pub struct CompletionMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub payload: CompletionPayload,
}

#[derive(Deserialize, Debug, Default)]
pub struct CompletionPayload {
    #[serde(default)]
    pub redirect: String,
}
