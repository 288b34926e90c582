//! Post creation for uploaded assets.

use crate::client::completion::CompletionWaiter;
use crate::client::http::{self, HttpFailure};
use crate::config::Endpoints;
use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::{AccessToken, Asset, GalleryPostResponse, PostSettings};
use log::{debug, info, warn};
use reqwest::{header, Client};
use serde::Serialize;

/// Fullname prefix for link posts.
pub const POST_PREFIX: &str = "t3_";

/// Build the `/api/submit` form for an image or video post.
///
/// Optional fields that are absent are left out entirely.
pub fn media_form(
    kind: &str,
    settings: &PostSettings,
    media: &Asset,
    poster: Option<&Asset>,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("kind", kind.to_string()),
        ("sr", settings.subreddit_name().to_string()),
        ("title", settings.title.clone()),
        ("url", media.location.clone()),
    ];

    if let Some(poster) = poster {
        form.push(("video_poster_url", poster.location.clone()));
    }

    form.push(("nsfw", settings.nsfw.to_string()));
    form.push(("resubmit", settings.resubmit.to_string()));
    form.push(("sendreplies", settings.send_replies.to_string()));
    form.push(("spoiler", settings.spoiler.to_string()));

    if let Some(id) = settings.flair_id() {
        form.push(("flair_id", id.to_string()));
    }
    if let Some(text) = settings.flair_text() {
        form.push(("flair_text", text.to_string()));
    }

    form
}

#[derive(Serialize, Debug)]
pub struct GalleryItem<'a> {
    pub caption: &'a str,
    pub outbound_url: &'a str,
    pub media_id: &'a str,
}

/// JSON body of `/api/submit_gallery_post.json`.
#[derive(Serialize, Debug)]
pub struct GalleryPayload<'a> {
    pub sr: &'a str,
    pub title: &'a str,
    pub items: Vec<GalleryItem<'a>>,
    pub nsfw: String,
    pub sendreplies: String,
    pub spoiler: String,
    pub api_type: &'static str,
    pub show_error_list: bool,
    pub validate_on_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flair_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flair_text: Option<&'a str>,
}

impl<'a> GalleryPayload<'a> {
    pub fn new(settings: &'a PostSettings, assets: &'a [Asset]) -> Self {
        Self {
            sr: settings.subreddit_name(),
            title: &settings.title,
            items: assets
                .iter()
                .map(|asset| GalleryItem {
                    caption: "",
                    outbound_url: "",
                    media_id: &asset.id,
                })
                .collect(),
            nsfw: settings.nsfw.to_string(),
            sendreplies: settings.send_replies.to_string(),
            spoiler: settings.spoiler.to_string(),
            api_type: "json",
            show_error_list: true,
            validate_on_submit: true,
            flair_id: settings.flair_id(),
            flair_text: settings.flair_text(),
        }
    }
}

/// Post fullname from a completion redirect such as
/// `https://www.reddit.com/r/sub/comments/<id>/<title>/`.
pub fn fullname_from_redirect(redirect: &str) -> Result<String> {
    let segments: Vec<&str> = redirect.split('/').collect();
    if segments.len() < 3 {
        return Err(RedmedError::CompletionFailure(format!(
            "unexpected redirect {:?}",
            redirect
        )));
    }

    let id = segments[segments.len() - 3];
    if id.is_empty() {
        return Err(RedmedError::CompletionFailure(format!(
            "no post id in redirect {:?}",
            redirect
        )));
    }

    Ok(format!("{}{}", POST_PREFIX, id))
}

/// Fullname reported directly in a submit response, if any.
fn fullname_from_body(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let data = &json["json"]["data"];
    if let Some(name) = data["name"].as_str().filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    data["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(|id| {
            if id.starts_with(POST_PREFIX) {
                id.to_string()
            } else {
                format!("{}{}", POST_PREFIX, id)
            }
        })
}

fn submission_failure(failure: HttpFailure) -> RedmedError {
    RedmedError::Submission {
        reason: failure.to_string(),
        body: failure.body().to_string(),
    }
}

/// Sends post-creation requests and resolves their fullnames.
#[derive(Clone)]
pub struct SubmissionSubmitter {
    http: Client,
    endpoints: Endpoints,
    user_agent: String,
    token: AccessToken,
    waiter: CompletionWaiter,
}

impl SubmissionSubmitter {
    pub fn new(
        http: Client,
        endpoints: Endpoints,
        user_agent: String,
        token: AccessToken,
        waiter: CompletionWaiter,
    ) -> Self {
        Self {
            http,
            endpoints,
            user_agent,
            token,
            waiter,
        }
    }

    /// Submit an image or video post and wait until the platform reports it ready.
    ///
    /// A 200 from `/api/submit` only means the post was accepted; the
    /// fullname comes from the completion channel's redirect.
    pub async fn submit_media(
        &self,
        kind: &str,
        settings: &PostSettings,
        media: &Asset,
        poster: Option<&Asset>,
        ctx: &Context,
    ) -> Result<String> {
        let form = media_form(kind, settings, media, poster);
        let request = self
            .http
            .post(self.endpoints.api_url("/api/submit"))
            .header(header::AUTHORIZATION, self.token.bearer())
            .form(&form);

        let body = http::execute(request, &self.user_agent, ctx, submission_failure).await?;
        info!(
            "Submission of {} post to r/{} accepted",
            kind,
            settings.subreddit_name()
        );

        let channel = media.completion_channel.as_deref().unwrap_or_default();
        let redirect = self.waiter.wait_for_completion(channel, ctx).await?;

        if redirect.is_empty() {
            debug!("No completion channel issued, reading fullname from response");
            return fullname_from_body(&body).ok_or_else(|| RedmedError::Submission {
                reason: "no completion channel and no post id in response".to_string(),
                body,
            });
        }

        fullname_from_redirect(&redirect)
    }

    /// Submit a gallery post. The fullname is returned synchronously.
    pub async fn submit_gallery(
        &self,
        settings: &PostSettings,
        assets: &[Asset],
        ctx: &Context,
    ) -> Result<String> {
        let payload = GalleryPayload::new(settings, assets);
        let request = self
            .http
            .post(self.endpoints.api_url("/api/submit_gallery_post.json"))
            .header(header::AUTHORIZATION, self.token.bearer())
            .json(&payload);

        let body = http::execute(request, &self.user_agent, ctx, submission_failure).await?;

        let parsed: GalleryPostResponse =
            serde_json::from_str(&body).map_err(|e| RedmedError::Submission {
                reason: format!("Parse error: {}", e),
                body: body.clone(),
            })?;

        if !parsed.json.errors.is_empty() {
            warn!("Gallery submission reported errors: {:?}", parsed.json.errors);
        }

        match parsed.json.data.and_then(|d| d.id).filter(|id| !id.is_empty()) {
            Some(id) => {
                info!("Gallery post {} created in r/{}", id, settings.subreddit_name());
                Ok(id)
            }
            None => Err(RedmedError::Submission {
                reason: "missing post id".to_string(),
                body,
            }),
        }
    }
}
