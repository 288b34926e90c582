//! Upload of a single media file: lease negotiation, staging of remote
//! sources, and the multipart transfer to the storage endpoint.

use crate::client::http::{self, HttpFailure};
use crate::config::Endpoints;
use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::{AccessToken, Asset, AssetLeaseResponse, LeaseField, StoragePostResponse};
use log::{debug, info};
use reqwest::{header, multipart, Client, StatusCode};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// Field name the storage endpoint expects the file content under.
const FILE_FIELD: &str = "file";

/// Supported extensions and the content type declared for each.
const MEDIA_TYPES: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".mp4", "video/mp4"),
    (".mov", "video/quicktime"),
];

/// True when `source` is an absolute URL with both a scheme and a host.
pub fn is_remote_url(source: &str) -> bool {
    match Url::parse(source) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Base file name of a local path or the last path segment of a link.
pub fn file_name(source: &str) -> String {
    if is_remote_url(source) {
        if let Ok(url) = Url::parse(source) {
            if let Some(last) = url.path_segments().and_then(|mut s| s.next_back()) {
                return last.to_string();
            }
        }
    }

    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// Extension of the source's file name, lowercased and with the leading dot.
fn extension(source: &str) -> String {
    Path::new(&file_name(source))
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Content type for a media source, or `UnsupportedMediaType`.
pub fn media_type(source: &str) -> Result<&'static str> {
    let ext = extension(source);
    MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| RedmedError::UnsupportedMediaType {
            path: source.to_string(),
            extension: if ext.is_empty() {
                "<none>".to_string()
            } else {
                ext
            },
        })
}

/// A file ready to be read for upload. Staged downloads are deleted when
/// this value is dropped, whichever way the upload exits.
enum LocalMedia {
    Local(PathBuf),
    Staged(NamedTempFile),
}

impl LocalMedia {
    fn path(&self) -> &Path {
        match self {
            LocalMedia::Local(path) => path,
            LocalMedia::Staged(file) => file.path(),
        }
    }
}

/// Uploads media with a token acquired for the current operation.
///
/// Cheap to clone; the gallery fan-out hands one clone to each task.
#[derive(Clone)]
pub struct AssetUploader {
    http: Client,
    endpoints: Endpoints,
    user_agent: String,
    token: AccessToken,
}

impl AssetUploader {
    pub fn new(http: Client, endpoints: Endpoints, user_agent: String, token: AccessToken) -> Self {
        Self {
            http,
            endpoints,
            user_agent,
            token,
        }
    }

    /// Upload one local path or link and return the resulting asset.
    pub async fn upload(&self, source: &str, ctx: &Context) -> Result<Asset> {
        let name = file_name(source);
        let mime = media_type(source)?;

        let media = self.stage(source, ctx).await?;

        let lease = self.negotiate_lease(source, &name, mime, ctx).await?;
        let upload_url = self.complete_upload_url(source, &lease.args.action)?;
        debug!("Lease for {} targets {}", name, upload_url);

        let location = self
            .transfer(source, &name, mime, media.path(), &lease.args.fields, &upload_url, ctx)
            .await?;
        info!("Uploaded {} as asset {}", source, lease.asset.asset_id);

        Ok(Asset {
            id: lease.asset.asset_id,
            location,
            completion_channel: lease.asset.websocket_url.filter(|u| !u.is_empty()),
        })
    }

    /// Remote sources are downloaded to a temp file; local paths are used as-is.
    async fn stage(&self, source: &str, ctx: &Context) -> Result<LocalMedia> {
        if !is_remote_url(source) {
            return Ok(LocalMedia::Local(PathBuf::from(source)));
        }

        let download_err = |reason: String| RedmedError::Download {
            url: source.to_string(),
            reason,
        };

        let mut response = ctx
            .run(
                self.http
                    .get(source)
                    .header(header::USER_AGENT, &self.user_agent)
                    .send(),
            )
            .await?
            .map_err(|e| download_err(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(download_err(format!(
                "expected status code {}, got {}",
                StatusCode::OK.as_u16(),
                response.status().as_u16()
            )));
        }

        let mut staged = tempfile::Builder::new()
            .prefix("redmed")
            .suffix(&extension(source))
            .tempfile()
            .map_err(|e| download_err(e.to_string()))?;

        let mut written = 0usize;
        while let Some(chunk) = ctx
            .run(response.chunk())
            .await?
            .map_err(|e| download_err(e.to_string()))?
        {
            staged
                .write_all(&chunk)
                .map_err(|e| download_err(e.to_string()))?;
            written += chunk.len();
        }
        staged.flush().map_err(|e| download_err(e.to_string()))?;

        debug!(
            "Staged {} ({} bytes) at {}",
            source,
            written,
            staged.path().display()
        );
        Ok(LocalMedia::Staged(staged))
    }

    async fn negotiate_lease(
        &self,
        source: &str,
        name: &str,
        mime: &str,
        ctx: &Context,
    ) -> Result<AssetLeaseResponse> {
        let lease_err = |reason: String| RedmedError::LeaseNegotiation {
            path: source.to_string(),
            reason,
        };

        let params = [("filepath", name), ("mimetype", mime)];
        let request = self
            .http
            .post(self.endpoints.api_url("/api/media/asset.json"))
            .header(header::AUTHORIZATION, self.token.bearer())
            .form(&params);

        let body = http::execute(request, &self.user_agent, ctx, |f: HttpFailure| {
            lease_err(f.to_string())
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| lease_err(format!("unmarshalling {}: {}", body, e)))
    }

    /// Lease actions are scheme-relative (`//host/path`).
    fn complete_upload_url(&self, source: &str, action: &str) -> Result<Url> {
        let candidate = if action.starts_with("//") {
            format!("{}:{}", self.endpoints.upload_scheme, action)
        } else {
            action.to_string()
        };

        Url::parse(&candidate).map_err(|e| RedmedError::LeaseNegotiation {
            path: source.to_string(),
            reason: format!("invalid upload action {:?}: {}", action, e),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn transfer(
        &self,
        source: &str,
        name: &str,
        mime: &str,
        path: &Path,
        fields: &[LeaseField],
        upload_url: &Url,
        ctx: &Context,
    ) -> Result<String> {
        let transfer_err = |reason: String| RedmedError::Transfer {
            path: source.to_string(),
            reason,
        };

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| transfer_err(format!("reading {}: {}", path.display(), e)))?;

        let mut form = multipart::Form::new();
        for field in fields {
            form = form.text(field.name.clone(), field.value.clone());
        }

        let part = multipart::Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(mime)
            .map_err(|e| transfer_err(e.to_string()))?;
        form = form.part(FILE_FIELD, part);

        let request = self.http.post(upload_url.as_str()).multipart(form);
        let body = http::execute(request, &self.user_agent, ctx, |f: HttpFailure| {
            transfer_err(f.to_string())
        })
        .await?;

        let parsed: StoragePostResponse = quick_xml::de::from_str(&body)
            .map_err(|e| transfer_err(format!("parsing storage response {}: {}", body, e)))?;

        if parsed.location.trim().is_empty() {
            return Err(transfer_err(format!("no Location in response: {}", body)));
        }

        Ok(parsed.location)
    }
}
