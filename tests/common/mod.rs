//! Local stand-ins for the Reddit API, the media storage endpoint and the
//! completion websocket.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use futures_util::{SinkExt, StreamExt};
use redmedia::models::PostSettings;
use redmedia::{Endpoints, RedditMediaClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;

pub const REMOTE_IMAGE: &[u8] = b"\xff\xd8\xff\xe0remote-jpeg";

/// What the completion websocket does once a client connects.
#[derive(Clone, Debug)]
pub enum CompletionScript {
    /// Send this text frame, then wait for the client to close.
    Message(String),
    /// Send nothing and wait for the client to close.
    Silent,
    /// Leases carry no websocket address at all.
    NoChannel,
}

#[derive(Clone, Debug)]
pub struct MockOptions {
    pub token_body: Value,
    pub completion: CompletionScript,
    pub upload_body: String,
    pub submit_body: Value,
    pub gallery_body: Value,
    /// Lease requests for this file name answer 500
    pub failing_lease: Option<String>,
    /// Lease requests for this file name are answered after a delay
    pub slow_lease: Option<(String, Duration)>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            token_body: json!({"access_token": "tok"}),
            completion: success_message("https://x/r/s/comments/abc123/t/"),
            upload_body: "<PostResponse><Location>https://store/obj</Location></PostResponse>"
                .to_string(),
            submit_body: json!({"json": {"errors": []}}),
            gallery_body: json!({"json": {"data": {"id": "t3_xyz"}}}),
            failing_lease: None,
            slow_lease: None,
        }
    }
}

pub fn success_message(redirect: &str) -> CompletionScript {
    CompletionScript::Message(
        json!({"type": "success", "payload": {"redirect": redirect}}).to_string(),
    )
}

#[derive(Default)]
pub struct Recorded {
    pub token_auth: Vec<String>,
    pub token_forms: Vec<HashMap<String, String>>,
    pub lease_auth: Vec<String>,
    pub leases: Vec<HashMap<String, String>>,
    pub uploads: Vec<(String, Vec<u8>)>,
    pub submits: Vec<HashMap<String, String>>,
    pub galleries: Vec<Value>,
}

pub struct MockState {
    pub options: MockOptions,
    pub api_port: u16,
    pub ws_url: String,
    pub token_calls: AtomicUsize,
    pub lease_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub gallery_calls: AtomicUsize,
    pub ws_connections: AtomicUsize,
    pub ws_closed: Notify,
    pub recorded: Mutex<Recorded>,
}

pub struct MockReddit {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockReddit {
    pub async fn start(options: MockOptions) -> Self {
        let api = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api_port = api.local_addr().unwrap().port();
        let ws_url = format!("ws://127.0.0.1:{}", ws.local_addr().unwrap().port());

        let state = Arc::new(MockState {
            options,
            api_port,
            ws_url,
            token_calls: AtomicUsize::new(0),
            lease_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            gallery_calls: AtomicUsize::new(0),
            ws_connections: AtomicUsize::new(0),
            ws_closed: Notify::new(),
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/api/v1/access_token", post(token))
            .route("/api/media/asset.json", post(lease))
            .route("/upload", post(upload))
            .route("/api/submit", post(submit))
            .route("/api/submit_gallery_post.json", post(gallery))
            .route("/media/:name", get(media))
            .with_state(state.clone());

        tokio::spawn(async move {
            let _ = axum::serve(api, app).await;
        });
        tokio::spawn(serve_completion(ws, state.clone()));

        Self {
            base_url: format!("http://127.0.0.1:{}", api_port),
            state,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        let mut endpoints = Endpoints::with_base(&self.base_url);
        endpoints.upload_scheme = "http".to_string();
        endpoints
    }

    pub fn client(&self) -> RedditMediaClient {
        RedditMediaClient::new("userAgent", "clientID", "secret", "username", "password")
            .unwrap()
            .with_endpoints(self.endpoints())
    }

    pub fn link(&self, name: &str) -> String {
        format!("{}/media/{}", self.base_url, name)
    }

    pub fn count(&self, counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().unwrap()
    }
}

/// A temp dir holding small fake media files with the given names.
pub fn media_dir(names: &[&str]) -> (tempfile::TempDir, Vec<String>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = names
        .iter()
        .map(|name| {
            let path: PathBuf = dir.path().join(name);
            std::fs::write(&path, format!("fake-bytes-of-{}", name)).unwrap();
            path.to_string_lossy().into_owned()
        })
        .collect();
    (dir, paths)
}

pub fn settings() -> PostSettings {
    PostSettings::new("s", "media test")
}

async fn token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.token_auth.push(header_value(&headers, header::AUTHORIZATION));
        recorded.token_forms.push(form);
    }
    Json(state.options.token_body.clone())
}

async fn lease(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.lease_calls.fetch_add(1, Ordering::SeqCst);
    let filepath = form.get("filepath").cloned().unwrap_or_default();
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.lease_auth.push(header_value(&headers, header::AUTHORIZATION));
        recorded.leases.push(form);
    }

    if state.options.failing_lease.as_deref() == Some(filepath.as_str()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "lease exploded").into_response();
    }
    if let Some((slow, delay)) = &state.options.slow_lease {
        if *slow == filepath {
            tokio::time::sleep(*delay).await;
        }
    }

    let websocket_url = match state.options.completion {
        CompletionScript::NoChannel => Value::Null,
        _ => Value::String(state.ws_url.clone()),
    };

    Json(json!({
        "args": {
            "action": format!("//127.0.0.1:{}/upload", state.api_port),
            "fields": [
                {"name": "key", "value": format!("uploads/{}", filepath)},
                {"name": "acl", "value": "private"}
            ]
        },
        "asset": {
            "asset_id": format!("asset-{}", filepath),
            "websocket_url": websocket_url
        }
    }))
    .into_response()
}

async fn upload(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);
    state
        .recorded
        .lock()
        .unwrap()
        .uploads
        .push((header_value(&headers, header::CONTENT_TYPE), body.to_vec()));

    (StatusCode::CREATED, state.options.upload_body.clone()).into_response()
}

async fn submit(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    state.submit_calls.fetch_add(1, Ordering::SeqCst);
    state.recorded.lock().unwrap().submits.push(form);
    Json(state.options.submit_body.clone())
}

async fn gallery(State(state): State<Arc<MockState>>, Json(payload): Json<Value>) -> Json<Value> {
    state.gallery_calls.fetch_add(1, Ordering::SeqCst);
    state.recorded.lock().unwrap().galleries.push(payload);
    Json(state.options.gallery_body.clone())
}

async fn media(Path(name): Path<String>) -> Response {
    if name.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    REMOTE_IMAGE.to_vec().into_response()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn serve_completion(listener: TcpListener, state: Arc<MockState>) {
    while let Ok((stream, _)) = listener.accept().await {
        let state = state.clone();
        tokio::spawn(async move {
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                return;
            };
            state.ws_connections.fetch_add(1, Ordering::SeqCst);

            if let CompletionScript::Message(text) = &state.options.completion {
                let _ = ws.send(Message::text(text.clone())).await;
            }

            // Hold the connection until the client closes it.
            while let Some(Ok(frame)) = ws.next().await {
                if frame.is_close() {
                    break;
                }
            }
            state.ws_closed.notify_one();
        });
    }
}
