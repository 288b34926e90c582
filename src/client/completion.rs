//! Waiting on the websocket that announces when a submitted post is ready.

use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::CompletionMessage;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::Connector;

/// How long a normal exit waits for the close handshake.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Connection settings for completion channels, shared read-only by all waits.
#[derive(Clone, Default)]
pub struct CompletionDialer {
    /// TLS connector for `wss://` addresses; `None` uses the default roots
    pub connector: Option<Connector>,
    pub config: Option<WebSocketConfig>,
}

/// Terminal interpretation of one completion message.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Failure,
}

impl CompletionMessage {
    /// Type `failed` or an empty redirect is a failure; any other type with a
    /// redirect is a success. Every decoded message is terminal.
    pub fn outcome(&self) -> Outcome {
        if self.kind == "failed" || self.payload.redirect.is_empty() {
            Outcome::Failure
        } else {
            Outcome::Success(self.payload.redirect.clone())
        }
    }
}

/// Blocks on a completion channel until it reports a terminal message.
#[derive(Clone, Default)]
pub struct CompletionWaiter {
    dialer: CompletionDialer,
}

impl CompletionWaiter {
    pub fn new(dialer: CompletionDialer) -> Self {
        Self { dialer }
    }

    /// Wait for the redirect announced on `address`.
    ///
    /// An empty address means the submission never issued a channel and
    /// resolves to an empty redirect at once.
    pub async fn wait_for_completion(&self, address: &str, ctx: &Context) -> Result<String> {
        if address.is_empty() {
            return Ok(String::new());
        }

        let (stream, _) = ctx
            .run(tokio_tungstenite::connect_async_tls_with_config(
                address,
                self.dialer.config.clone(),
                false,
                self.dialer.connector.clone(),
            ))
            .await
            .map_err(timeout_for_deadline)?
            .map_err(|e| RedmedError::Channel(format!("dialing websocket connection: {}", e)))?;
        debug!("Completion channel open at {}", address);

        let (mut sink, mut reader) = stream.split();
        let (tx, rx) = oneshot::channel();

        let listener = tokio::spawn(async move {
            let outcome = listen(&mut reader).await;
            // The waiter may already be gone after a cancellation.
            let _ = tx.send(outcome);
        });

        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(RedmedError::Cancelled),
            _ = ctx.deadline_elapsed() => Err(RedmedError::CompletionTimeout),
            outcome = rx => outcome.unwrap_or_else(|_| {
                Err(RedmedError::Channel("listener exited without a result".to_string()))
            }),
        };

        listener.abort();

        match &result {
            Err(err) if err.is_cancellation() => {
                warn!("Abandoning completion channel {}: {}", address, err);
                tokio::spawn(async move {
                    let _ = sink.close().await;
                });
            }
            _ => {
                let _ = tokio::time::timeout(CLOSE_GRACE, sink.close()).await;
            }
        }

        result
    }
}

fn timeout_for_deadline(err: RedmedError) -> RedmedError {
    match err {
        RedmedError::DeadlineExceeded => RedmedError::CompletionTimeout,
        other => other,
    }
}

/// Read until one terminal message arrives. Control and binary frames are skipped.
async fn listen<S>(reader: &mut S) -> Result<String>
where
    S: futures_util::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin,
{
    while let Some(frame) = reader.next().await {
        let frame = frame
            .map_err(|e| RedmedError::Channel(format!("reading websocket message: {}", e)))?;

        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => {
                return Err(RedmedError::Channel(
                    "connection closed before a terminal message".to_string(),
                ))
            }
            _ => continue,
        };

        let message: CompletionMessage = serde_json::from_str(&text).map_err(|e| {
            RedmedError::Channel(format!("unmarshalling websocket message: {}", e))
        })?;
        debug!("Completion message of type {:?}", message.kind);

        return match message.outcome() {
            Outcome::Success(redirect) => {
                info!("Post ready at {}", redirect);
                Ok(redirect)
            }
            Outcome::Failure => Err(RedmedError::CompletionFailure(text.to_string())),
        };
    }

    Err(RedmedError::Channel(
        "connection closed before a terminal message".to_string(),
    ))
}
