use crate::context::Context;
use crate::error::{RedmedError, Result};
use log::debug;
use reqwest::{header, RequestBuilder, StatusCode};
use std::fmt;

/// Why an API or storage call did not produce a usable body.
#[derive(Debug)]
pub(crate) enum HttpFailure {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl HttpFailure {
    /// Raw response body, empty for transport failures.
    pub(crate) fn body(&self) -> &str {
        match self {
            HttpFailure::Transport(_) => "",
            HttpFailure::Status { body, .. } => body,
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HttpFailure::Transport(err) => write!(f, "Request error: {}", err),
            HttpFailure::Status { status, body } => {
                write!(f, "status code {}: {}", status.as_u16(), body)
            }
        }
    }
}

/// Send `request` with the client's user agent and return the body text.
///
/// Only 200 and 201 count as success. Transport and status failures go
/// through `fail` so each phase reports its own error kind; cancellation
/// and deadline errors from `ctx` pass through untouched.
pub(crate) async fn execute<F>(
    request: RequestBuilder,
    user_agent: &str,
    ctx: &Context,
    fail: F,
) -> Result<String>
where
    F: Fn(HttpFailure) -> RedmedError,
{
    let response = ctx
        .run(request.header(header::USER_AGENT, user_agent).send())
        .await?
        .map_err(|e| fail(HttpFailure::Transport(e)))?;

    let status = response.status();
    debug!("Response status: {}", status);

    let body = ctx
        .run(response.text())
        .await?
        .map_err(|e| fail(HttpFailure::Transport(e)))?;

    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(fail(HttpFailure::Status { status, body }));
    }

    Ok(body)
}
