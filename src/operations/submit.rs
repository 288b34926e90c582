use crate::client::RedditMediaClient;
use crate::context::Context;
use crate::error::RedmedError;
use crate::models::SubmissionRequest;
use log::{error, info};

/// Result of a media submission operation
#[derive(Debug)]
pub struct SubmitResult {
    /// Fullname of the created post (e.g. `t3_abc123`)
    pub fullname: String,
    /// Formatted message for CLI output
    pub message: String,
}

/// Operation for submitting an image, video or gallery post
pub struct SubmitOperation {
    request: SubmissionRequest,
    client: RedditMediaClient,
}

impl SubmitOperation {
    pub fn new(request: SubmissionRequest, client: RedditMediaClient) -> Self {
        Self { request, client }
    }

    fn describe(&self) -> &'static str {
        match self.request {
            SubmissionRequest::Image(_) => "image",
            SubmissionRequest::Video(_) => "video",
            SubmissionRequest::Gallery(_) => "gallery",
        }
    }

    /// Execute the submission
    pub async fn execute(&mut self, ctx: &Context) -> Result<SubmitResult, RedmedError> {
        let settings = self.request.settings();
        info!(
            "Submitting {} post to r/{}: '{}'",
            self.describe(),
            settings.subreddit_name(),
            settings.title
        );

        let fullname = self.client.submit(&self.request, ctx).await?;
        let message = format!("Post created successfully! ID: {}", fullname);

        Ok(SubmitResult { fullname, message })
    }
}

/// CLI handler function for the image, video and gallery commands
pub async fn handle_submit_command(
    request: SubmissionRequest,
    client: RedditMediaClient,
    ctx: &Context,
) -> Result<String, RedmedError> {
    let mut operation = SubmitOperation::new(request, client);
    match operation.execute(ctx).await {
        Ok(result) => {
            info!("{}", result.message);
            Ok(result.fullname)
        }
        Err(err) => {
            error!("Error submitting post: {}", err);
            Err(err)
        }
    }
}
