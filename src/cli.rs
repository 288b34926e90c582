use crate::models::{
    Flair, GalleryRequest, ImageRequest, PostSettings, SubmissionRequest, VideoKind, VideoRequest,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "redmedia",
    version = "0.1",
    about = "Post images, videos and galleries to Reddit."
)]
pub struct Cli {
    /// Give up after this many seconds (overrides REDDIT_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every post kind.
#[derive(clap::Args, Debug, Clone)]
pub struct PostArgs {
    /// The name of the subreddit to post to.
    #[arg(help = "Subreddit name", required = true)]
    pub subreddit: String,

    /// Title of the post.
    #[arg(help = "Post title", required = true)]
    pub title: String,

    #[arg(long, help = "Mark the post NSFW")]
    pub nsfw: bool,

    #[arg(long, help = "Mark the post as a spoiler")]
    pub spoiler: bool,

    #[arg(long, help = "Fail instead of resubmitting an already-posted link")]
    pub no_resubmit: bool,

    #[arg(long, help = "Do not send replies to the inbox")]
    pub no_send_replies: bool,

    #[arg(long, help = "Flair template ID")]
    pub flair_id: Option<String>,

    #[arg(long, help = "Flair text")]
    pub flair_text: Option<String>,
}

impl PostArgs {
    pub fn settings(&self) -> PostSettings {
        let flair = if self.flair_id.is_some() || self.flair_text.is_some() {
            Some(Flair {
                id: self.flair_id.clone(),
                text: self.flair_text.clone(),
            })
        } else {
            None
        };

        PostSettings {
            subreddit: self.subreddit.clone(),
            title: self.title.clone(),
            nsfw: self.nsfw,
            spoiler: self.spoiler,
            resubmit: !self.no_resubmit,
            send_replies: !self.no_send_replies,
            flair,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Post a .png, .jpg, .jpeg or .gif image from a local path or link.
    Image {
        #[command(flatten)]
        post: PostArgs,

        #[arg(long, help = "Local path or link to the image", required = true)]
        path: String,
    },

    /// Post a .mp4 or .mov video from a local path or link.
    Video {
        #[command(flatten)]
        post: PostArgs,

        #[arg(long, help = "Local path or link to the video", required = true)]
        path: String,

        #[arg(long, help = "Poster image shown before playback")]
        thumbnail: Option<String>,

        #[arg(long, help = "Post as a silent looping videogif")]
        gif: bool,
    },

    /// Post a gallery of images from local paths and/or links.
    Gallery {
        #[command(flatten)]
        post: PostArgs,

        #[arg(long = "path", help = "Image path or link (repeat for each item)", required = true)]
        paths: Vec<String>,
    },
}

impl Commands {
    pub fn into_request(self) -> SubmissionRequest {
        match self {
            Commands::Image { post, path } => SubmissionRequest::Image(ImageRequest {
                settings: post.settings(),
                path,
            }),
            Commands::Video {
                post,
                path,
                thumbnail,
                gif,
            } => SubmissionRequest::Video(VideoRequest {
                settings: post.settings(),
                kind: if gif {
                    VideoKind::VideoGif
                } else {
                    VideoKind::Video
                },
                path,
                thumbnail_path: thumbnail,
            }),
            Commands::Gallery { post, paths } => SubmissionRequest::Gallery(GalleryRequest {
                settings: post.settings(),
                paths,
            }),
        }
    }
}
