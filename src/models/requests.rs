//! Request value objects for the three submission kinds.

use crate::error::{RedmedError, Result};

/// Post flair. Either field may be absent; absent fields are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flair {
    pub id: Option<String>,
    pub text: Option<String>,
}

/// Fields shared by every submission kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSettings {
    /// The name of the subreddit to post to (with or without an `r/` prefix)
    pub subreddit: String,
    /// Title of the post
    pub title: String,
    pub nsfw: bool,
    pub spoiler: bool,
    pub resubmit: bool,
    pub send_replies: bool,
    pub flair: Option<Flair>,
}

impl PostSettings {
    pub fn new(subreddit: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            title: title.into(),
            nsfw: false,
            spoiler: false,
            resubmit: true,
            send_replies: true,
            flair: None,
        }
    }

    /// Subreddit name without a leading `r/`.
    pub fn subreddit_name(&self) -> &str {
        self.subreddit
            .strip_prefix("r/")
            .unwrap_or(self.subreddit.as_str())
    }

    pub fn flair_id(&self) -> Option<&str> {
        self.flair.as_ref().and_then(|f| f.id.as_deref())
    }

    pub fn flair_text(&self) -> Option<&str> {
        self.flair.as_ref().and_then(|f| f.text.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.subreddit_name().trim().is_empty() {
            return Err(RedmedError::invalid("subreddit", "must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(RedmedError::invalid("title", "must not be empty"));
        }
        Ok(())
    }
}

/// Single image post from a local path or link.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub settings: PostSettings,
    pub path: String,
}

/// Video posts are either regular videos or silent looping "videogif"s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoKind {
    #[default]
    Video,
    VideoGif,
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoKind::Video => "video",
            VideoKind::VideoGif => "videogif",
        }
    }
}

impl std::str::FromStr for VideoKind {
    type Err = RedmedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "video" => Ok(VideoKind::Video),
            "videogif" => Ok(VideoKind::VideoGif),
            _ => Err(RedmedError::invalid("kind", "must be video or videogif")),
        }
    }
}

/// Single video post with an optional poster image.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub settings: PostSettings,
    pub kind: VideoKind,
    pub path: String,
    pub thumbnail_path: Option<String>,
}

/// Multi-image gallery post. Item order is preserved in the post.
#[derive(Debug, Clone)]
pub struct GalleryRequest {
    pub settings: PostSettings,
    pub paths: Vec<String>,
}

/// Any of the supported submissions.
#[derive(Debug, Clone)]
pub enum SubmissionRequest {
    Image(ImageRequest),
    Video(VideoRequest),
    Gallery(GalleryRequest),
}

impl SubmissionRequest {
    pub fn settings(&self) -> &PostSettings {
        match self {
            SubmissionRequest::Image(r) => &r.settings,
            SubmissionRequest::Video(r) => &r.settings,
            SubmissionRequest::Gallery(r) => &r.settings,
        }
    }

    /// Every media source the request will upload, in upload order.
    pub fn sources(&self) -> Vec<&str> {
        match self {
            SubmissionRequest::Image(r) => vec![r.path.as_str()],
            SubmissionRequest::Video(r) => {
                let mut sources = vec![r.path.as_str()];
                if let Some(thumb) = r.thumbnail_path.as_deref() {
                    sources.push(thumb);
                }
                sources
            }
            SubmissionRequest::Gallery(r) => r.paths.iter().map(String::as_str).collect(),
        }
    }

    /// Checks the request shape and every source's media type without touching the network.
    pub fn validate(&self) -> Result<()> {
        self.settings().validate()?;

        match self {
            SubmissionRequest::Image(r) if r.path.is_empty() => {
                return Err(RedmedError::invalid(
                    "path",
                    "must provide a local path or link to image",
                ))
            }
            SubmissionRequest::Video(r) if r.path.is_empty() => {
                return Err(RedmedError::invalid(
                    "path",
                    "must provide a local path or link to video",
                ))
            }
            SubmissionRequest::Video(r) if r.thumbnail_path.as_deref() == Some("") => {
                return Err(RedmedError::invalid(
                    "thumbnail_path",
                    "must be a local path or link when present",
                ))
            }
            SubmissionRequest::Gallery(r) if r.paths.is_empty() => {
                return Err(RedmedError::invalid(
                    "paths",
                    "must provide local paths or links to images",
                ))
            }
            SubmissionRequest::Gallery(r) if r.paths.iter().any(|p| p.is_empty()) => {
                return Err(RedmedError::invalid("paths", "must not contain empty entries"))
            }
            _ => {}
        }

        for source in self.sources() {
            crate::client::upload::media_type(source)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PostSettings {
        PostSettings::new("r/pics", "hello")
    }

    #[test]
    fn new_settings_use_reddit_defaults() {
        let settings = PostSettings::new("r/pics", "t");
        assert!(settings.resubmit);
        assert!(settings.send_replies);
        assert!(!settings.nsfw);
        assert!(!settings.spoiler);
        assert!(settings.flair.is_none());
    }

    #[test]
    fn subreddit_prefix_is_stripped() {
        assert_eq!(settings().subreddit_name(), "pics");
        assert_eq!(PostSettings::new("pics", "t").subreddit_name(), "pics");
    }

    #[test]
    fn video_kind_parses() {
        assert_eq!("video".parse::<VideoKind>().unwrap(), VideoKind::Video);
        assert_eq!("videogif".parse::<VideoKind>().unwrap(), VideoKind::VideoGif);
        assert!("gif".parse::<VideoKind>().is_err());
    }

    #[test]
    fn empty_gallery_is_rejected() {
        let req = SubmissionRequest::Gallery(GalleryRequest {
            settings: settings(),
            paths: vec![],
        });
        assert!(matches!(
            req.validate(),
            Err(RedmedError::InvalidRequest { ref field, .. }) if field == "paths"
        ));
    }

    #[test]
    fn unsupported_source_fails_validation() {
        let req = SubmissionRequest::Image(ImageRequest {
            settings: settings(),
            path: "notes.txt".into(),
        });
        assert!(matches!(
            req.validate(),
            Err(RedmedError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn video_sources_include_thumbnail() {
        let req = SubmissionRequest::Video(VideoRequest {
            settings: settings(),
            kind: VideoKind::Video,
            path: "clip.mp4".into(),
            thumbnail_path: Some("poster.png".into()),
        });
        assert_eq!(req.sources(), vec!["clip.mp4", "poster.png"]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut s = settings();
        s.title = "  ".into();
        let req = SubmissionRequest::Image(ImageRequest {
            settings: s,
            path: "a.png".into(),
        });
        assert!(matches!(
            req.validate(),
            Err(RedmedError::InvalidRequest { ref field, .. }) if field == "title"
        ));
    }
}
