//! Submit images, videos and galleries to Reddit.
//!
//! Each submission authenticates, uploads its media through an upload
//! lease, creates the post and (for image and video posts) waits on the
//! completion websocket before returning the post's fullname.

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod operations;

pub use client::RedditMediaClient;
pub use config::{AppConfig, Endpoints};
pub use context::Context;
pub use error::{RedmedError, Result};
