use crate::client::upload::AssetUploader;
use crate::context::Context;
use crate::error::{RedmedError, Result};
use crate::models::Asset;
use log::{debug, info};
use tokio::task::JoinSet;

/// Uploads every source of a multi-item request concurrently.
pub struct GalleryOrchestrator {
    uploader: AssetUploader,
}

impl GalleryOrchestrator {
    pub fn new(uploader: AssetUploader) -> Self {
        Self { uploader }
    }

    /// Upload all `sources`, returning assets in input order.
    ///
    /// The first failure is returned and no assets are. Uploads still in
    /// flight at that point keep running detached and their results are
    /// dropped; staged files are removed as each one finishes.
    pub async fn upload_all(&self, sources: &[String], ctx: &Context) -> Result<Vec<Asset>> {
        info!("Uploading {} gallery items", sources.len());

        let mut slots: Vec<Option<Asset>> = vec![None; sources.len()];
        let mut tasks = JoinSet::new();

        for (index, source) in sources.iter().enumerate() {
            let uploader = self.uploader.clone();
            let source = source.clone();
            let ctx = ctx.clone();
            tasks.spawn(async move { (index, uploader.upload(&source, &ctx).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| RedmedError::Transfer {
                path: "<gallery item>".to_string(),
                reason: format!("upload task failed: {}", e),
            });

            match outcome {
                Ok((index, Ok(asset))) => {
                    debug!("Gallery item {} uploaded as {}", index, asset.id);
                    slots[index] = Some(asset);
                }
                Ok((_, Err(err))) | Err(err) => {
                    tasks.detach_all();
                    return Err(err);
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| RedmedError::Transfer {
                    path: sources[index].clone(),
                    reason: "upload produced no asset".to_string(),
                })
            })
            .collect()
    }
}
