//! Demo fixture precomputation.
//!
//! The demo operation serves a stored analysis so that visitors can try the
//! mood board without uploading audio. These helpers produce that fixture
//! from a real clip, or synthesize one from the catalog when no clip is at
//! hand.

use evoke_core::{DemoFixture, Embedding, MoodSliders};

use crate::error::{ServiceError, ServiceResult};
use crate::request::AudioUpload;
use crate::retrieval::{RetrievalService, TOP_K};

impl RetrievalService {
    /// Build a demo fixture from `upload`, or synthesize one when `None`.
    pub async fn build_demo(&self, upload: Option<&AudioUpload>) -> ServiceResult<DemoFixture> {
        let Some(upload) = upload else {
            return self.synthesize_demo();
        };

        let response = self.analyze(upload).await?;
        Ok(DemoFixture {
            embedding: response.embedding,
            mood: response.mood,
            images: response.images,
        })
    }

    /// A fixture centered on the catalog: the normalized mean embedding with
    /// every mood at neutral.
    pub fn synthesize_demo(&self) -> ServiceResult<DemoFixture> {
        let centroid = self
            .dataset()
            .and_then(|dataset| dataset.catalog.centroid())
            .ok_or(ServiceError::CatalogUnavailable)?;

        let norm = centroid.norm();
        let embedding: Embedding = if norm > 0.0 {
            centroid.iter().map(|v| v / norm).collect()
        } else {
            centroid
        };

        log::info!("Synthesized demo fixture from {}-dimensional centroid", embedding.dim());

        let images = self.search(&embedding, TOP_K);
        Ok(DemoFixture {
            embedding,
            mood: MoodSliders::NEUTRAL.into(),
            images,
        })
    }
}
