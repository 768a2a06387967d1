//! The retrieval service: steering and search composed behind the
//! operations the boundary layer calls.
//!
//! The service holds the dataset behind an `Arc` and never mutates it, so a
//! single instance can be cloned into any number of concurrent handlers.

use std::sync::Arc;

use evoke_core::{Dataset, DemoFixture, Embedding, MoodReading, MoodSliders, SearchResult};

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::health::{CatalogHealth, HealthReport};
use crate::ml_client::{AudioAnalyzer, MlClient};
use crate::request::{validate_embedding, AudioUpload, RefineRequest};
use crate::response::{AnalyzeResponse, RefineResponse};

/// Number of images returned by analyze and refine.
pub const TOP_K: usize = 20;

#[derive(Debug, Clone)]
pub struct RetrievalService {
    dataset: Option<Arc<Dataset>>,
    analyzer: Arc<dyn AudioAnalyzer>,
}

impl RetrievalService {
    pub fn new(dataset: Dataset, analyzer: Arc<dyn AudioAnalyzer>) -> Self {
        Self {
            dataset: Some(Arc::new(dataset)),
            analyzer,
        }
    }

    /// A service whose dataset failed to load.
    ///
    /// Searches return nothing and the health check reports the catalog as
    /// not loaded.
    pub fn without_dataset(analyzer: Arc<dyn AudioAnalyzer>) -> Self {
        Self {
            dataset: None,
            analyzer,
        }
    }

    /// Build the service from configuration.
    ///
    /// A dataset that fails to load is logged and leaves the service running
    /// without a catalog, so the failure stays visible through `health`.
    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let analyzer: Arc<dyn AudioAnalyzer> = Arc::new(MlClient::from_config(config)?);

        match Dataset::load(&config.data_dir) {
            Ok(dataset) => Ok(Self::new(dataset, analyzer)),
            Err(e) => {
                log::error!("Failed to load dataset: {}", e);
                Ok(Self::without_dataset(analyzer))
            }
        }
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    /// The `k` catalog images closest to `query`.
    #[must_use]
    pub fn search(&self, query: &[f64], k: usize) -> Vec<SearchResult> {
        self.dataset()
            .map(|dataset| evoke_search::search(&dataset.catalog, query, k))
            .unwrap_or_default()
    }

    /// Steer `base` with the dataset's direction vectors.
    ///
    /// Without a dataset there are no directions, so this only normalizes.
    #[must_use]
    pub fn steer(&self, base: &[f64], sliders: &MoodSliders) -> Embedding {
        match self.dataset() {
            Some(dataset) => evoke_search::steer(base, &dataset.directions, sliders),
            None => evoke_search::steer(base, &Default::default(), sliders),
        }
    }

    /// Attach the top images for an embedding the model already produced.
    pub fn analyze_result(
        &self,
        embedding: Embedding,
        mood: MoodReading,
    ) -> ServiceResult<AnalyzeResponse> {
        let embedding = validate_embedding(embedding.into_inner())?;
        let images = self.search(&embedding, TOP_K);
        Ok(AnalyzeResponse {
            embedding,
            mood,
            images,
        })
    }

    /// Send a clip to the model and rank the catalog against its embedding.
    pub async fn analyze(&self, upload: &AudioUpload) -> ServiceResult<AnalyzeResponse> {
        upload.validate()?;
        log::info!("Analyzing {} ({} bytes)", upload.filename, upload.bytes.len());

        let analysis = self.analyzer.analyze(upload).await.map_err(|e| {
            log::warn!("Analysis of {} failed: {}", upload.filename, e);
            e
        })?;

        if analysis.embedding.is_empty() {
            return Err(ServiceError::Upstream {
                status: None,
                message: "model returned an empty embedding".to_string(),
            });
        }

        self.analyze_result(analysis.embedding, analysis.mood)
    }

    /// Steer a previously returned embedding and re-rank the catalog.
    ///
    /// The response echoes the requested sliders rather than anything derived
    /// from the steered embedding.
    pub fn refine(&self, request: RefineRequest) -> ServiceResult<RefineResponse> {
        let (base, sliders) = request.validate()?;
        Ok(self.refine_embedding(&base, sliders))
    }

    /// Refine with already-validated input.
    #[must_use]
    pub fn refine_embedding(&self, base: &[f64], sliders: MoodSliders) -> RefineResponse {
        log::debug!("Refining {}-dimensional embedding with {:?}", base.len(), sliders);
        let steered = self.steer(base, &sliders);
        RefineResponse {
            mood: sliders.into(),
            images: self.search(&steered, TOP_K),
        }
    }

    /// The precomputed demo analysis.
    pub fn demo(&self) -> ServiceResult<DemoFixture> {
        self.dataset()
            .and_then(|dataset| dataset.demo.clone())
            .ok_or(ServiceError::DemoUnavailable)
    }

    #[must_use]
    pub fn catalog_health(&self) -> CatalogHealth {
        match self.dataset() {
            None => CatalogHealth::NotLoaded,
            Some(dataset) if dataset.catalog.is_empty() => CatalogHealth::Empty,
            Some(dataset) => CatalogHealth::Ok {
                images: dataset.catalog.len(),
            },
        }
    }

    /// Check the catalog and probe the model.
    pub async fn health(&self) -> HealthReport {
        let report = HealthReport::new(self.catalog_health(), self.analyzer.probe().await);
        if !report.is_ok() {
            log::warn!("Service degraded: catalog {}", report.services.vectorstore);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use evoke_core::{Catalog, DirectionVectorSet};

    use crate::ml_client::{ModelAnalysis, ModelHealth};

    #[derive(Debug)]
    struct FixedAnalyzer {
        embedding: Vec<f64>,
    }

    #[async_trait]
    impl AudioAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _upload: &AudioUpload) -> ServiceResult<ModelAnalysis> {
            Ok(ModelAnalysis {
                embedding: Embedding::new(self.embedding.clone()),
                mood: MoodSliders::new(0.8, 0.6, 0.4, 0.2).into(),
            })
        }

        async fn probe(&self) -> ModelHealth {
            ModelHealth::Ok
        }
    }

    fn analyzer(embedding: Vec<f64>) -> Arc<dyn AudioAnalyzer> {
        Arc::new(FixedAnalyzer { embedding })
    }

    fn three_image_dataset() -> Dataset {
        let catalog = Catalog::from_embeddings(vec![
            Embedding::new(vec![1.0, 0.0]),
            Embedding::new(vec![0.0, 1.0]),
            Embedding::new(vec![1.0, 1.0]),
        ]);
        let directions = DirectionVectorSet::new(
            Embedding::new(vec![-1.0, 1.0]),
            Embedding::new(vec![0.0, 0.0]),
            Embedding::new(vec![0.0, 0.0]),
            Embedding::new(vec![0.0, 0.0]),
        );
        Dataset::new(catalog, directions, None)
    }

    #[tokio::test]
    async fn test_analyze_ranks_catalog() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0, 0.0]));

        let response = service
            .analyze(&AudioUpload::new("clip.mp3", vec![0xFF, 0xFB]))
            .await
            .unwrap();

        let ids: Vec<usize> = response.images.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 2, 1]);
        assert!((response.mood.energy - 0.8).abs() < f64::EPSILON);
        assert_eq!(response.embedding.as_slice(), &[1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_audio_before_calling_model() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0, 0.0]));

        let err = service
            .analyze(&AudioUpload::new("notes.txt", b"hello".to_vec()))
            .await
            .unwrap_err();

        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_model_embedding() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(Vec::new()));

        let err = service
            .analyze(&AudioUpload::new("clip.wav", vec![1]))
            .await
            .unwrap_err();

        assert!(err.is_upstream());
    }

    #[test]
    fn test_analyze_result_caps_at_top_k() {
        let catalog = Catalog::from_embeddings((0..30u8).map(|i| Embedding::new(vec![f64::from(i)])));
        let dataset = Dataset::new(catalog, DirectionVectorSet::default(), None);
        let service = RetrievalService::new(dataset, analyzer(vec![0.0]));

        let response = service
            .analyze_result(Embedding::new(vec![0.0]), MoodSliders::NEUTRAL.into())
            .unwrap();

        assert_eq!(response.images.len(), TOP_K);
        assert_eq!(response.images[0].id, 0);
    }

    #[test]
    fn test_analyze_result_rejects_empty_embedding() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0]));
        let err = service
            .analyze_result(Embedding::default(), MoodSliders::NEUTRAL.into())
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_refine_echoes_requested_sliders() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0]));
        let sliders = MoodSliders::new(1.0, 0.5, 0.5, 0.5);

        let response = service
            .refine(RefineRequest::new(vec![1.0, 0.0], sliders))
            .unwrap();

        assert_eq!(MoodSliders::from(response.mood), sliders);
        assert_eq!(response.images.len(), 3);
    }

    #[test]
    fn test_refine_ranks_against_steered_embedding() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0]));

        // Energy pushes along [-1, 1]: a strong push turns [1, 0] toward [0, 1].
        let response = service.refine_embedding(&[1.0, 0.0], MoodSliders::new(8.0, 0.5, 0.5, 0.5));
        assert_eq!(response.images[0].id, 1);

        let neutral = service.refine_embedding(&[1.0, 0.0], MoodSliders::NEUTRAL);
        assert_eq!(neutral.images[0].id, 0);
    }

    #[test]
    fn test_refine_rejects_missing_embedding() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0]));
        let err = service.refine(RefineRequest::default()).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_missing_dataset() {
        let service = RetrievalService::without_dataset(analyzer(vec![1.0]));

        assert!(service.search(&[1.0, 0.0], 5).is_empty());
        assert_eq!(service.catalog_health(), CatalogHealth::NotLoaded);
        assert!(matches!(service.demo(), Err(ServiceError::DemoUnavailable)));

        let steered = service.steer(&[3.0, 4.0], &MoodSliders::new(1.0, 1.0, 1.0, 1.0));
        assert!((steered[0] - 0.6).abs() < 1e-12);
        assert!((steered[1] - 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_health_reports_empty_catalog() {
        let dataset = Dataset::new(Catalog::default(), DirectionVectorSet::default(), None);
        let service = RetrievalService::new(dataset, analyzer(vec![1.0]));

        let report = service.health().await;

        assert!(!report.is_ok());
        assert_eq!(report.services.vectorstore, CatalogHealth::Empty);
        assert_eq!(report.services.ml, ModelHealth::Ok);
    }

    #[tokio::test]
    async fn test_health_ok() {
        let service = RetrievalService::new(three_image_dataset(), analyzer(vec![1.0]));
        let report = service.health().await;
        assert!(report.is_ok());
        assert_eq!(report.services.vectorstore, CatalogHealth::Ok { images: 3 });
    }
}
