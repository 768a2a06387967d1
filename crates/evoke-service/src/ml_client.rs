//! Client for the external audio embedding model.
//!
//! The model accepts raw audio as a multipart upload and answers with an
//! embedding in the image space plus four mood scalars. Calls are bounded by
//! a timeout and are never retried: a failure is reported to the caller as
//! is.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use evoke_core::{Embedding, MoodReading};

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::request::AudioUpload;

/// What the model reports for one clip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelAnalysis {
    pub embedding: Embedding,
    #[serde(flatten)]
    pub mood: MoodReading,
}

/// Outcome of probing the model's health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelHealth {
    /// The model answered with a success status.
    Ok,
    /// The model answered, but with a failure status.
    Error,
    /// The model could not be reached within the probe timeout.
    Unreachable,
}

impl ModelHealth {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for ModelHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can turn audio into an embedding and mood reading.
#[async_trait]
pub trait AudioAnalyzer: fmt::Debug + Send + Sync {
    /// Analyze one clip.
    async fn analyze(&self, upload: &AudioUpload) -> ServiceResult<ModelAnalysis>;

    /// Check whether the analyzer is reachable.
    async fn probe(&self) -> ModelHealth;
}

/// HTTP client for the embedding model service.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    base_url: String,
    health_timeout: Duration,
}

impl MlClient {
    /// Create a new model client.
    ///
    /// `timeout` bounds every analyze call; `health_timeout` bounds the
    /// health probe.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("evoke/0.1.0 (https://github.com/evoke/evoke)")
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            health_timeout,
        })
    }

    /// Create a client from the configured URL and timeouts.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.ml_service_url.clone(),
            config.ml_timeout(),
            config.health_timeout(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AudioAnalyzer for MlClient {
    async fn analyze(&self, upload: &AudioUpload) -> ServiceResult<ModelAnalysis> {
        let part = Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        let form = Form::new().part("audio", part);

        log::debug!("Sending {} to {}", upload.filename, self.base_url);

        let response = self
            .http
            .post(self.endpoint("analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Could not read model error body: {}", e);
                    format!("<unreadable body: {}>", e)
                }
            };
            return Err(ServiceError::Upstream {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response
            .json::<ModelAnalysis>()
            .await
            .map_err(|e| ServiceError::Upstream {
                status: None,
                message: format!("malformed analysis: {}", e),
            })
    }

    async fn probe(&self) -> ModelHealth {
        let result = self
            .http
            .get(self.endpoint("health"))
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ModelHealth::Ok,
            Ok(response) => {
                log::warn!("Model health check returned {}", response.status());
                ModelHealth::Error
            }
            Err(e) => {
                log::warn!("Model health check failed: {}", e);
                ModelHealth::Unreachable
            }
        }
    }
}
