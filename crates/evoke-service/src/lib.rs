//! Retrieval service for evoke.
//!
//! Composes mood steering and nearest-neighbor search behind the analyze,
//! refine, demo and health operations, validates boundary input, and talks
//! to the external audio embedding model over HTTP.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod fixture;
pub mod health;
pub mod ml_client;
pub mod request;
pub mod response;
pub mod retrieval;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use health::{CatalogHealth, HealthReport, HealthStatus};
pub use ml_client::{AudioAnalyzer, MlClient, ModelAnalysis, ModelHealth};
pub use request::{AudioUpload, RefineRequest};
pub use response::{AnalyzeResponse, RefineResponse};
pub use retrieval::{RetrievalService, TOP_K};
