use serde::{Deserialize, Serialize};

/// A ranked catalog image.
///
/// `score` is the Euclidean distance to the query: lower is more similar.
/// Only the ordering of a result list is meaningful, not score magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: usize,
    #[serde(rename = "image_url")]
    pub url: String,
    pub score: f64,
}
