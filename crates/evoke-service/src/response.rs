//! Response payloads, shaped as the boundary serializes them.

use serde::{Deserialize, Serialize};

use evoke_core::{Embedding, MoodReading, SearchResult};

/// Result of analyzing an audio clip.
///
/// Carries the embedding back so the caller can refine it later without
/// re-uploading audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub embedding: Embedding,
    #[serde(flatten)]
    pub mood: MoodReading,
    pub images: Vec<SearchResult>,
}

/// Result of a refine call: the requested sliders, echoed, and the images
/// ranked against the steered embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineResponse {
    #[serde(flatten)]
    pub mood: MoodReading,
    pub images: Vec<SearchResult>,
}
