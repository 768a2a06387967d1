//! Boundary request types and their validation.
//!
//! Requests arrive loosely shaped; validation turns them into the typed
//! values the engine works with, or rejects them as invalid input before any
//! computation runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use evoke_core::{Embedding, MoodAxis, MoodSliders};

use crate::error::{ServiceError, ServiceResult};

/// Audio file extensions the embedding model accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "flac"];

/// An uploaded audio clip, forwarded verbatim to the embedding model.
#[derive(Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for AudioUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioUpload")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl AudioUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read an upload from disk, keeping only the file name.
    pub fn from_path(path: &Path) -> ServiceResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ServiceError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("not a file path: {}", path.display()))
            })?;
        Ok(Self::new(filename, bytes))
    }

    /// Lower-cased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Reject empty uploads and files that are not a supported audio format.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.bytes.is_empty() {
            return Err(ServiceError::InvalidInput("audio file is empty".to_string()));
        }
        match self.extension() {
            Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(ServiceError::InvalidInput(format!(
                "{} is not an audio file (expected MP3, WAV, OGG or FLAC)",
                self.filename
            ))),
        }
    }
}

/// A refine call as received at the boundary.
///
/// Every field is optional here so that a missing value is reported as
/// invalid input rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefineRequest {
    pub embedding: Option<Vec<f64>>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub texture: Option<f64>,
}

impl RefineRequest {
    pub fn new(embedding: Vec<f64>, sliders: MoodSliders) -> Self {
        Self {
            embedding: Some(embedding),
            energy: Some(sliders.energy),
            valence: Some(sliders.valence),
            tempo: Some(sliders.tempo),
            texture: Some(sliders.texture),
        }
    }

    /// Check the request and split it into a base embedding and sliders.
    ///
    /// Slider values outside `[0, 1]` are accepted as given.
    pub fn validate(self) -> ServiceResult<(Embedding, MoodSliders)> {
        let embedding = validate_embedding(self.embedding.unwrap_or_default())?;
        let sliders = MoodSliders::new(
            require_slider(self.energy, MoodAxis::Energy)?,
            require_slider(self.valence, MoodAxis::Valence)?,
            require_slider(self.tempo, MoodAxis::Tempo)?,
            require_slider(self.texture, MoodAxis::Texture)?,
        );
        Ok((embedding, sliders))
    }
}

/// Accept a non-empty embedding of finite values.
pub fn validate_embedding(values: Vec<f64>) -> ServiceResult<Embedding> {
    if values.is_empty() {
        return Err(ServiceError::InvalidInput("embedding is required".to_string()));
    }
    Embedding::try_new(values).map_err(|e| ServiceError::InvalidInput(e.to_string()))
}

fn require_slider(value: Option<f64>, axis: MoodAxis) -> ServiceResult<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(ServiceError::InvalidInput(format!(
            "{} must be a finite number, got {}",
            axis, v
        ))),
        None => Err(ServiceError::InvalidInput(format!("{} is required", axis))),
    }
}
