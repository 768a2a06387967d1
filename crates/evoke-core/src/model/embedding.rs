use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::error::{Error, Result};

/// A point in the shared audio/image similarity space.
///
/// The dimensionality is fixed by the external model, but the type does not
/// pin a length: catalog entries, queries and direction vectors are combined
/// over their shared prefix when their lengths drift apart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f64>);

impl Embedding {
    /// Wrap raw coordinates without validation.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Wrap raw coordinates, rejecting empty vectors and non-finite values.
    pub fn try_new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidData("embedding is empty".to_string()));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!(
                "embedding has a non-finite value at index {}",
                index
            )));
        }
        Ok(Self(values))
    }

    /// An all-zero embedding of the given dimension.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Euclidean norm, accumulated in index order.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.iter().fold(0.0, |acc, v| acc + v * v).sqrt()
    }
}

impl Deref for Embedding {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[f64]> for Embedding {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for Embedding {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
