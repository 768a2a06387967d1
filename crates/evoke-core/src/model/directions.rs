use serde::{Deserialize, Serialize};

use crate::model::embedding::Embedding;
use crate::model::mood::MoodAxis;

/// One direction vector per mood axis, loaded once with the catalog.
///
/// Each vector may differ in length from the embeddings it steers; steering
/// only applies over the shared prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionVectorSet {
    pub energy: Embedding,
    pub valence: Embedding,
    pub tempo: Embedding,
    pub texture: Embedding,
}

impl DirectionVectorSet {
    #[must_use]
    pub const fn new(
        energy: Embedding,
        valence: Embedding,
        tempo: Embedding,
        texture: Embedding,
    ) -> Self {
        Self {
            energy,
            valence,
            tempo,
            texture,
        }
    }

    /// The same vector for every axis. Mostly useful in tests.
    #[must_use]
    pub fn uniform(direction: &Embedding) -> Self {
        Self::new(
            direction.clone(),
            direction.clone(),
            direction.clone(),
            direction.clone(),
        )
    }

    #[must_use]
    pub const fn get(&self, axis: MoodAxis) -> &Embedding {
        match axis {
            MoodAxis::Energy => &self.energy,
            MoodAxis::Valence => &self.valence,
            MoodAxis::Tempo => &self.tempo,
            MoodAxis::Texture => &self.texture,
        }
    }

    /// `(axis, length)` pairs in accumulation order.
    pub fn lengths(&self) -> impl Iterator<Item = (MoodAxis, usize)> + '_ {
        MoodAxis::ALL
            .into_iter()
            .map(move |axis| (axis, self.get(axis).dim()))
    }
}
