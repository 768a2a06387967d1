use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four semantic axes a mood board can be steered along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodAxis {
    Energy,
    Valence,
    Tempo,
    Texture,
}

impl MoodAxis {
    /// All axes, in the order their contributions are accumulated.
    pub const ALL: [Self; 4] = [Self::Energy, Self::Valence, Self::Tempo, Self::Texture];

    /// How strongly a full slider deflection moves an embedding along this axis.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Energy | Self::Valence => 0.20,
            Self::Tempo | Self::Texture => 0.15,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
            Self::Texture => "texture",
        }
    }
}

impl fmt::Display for MoodAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Desired position on each mood axis.
///
/// Values are intended to lie in `[0, 1]` with `0.5` meaning "no
/// adjustment". Nothing clamps them: out-of-range values flow through the
/// steering arithmetic as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodSliders {
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub texture: f64,
}

impl MoodSliders {
    /// The neutral slider value.
    pub const CENTER: f64 = 0.5;

    /// All four sliders at the neutral position.
    pub const NEUTRAL: Self = Self::new(Self::CENTER, Self::CENTER, Self::CENTER, Self::CENTER);

    #[must_use]
    pub const fn new(energy: f64, valence: f64, tempo: f64, texture: f64) -> Self {
        Self {
            energy,
            valence,
            tempo,
            texture,
        }
    }

    #[must_use]
    pub const fn get(&self, axis: MoodAxis) -> f64 {
        match axis {
            MoodAxis::Energy => self.energy,
            MoodAxis::Valence => self.valence,
            MoodAxis::Tempo => self.tempo,
            MoodAxis::Texture => self.texture,
        }
    }

    /// Signed offset of the slider on `axis` from the neutral position.
    #[must_use]
    pub fn deflection(&self, axis: MoodAxis) -> f64 {
        self.get(axis) - Self::CENTER
    }
}

impl Default for MoodSliders {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// The four mood scalars in the shape the external model reports them and
/// responses echo them (`mood_energy`, `mood_valence`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodReading {
    #[serde(rename = "mood_energy")]
    pub energy: f64,
    #[serde(rename = "mood_valence")]
    pub valence: f64,
    #[serde(rename = "mood_tempo")]
    pub tempo: f64,
    #[serde(rename = "mood_texture")]
    pub texture: f64,
}

impl From<MoodSliders> for MoodReading {
    fn from(sliders: MoodSliders) -> Self {
        Self {
            energy: sliders.energy,
            valence: sliders.valence,
            tempo: sliders.tempo,
            texture: sliders.texture,
        }
    }
}

impl From<MoodReading> for MoodSliders {
    fn from(reading: MoodReading) -> Self {
        Self::new(reading.energy, reading.valence, reading.tempo, reading.texture)
    }
}
