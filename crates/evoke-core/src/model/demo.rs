use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::model::embedding::Embedding;
use crate::model::mood::{MoodReading, MoodSliders};
use crate::model::result::SearchResult;

/// A precomputed analysis served without an audio upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoFixture {
    pub embedding: Embedding,
    #[serde(flatten)]
    pub mood: MoodReading,
    pub images: Vec<SearchResult>,
}

impl DemoFixture {
    /// The fixture's mood, as slider positions for a follow-up refine.
    #[must_use]
    pub fn sliders(&self) -> MoodSliders {
        self.mood.into()
    }

    /// Write the fixture as JSON, in the same shape the dataset loader reads.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
