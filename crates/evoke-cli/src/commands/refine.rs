use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use evoke_service::{RefineRequest, RetrievalService};

use super::{print_images, print_json, print_mood};

/// Where the base embedding comes from.
#[derive(Debug)]
pub enum EmbeddingSource {
    /// A JSON file, or stdin for `-`.
    File(PathBuf),
    /// The demo fixture.
    Demo,
}

/// Slider values as given on the command line; missing ones are rejected by
/// the service.
#[derive(Debug, Clone, Copy)]
pub struct SliderArgs {
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub texture: Option<f64>,
}

/// Accepts a bare array or any object with an `embedding` field, such as
/// the output of `evoke analyze --json`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingFile {
    Bare(Vec<f64>),
    Wrapped { embedding: Vec<f64> },
}

impl From<EmbeddingFile> for Vec<f64> {
    fn from(file: EmbeddingFile) -> Self {
        match file {
            EmbeddingFile::Bare(values) | EmbeddingFile::Wrapped { embedding: values } => values,
        }
    }
}

pub fn run_refine(
    service: &RetrievalService,
    source: EmbeddingSource,
    sliders: SliderArgs,
    json: bool,
) -> Result<()> {
    let embedding = match source {
        EmbeddingSource::File(path) => read_embedding(&path)?,
        EmbeddingSource::Demo => service.demo()?.embedding.into_inner(),
    };

    let request = RefineRequest {
        embedding: Some(embedding),
        energy: sliders.energy,
        valence: sliders.valence,
        tempo: sliders.tempo,
        texture: sliders.texture,
    };
    let response = service.refine(request)?;

    if json {
        return print_json(&response);
    }

    println!("\n🎚  Refined mood board\n");
    print_mood(&response.mood);
    print_images(&response.images);

    Ok(())
}

fn read_embedding(path: &Path) -> Result<Vec<f64>> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read embedding from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    parse_embedding(&text)
}

fn parse_embedding(text: &str) -> Result<Vec<f64>> {
    let file: EmbeddingFile = serde_json::from_str(text)
        .context("Expected a JSON array of numbers or an object with an \"embedding\" array")?;
    Ok(file.into())
}
