use anyhow::Result;
use std::path::Path;

use evoke_service::{AudioUpload, RetrievalService};

use super::{print_images, print_json, print_mood};

pub async fn run_analyze(service: &RetrievalService, audio: &Path, json: bool) -> Result<()> {
    log::info!("Analyzing {}", audio.display());

    let upload = AudioUpload::from_path(audio)?;
    let response = service.analyze(&upload).await?;

    if json {
        return print_json(&response);
    }

    println!("\n🎧 {}\n", upload.filename);
    print_mood(&response.mood);
    print_images(&response.images);

    Ok(())
}
