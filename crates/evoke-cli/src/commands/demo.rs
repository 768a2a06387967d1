use anyhow::Result;
use std::path::Path;

use evoke_service::{AudioUpload, RetrievalService};

use super::{print_images, print_json, print_mood};

pub fn show_demo(service: &RetrievalService, json: bool) -> Result<()> {
    let demo = service.demo()?;

    if json {
        return print_json(&demo);
    }

    println!("\n✨ Demo mood board\n");
    print_mood(&demo.mood);
    print_images(&demo.images);

    Ok(())
}

pub async fn build_demo(
    service: &RetrievalService,
    audio: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let upload = audio.map(AudioUpload::from_path).transpose()?;

    match &upload {
        Some(upload) => println!("Analyzing demo clip {}...", upload.filename),
        None => println!("No demo clip given; centering the demo on the catalog..."),
    }

    let fixture = service.build_demo(upload.as_ref()).await?;
    fixture.write_to(output)?;

    log::info!("Wrote demo fixture to {}", output.display());
    println!("✓ Wrote demo fixture ({} images)", fixture.images.len());
    println!("  to {}", output.display());

    Ok(())
}
