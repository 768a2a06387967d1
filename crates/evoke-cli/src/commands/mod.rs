pub mod analyze;
pub mod config;
pub mod demo;
pub mod health;
pub mod refine;
pub mod status;

pub use analyze::run_analyze;
pub use demo::{build_demo, show_demo};
pub use health::run_health;
pub use refine::{run_refine, EmbeddingSource, SliderArgs};
pub use status::show_status;

use anyhow::Result;
use evoke_core::{MoodReading, SearchResult};
use serde::Serialize;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_mood(mood: &MoodReading) {
    println!(
        "  Mood: energy {:.2}  valence {:.2}  tempo {:.2}  texture {:.2}",
        mood.energy, mood.valence, mood.tempo, mood.texture
    );
}

pub(crate) fn print_images(images: &[SearchResult]) {
    if images.is_empty() {
        println!("\n  No matching images (is the catalog loaded? try `evoke health`)");
        return;
    }

    println!();
    for (rank, image) in images.iter().enumerate() {
        println!(
            "  {:>2}. [{:>4}] {:.4}  {}",
            rank + 1,
            image.id,
            image.score,
            image.url
        );
    }
}
