use evoke_service::{Config, RetrievalService};

pub fn show_status(service: &RetrievalService, config: &Config) {
    println!("\n📊 Evoke Status\n");
    println!("  Dataset: {}", config.data_dir.display());

    let Some(dataset) = service.dataset() else {
        println!("  Catalog: not loaded");
        println!("\n  Check the dataset directory, or run with --data-dir");
        return;
    };

    let catalog = &dataset.catalog;
    println!("  Catalog images: {}", catalog.len());

    match catalog.dimension() {
        Some(dim) => {
            println!("  Embedding dimension: {}", dim);
            let drifting = catalog.drifting_entries().count();
            if drifting > 0 {
                println!("  Entries with a different dimension: {}", drifting);
            }
        }
        None => println!("  Embedding dimension: n/a (catalog is empty)"),
    }

    println!("  Direction vectors:");
    for (axis, len) in dataset.directions.lengths() {
        println!("    {:<8} {}", axis.name(), len);
    }

    match &dataset.demo {
        Some(demo) => println!("  Demo fixture: {} images", demo.images.len()),
        None => {
            println!("  Demo fixture: none");
            println!("\n  Run `evoke demo build` to create one");
        }
    }
}
