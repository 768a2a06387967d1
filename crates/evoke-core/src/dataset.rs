//! Static dataset loading.
//!
//! A dataset directory holds three JSON files produced offline:
//!
//! - `images.json`: the catalog, an array of `{url, embedding}` records
//! - `directions.json`: one direction vector per mood axis
//! - `demo.json`: an optional precomputed demo analysis
//!
//! The dataset is read once at start-up and never mutated afterwards.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Catalog, DemoFixture, DirectionVectorSet, ImageRecord};

pub const IMAGES_FILE: &str = "images.json";
pub const DIRECTIONS_FILE: &str = "directions.json";
pub const DEMO_FILE: &str = "demo.json";

/// Everything the retrieval engine reads: catalog, steering directions and
/// the demo fixture.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub catalog: Catalog,
    pub directions: DirectionVectorSet,
    pub demo: Option<DemoFixture>,
}

impl Dataset {
    #[must_use]
    pub const fn new(
        catalog: Catalog,
        directions: DirectionVectorSet,
        demo: Option<DemoFixture>,
    ) -> Self {
        Self {
            catalog,
            directions,
            demo,
        }
    }

    /// Load a dataset directory.
    ///
    /// The catalog and direction files are required. The demo file is
    /// optional: a missing or unreadable one leaves `demo` empty without
    /// affecting the catalog. Dimension drift between entries is tolerated
    /// and logged.
    pub fn load(dir: &Path) -> Result<Self> {
        log::info!("Loading dataset from {}", dir.display());

        let records: Vec<ImageRecord> = read_json(&dir.join(IMAGES_FILE))?;
        let catalog = Catalog::from_records(records);

        let directions: DirectionVectorSet = read_json(&dir.join(DIRECTIONS_FILE))?;

        let demo = read_demo(&dir.join(DEMO_FILE));

        let dataset = Self::new(catalog, directions, demo);
        dataset.warn_dimension_drift();

        log::info!(
            "Loaded {} catalog images (dimension {})",
            dataset.catalog.len(),
            dataset
                .catalog
                .dimension()
                .map_or_else(|| "n/a".to_string(), |d| d.to_string())
        );

        Ok(dataset)
    }

    fn warn_dimension_drift(&self) {
        let Some(nominal) = self.catalog.dimension() else {
            log::warn!("Catalog is empty");
            return;
        };

        let drifting = self.catalog.drifting_entries().count();
        if drifting > 0 {
            log::warn!(
                "{} catalog entries differ from dimension {}; distances use the shared prefix",
                drifting,
                nominal
            );
        }

        for (axis, len) in self.directions.lengths() {
            if len != nominal {
                log::warn!(
                    "{} direction has length {} (catalog dimension {}); steering uses the shared prefix",
                    axis,
                    len,
                    nominal
                );
            }
        }
    }
}

fn read_demo(path: &Path) -> Option<DemoFixture> {
    if !path.exists() {
        log::info!("No demo fixture at {}", path.display());
        return None;
    }

    match read_json::<DemoFixture>(path) {
        Ok(demo) => Some(demo),
        Err(e) => {
            log::warn!("Ignoring unreadable demo fixture: {}", e);
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let dataset_error = |message: String| Error::Dataset {
        file: path.display().to_string(),
        message,
    };

    let file = File::open(path).map_err(|e| dataset_error(e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| dataset_error(e.to_string()))
}
