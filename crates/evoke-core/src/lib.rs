//! Core data model for evoke.
//!
//! This crate defines the embedding types shared by the search and
//! steering engine, the immutable image catalog with its mood direction
//! vectors, the precomputed demo fixture, and the loader that reads them
//! from a static dataset directory.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod dataset;
pub mod error;
pub mod model;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use model::{
    Catalog, CatalogEntry, DemoFixture, DirectionVectorSet, Embedding, MoodAxis, MoodReading,
    MoodSliders, SearchResult,
};
