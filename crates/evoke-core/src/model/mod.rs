pub mod catalog;
pub mod demo;
pub mod directions;
pub mod embedding;
pub mod mood;
pub mod result;

pub use catalog::{Catalog, CatalogEntry, ImageRecord};
pub use demo::DemoFixture;
pub use directions::DirectionVectorSet;
pub use embedding::Embedding;
pub use mood::{MoodAxis, MoodReading, MoodSliders};
pub use result::SearchResult;
