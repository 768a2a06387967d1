//! Health reporting.
//!
//! Distinguishes a valid catalog that merely matched nothing from a catalog
//! that is empty or was never loaded, and reports model reachability.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::ml_client::ModelHealth;

/// State of the image catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogHealth {
    Ok { images: usize },
    Empty,
    NotLoaded,
}

impl CatalogHealth {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl fmt::Display for CatalogHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok { images } => write!(f, "ok ({} images)", images),
            Self::Empty => f.write_str("error: empty catalog"),
            Self::NotLoaded => f.write_str("error: not loaded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Degraded => f.write_str("degraded"),
        }
    }
}

/// Per-dependency status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    #[serde(serialize_with = "as_display")]
    pub vectorstore: CatalogHealth,
    #[serde(serialize_with = "as_display")]
    pub ml: ModelHealth,
}

/// Overall health. Degraded whenever the catalog is unusable; an unreachable
/// model is reported but does not degrade the status, since refine and demo
/// keep working without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub services: ServiceHealth,
}

impl HealthReport {
    #[must_use]
    pub const fn new(vectorstore: CatalogHealth, ml: ModelHealth) -> Self {
        let status = if vectorstore.is_ok() {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            services: ServiceHealth { vectorstore, ml },
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

fn as_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
