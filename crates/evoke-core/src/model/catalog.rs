use serde::{Deserialize, Serialize};

use crate::model::embedding::Embedding;

/// An image as stored in the dataset file, before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub embedding: Embedding,
}

/// A retrievable image and its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    /// Stable identity: the entry's position in load order.
    pub id: usize,
    pub url: String,
    pub embedding: Embedding,
}

/// The immutable set of images that searches run against.
///
/// Entries keep their load order, which doubles as the tie-break key when
/// two entries are equally close to a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, assigning ids in record order.
    #[must_use]
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| CatalogEntry {
                id,
                url: record.url,
                embedding: record.embedding,
            })
            .collect();
        Self { entries }
    }

    /// Build a catalog from bare embeddings, with placeholder urls.
    #[must_use]
    pub fn from_embeddings<I>(embeddings: I) -> Self
    where
        I: IntoIterator<Item = Embedding>,
    {
        let records = embeddings
            .into_iter()
            .enumerate()
            .map(|(i, embedding)| ImageRecord {
                url: format!("image-{}", i),
                embedding,
            })
            .collect();
        Self::from_records(records)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Dimension of the first entry, taken as the catalog's nominal dimension.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.embedding.dim())
    }

    /// Entries whose dimension differs from the nominal one.
    pub fn drifting_entries(&self) -> impl Iterator<Item = &CatalogEntry> + '_ {
        let nominal = self.dimension();
        self.entries
            .iter()
            .filter(move |entry| Some(entry.embedding.dim()) != nominal)
    }

    /// Mean embedding over the nominal dimension.
    ///
    /// Coordinates missing from shorter entries count as zero.
    #[must_use]
    pub fn centroid(&self) -> Option<Embedding> {
        let dim = self.dimension()?;
        let mut sum = vec![0.0; dim];
        for entry in &self.entries {
            for (acc, value) in sum.iter_mut().zip(entry.embedding.iter()) {
                *acc += value;
            }
        }
        let count = self.entries.len() as f64;
        Some(sum.into_iter().map(|v| v / count).collect())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, values: Vec<f64>) -> ImageRecord {
        ImageRecord {
            url: url.to_string(),
            embedding: Embedding::new(values),
        }
    }

    #[test]
    fn test_ids_follow_load_order() {
        let catalog = Catalog::from_records(vec![
            record("a.jpg", vec![1.0, 0.0]),
            record("b.jpg", vec![0.0, 1.0]),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().url, "a.jpg");
        assert_eq!(catalog.get(1).unwrap().id, 1);
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.dimension(), None);
        assert_eq!(catalog.centroid(), None);
    }

    #[test]
    fn test_drifting_entries() {
        let catalog = Catalog::from_embeddings(vec![
            Embedding::new(vec![1.0, 0.0, 0.0]),
            Embedding::new(vec![1.0, 0.0]),
            Embedding::new(vec![0.0, 0.0, 1.0]),
        ]);

        assert_eq!(catalog.dimension(), Some(3));
        let drifting: Vec<usize> = catalog.drifting_entries().map(|e| e.id).collect();
        assert_eq!(drifting, vec![1]);
    }

    #[test]
    fn test_centroid() {
        let catalog = Catalog::from_embeddings(vec![
            Embedding::new(vec![1.0, 0.0]),
            Embedding::new(vec![0.0, 1.0]),
        ]);
        let centroid = catalog.centroid().unwrap();
        assert_eq!(centroid.as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn test_record_parses_dataset_shape() {
        let json = r#"[{"url":"https://img/1","embedding":[0.1,0.2]}]"#;
        let records: Vec<ImageRecord> = serde_json::from_str(json).unwrap();
        let catalog = Catalog::from_records(records);
        assert_eq!(catalog.get(0).unwrap().embedding.as_slice(), &[0.1, 0.2]);
    }
}
