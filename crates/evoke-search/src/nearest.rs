use evoke_core::{Catalog, CatalogEntry, SearchResult};

/// Euclidean distance over the shared prefix of `a` and `b`.
///
/// Coordinates past the shorter vector's end are ignored rather than
/// rejected.
#[must_use]
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .fold(0.0, |sum, (x, y)| {
            let d = x - y;
            sum + d * d
        })
        .sqrt()
}

/// Rank the catalog by distance to `query` and return the closest `k`.
///
/// This is a linear scan: O(N·D) per query with no index structure. Results
/// are sorted by ascending score; ties keep catalog order, so identical
/// inputs always produce identical output. An empty catalog yields an empty
/// result for any `k`.
#[must_use]
pub fn search(catalog: &Catalog, query: &[f64], k: usize) -> Vec<SearchResult> {
    let mut scored: Vec<(&CatalogEntry, f64)> = catalog
        .iter()
        .map(|entry| (entry, l2_distance(query, &entry.embedding)))
        .collect();

    // Stable sort: equal distances stay in load order.
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(k);

    log::debug!(
        "Searched {} catalog images, returning {}",
        catalog.len(),
        scored.len()
    );

    scored
        .into_iter()
        .map(|(entry, score)| SearchResult {
            id: entry.id,
            url: entry.url.clone(),
            score,
        })
        .collect()
}
