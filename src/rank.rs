//! Chunk-to-parent result aggregation
//!
//! A similarity search retrieves a pool of candidate chunks; ranking happens
//! at parent-document granularity. Each parent is scored as the sum of
//! `1 - cosine_distance` over its candidate chunks, so a document with
//! several independently relevant chunks outranks a document with a single
//! strong match. This also keeps one article from appearing multiple times
//! in the result list, which a plain chunk-level top-k would.

use std::collections::HashMap;

/// A candidate chunk returned by the vector index.
#[derive(Debug, Clone)]
pub struct ChunkHit {
    /// Parent document id
    pub document_id: i64,
    /// Cosine distance to the query (lower is more similar)
    pub distance: f64,
}

/// A parent document with its aggregate score.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentScore {
    pub document_id: i64,
    pub score: f64,
}

/// Aggregate candidate chunks to parent documents and return the `top_k`
/// parents ordered by score descending.
pub fn rank_parents(hits: &[ChunkHit], top_k: usize) -> Vec<ParentScore> {
    let mut scores: HashMap<i64, f64> = HashMap::new();
    for hit in hits {
        *scores.entry(hit.document_id).or_insert(0.0) += 1.0 - hit.distance;
    }

    let mut ranked: Vec<ParentScore> = scores
        .into_iter()
        .map(|(document_id, score)| ParentScore { document_id, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_k);
    ranked
}
