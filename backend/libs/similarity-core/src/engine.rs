/// Similar-item engine
///
/// Built once from a catalog snapshot and read-only afterwards, so a single
/// instance can be shared behind an `Arc` by any number of query handlers.
use ndarray::{Array2, Axis};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, info};

use crate::config::{EngineConfig, SimilarityMetric};
use crate::error::{Result, SimilarityError};
use crate::models::CatalogRecord;
use crate::reducer::{self, ReducedMatrix};
use crate::title_index::TitleIndex;
use crate::vectorizer::TermWeightMatrix;

/// Number of recommendations returned when the caller does not choose
pub const DEFAULT_RECOMMENDATIONS: usize = 10;

/// Scores closer than this are ranked as equal
const SCORE_RESOLUTION: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub row: usize,
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub catalog_size: usize,
    pub distinct_titles: usize,
    pub vocabulary_size: usize,
    pub dimensions: usize,
    pub metric: SimilarityMetric,
    pub explained_variance: f64,
}

#[derive(Debug)]
pub struct SimilarityEngine {
    titles: Vec<String>,
    index: TitleIndex,
    vocabulary_size: usize,
    reduced: ReducedMatrix,
    /// Vectors actually scored; unit-normalized copies for `Cosine`
    scoring: Array2<f64>,
    metric: SimilarityMetric,
}

impl SimilarityEngine {
    /// Vectorize, reduce and index the catalog
    ///
    /// Fails with `DegenerateCorpus` when no category text contributes a
    /// single vocabulary term.
    pub fn build(records: &[CatalogRecord], config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let texts: Vec<&str> = records.iter().map(|r| r.category_text.as_str()).collect();
        let matrix = TermWeightMatrix::build(&texts, &config.vectorizer)?;
        let reduced = reducer::reduce(&matrix, config.target_dims, config.svd)?;
        let index = TitleIndex::build(records);

        let scoring = match config.metric {
            SimilarityMetric::DotProduct => reduced.vectors().clone(),
            SimilarityMetric::Cosine => unit_rows(reduced.vectors()),
        };

        info!(
            records = records.len(),
            vocabulary = matrix.vocabulary_size(),
            dimensions = reduced.dimensions(),
            metric = %config.metric,
            "Similarity engine built"
        );

        Ok(Self {
            titles: records.iter().map(|r| r.title.clone()).collect(),
            index,
            vocabulary_size: matrix.vocabulary_size(),
            reduced,
            scoring,
            metric: config.metric,
        })
    }

    /// Titles most similar to `title`, best first
    ///
    /// An unknown title yields an empty list rather than an error.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .recommend_scored(title, k)?
            .into_iter()
            .map(|item| item.title)
            .collect())
    }

    pub fn recommend_scored(&self, title: &str, k: usize) -> Result<Vec<ScoredItem>> {
        if k == 0 {
            return Err(SimilarityError::InvalidArgument(
                "k must be positive".to_string(),
            ));
        }

        let Some(query) = self.index.lookup(title) else {
            debug!(title, "No catalog entry for title");
            return Ok(Vec::new());
        };

        let scores = self.scoring.dot(&self.scoring.row(query));

        let mut ranked: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(row, _)| *row != query)
            .collect();
        // Stable: equal scores keep catalog order
        ranked.sort_by_key(|&(_, score)| Reverse(rank_key(score)));
        ranked.truncate(k);

        debug!(title, row = query, returned = ranked.len(), "Ranked similar items");

        Ok(ranked
            .into_iter()
            .map(|(row, score)| ScoredItem {
                row,
                title: self.titles[row].clone(),
                score,
            })
            .collect())
    }

    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.index.lookup(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn reduced(&self) -> &ReducedMatrix {
        &self.reduced
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            catalog_size: self.titles.len(),
            distinct_titles: self.index.len(),
            vocabulary_size: self.vocabulary_size,
            dimensions: self.reduced.dimensions(),
            metric: self.metric,
            explained_variance: self.reduced.explained_variance_ratio().iter().sum(),
        }
    }
}

/// Scores quantized to `SCORE_RESOLUTION`, so values that differ only by
/// solver rounding compare equal (and `-0.0 == 0.0`)
fn rank_key(score: f64) -> i64 {
    (score / SCORE_RESOLUTION).round() as i64
}

fn unit_rows(vectors: &Array2<f64>) -> Array2<f64> {
    let mut normalized = vectors.clone();
    for mut row in normalized.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    normalized
}
