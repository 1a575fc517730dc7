use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimilarityError};

/// Number of latent dimensions kept by the reducer unless configured otherwise
pub const DEFAULT_TARGET_DIMS: usize = 20;

/// Stop-word handling for the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopWords {
    English,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub lowercase: bool,
    pub stop_words: StopWords,
    /// Use `1 + ln(tf)` instead of raw counts
    pub sublinear_tf: bool,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in (0.0, 1.0]
    pub max_df: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            stop_words: StopWords::English,
            sublinear_tf: false,
            min_df: 1,
            max_df: 1.0,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(SimilarityError::InvalidArgument(
                "min_df must be at least 1".to_string(),
            ));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(SimilarityError::InvalidArgument(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

/// Solver used by the truncated SVD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvdAlgorithm {
    /// Full SVD of the dense term-weight matrix
    Exact,
    /// Seeded randomized range finder (Halko et al.) followed by an exact SVD
    /// of the projected matrix
    Randomized {
        oversamples: usize,
        power_iterations: usize,
        seed: u64,
    },
}

impl SvdAlgorithm {
    pub fn randomized(seed: u64) -> Self {
        SvdAlgorithm::Randomized {
            oversamples: 10,
            power_iterations: 5,
            seed,
        }
    }
}

impl Default for SvdAlgorithm {
    fn default() -> Self {
        SvdAlgorithm::randomized(42)
    }
}

/// Similarity measure over reduced vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Linear kernel: raw inner product of the reduced vectors
    #[default]
    DotProduct,
    /// Inner product of unit-normalized reduced vectors
    Cosine,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::DotProduct => "dot",
            SimilarityMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" | "dot_product" | "linear" => Ok(SimilarityMetric::DotProduct),
            "cosine" => Ok(SimilarityMetric::Cosine),
            other => Err(SimilarityError::InvalidArgument(format!(
                "unknown similarity metric: {}",
                other
            ))),
        }
    }
}

/// Engine build parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub target_dims: usize,
    pub vectorizer: VectorizerConfig,
    pub svd: SvdAlgorithm,
    pub metric: SimilarityMetric,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_dims: DEFAULT_TARGET_DIMS,
            vectorizer: VectorizerConfig::default(),
            svd: SvdAlgorithm::default(),
            metric: SimilarityMetric::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_target_dims(mut self, target_dims: usize) -> Self {
        self.target_dims = target_dims;
        self
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_svd(mut self, svd: SvdAlgorithm) -> Self {
        self.svd = svd;
        self
    }

    /// Reject invalid parameters before any corpus processing
    pub fn validate(&self) -> Result<()> {
        if self.target_dims == 0 {
            return Err(SimilarityError::InvalidArgument(
                "target_dims must be positive".to_string(),
            ));
        }
        self.vectorizer.validate()
    }
}
