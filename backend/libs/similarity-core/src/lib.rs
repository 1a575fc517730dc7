//! Content-based similar-item engine
//!
//! Builds a TF-IDF term-weight matrix over each catalog record's category
//! text, projects it into a dense latent space with a truncated SVD, and
//! answers "more like this title" queries with a linear-kernel ranking.
//!
//! ```no_run
//! use similarity_core::{CatalogRecord, EngineConfig, SimilarityEngine};
//!
//! let records = vec![
//!     CatalogRecord::new("Heat", "action crime thriller"),
//!     CatalogRecord::new("Alien", "horror sci-fi"),
//! ];
//! let engine = SimilarityEngine::build(&records, &EngineConfig::default())?;
//! let similar = engine.recommend("Heat", 10)?;
//! # Ok::<(), similarity_core::SimilarityError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod reducer;
pub mod title_index;
pub mod tokenizer;
pub mod vectorizer;

pub use config::{
    EngineConfig, SimilarityMetric, StopWords, SvdAlgorithm, VectorizerConfig,
    DEFAULT_TARGET_DIMS,
};
pub use engine::{EngineStats, ScoredItem, SimilarityEngine, DEFAULT_RECOMMENDATIONS};
pub use error::{Result, SimilarityError};
pub use models::CatalogRecord;
pub use reducer::ReducedMatrix;
pub use title_index::TitleIndex;
pub use tokenizer::Tokenizer;
pub use vectorizer::TermWeightMatrix;
