use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimilarityError>;

#[derive(Debug, Error)]
pub enum SimilarityError {
    /// Every category text was empty, stop words only, or pruned away.
    #[error("Degenerate corpus: no vocabulary terms across {records} records")]
    DegenerateCorpus { records: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Decomposition error: {0}")]
    Decomposition(String),
}

impl SimilarityError {
    pub fn is_degenerate_corpus(&self) -> bool {
        matches!(self, SimilarityError::DegenerateCorpus { .. })
    }
}
