/// TF-IDF term-weight matrix
///
/// Rows follow catalog order. Columns are the vocabulary sorted
/// lexicographically so the column layout is reproducible across builds.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::config::VectorizerConfig;
use crate::error::{Result, SimilarityError};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone)]
pub struct TermWeightMatrix {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    /// Sparse rows of `(column, weight)`, sorted by column, L2-normalized
    rows: Vec<Vec<(usize, f64)>>,
}

impl TermWeightMatrix {
    /// Learn the vocabulary from `texts` and weight every document against it
    pub fn build<S: AsRef<str>>(texts: &[S], config: &VectorizerConfig) -> Result<Self> {
        config.validate()?;

        let tokenizer = Tokenizer::new(config);
        let documents: Vec<Vec<String>> = texts
            .iter()
            .map(|text| tokenizer.tokenize(text.as_ref()))
            .collect();
        let n_docs = documents.len();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &documents {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        let kept: Vec<(&str, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= config.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if kept.is_empty() {
            return Err(SimilarityError::DegenerateCorpus { records: n_docs });
        }

        let column_of: HashMap<&str, usize> = kept
            .iter()
            .enumerate()
            .map(|(column, (term, _))| (*term, column))
            .collect();

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let idf: Vec<f64> = kept
            .iter()
            .map(|(_, df)| ((1.0 + n_docs as f64) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let rows = documents
            .iter()
            .map(|tokens| {
                let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
                for token in tokens {
                    if let Some(&column) = column_of.get(token.as_str()) {
                        *counts.entry(column).or_insert(0) += 1;
                    }
                }

                let mut row: Vec<(usize, f64)> = counts
                    .into_iter()
                    .map(|(column, count)| {
                        let tf = if config.sublinear_tf {
                            1.0 + (count as f64).ln()
                        } else {
                            count as f64
                        };
                        (column, tf * idf[column])
                    })
                    .collect();

                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, weight) in row.iter_mut() {
                        *weight /= norm;
                    }
                }
                row
            })
            .collect();

        let vocabulary: Vec<String> = kept.iter().map(|(term, _)| term.to_string()).collect();

        debug!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            "Built TF-IDF matrix"
        );

        Ok(Self {
            vocabulary,
            idf,
            rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn row(&self, index: usize) -> &[(usize, f64)] {
        &self.rows[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[(usize, f64)]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Weight of `term` in row `index`, zero when absent
    pub fn weight(&self, index: usize, term: &str) -> f64 {
        let Ok(column) = self.vocabulary.binary_search_by(|t| t.as_str().cmp(term)) else {
            return 0.0;
        };
        self.rows[index]
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|pos| self.rows[index][pos].1)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(texts: &[&str]) -> Result<TermWeightMatrix> {
        TermWeightMatrix::build(texts, &VectorizerConfig::default())
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let matrix = build(&["drama romance", "action drama"]).unwrap();
        assert_eq!(matrix.vocabulary(), &["action", "drama", "romance"]);
        assert_eq!(matrix.n_rows(), 2);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let matrix = build(&["drama romance", "action drama drama", "comedy"]).unwrap();
        for row in matrix.rows() {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_common_terms_are_downweighted() {
        let matrix = build(&["drama war", "drama romance", "drama comedy"]).unwrap();
        assert!(matrix.weight(0, "war") > matrix.weight(0, "drama"));
        // drama appears everywhere: idf == ln(4/4) + 1
        assert!((matrix.idf()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_text_gives_zero_row() {
        let matrix = build(&["drama", ""]).unwrap();
        assert!(matrix.row(1).is_empty());
        assert_eq!(matrix.weight(1, "drama"), 0.0);
    }

    #[test]
    fn test_all_empty_is_degenerate() {
        let err = build(&["", "", ""]).unwrap_err();
        assert!(matches!(err, SimilarityError::DegenerateCorpus { records: 3 }));
    }

    #[test]
    fn test_all_stop_words_is_degenerate() {
        assert!(build(&["the and", "of a"]).unwrap_err().is_degenerate_corpus());
    }

    #[test]
    fn test_no_documents_is_degenerate() {
        let texts: [&str; 0] = [];
        assert!(build(&texts).unwrap_err().is_degenerate_corpus());
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        let config = VectorizerConfig {
            max_df: 0.5,
            ..Default::default()
        };
        let matrix =
            TermWeightMatrix::build(&["drama war", "drama romance", "drama comedy"], &config)
                .unwrap();
        assert!(!matrix.vocabulary().iter().any(|t| t == "drama"));
    }

    #[test]
    fn test_sublinear_tf() {
        let raw = build(&["war war war drama", "drama comedy"]).unwrap();
        let config = VectorizerConfig {
            sublinear_tf: true,
            ..Default::default()
        };
        let damped =
            TermWeightMatrix::build(&["war war war drama", "drama comedy"], &config).unwrap();
        assert!(damped.weight(0, "war") < raw.weight(0, "war"));
    }
}
