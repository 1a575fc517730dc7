//! CSV catalog loading
//!
//! Validates that the configured title and category columns exist and turns
//! each row into a `CatalogRecord`. Rows without a title are skipped; empty
//! category cells become empty strings.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use similarity_core::CatalogRecord;

use crate::config::CatalogConfig;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required columns are missing from the catalog: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct CatalogLoader {
    title_column: String,
    category_column: String,
}

impl CatalogLoader {
    pub fn new(title_column: impl Into<String>, category_column: impl Into<String>) -> Self {
        Self {
            title_column: title_column.into(),
            category_column: category_column.into(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.title_column, &config.category_column)
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<CatalogRecord>, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let records = self.load_reader(file)?;
        info!(
            path = %path.display(),
            records = records.len(),
            "Loaded catalog"
        );
        Ok(records)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<CatalogRecord>, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let (title_idx, category_idx) =
            match (position(&self.title_column), position(&self.category_column)) {
                (Some(t), Some(c)) => (t, c),
                (title, category) => {
                    let mut missing = Vec::new();
                    if title.is_none() {
                        missing.push(self.title_column.clone());
                    }
                    if category.is_none() {
                        missing.push(self.category_column.clone());
                    }
                    return Err(CatalogError::MissingColumns { missing });
                }
            };

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            let title = row.get(title_idx).unwrap_or_default();
            if title.trim().is_empty() {
                // header is line 1
                warn!(line = line + 2, "Skipping catalog row without a title");
                continue;
            }
            let category = row.get(category_idx).unwrap_or_default();
            records.push(CatalogRecord::new(title, category));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> CatalogLoader {
        CatalogLoader::new("title", "genres")
    }

    #[test]
    fn test_loads_records_in_order() {
        let csv = "movieId,title,genres\n1,Toy Story (1995),Adventure|Animation|Children\n2,Heat (1995),Action|Crime|Thriller\n";
        let records = loader().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Toy Story (1995)");
        assert_eq!(records[1].category_text, "Action|Crime|Thriller");
    }

    #[test]
    fn test_empty_category_becomes_empty_string() {
        let csv = "title,genres\nNo Tags,\nShort Row\n";
        let records = loader().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category_text, "");
        assert_eq!(records[1].category_text, "");
    }

    #[test]
    fn test_blank_titles_skipped() {
        let csv = "title,genres\n,Drama\n  ,Comedy\nKept,Drama\n";
        let records = loader().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(records, vec![CatalogRecord::new("Kept", "Drama")]);
    }

    #[test]
    fn test_missing_columns_reported() {
        let csv = "name,tags\nHeat,action\n";
        match loader().load_reader(csv.as_bytes()).unwrap_err() {
            CatalogError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["title".to_string(), "genres".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_columns() {
        let csv = "name,tags\nHeat,action\n";
        let records = CatalogLoader::new("name", "tags")
            .load_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(records[0], CatalogRecord::new("Heat", "action"));
    }
}
