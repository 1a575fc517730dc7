use serde::{Deserialize, Serialize};

/// One catalog entry as supplied by the catalog loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub title: String,
    /// Free-text category tags, empty when the source had none
    #[serde(default)]
    pub category_text: String,
}

impl CatalogRecord {
    pub fn new(title: impl Into<String>, category_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category_text: category_text.into(),
        }
    }

    /// Record whose category field was missing in the source
    pub fn without_category(title: impl Into<String>) -> Self {
        Self::new(title, String::new())
    }
}
