/// Configuration management for recommendation-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

use similarity_core::{
    EngineConfig, SimilarityMetric, SvdAlgorithm, VectorizerConfig, DEFAULT_RECOMMENDATIONS,
    DEFAULT_TARGET_DIMS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub catalog: CatalogConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'plain' or 'json', got '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
    pub title_column: String,
    pub category_column: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RecommendationConfig {
    pub target_dims: usize,
    pub default_limit: usize,
    pub max_limit: usize,
    pub metric: SimilarityMetric,
    pub svd_algorithm: String,
    pub svd_seed: u64,
    pub query_timeout_ms: u64,
}

impl RecommendationConfig {
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let svd = match self.svd_algorithm.trim().to_ascii_lowercase().as_str() {
            "exact" => SvdAlgorithm::Exact,
            "randomized" => SvdAlgorithm::randomized(self.svd_seed),
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "SVD_ALGORITHM",
                    value: other.to_string(),
                    reason: "expected 'randomized' or 'exact'".to_string(),
                })
            }
        };

        Ok(EngineConfig {
            target_dims: self.target_dims,
            vectorizer: VectorizerConfig::default(),
            svd,
            metric: self.metric,
        })
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            app: AppConfig {
                env: get("APP_ENV", "development"),
                host: get("HTTP_HOST", "0.0.0.0"),
                port: parse(&lookup, "HTTP_PORT", 8080)?,
                log_format: parse(&lookup, "LOG_FORMAT", LogFormat::Plain)?,
            },
            catalog: CatalogConfig {
                path: get("CATALOG_PATH", "./data/movies.csv"),
                title_column: get("CATALOG_TITLE_COLUMN", "title"),
                category_column: get("CATALOG_CATEGORY_COLUMN", "genres"),
            },
            recommendation: RecommendationConfig {
                target_dims: parse(&lookup, "RECOMMENDER_TARGET_DIMS", DEFAULT_TARGET_DIMS)?,
                default_limit: parse(
                    &lookup,
                    "RECOMMENDER_DEFAULT_LIMIT",
                    DEFAULT_RECOMMENDATIONS,
                )?,
                max_limit: parse(&lookup, "RECOMMENDER_MAX_LIMIT", 100)?,
                metric: parse(&lookup, "SIMILARITY_METRIC", SimilarityMetric::DotProduct)?,
                svd_algorithm: get("SVD_ALGORITHM", "randomized"),
                svd_seed: parse(&lookup, "SVD_SEED", 42)?,
                query_timeout_ms: parse(&lookup, "QUERY_TIMEOUT_MS", 2000)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rec = &self.recommendation;
        let positive = [
            ("RECOMMENDER_TARGET_DIMS", rec.target_dims),
            ("RECOMMENDER_DEFAULT_LIMIT", rec.default_limit),
            ("RECOMMENDER_MAX_LIMIT", rec.max_limit),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: value.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        if rec.default_limit > rec.max_limit {
            return Err(ConfigError::InvalidValue {
                key: "RECOMMENDER_DEFAULT_LIMIT",
                value: rec.default_limit.to_string(),
                reason: format!("exceeds RECOMMENDER_MAX_LIMIT ({})", rec.max_limit),
            });
        }
        rec.engine_config().map(|_| ())
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.log_format, LogFormat::Plain);
        assert_eq!(config.catalog.path, "./data/movies.csv");
        assert_eq!(config.catalog.title_column, "title");
        assert_eq!(config.catalog.category_column, "genres");
        assert_eq!(config.recommendation.target_dims, 20);
        assert_eq!(config.recommendation.default_limit, 10);
        assert_eq!(config.recommendation.metric, SimilarityMetric::DotProduct);

        let engine = config.recommendation.engine_config().unwrap();
        assert_eq!(engine.svd, SvdAlgorithm::randomized(42));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HTTP_PORT", "9090"),
            ("LOG_FORMAT", "json"),
            ("SIMILARITY_METRIC", "cosine"),
            ("SVD_ALGORITHM", "exact"),
            ("CATALOG_CATEGORY_COLUMN", "tags"),
        ])
        .unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.catalog.category_column, "tags");
        assert_eq!(config.recommendation.metric, SimilarityMetric::Cosine);
        assert_eq!(
            config.recommendation.engine_config().unwrap().svd,
            SvdAlgorithm::Exact
        );
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert!(load(&[("HTTP_PORT", "not-a-port")]).is_err());
        assert!(load(&[("RECOMMENDER_TARGET_DIMS", "0")]).is_err());
        assert!(load(&[("SIMILARITY_METRIC", "manhattan")]).is_err());
        assert!(load(&[("SVD_ALGORITHM", "lanczos")]).is_err());
        assert!(load(&[("RECOMMENDER_DEFAULT_LIMIT", "200")]).is_err());
    }
}
