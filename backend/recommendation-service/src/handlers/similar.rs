/// Similar-item API Handlers
///
/// HTTP endpoints for "more like this title" recommendations
use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use similarity_core::{EngineStats, SimilarityEngine};

use crate::error::{AppError, Result};
use crate::metrics::{self, QueryOutcome};

pub const NO_RECOMMENDATIONS_MESSAGE: &str = "No recommendations found for the given title.";

/// Query parameters for GET /api/v1/recommendations/similar
#[derive(Debug, Deserialize)]
pub struct SimilarItemsQuery {
    pub title: Option<String>,
    /// Number of similar items to return (default: configured, max: configured)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarItem {
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarItemsResponse {
    pub title: String,
    pub recommendations: Vec<SimilarItem>,
    pub count: usize,
    pub message: String,
}

/// Handler state shared by all workers
pub struct RecommendationHandlerState {
    pub engine: Arc<SimilarityEngine>,
    pub default_limit: usize,
    pub max_limit: usize,
    pub query_timeout: Duration,
}

impl RecommendationHandlerState {
    fn resolve_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            Some(0) => Err(AppError::BadRequest(
                "limit must be a positive integer".to_string(),
            )),
            Some(limit) => Ok(limit.min(self.max_limit)),
            None => Ok(self.default_limit.min(self.max_limit)),
        }
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// GET /api/v1/recommendations/similar?title=<title>&limit=<k>
/// Titles whose category tags are most similar to the given title
#[get("/api/v1/recommendations/similar")]
pub async fn get_similar_items(
    query: web::Query<SimilarItemsQuery>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let title = query.title.as_deref().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        metrics::record_query(QueryOutcome::Invalid);
        return Err(AppError::BadRequest("Please enter a title".to_string()));
    }

    let limit = state.resolve_limit(query.limit).map_err(|err| {
        metrics::record_query(QueryOutcome::Invalid);
        err
    })?;

    debug!(title = %title, limit, "Getting similar items");

    let engine = Arc::clone(&state.engine);
    let lookup_title = title.clone();
    let started = Instant::now();
    let ranked = tokio::time::timeout(
        state.query_timeout,
        web::block(move || engine.recommend_scored(&lookup_title, limit)),
    )
    .await;
    metrics::observe_query_duration(started.elapsed());

    let items = match ranked {
        Ok(Ok(Ok(items))) => items,
        Ok(Ok(Err(err))) => {
            error!(title = %title, "Similarity query failed: {}", err);
            metrics::record_query(QueryOutcome::Error);
            return Err(err.into());
        }
        Ok(Err(err)) => {
            error!(title = %title, "Similarity worker failed: {}", err);
            metrics::record_query(QueryOutcome::Error);
            return Err(err.into());
        }
        Err(_) => {
            let timeout_ms = state.query_timeout.as_millis() as u64;
            warn!(title = %title, timeout_ms, "Similarity query timed out");
            metrics::record_query(QueryOutcome::Error);
            return Err(AppError::Timeout(timeout_ms));
        }
    };

    let message = if items.is_empty() {
        metrics::record_query(QueryOutcome::Miss);
        NO_RECOMMENDATIONS_MESSAGE.to_string()
    } else {
        metrics::record_query(QueryOutcome::Hit);
        format!("Recommendations for '{}':", title)
    };

    let recommendations: Vec<SimilarItem> = items
        .into_iter()
        .map(|item| SimilarItem {
            title: item.title,
            score: item.score,
        })
        .collect();

    Ok(HttpResponse::Ok().json(SimilarItemsResponse {
        title,
        count: recommendations.len(),
        recommendations,
        message,
    }))
}

/// GET /api/v1/recommendations/model-info
/// Shape of the similarity model currently being served
#[get("/api/v1/recommendations/model-info")]
pub async fn get_model_info(state: web::Data<RecommendationHandlerState>) -> HttpResponse {
    let stats: EngineStats = state.engine.stats();
    HttpResponse::Ok().json(stats)
}
