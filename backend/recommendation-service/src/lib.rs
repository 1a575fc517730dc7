pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;

use actix_web::web;

pub use catalog::{CatalogError, CatalogLoader};
pub use config::Config;
pub use error::AppError;
pub use handlers::RecommendationHandlerState;

/// Register every HTTP route served by recommendation-service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .service(handlers::get_similar_items)
        .service(handlers::get_model_info);
}
