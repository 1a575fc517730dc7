use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::config::{Config, LogFormat};
use recommendation_service::{configure, metrics, CatalogLoader, RecommendationHandlerState};
use similarity_core::SimilarityEngine;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.log_format);

    tracing::info!(
        "Starting recommendation-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    let records = CatalogLoader::from_config(&config.catalog)
        .load_path(&config.catalog.path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog.path))?;

    // Build happens once, before any query is served
    let engine_config = config.recommendation.engine_config()?;
    let started = Instant::now();
    let engine = match SimilarityEngine::build(&records, &engine_config) {
        Ok(engine) => {
            tracing::info!(
                records = records.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Similarity engine initialized successfully"
            );
            Arc::new(engine)
        }
        Err(e) => {
            tracing::error!("Failed to initialize similarity engine: {}", e);
            return Err(e).context("Similarity engine could not be built from the catalog");
        }
    };
    metrics::set_catalog_size(engine.len());

    let handler_state = web::Data::new(RecommendationHandlerState {
        engine,
        default_limit: config.recommendation.default_limit,
        max_limit: config.recommendation.max_limit,
        query_timeout: Duration::from_millis(config.recommendation.query_timeout_ms),
    });

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(handler_state.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
