use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, TextEncoder};

static SIMILAR_ITEMS_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "similar_items_requests_total",
            "Similar-item queries by outcome (hit, miss, invalid, error)",
        ),
        &["outcome"],
    )
    .expect("failed to create similar_items_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register similar_items_requests_total");
    counter
});

static SIMILAR_ITEMS_QUERY_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    let histogram = Histogram::with_opts(
        HistogramOpts::new(
            "similar_items_query_duration_seconds",
            "Time spent ranking a single similar-item query",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
    )
    .expect("failed to create similar_items_query_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register similar_items_query_duration_seconds");
    histogram
});

static SIMILAR_ITEMS_CATALOG_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "similar_items_catalog_size",
        "Number of catalog records loaded into the similarity engine",
    )
    .expect("failed to create similar_items_catalog_size");
    prometheus::default_registry()
        .register(Box::new(gauge.clone()))
        .expect("failed to register similar_items_catalog_size");
    gauge
});

#[derive(Debug, Clone, Copy)]
pub enum QueryOutcome {
    Hit,
    Miss,
    Invalid,
    Error,
}

impl QueryOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Hit => "hit",
            QueryOutcome::Miss => "miss",
            QueryOutcome::Invalid => "invalid",
            QueryOutcome::Error => "error",
        }
    }
}

pub fn record_query(outcome: QueryOutcome) {
    SIMILAR_ITEMS_REQUESTS_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}

pub fn observe_query_duration(elapsed: Duration) {
    SIMILAR_ITEMS_QUERY_DURATION_SECONDS.observe(elapsed.as_secs_f64());
}

pub fn set_catalog_size(records: usize) {
    SIMILAR_ITEMS_CATALOG_SIZE.set(records as i64);
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
