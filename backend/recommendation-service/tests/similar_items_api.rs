use actix_web::{http::StatusCode, test, web, App};
use std::sync::Arc;
use std::time::Duration;

use recommendation_service::configure;
use recommendation_service::handlers::{
    RecommendationHandlerState, SimilarItemsResponse, NO_RECOMMENDATIONS_MESSAGE,
};
use similarity_core::{CatalogRecord, EngineConfig, SimilarityEngine};

fn handler_state() -> web::Data<RecommendationHandlerState> {
    let records = vec![
        CatalogRecord::new("Heat (1995)", "Action|Crime|Thriller"),
        CatalogRecord::new("Ronin (1998)", "Action|Crime|Thriller"),
        CatalogRecord::new("Toy Story (1995)", "Adventure|Animation|Children|Comedy"),
        CatalogRecord::new("Notting Hill (1999)", "Comedy|Romance"),
        CatalogRecord::new("Alien (1979)", "Horror|Sci-Fi"),
        CatalogRecord::new("Casablanca (1942)", "Drama|Romance"),
    ];
    let engine = SimilarityEngine::build(&records, &EngineConfig::default()).expect("engine");

    web::Data::new(RecommendationHandlerState {
        engine: Arc::new(engine),
        default_limit: 3,
        max_limit: 4,
        query_timeout: Duration::from_secs(5),
    })
}

macro_rules! app {
    () => {
        test::init_service(App::new().app_data(handler_state()).configure(configure)).await
    };
}

#[actix_web::test]
async fn health_returns_ok() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn known_title_returns_ranked_recommendations() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=Heat%20(1995)&limit=2")
        .to_request();
    let body: SimilarItemsResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.title, "Heat (1995)");
    assert_eq!(body.count, 2);
    assert_eq!(body.recommendations[0].title, "Ronin (1998)");
    assert!(body.recommendations.iter().all(|r| r.title != "Heat (1995)"));
    assert!(body.recommendations[0].score >= body.recommendations[1].score);
}

#[actix_web::test]
async fn title_is_trimmed_and_default_limit_applied() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=%20%20Alien%20(1979)%20")
        .to_request();
    let body: SimilarItemsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.title, "Alien (1979)");
    assert_eq!(body.count, 3);
}

#[actix_web::test]
async fn limit_is_clamped_to_maximum() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=Casablanca%20(1942)&limit=50")
        .to_request();
    let body: SimilarItemsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.count, 4);
}

#[actix_web::test]
async fn unknown_title_is_empty_not_error() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=heat%20(1995)")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: SimilarItemsResponse = test::read_body_json(resp).await;
    assert_eq!(body.count, 0);
    assert!(body.recommendations.is_empty());
    assert_eq!(body.message, NO_RECOMMENDATIONS_MESSAGE);
}

#[actix_web::test]
async fn blank_title_is_bad_request() {
    let app = app!();
    for uri in [
        "/api/v1/recommendations/similar?title=%20%20",
        "/api/v1/recommendations/similar",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn zero_limit_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=Heat%20(1995)&limit=0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 400);
}

#[actix_web::test]
async fn model_info_reports_engine_shape() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/model-info")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["catalog_size"], 6);
    assert_eq!(body["metric"], "dot_product");
    assert!(body["dimensions"].as_u64().unwrap() >= 1);
}

#[actix_web::test]
async fn metrics_are_exposed() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/similar?title=Heat%20(1995)")
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("similar_items_requests_total"));
}
