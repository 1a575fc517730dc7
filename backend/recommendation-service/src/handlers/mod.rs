pub mod similar;

// Re-export handlers for convenience
pub use similar::{
    get_model_info, get_similar_items, health, RecommendationHandlerState, SimilarItem,
    SimilarItemsQuery, SimilarItemsResponse, NO_RECOMMENDATIONS_MESSAGE,
};
