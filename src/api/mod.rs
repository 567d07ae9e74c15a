pub mod handlers;

use crate::service::{DocumentMatcher, SimilarityStrategy};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;

pub use handlers::*;

/// 共享状态: 匹配器 + 可选的数据库连接池
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<DocumentMatcher<Box<dyn SimilarityStrategy>>>,
    pub pool: Option<PgPool>,
}

/// 构建HTTP路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/mapping", post(handlers::map_documents))
        .route("/api/mapping/aggregate", post(handlers::aggregate))
        .route("/api/mapping/review", post(handlers::review))
        .route("/api/mapping/:review_id", get(handlers::get_stored_mapping))
        .with_state(state)
        .layer(ServiceBuilder::new())
}
