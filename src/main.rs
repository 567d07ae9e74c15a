use glosa_mapping::api::{self, AppState};
use glosa_mapping::{create_pool, AppConfig, DocumentMatcher};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志（本地时间）
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config.redacted());

    // 可选的数据库连接池
    let pool = match &config.database.url {
        Some(url) => {
            let pool = create_pool(url, &config.database).await?;
            info!("Database pool created (max {} connections)", config.database.max_connections);
            Some(pool)
        }
        None => {
            warn!("DATABASE_URL not set, mapping results will not be persisted");
            None
        }
    };

    let matcher = Arc::new(DocumentMatcher::from_config(&config.matching));
    let thresholds = matcher.thresholds();
    info!(
        "Matcher: {:?} similarity, exact >= {}, partial >= {}",
        config.matching.strategy, thresholds.exact, thresholds.partial
    );

    let app = api::router(AppState { matcher, pool });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/mapping            - reconcile invoices with COVEs");
    info!("  POST /api/mapping/aggregate  - monetary totals over mappings");
    info!("  POST /api/mapping/review     - mapping, totals and scenario");
    info!("  GET  /api/mapping/:review_id - stored mapping of a review");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
