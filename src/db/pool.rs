use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

const SLOW_STATEMENT_SECS: u64 = 5;
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// 连接池参数（至少1个连接）
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
}

/// 创建数据库连接池
pub async fn create_pool(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(database_url)?
        .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(SLOW_STATEMENT_SECS));

    tracing::debug!("Connecting with up to {} connections", config.max_connections.max(1));
    pool_options(config).connect_with(connect_options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_follows_config() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 3,
        };
        assert_eq!(pool_options(&config).get_max_connections(), 3);

        let config = DatabaseConfig {
            url: None,
            max_connections: 0,
        };
        assert_eq!(pool_options(&config).get_max_connections(), 1);
    }
}
