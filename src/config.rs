use crate::error::Result;
use crate::service::similarity::{SimilarityKind, DEFAULT_SUBSTRING_PENALTY};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 未设置时不持久化
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub strategy: SimilarityKind,
    pub exact_threshold: f64,
    pub partial_threshold: f64,
    pub substring_penalty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// 抽取并发数
    pub max_concurrency: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: SimilarityKind::Positional,
            exact_threshold: 0.95,
            partial_threshold: 0.70,
            substring_penalty: DEFAULT_SUBSTRING_PENALTY,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            matching: MatchingConfig::default(),
            extraction: ExtractionConfig { max_concurrency: 4 },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 可选的 `glosa.toml` ->
    /// `GLOSA_` 环境变量 (`GLOSA_MATCHING__STRATEGY=levenshtein`)
    /// `SERVER_HOST`、`SERVER_PORT`、`DATABASE_URL` 优先级最高
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let config = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("matching.strategy", "positional")?
            .set_default("matching.exact_threshold", defaults.matching.exact_threshold)?
            .set_default("matching.partial_threshold", defaults.matching.partial_threshold)?
            .set_default("matching.substring_penalty", defaults.matching.substring_penalty)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default("extraction.max_concurrency", defaults.extraction.max_concurrency as i64)?
            .add_source(File::with_name("glosa").required(false))
            .add_source(
                Environment::with_prefix("GLOSA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse::<i64>().ok()),
            )?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 用于日志输出的副本，隐藏数据库URL（可能含密码）
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.database.url.is_some() {
            config.database.url = Some("***".to_string());
        }
        config
    }
}
