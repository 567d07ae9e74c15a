//! 错误类型
//!
//! 匹配与汇总不会失败；这里覆盖配置、I/O、
//! 持久化和抽取流水线的错误

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlosaError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database operation timed out after {seconds}s")]
    DatabaseTimeout { seconds: u64 },

    /// 单个文档抽取失败
    #[error("extraction failed for {label}: {source}")]
    Extraction {
        label: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 抽取结果与预期结构不符
    #[error("could not decode extracted {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid page range {start_page}-{end_page} for document with {page_count} pages")]
    InvalidPageRange {
        start_page: usize,
        end_page: usize,
        page_count: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlosaError>;
