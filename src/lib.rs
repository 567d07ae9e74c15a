pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::{GlosaError, Result};
pub use service::{aggregate, map_documents, DocumentMatcher};
