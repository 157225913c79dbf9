//! Application configuration

mod app_config;

pub use app_config::{
    AiConfig, AiProvider, AppConfig, DatabaseConfig, LogFormat, LoggingConfig, RetrievalConfig,
};
