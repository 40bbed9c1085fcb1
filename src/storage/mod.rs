//! Storage for configuration.

pub mod config;

pub use config::{
    Config, DEFAULT_CONFIG_PATH, EmailConfig, RequestConfig, RetryConfig, TelegramConfig,
};
