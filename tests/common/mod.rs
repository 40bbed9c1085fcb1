//! Common test utilities and fixtures for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: mock server wiring for the usage API, Telegram, and Gmail
//! - `log_capture`: tracing capture for asserting on emitted logs
//! - `logger`: structured per-test progress logging

pub mod fixtures;
pub mod log_capture;
pub mod logger;
