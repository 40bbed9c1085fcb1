//! Outbound notification channels.
//!
//! - [`telegram`]: the primary channel, always attempted.
//! - [`gmail`]: the secondary channel, best-effort and used for warnings and
//!   hard failures only.

pub mod gmail;
pub mod telegram;

pub use gmail::GmailNotifier;
pub use telegram::TelegramNotifier;
