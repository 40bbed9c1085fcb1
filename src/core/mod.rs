//! Usage fetching, retry control, and the shared HTTP and logging plumbing.

pub mod fetcher;
pub mod http;
pub mod logging;
pub mod models;
pub mod retry;

pub use fetcher::UsageFetcher;
pub use models::{
    Classification, NotificationMessage, UsageRequest, UsageResponse, UsageSample,
    WARNING_THRESHOLD,
};
pub use retry::{RetryOutcome, RetryPolicy, RetryState};
