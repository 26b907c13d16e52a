//! HTTP client layer — `FxMarketHttp` with session continuity and opt-in retries.

pub mod client;
pub mod retry;

pub use client::FxMarketHttp;
pub use retry::{RetryConfig, RetryPolicy};
