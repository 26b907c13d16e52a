//! Network defaults for the FxMarket SDK.

/// Default REST API origin. Endpoint paths are appended under `/api`.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Path prefix every backend route lives under.
pub const API_PREFIX: &str = "/api";
