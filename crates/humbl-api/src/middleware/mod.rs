//! HTTP middleware 모음.

pub mod cache;
pub mod process_time;
pub mod rate_limit;

pub use cache::{response_cache_middleware, ResponseCacheState};
pub use process_time::process_time_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimiter};
