//! HTTP 응답 caching.
//!
//! 이 crate는 다음을 제공합니다:
//! - 결정적 cache 키 빌더 (쿼리 파라미터 순서 무관)
//! - TTL 기반 Redis 저장소 (SCAN 배치 패턴 무효화 포함)
//! - 테스트용 인메모리 저장소

pub mod backend;
pub mod error;
pub mod key;
pub mod memory;
pub mod store;

pub use backend::CacheBackend;
pub use error::{CacheError, Result};
pub use key::{query_pairs, request_key};
pub use memory::MemoryStore;
pub use store::{RedisConfig, RedisStore};
