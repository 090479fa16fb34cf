//! cache 계층 오류 타입.

use thiserror::Error;

/// cache 작업 오류.
#[derive(Error, Debug)]
pub enum CacheError {
    /// 백엔드 연결 실패 (접속 불가, 타임아웃 등)
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// 백엔드 명령 실패
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Backend(err.to_string())
        }
    }
}

/// cache 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, CacheError>;
