//! cache 백엔드 trait.

use crate::error::Result;
use async_trait::async_trait;

/// 응답 cache 저장소가 구현해야 하는 백엔드 인터페이스.
///
/// 구현체: Redis 기반 [`RedisStore`](crate::store::RedisStore),
/// 테스트용 [`MemoryStore`](crate::memory::MemoryStore).
///
/// 키 부재는 `Ok(None)`이며 오류가 아닙니다. 모든 오류는 백엔드
/// 연결/명령 실패를 의미합니다.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 키에 저장된 원시 페이로드를 가져옵니다.
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// TTL(초)과 함께 원시 페이로드를 저장합니다.
    async fn set_raw(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()>;

    /// 단일 키를 삭제합니다. 키가 존재했으면 `true`.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// glob 패턴과 일치하는 모든 키를 삭제하고 실제 삭제된 수를 반환합니다.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize>;

    /// 저장소 전체를 비우고 비우기 직전의 키 수를 반환합니다.
    async fn flush_all(&self) -> Result<usize>;

    /// 현재 키 수.
    async fn dbsize(&self) -> Result<usize>;

    /// 백엔드 연결 상태를 확인합니다.
    async fn ping(&self) -> Result<bool>;
}
