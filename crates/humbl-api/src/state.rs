//! 애플리케이션 공유 상태.

use humbl_cache::{CacheBackend, RedisConfig, RedisStore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::toolbox::ToolboxProvider;

/// 모든 핸들러가 공유하는 애플리케이션 상태.
///
/// cache 백엔드는 선택 사항입니다. Redis 연결에 실패해도 서버는
/// cache 없이 기동하며, cache가 필요한 엔드포인트만 오류를 반환합니다.
#[derive(Clone)]
pub struct AppState {
    /// 응답 cache 백엔드 (미구성 시 None)
    pub cache: Option<Arc<dyn CacheBackend>>,
    /// cache 키 접두사
    pub cache_key_prefix: String,
    /// 분석 toolbox 공급자
    pub toolbox: Arc<dyn ToolboxProvider>,
    /// flush 엔드포인트 인증 토큰
    pub flush_token: Option<String>,
    /// 연결된 Redis URL (상태 보고용, 자격 증명 포함 가능하므로 응답에 그대로 노출 금지)
    pub redis_url: Option<String>,
}

impl AppState {
    /// 새로운 애플리케이션 상태를 생성합니다.
    pub fn new(toolbox: Arc<dyn ToolboxProvider>) -> Self {
        Self {
            cache: None,
            cache_key_prefix: "humbl-cache".to_string(),
            toolbox,
            flush_token: None,
            redis_url: None,
        }
    }

    /// Redis cache 백엔드를 연결합니다.
    ///
    /// 연결 실패는 경고만 남기고 cache 없이 계속합니다.
    pub async fn with_redis(mut self, url: &str) -> Self {
        let config = RedisConfig {
            url: url.to_string(),
        };
        match RedisStore::connect(&config).await {
            Ok(store) => {
                info!("Response cache enabled");
                self.cache = Some(Arc::new(store));
                self.redis_url = Some(url.to_string());
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, continuing without response cache");
            }
        }
        self
    }

    /// cache 백엔드를 직접 주입합니다.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// cache 키 접두사를 설정합니다.
    #[must_use]
    pub fn with_cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = prefix.into();
        self
    }

    /// flush 토큰을 설정합니다.
    #[must_use]
    pub fn with_flush_token(mut self, token: Option<String>) -> Self {
        self.flush_token = token;
        self
    }

    /// cache 백엔드 구성 여부.
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}

/// 테스트용 상태를 생성합니다 (mock toolbox, cache 없음).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::toolbox::MockToolbox;

    AppState::new(Arc::new(MockToolbox::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use humbl_cache::MemoryStore;

    #[test]
    fn test_state_defaults() {
        let state = create_test_state();
        assert!(!state.has_cache());
        assert!(state.flush_token.is_none());
        assert_eq!(state.cache_key_prefix, "humbl-cache");
    }

    #[test]
    fn test_builder_methods() {
        let state = create_test_state()
            .with_cache(Arc::new(MemoryStore::new()))
            .with_cache_key_prefix("test-cache")
            .with_flush_token(Some("secret".to_string()));

        assert!(state.has_cache());
        assert_eq!(state.cache_key_prefix, "test-cache");
        assert_eq!(state.flush_token.as_deref(), Some("secret"));
    }
}
