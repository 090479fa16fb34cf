//! 인메모리 cache 백엔드.
//!
//! Redis 없이 cache 동작을 검증하기 위한 구현입니다. 만료는
//! 읽기/집계 시점에 게으르게(lazy) 처리됩니다.

use crate::backend::CacheBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// HashMap 기반 cache 저장소.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix*` 형태의 glob 패턴 또는 정확한 키 일치.
    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                // 만료된 항목은 읽기 시점에 제거
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries
            .iter()
            .filter(|(key, entry)| entry.expires_at > now && Self::matches(pattern, key))
            .count();
        entries.retain(|key, entry| entry.expires_at > now && !Self::matches(pattern, key));
        Ok(before)
    }

    async fn flush_all(&self) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let size = entries
            .values()
            .filter(|entry| entry.expires_at > now)
            .count();
        entries.clear();
        Ok(size)
    }

    async fn dbsize(&self) -> Result<usize> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(entries.len())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let store = MemoryStore::new();
        store.set_raw("k", b"payload", 60).await.unwrap();

        let value = store.get_raw("k").await.unwrap();
        assert_eq!(value, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none_not_error() {
        let store = MemoryStore::new();
        assert_eq!(store.get_raw("absent").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();
        store.set_raw("k", b"v", 10).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.get_raw("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get_raw("k").await.unwrap(), None);
        assert_eq!(store.dbsize().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set_raw("k", b"v", 60).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_pattern_counts_only_matches() {
        let store = MemoryStore::new();
        store.set_raw("humbl-cache:a", b"1", 60).await.unwrap();
        store.set_raw("humbl-cache:b", b"2", 60).await.unwrap();
        store.set_raw("other:c", b"3", 60).await.unwrap();

        let deleted = store.delete_pattern("humbl-cache:*").await.unwrap();
        assert_eq!(deleted, 2);

        assert_eq!(store.get_raw("humbl-cache:a").await.unwrap(), None);
        assert_eq!(store.get_raw("humbl-cache:b").await.unwrap(), None);
        assert!(store.get_raw("other:c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern_no_matches() {
        let store = MemoryStore::new();
        store.set_raw("other:c", b"3", 60).await.unwrap();

        assert_eq!(store.delete_pattern("humbl-cache:*").await.unwrap(), 0);
        assert_eq!(store.dbsize().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pattern_delete_does_not_block_reads() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        for i in 0..500 {
            store
                .set_raw(&format!("humbl-cache:{i}"), b"v", 60)
                .await
                .unwrap();
        }
        store.set_raw("other:keep", b"v", 60).await.unwrap();

        // 패턴 삭제와 동시에 읽기가 진행되어야 함
        let deleter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.delete_pattern("humbl-cache:*").await })
        };
        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_raw("other:keep").await })
        };

        assert_eq!(deleter.await.unwrap().unwrap(), 500);
        assert_eq!(reader.await.unwrap().unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_flush_all_returns_prior_size() {
        let store = MemoryStore::new();
        store.set_raw("a", b"1", 60).await.unwrap();
        store.set_raw("b", b"2", 60).await.unwrap();

        assert_eq!(store.flush_all().await.unwrap(), 2);
        assert_eq!(store.dbsize().await.unwrap(), 0);
    }
}
