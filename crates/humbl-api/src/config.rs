//! 서버 설정.
//!
//! 환경 변수에서 읽으며, 없으면 개발용 기본값을 사용합니다.

use std::env;
use std::net::SocketAddr;

/// API 서버 설정.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// 바인드 호스트 (API_HOST, 기본: 127.0.0.1)
    pub host: String,
    /// 바인드 포트 (API_PORT, 기본: 8000)
    pub port: u16,
    /// Redis URL (REDIS_URL, 없으면 cache 비활성)
    pub redis_url: Option<String>,
    /// cache 키 접두사 (CACHE_KEY_PREFIX, 기본: humbl-cache)
    pub cache_key_prefix: String,
    /// flush 엔드포인트 토큰 (FLUSH_API_TOKEN, 없으면 flush 거부)
    pub flush_token: Option<String>,
    /// toolbox 서비스 URL (TOOLBOX_BASE_URL)
    pub toolbox_base_url: String,
    /// IP당 분당 요청 한도 (RATE_LIMIT_RPM, 기본: 600)
    pub rate_limit_rpm: u32,
    /// rate limit 비활성화 (RATE_LIMIT_DISABLED=true)
    pub rate_limit_disabled: bool,
    /// CORS 허용 origin 목록 (CORS_ORIGINS, 쉼표 구분, 기본: 모두 허용)
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// 환경 변수에서 설정을 읽습니다.
    pub fn from_env() -> Self {
        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            cache_key_prefix: env::var("CACHE_KEY_PREFIX")
                .unwrap_or_else(|_| "humbl-cache".to_string()),
            flush_token: env::var("FLUSH_API_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            toolbox_base_url: env::var("TOOLBOX_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            rate_limit_rpm: env::var("RATE_LIMIT_RPM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            rate_limit_disabled: env::var("RATE_LIMIT_DISABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// 바인드 주소.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            redis_url: None,
            cache_key_prefix: "humbl-cache".to_string(),
            flush_token: None,
            toolbox_base_url: "http://localhost:8080".to_string(),
            rate_limit_rpm: 600,
            rate_limit_disabled: false,
            cors_origins: Vec::new(),
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }
}
