//! humblAPI 서버 라이브러리.
//!
//! 외부 분석 toolbox 위의 얇은 HTTP 파사드입니다. 핵심은 응답
//! cache입니다: 요청의 메서드/경로/쿼리에서 결정적 키를 만들어
//! Redis에 TTL과 함께 저장하고, 같은 요청은 toolbox를 거치지 않고
//! 바로 응답합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod state;
pub mod toolbox;
