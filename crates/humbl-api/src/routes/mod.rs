//! API route 구성.

use axum::{http::StatusCode, Json, Router};
use std::sync::Arc;

use crate::error::{validation_error, ApiErrorResponse};
use crate::state::AppState;

pub mod core;
pub mod openbb;
pub mod portfolio;
pub mod toolbox;

/// 전체 API router 구성.
///
/// core routes는 루트에, 데이터 routes는 `/api/v1` 아래에 배치됩니다.
pub fn create_api_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(core::core_router(state))
        .nest("/api/v1", toolbox::toolbox_router(state))
        .nest("/api/v1", openbb::openbb_router(state))
        .nest("/api/v1", portfolio::portfolio_router(state))
}

/// 쉼표로 구분된 심볼 문자열을 목록으로 변환합니다.
///
/// 빈 문자열은 400 검증 오류입니다.
pub(crate) fn parse_symbols(
    symbols: &str,
) -> Result<Vec<String>, (StatusCode, Json<ApiErrorResponse>)> {
    let list: Vec<String> = symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if list.is_empty() {
        return Err(validation_error("Symbols parameter cannot be empty"));
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_splits_and_trims() {
        let symbols = parse_symbols("AAPL, msft ,NVDA").unwrap();
        assert_eq!(symbols, vec!["AAPL", "msft", "NVDA"]);
    }

    #[test]
    fn test_parse_symbols_rejects_empty() {
        assert!(parse_symbols("").is_err());
        assert!(parse_symbols(" , ,").is_err());
    }
}
