//! 공통 응답 envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 모든 데이터 엔드포인트가 사용하는 표준 응답 envelope.
///
/// # 예시
///
/// ```json
/// {
///   "response_data": { "results": [] },
///   "message": "humblAPI is HEALTHY",
///   "status_code": 200
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HumblResponse<T> {
    /// 페이로드 (메시지 전용 응답에서는 null)
    pub response_data: Option<T>,
    /// 사람이 읽을 수 있는 상태 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 비치명적 경고 목록 (부분 실패 시 채워짐)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    /// HTTP 상태 코드 (본문에도 포함)
    pub status_code: u16,
}

impl<T> HumblResponse<T> {
    /// 데이터 포함 200 응답.
    pub fn ok(data: T) -> Self {
        Self {
            response_data: Some(data),
            message: None,
            warnings: None,
            status_code: 200,
        }
    }

    /// 데이터와 메시지 포함 200 응답.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            response_data: Some(data),
            message: Some(message.into()),
            warnings: None,
            status_code: 200,
        }
    }

    /// 경고 목록을 첨부합니다. 빈 목록은 생략됩니다.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        if !warnings.is_empty() {
            self.warnings = Some(warnings);
        }
        self
    }
}

impl HumblResponse<()> {
    /// 데이터 없이 메시지만 담은 200 응답.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            response_data: None,
            message: Some(message.into()),
            warnings: None,
            status_code: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only_serialization() {
        let response = HumblResponse::message_only("humblAPI is HEALTHY");
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""response_data":null"#));
        assert!(json.contains(r#""message":"humblAPI is HEALTHY""#));
        assert!(json.contains(r#""status_code":200"#));
        assert!(!json.contains("warnings"));
    }

    #[test]
    fn test_warnings_included_when_present() {
        let response =
            HumblResponse::ok(vec![1, 2, 3]).with_warnings(vec!["partial data".to_string()]);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""warnings":["partial data"]"#));
    }

    #[test]
    fn test_empty_warnings_omitted() {
        let response = HumblResponse::ok(1).with_warnings(Vec::new());
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("warnings"));
    }
}
