//! cache 키 빌더.
//!
//! HTTP 요청의 결정적(deterministic) 식별자를 생성합니다.
//! 동일한 요청은 쿼리 파라미터 순서와 무관하게 항상 동일한 키를 얻습니다.

/// 요청의 cache 키를 생성합니다.
///
/// `{prefix}:{namespace}:{method}:{path}:{sorted query pairs}` 형식이며
/// method는 소문자로 정규화되고, 쿼리 파라미터는 (이름, 값) 순으로
/// 정렬된 뒤 `name=value&...` 형태로 직렬화됩니다.
/// 쿼리 파라미터가 없으면 마지막 세그먼트는 빈 문자열입니다.
pub fn request_key(
    prefix: &str,
    namespace: &str,
    method: &str,
    path: &str,
    query_pairs: &[(String, String)],
) -> String {
    let mut sorted: Vec<&(String, String)> = query_pairs.iter().collect();
    sorted.sort();

    let params = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}:{}:{}:{}:{}",
        prefix,
        namespace,
        method.to_lowercase(),
        path,
        params
    )
}

/// 원시 쿼리 문자열을 (이름, 값) 쌍으로 분해합니다.
///
/// 이름과 값은 percent-decoding되므로 `symbols=AAPL%2CMSFT`와
/// `symbols=AAPL,MSFT`는 같은 쌍을 얻습니다. 값이 없는
/// 파라미터(`?flag`)는 빈 값으로 처리합니다.
pub fn query_pairs(raw_query: Option<&str>) -> Vec<(String, String)> {
    let raw = match raw_query {
        Some(q) if !q.is_empty() => q,
        _ => return Vec::new(),
    };

    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (urldecode(name), urldecode(value)),
            None => (urldecode(part), String::new()),
        })
        .collect()
}

/// percent-encoding 해제 (`+`는 공백).
fn urldecode(s: &str) -> String {
    // 멀티바이트 UTF-8 인코딩이 온전히 복원되도록 바이트 단위로 해제
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = [bytes[i + 1], bytes[i + 2]];
                match std::str::from_utf8(&hex)
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_format() {
        let key = request_key(
            "humbl-cache",
            "core",
            "GET",
            "/health",
            &pairs(&[("a", "1")]),
        );
        assert_eq!(key, "humbl-cache:core:get:/health:a=1");
    }

    #[test]
    fn test_key_is_order_independent() {
        let forward = request_key(
            "humbl-cache",
            "humblCHANNEL",
            "GET",
            "/api/v1/humblCHANNEL",
            &pairs(&[("symbols", "AAPL"), ("interval", "1d")]),
        );
        let reversed = request_key(
            "humbl-cache",
            "humblCHANNEL",
            "GET",
            "/api/v1/humblCHANNEL",
            &pairs(&[("interval", "1d"), ("symbols", "AAPL")]),
        );
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_key_changes_with_any_value() {
        let base = request_key(
            "humbl-cache",
            "humblMOMENTUM",
            "GET",
            "/api/v1/humblMOMENTUM",
            &pairs(&[("symbols", "AAPL"), ("window", "1d")]),
        );
        let other_value = request_key(
            "humbl-cache",
            "humblMOMENTUM",
            "GET",
            "/api/v1/humblMOMENTUM",
            &pairs(&[("symbols", "AMD"), ("window", "1d")]),
        );
        let other_namespace = request_key(
            "humbl-cache",
            "humblCHANNEL",
            "GET",
            "/api/v1/humblMOMENTUM",
            &pairs(&[("symbols", "AAPL"), ("window", "1d")]),
        );
        assert_ne!(base, other_value);
        assert_ne!(base, other_namespace);
    }

    #[test]
    fn test_method_is_lowercased() {
        let upper = request_key("p", "ns", "GET", "/x", &[]);
        let lower = request_key("p", "ns", "get", "/x", &[]);
        assert_eq!(upper, lower);
        assert!(upper.ends_with(":get:/x:"));
    }

    #[test]
    fn test_empty_query_yields_empty_segment() {
        let key = request_key("p", "ns", "GET", "/x", &[]);
        assert_eq!(key, "p:ns:get:/x:");
    }

    #[test]
    fn test_query_pairs_parsing() {
        assert_eq!(query_pairs(None), Vec::<(String, String)>::new());
        assert_eq!(query_pairs(Some("")), Vec::<(String, String)>::new());
        assert_eq!(
            query_pairs(Some("b=2&a=1")),
            pairs(&[("b", "2"), ("a", "1")])
        );
        assert_eq!(query_pairs(Some("flag")), pairs(&[("flag", "")]));
    }

    #[test]
    fn test_query_pairs_percent_decoding() {
        // 인코딩 여부와 무관하게 같은 논리적 요청은 같은 쌍을 얻음
        assert_eq!(
            query_pairs(Some("symbols=AAPL%2CMSFT")),
            query_pairs(Some("symbols=AAPL,MSFT"))
        );
        assert_eq!(query_pairs(Some("q=a+b")), pairs(&[("q", "a b")]));
        assert_eq!(query_pairs(Some("q=100%25")), pairs(&[("q", "100%")]));
        // 잘린 escape는 문자 그대로 유지
        assert_eq!(query_pairs(Some("q=50%2")), pairs(&[("q", "50%2")]));
    }

    #[test]
    fn test_duplicate_names_sorted_by_value() {
        let key = request_key(
            "p",
            "ns",
            "GET",
            "/x",
            &pairs(&[("s", "MSFT"), ("s", "AAPL")]),
        );
        assert!(key.ends_with(":s=AAPL&s=MSFT"));
    }
}
