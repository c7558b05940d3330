use reqwest::StatusCode;

use crate::application::ports::GatewayErrorKind;

/// Maps an HTTP response to an error class. Status code wins; the message
/// pattern table is the fallback for ambiguous codes. The upstream API has
/// no structured error codes, so all string inspection is confined to this
/// module.
pub fn classify_http_status(status: StatusCode, body: &str) -> GatewayErrorKind {
    match status.as_u16() {
        401 | 403 => GatewayErrorKind::Authentication,
        408 => GatewayErrorKind::Timeout,
        429 => {
            if mentions_quota(body) {
                GatewayErrorKind::QuotaExceeded
            } else {
                GatewayErrorKind::RateLimited
            }
        }
        400 | 422 => GatewayErrorKind::Validation,
        500..=599 => GatewayErrorKind::ServerError,
        _ => classify_message(body),
    }
}

pub fn classify_message(message: &str) -> GatewayErrorKind {
    let patterns: &[(&str, GatewayErrorKind)] = &[
        ("invalid api key", GatewayErrorKind::Authentication),
        ("incorrect api key", GatewayErrorKind::Authentication),
        ("unauthorized", GatewayErrorKind::Authentication),
        ("authentication", GatewayErrorKind::Authentication),
        ("quota", GatewayErrorKind::QuotaExceeded),
        ("billing", GatewayErrorKind::QuotaExceeded),
        ("rate limit", GatewayErrorKind::RateLimited),
        ("too many requests", GatewayErrorKind::RateLimited),
        ("timed out", GatewayErrorKind::Timeout),
        ("timeout", GatewayErrorKind::Timeout),
        ("connection refused", GatewayErrorKind::ConnectionError),
        ("connection reset", GatewayErrorKind::ConnectionError),
        ("connection", GatewayErrorKind::ConnectionError),
        ("dns error", GatewayErrorKind::ConnectionError),
        ("invalid request", GatewayErrorKind::Validation),
        ("bad request", GatewayErrorKind::Validation),
    ];

    let lower = message.to_lowercase();
    for (pattern, kind) in patterns {
        if lower.contains(pattern) {
            return *kind;
        }
    }

    GatewayErrorKind::Unknown
}

fn mentions_quota(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("quota") || lower.contains("billing")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_before_message_patterns() {
        assert_eq!(
            classify_http_status(StatusCode::UNAUTHORIZED, "rate limit"),
            GatewayErrorKind::Authentication
        );
        assert_eq!(
            classify_http_status(StatusCode::BAD_GATEWAY, ""),
            GatewayErrorKind::ServerError
        );
        assert_eq!(
            classify_http_status(StatusCode::BAD_REQUEST, ""),
            GatewayErrorKind::Validation
        );
    }

    #[test]
    fn too_many_requests_distinguishes_quota_from_throttling() {
        assert_eq!(
            classify_http_status(StatusCode::TOO_MANY_REQUESTS, "You exceeded your current quota"),
            GatewayErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_http_status(StatusCode::TOO_MANY_REQUESTS, "Rate limit reached"),
            GatewayErrorKind::RateLimited
        );
    }

    #[test]
    fn message_patterns_classify_transport_failures() {
        assert_eq!(
            classify_message("error sending request: connection refused"),
            GatewayErrorKind::ConnectionError
        );
        assert_eq!(
            classify_message("operation timed out after 90s"),
            GatewayErrorKind::Timeout
        );
        assert_eq!(
            classify_message("Incorrect API key provided"),
            GatewayErrorKind::Authentication
        );
    }

    #[test]
    fn unmatched_messages_are_unknown() {
        assert_eq!(classify_message("something odd"), GatewayErrorKind::Unknown);
        assert!(GatewayErrorKind::Unknown.retryable());
    }
}
