const MAX_ERROR_LENGTH: usize = 500;

/// Sanitizes an error string before it is persisted to a job record or sent
/// in a notification. Credentials leaking into upstream error bodies must
/// not end up in durable storage.
pub fn sanitize_error(error: &str) -> String {
    let trimmed = error.trim();

    let truncated = if trimmed.len() > MAX_ERROR_LENGTH {
        let mut end = MAX_ERROR_LENGTH;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} chars total)", &trimmed[..end], trimmed.len())
    } else {
        trimmed.to_string()
    };

    redact_sensitive_patterns(&truncated)
}

fn redact_sensitive_patterns(text: &str) -> String {
    let patterns = [
        ("Bearer ", "Bearer [REDACTED]"),
        ("api_key=", "api_key=[REDACTED]"),
        ("api-key: ", "api-key: [REDACTED]"),
        ("password=", "password=[REDACTED]"),
        ("secret=", "secret=[REDACTED]"),
        ("token=", "token=[REDACTED]"),
    ];

    let mut result = text.to_string();
    for (pattern, replacement) in patterns {
        if let Some(idx) = result.find(pattern) {
            let end = result[idx + pattern.len()..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
                .map(|i| idx + pattern.len() + i)
                .unwrap_or(result.len());
            result = format!("{}{}{}", &result[..idx], replacement, &result[end..]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_redacted() {
        let sanitized = sanitize_error("HTTP 401: Authorization: Bearer sk-abc123 rejected");
        assert!(!sanitized.contains("sk-abc123"));
        assert!(sanitized.contains("Bearer [REDACTED]"));
    }

    #[test]
    fn long_errors_are_truncated() {
        let long = "x".repeat(2000);
        let sanitized = sanitize_error(&long);
        assert!(sanitized.len() < 600);
        assert!(sanitized.contains("2000 chars total"));
    }

    #[test]
    fn short_errors_pass_through() {
        assert_eq!(sanitize_error("timeout: call exceeded 90s"), "timeout: call exceeded 90s");
    }
}
