//! JSON decoding of payloads and failure bodies.
//!
//! The auth service speaks JSON in both directions. Success bodies are
//! decoded into the types from [`crate::types`]; failure bodies are never
//! decoded into a structured error. They're reduced to a single reason
//! string by [`error_reason`], because callers only ever show that string
//! to a human.

use serde::de::DeserializeOwned;

use crate::{ErrorBody, ProtocolError};

/// Deserializes JSON bytes into a value.
///
/// # Errors
/// Returns [`ProtocolError::Decode`] if the bytes are malformed,
/// incomplete, or don't match the expected type.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(data).map_err(ProtocolError::Decode)
}

/// Extracts the human-readable reason from a failure body.
///
/// The service reports failures as `{"detail": "..."}`. Anything else
/// (an unparsable body, a missing `detail`, an empty string, or the array
/// of field errors a request validator produces) falls back to
/// `default`.
///
/// ```rust
/// use authline_protocol::error_reason;
///
/// assert_eq!(error_reason(br#"{"detail":"bad code"}"#, "failed"), "bad code");
/// assert_eq!(error_reason(b"<html>502</html>", "failed"), "failed");
/// ```
pub fn error_reason(body: &[u8], default: &str) -> String {
    match decode::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(serde_json::Value::String(detail)),
        }) if !detail.trim().is_empty() => detail,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageResponse;

    #[test]
    fn test_error_reason_string_detail_returned_verbatim() {
        let body = r#"{"detail":"用户名或密码错误"}"#.as_bytes();
        assert_eq!(error_reason(body, "login failed"), "用户名或密码错误");
    }

    #[test]
    fn test_error_reason_unparsable_body_uses_default() {
        assert_eq!(error_reason(b"Internal Server Error", "login failed"), "login failed");
        assert_eq!(error_reason(b"", "login failed"), "login failed");
    }

    #[test]
    fn test_error_reason_missing_or_null_detail_uses_default() {
        assert_eq!(error_reason(b"{}", "request failed"), "request failed");
        assert_eq!(error_reason(br#"{"detail":null}"#, "request failed"), "request failed");
    }

    #[test]
    fn test_error_reason_empty_detail_uses_default() {
        assert_eq!(error_reason(br#"{"detail":"  "}"#, "request failed"), "request failed");
    }

    #[test]
    fn test_error_reason_validation_array_uses_default() {
        // Request validators report a list of per-field problems.
        let body = br#"{"detail":[{"loc":["body","email"],"msg":"bad"}]}"#;
        assert_eq!(error_reason(body, "email binding failed"), "email binding failed");
    }

    #[test]
    fn test_decode_wrong_shape_returns_decode_error() {
        let result = decode::<MessageResponse>(br#"{"msg":"ok"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
