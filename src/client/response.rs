//! Mapping HTTP outcomes onto the gateway's error taxonomy.

use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::config::{HEADER_RETRY_AFTER, HTTP_STATUS_TOO_MANY_REQUESTS};
use crate::error_handling::{GatewayError, ThrottleSignal};

/// Longest advisory wait honored from an HTTP-date `Retry-After`.
const MAX_RETRY_AFTER_DATE_SECS: i64 = 3600;

/// Parses a `Retry-After` header value.
///
/// Accepts delay-seconds (`"3"`) or an HTTP-date. A date in the past means no wait;
/// dates more than an hour ahead, and anything unparseable, yield `None` so the caller
/// falls back to its default wait.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        let remaining = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        let secs = remaining.num_seconds();
        if secs <= 0 {
            return Some(Duration::ZERO);
        }
        if secs <= MAX_RETRY_AFTER_DATE_SECS {
            return Some(Duration::from_secs(secs as u64));
        }
    }

    log::warn!("Could not use Retry-After value '{}', using default wait", value);
    None
}

/// Error for a non-success status.
///
/// `retry_after` is the raw header value, consulted only for throttling responses.
pub fn status_error(
    status: StatusCode,
    retry_after: Option<&str>,
    message: String,
    request: &str,
) -> GatewayError {
    let code = status.as_u16();
    if code == HTTP_STATUS_TOO_MANY_REQUESTS {
        return GatewayError::Throttled(ThrottleSignal::new(
            request,
            retry_after.and_then(parse_retry_after),
        ));
    }
    if status.is_server_error() {
        GatewayError::ServerError {
            status: code,
            message,
        }
    } else {
        GatewayError::ClientError {
            status: code,
            message,
        }
    }
}

/// Passes successful responses through and turns everything else into a
/// `GatewayError`.
pub async fn classify(response: Response, request: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(HEADER_RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status.canonical_reason().unwrap_or("").to_string(),
    };
    Err(status_error(status, retry_after.as_deref(), message, request))
}

/// Error for a request that produced no HTTP response.
pub fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        // The request itself is malformed; resending it cannot help.
        GatewayError::ClientError {
            status: 0,
            message: err.to_string(),
        }
    } else if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::NetworkError(err.to_string())
    }
}
