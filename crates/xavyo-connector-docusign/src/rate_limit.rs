//! Rate-limit metadata from DocuSign response headers.
//!
//! DocuSign reports its hourly API quota through `X-RateLimit-*` headers. The
//! connector does not throttle itself; it only forwards what it sees.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use xavyo_connector_sdk::{RateLimitDescription, RateLimitStatus};

pub const LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RESET_HEADER: &str = "X-RateLimit-Reset";

/// Values at or above this are epoch seconds, smaller ones are a delay.
const EPOCH_THRESHOLD: i64 = 1_000_000_000;

/// Build a [`RateLimitDescription`] from a response.
///
/// Returns `None` when the response carries none of the rate-limit headers.
pub fn describe(status: StatusCode, headers: &HeaderMap) -> Option<RateLimitDescription> {
    let limit = header_u64(headers, LIMIT_HEADER);
    let remaining = header_u64(headers, REMAINING_HEADER);
    let reset_at = header_i64(headers, RESET_HEADER).and_then(reset_time);

    if limit.is_none() && remaining.is_none() && reset_at.is_none() {
        return None;
    }

    let status = if status == StatusCode::TOO_MANY_REQUESTS || remaining == Some(0) {
        RateLimitStatus::Overlimit
    } else if limit.is_some() || remaining.is_some() {
        RateLimitStatus::Ok
    } else {
        RateLimitStatus::Unknown
    };

    Some(RateLimitDescription {
        status,
        limit,
        remaining,
        reset_at,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}

fn reset_time(value: i64) -> Option<DateTime<Utc>> {
    if value >= EPOCH_THRESHOLD {
        Utc.timestamp_opt(value, 0).single()
    } else if value >= 0 {
        Some(Utc::now() + Duration::seconds(value))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_no_headers_no_description() {
        assert!(describe(StatusCode::OK, &HeaderMap::new()).is_none());
        assert!(describe(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new()).is_none());
    }

    #[test]
    fn test_ok_with_quota_left() {
        let desc = describe(
            StatusCode::OK,
            &headers(&[
                ("x-ratelimit-limit", "1000"),
                ("x-ratelimit-remaining", "998"),
                ("x-ratelimit-reset", "1767225600"),
            ]),
        )
        .unwrap();

        assert_eq!(desc.status, RateLimitStatus::Ok);
        assert_eq!(desc.limit, Some(1000));
        assert_eq!(desc.remaining, Some(998));
        assert_eq!(desc.reset_at.unwrap().timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_overlimit_when_exhausted_or_throttled() {
        let exhausted = describe(
            StatusCode::OK,
            &headers(&[("x-ratelimit-limit", "1000"), ("x-ratelimit-remaining", "0")]),
        )
        .unwrap();
        assert_eq!(exhausted.status, RateLimitStatus::Overlimit);

        let throttled = describe(
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("x-ratelimit-remaining", "12")]),
        )
        .unwrap();
        assert_eq!(throttled.status, RateLimitStatus::Overlimit);
    }

    #[test]
    fn test_reset_only_is_unknown() {
        let desc = describe(StatusCode::OK, &headers(&[("x-ratelimit-reset", "60")])).unwrap();
        assert_eq!(desc.status, RateLimitStatus::Unknown);
        assert!(desc.reset_at.unwrap() > Utc::now());
    }

    #[test]
    fn test_garbage_values_ignored() {
        assert!(describe(
            StatusCode::OK,
            &headers(&[("x-ratelimit-limit", "lots"), ("x-ratelimit-reset", "-5")])
        )
        .is_none());
    }
}
