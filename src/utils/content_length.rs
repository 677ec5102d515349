//! Content length extraction utilities.
//!
//! Helpers for reading sizes out of `Content-Length` and `Content-Range`
//! headers.

use reqwest::{
    header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE},
    Response, StatusCode,
};

/// Read the `Content-Length` header.
///
/// Unlike [`Response::content_length`] this reads the header itself, which
/// matters for HEAD responses whose body is always empty.
pub fn header_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Total size of the resource a GET response is part of.
///
/// A `206 Partial Content` response carries it in `Content-Range`; any
/// other response covers the body starting at `offset`, so the total is its
/// length plus the offset.
pub fn response_total(response: &Response, offset: u64) -> Option<u64> {
    if response.status() == StatusCode::PARTIAL_CONTENT {
        content_range(response.headers()).and_then(parse_content_range_total)
    } else {
        response.content_length().map(|len| len.saturating_add(offset))
    }
}

/// Raw `Content-Range` header value, if present and valid ASCII.
pub fn content_range(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_RANGE).and_then(|v| v.to_str().ok())
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total", or "bytes */total"
/// for a `416` answer. An unknown total (`*`) yields `None`.
///
/// ```rust
/// use zipmirror::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes */2048"), Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// Parse Content-Range header to extract the first byte position.
///
/// ```rust
/// use zipmirror::utils::parse_content_range_start;
///
/// assert_eq!(parse_content_range_start("bytes 200-1023/2048"), Some(200));
/// ```
pub fn parse_content_range_start(content_range: &str) -> Option<u64> {
    let range = content_range.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = range.split_once('-')?;
    start.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
        assert_eq!(parse_content_range_total("bytes 200-1023/5000"), Some(5000));
        assert_eq!(parse_content_range_total("bytes 0-0/1"), Some(1));
        assert_eq!(parse_content_range_total("bytes */42"), Some(42));
        assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
        assert_eq!(parse_content_range_total("invalid"), None);
        assert_eq!(parse_content_range_total("bytes 0-1023"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[test]
    fn test_parse_content_range_total_edge_cases() {
        // Test with whitespace
        assert_eq!(parse_content_range_total("bytes 0-1023/ 2048 "), Some(2048));
        // Test with zero size
        assert_eq!(parse_content_range_total("bytes 0-0/0"), Some(0));
        // Test with large numbers
        assert_eq!(
            parse_content_range_total("bytes 0-1023/999999999999"),
            Some(999999999999)
        );
    }

    #[test]
    fn test_parse_content_range_start() {
        assert_eq!(parse_content_range_start("bytes 0-1023/2048"), Some(0));
        assert_eq!(parse_content_range_start("bytes 512-1023/1024"), Some(512));
        assert_eq!(parse_content_range_start("bytes */1024"), None);
        assert_eq!(parse_content_range_start("items 0-1/2"), None);
        assert_eq!(parse_content_range_start(""), None);
    }

    #[test]
    fn test_header_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_content_length(&headers), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        assert_eq!(header_content_length(&headers), Some(1024));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(header_content_length(&headers), None);
    }
}
