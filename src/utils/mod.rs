//! Shared utility functions.
//!
//! - [`content_length`] - Size extraction from `Content-Length` and
//!   `Content-Range` headers

pub mod content_length;

pub use content_length::{
    content_range, header_content_length, parse_content_range_start, parse_content_range_total,
    response_total,
};
