//! Request size limits.
//!
//! Header bytes are the sum of every name and value; exceeding
//! `max-header-size` answers 431. Bodies over `max-body-size` (or
//! `max-multipart-memory-size` for multipart payloads) answer 413.

use crate::config::LimiterConfig;
use crate::error::GatewayError;
use crate::model::header::{Header, CONTENT_TYPE};

pub fn check_header_size(limiter: &LimiterConfig, header: &Header) -> Result<(), GatewayError> {
    let size = header.size();
    let limit = limiter.max_header_size();
    if size > limit {
        return Err(GatewayError::HeaderTooLarge { size, limit });
    }
    Ok(())
}

/// Body byte limit for a request carrying `header`.
pub fn body_limit(limiter: &LimiterConfig, header: &Header) -> usize {
    let multipart = header
        .get(CONTENT_TYPE)
        .is_some_and(|mime| mime.trim_start().to_ascii_lowercase().starts_with("multipart/"));
    if multipart {
        limiter.max_multipart_memory_size()
    } else {
        limiter.max_body_size()
    }
}

pub fn check_body_size(limit: usize, size: usize) -> Result<(), GatewayError> {
    if size > limit {
        return Err(GatewayError::PayloadTooLarge { limit });
    }
    Ok(())
}
