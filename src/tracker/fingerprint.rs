//! Visitor fingerprinting from HTTP request headers
//!
//! The fingerprint is a plain 31-multiplier rolling hash over
//! `"{address}-{user_agent}"`. It exists only to approximate unique-visitor
//! counts; collisions are expected and nothing here is a security boundary.

use axum::http::HeaderMap;

use crate::models::RequestMetadata;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const USER_AGENT: &str = "user-agent";

impl RequestMetadata {
    /// Collect the fingerprint signals from request headers
    ///
    /// Values are decoded byte-for-byte as Latin-1, so any header that is
    /// present contributes to the fingerprint.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            forwarded_for: header_value(headers, FORWARDED_FOR),
            real_ip: header_value(headers, REAL_IP),
            user_agent: header_value(headers, USER_AGENT),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|h| h.as_bytes().iter().map(|&b| char::from(b)).collect())
}

/// Fingerprint for a request's metadata
pub fn fingerprint(metadata: &RequestMetadata) -> String {
    fingerprint_parts(metadata.client_address(), metadata.user_agent_or_unknown())
}

/// Fingerprint for an explicit address / user-agent pair
pub fn fingerprint_parts(address: &str, user_agent: &str) -> String {
    let combined = format!("{address}-{user_agent}");
    rolling_hash(&combined).to_string()
}

/// `hash = hash * 31 + unit` over UTF-16 code units, wrapping at 32 bits
fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}
