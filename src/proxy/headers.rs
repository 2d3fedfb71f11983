//! Hop-by-hop header handling.
//!
//! Connection-management headers are meaningful for a single transport
//! hop and must not be forwarded in either direction.

use axum::http::{header, HeaderMap, HeaderName};

/// Headers scoped to a single hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Copy end-to-end headers, leaving hop-by-hop ones behind.
///
/// The Host header is also dropped; the client sets it from the
/// backend authority.
pub fn end_to_end_headers(source: &HeaderMap) -> HeaderMap {
    let mut headers = source.clone();
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::HOST);
    headers
}

/// Remove hop-by-hop headers from a response in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}
