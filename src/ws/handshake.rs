//! RFC 6455 handshake helper (spec.md §6 "WebSocket upgrade"). The core
//! doesn't own a socket to upgrade (spec.md §1 Non-goals: "not a protocol
//! implementation of ... WebSocket framing"), so this only computes the
//! `Sec-WebSocket-Accept` value; writing the `101 Switching Protocols`
//! response and handing the raw connection off to a transport is the
//! caller's job.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha1::{Digest, Sha1};

use crate::request::{Header, RawRequest};

const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// `base64(sha1(key + GUID))`, per RFC 6455 §1.3.
pub fn accept_key(sec_websocket_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(sec_websocket_key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Whether `request` carries the headers of a WebSocket upgrade request:
/// `Upgrade: websocket` and `Connection` containing `upgrade`.
pub fn is_upgrade_request(request: &RawRequest) -> bool {
    let upgrades = request
        .headers
        .get(&Header::new("upgrade"))
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);
    let connection_upgrades = request
        .headers
        .get(&Header::new("connection"))
        .map(|v| v.split(',').any(|part| part.trim().eq_ignore_ascii_case("upgrade")))
        .unwrap_or(false);
    upgrades && connection_upgrades
}

/// Extract `Sec-WebSocket-Key` from the request, if present.
pub fn sec_websocket_key(request: &RawRequest) -> Option<&str> {
    request
        .headers
        .get(&Header::new("sec-websocket-key"))
        .map(|s| s.as_str())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    #[test]
    fn test_accept_key_matches_rfc6455_example() {
        // The worked example from RFC 6455 §1.3.
        assert_eq!(accept_key("dGhlIHNhbXBsZSBub25jZQ=="), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn test_is_upgrade_request() {
        let request = Request::default()
            .with_header("upgrade", "websocket")
            .with_header("connection", "Upgrade");
        assert!(is_upgrade_request(&request));

        let not_upgrade = Request::default();
        assert!(!is_upgrade_request(&not_upgrade));
    }

    #[test]
    fn test_sec_websocket_key_extracted() {
        let request = Request::default().with_header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(sec_websocket_key(&request), Some("dGhlIHNhbXBsZSBub25jZQ=="));
    }
}
