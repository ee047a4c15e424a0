// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Client address resolution.
//!
//! The direct peer of the proxy is carried as a [`RemoteAddr`] request
//! extension; proxies in front of it are listed in `X-Forwarded-For`.

use http::Request;
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address of the connection's peer, attached to the request by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Returns the first `X-Forwarded-For` entry, falling back to the peer
/// address when the header is absent or its first entry is not an IP.
pub fn remote_host<B>(req: &Request<B>) -> Option<IpAddr> {
    forwarded_for(req)
        .and_then(|chain| chain.split(|&b| b == b',').next())
        .and_then(parse_ip)
        .or_else(|| peer(req))
}

/// Like [`remote_host`] but takes the last `X-Forwarded-For` entry, the one
/// appended by the closest proxy.
pub fn remote_host_from_last<B>(req: &Request<B>) -> Option<IpAddr> {
    forwarded_for(req)
        .and_then(|chain| chain.rsplit(|&b| b == b',').next())
        .and_then(parse_ip)
        .or_else(|| peer(req))
}

// Raw bytes: a non-ASCII byte in one entry must not hide the others.
// A repeated header is read like the gateway's Header.Get, first one only.
fn forwarded_for<B>(req: &Request<B>) -> Option<&[u8]> {
    req.headers().get(X_FORWARDED_FOR).map(|v| v.as_bytes())
}

fn peer<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions().get::<RemoteAddr>().map(|addr| addr.0.ip())
}

fn parse_ip(entry: &[u8]) -> Option<IpAddr> {
    std::str::from_utf8(entry).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn request(forwarded: Option<&str>, peer: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        if let Some(chain) = forwarded {
            builder = builder.header("X-Forwarded-For", chain);
        }
        if let Some(addr) = peer {
            builder = builder.extension(RemoteAddr(addr.parse().unwrap()));
        }
        builder.body(()).unwrap()
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_peer_only() {
        let req = request(None, Some("4.4.4.4:51234"));
        assert_eq!(remote_host(&req), ip("4.4.4.4"));
        assert_eq!(remote_host_from_last(&req), ip("4.4.4.4"));
    }

    #[test]
    fn test_forwarded_chain() {
        let req = request(Some("1.1.1.1, 2.2.2.2, 3.3.3.3"), Some("4.4.4.4:443"));
        assert_eq!(remote_host(&req), ip("1.1.1.1"));
        assert_eq!(remote_host_from_last(&req), ip("3.3.3.3"));
    }

    #[test]
    fn test_single_entry_chain() {
        let req = request(Some(" 2001:db8::1 "), None);
        assert_eq!(remote_host(&req), ip("2001:db8::1"));
        assert_eq!(remote_host_from_last(&req), ip("2001:db8::1"));
    }

    #[test]
    fn test_invalid_entry_falls_back_to_peer() {
        let req = request(Some("unknown, 2.2.2.2, garbage"), Some("[2001:db8::2]:8080"));
        assert_eq!(remote_host(&req), ip("2001:db8::2"));
        assert_eq!(remote_host_from_last(&req), ip("2001:db8::2"));
    }

    #[test]
    fn test_non_ascii_entry_does_not_hide_chain() {
        let req = Request::builder()
            .header(
                "X-Forwarded-For",
                HeaderValue::from_bytes(b"1.1.1.1, proxy-\xf1, 3.3.3.3").unwrap(),
            )
            .extension(RemoteAddr("4.4.4.4:443".parse().unwrap()))
            .body(())
            .unwrap();
        assert_eq!(remote_host(&req), ip("1.1.1.1"));
        assert_eq!(remote_host_from_last(&req), ip("3.3.3.3"));

        let mut req = request(None, Some("4.4.4.4:443"));
        req.headers_mut().insert(
            "x-forwarded-for",
            HeaderValue::from_bytes(b"caf\xe9, 2.2.2.2").unwrap(),
        );
        assert_eq!(remote_host(&req), ip("4.4.4.4"));
        assert_eq!(remote_host_from_last(&req), ip("2.2.2.2"));
    }

    #[test]
    fn test_repeated_header_uses_first() {
        let mut req = request(Some("1.1.1.1"), None);
        req.headers_mut()
            .append("x-forwarded-for", HeaderValue::from_static("3.3.3.3"));
        assert_eq!(remote_host(&req), ip("1.1.1.1"));
        assert_eq!(remote_host_from_last(&req), ip("1.1.1.1"));
    }

    #[test]
    fn test_no_address() {
        let req = request(None, None);
        assert_eq!(remote_host(&req), None);
        assert_eq!(remote_host_from_last(&req), None);

        let req = request(Some("garbage"), None);
        assert_eq!(remote_host(&req), None);
    }
}
