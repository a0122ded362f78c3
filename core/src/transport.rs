//! The transport seam: the core builds parameter maps and interprets bodies
//! without ever touching the network.
//!
//! # Design
//! A [`Transport`] implementation owns the base URL and the actual I/O; the
//! core hands it a method, an endpoint path and the prepared parameter map.
//! Everything crossing the seam is plain owned data, so test transports are
//! trivial to write and no HTTP crate leaks into the core's dependency
//! graph.

use crate::auth::Credentials;
use crate::error::TransportError;

/// HTTP method for a remote call. The remote API only ever uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// The prepared request parameters: remote-cased names paired with
/// stringified values, in template order. Repeated keys are legal (nameserver
/// lists).
pub type TransportMap = Vec<(String, String)>;

/// Capability for executing one request against the remote service.
///
/// Implementations return the raw status code and body; interpreting them is
/// the response wrapper's job. Network-level failures map to
/// [`TransportError`].
pub trait Transport {
    fn send(
        &self,
        method: HttpMethod,
        path: &str,
        params: &TransportMap,
    ) -> Result<(u16, String), TransportError>;
}

/// Build the call-guard closure for one operation: merges the authentication
/// fields into the prepared map, then hands it to the transport.
pub fn authed<'a, T: Transport + ?Sized>(
    transport: &'a T,
    credentials: &'a Credentials,
    method: HttpMethod,
    path: &'a str,
) -> impl FnOnce(TransportMap) -> Result<(u16, String), TransportError> + 'a {
    move |mut params| {
        credentials.apply(&mut params);
        transport.send(method, path, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, Credentials};

    struct Echo;

    impl Transport for Echo {
        fn send(
            &self,
            method: HttpMethod,
            path: &str,
            params: &TransportMap,
        ) -> Result<(u16, String), TransportError> {
            assert_eq!(method, HttpMethod::Get);
            assert_eq!(path, "/dns/login.json");
            Ok((200, format!("{params:?}")))
        }
    }

    #[test]
    fn authed_appends_credentials_before_sending() {
        let creds = Credentials::new(Auth::Id("user".into()), "secret".into());
        let call = authed(&Echo, &creds, HttpMethod::Get, "/dns/login.json");
        let (status, body) = call(vec![("domain-name".into(), "example.com".into())]).unwrap();
        assert_eq!(status, 200);
        assert!(body.contains("auth-id"));
        assert!(body.contains("auth-password"));
        assert!(body.contains("domain-name"));
    }
}
