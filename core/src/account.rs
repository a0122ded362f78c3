//! Account-level operations: login check, nameserver listing, and a couple
//! of connectivity helpers. None of these take parameters beyond the
//! credentials themselves.

use crate::auth::Credentials;
use crate::guard::execute;
use crate::params::{build_and_validate, Template};
use crate::response::ApiResponse;
use crate::transport::{authed, HttpMethod, Transport};

const LOGIN: &str = "/dns/login.json";
const AVAILABLE_NAME_SERVERS: &str = "/dns/available-name-servers.json";
const GET_MY_IP: &str = "/dns/get-my-ip.json";
const IS_GEODNS_AVAILABLE: &str = "/dns/is-geodns-available.json";

fn bare_call<T: Transport>(transport: &T, credentials: &Credentials, path: &str) -> ApiResponse {
    let set = build_and_validate(&Template::new(vec![]), vec![]);
    execute(set, authed(transport, credentials, HttpMethod::Get, path))
}

/// Verify the credentials against the remote service.
pub fn get_login<T: Transport>(transport: &T, credentials: &Credentials) -> ApiResponse {
    bare_call(transport, credentials, LOGIN)
}

/// The nameservers available to this account.
pub fn get_nameservers<T: Transport>(transport: &T, credentials: &Credentials) -> ApiResponse {
    bare_call(transport, credentials, AVAILABLE_NAME_SERVERS)
}

/// The public IP the remote service sees this client as.
pub fn get_my_ip<T: Transport>(transport: &T, credentials: &Credentials) -> ApiResponse {
    bare_call(transport, credentials, GET_MY_IP)
}

/// Whether the account's plan includes GeoDNS.
pub fn is_geodns_available<T: Transport>(transport: &T, credentials: &Credentials) -> ApiResponse {
    bare_call(transport, credentials, IS_GEODNS_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::auth::Auth;
    use crate::error::TransportError;
    use crate::transport::TransportMap;

    struct Recorder {
        sent: RefCell<Vec<(HttpMethod, String, TransportMap)>>,
    }

    impl Transport for Recorder {
        fn send(
            &self,
            method: HttpMethod,
            path: &str,
            params: &TransportMap,
        ) -> Result<(u16, String), TransportError> {
            self.sent.borrow_mut().push((method, path.to_string(), params.clone()));
            Ok((200, r#"{"status":"Success","statusDescription":"Success login."}"#.to_string()))
        }
    }

    fn creds() -> Credentials {
        Credentials::new(Auth::Id("id".into()), "pw".into())
    }

    #[test]
    fn login_carries_only_credentials() {
        let transport = Recorder { sent: RefCell::new(Vec::new()) };
        let response = get_login(&transport, &creds());
        assert!(response.success());
        let sent = transport.sent.borrow();
        let (method, path, params) = &sent[0];
        assert_eq!(*method, HttpMethod::Get);
        assert_eq!(path, LOGIN);
        assert_eq!(
            *params,
            vec![
                ("auth-id".to_string(), "id".to_string()),
                ("auth-password".to_string(), "pw".to_string()),
            ]
        );
    }

    #[test]
    fn each_helper_hits_its_endpoint() {
        let transport = Recorder { sent: RefCell::new(Vec::new()) };
        get_nameservers(&transport, &creds());
        get_my_ip(&transport, &creds());
        is_geodns_available(&transport, &creds());
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].1, AVAILABLE_NAME_SERVERS);
        assert_eq!(sent[1].1, GET_MY_IP);
        assert_eq!(sent[2].1, IS_GEODNS_AVAILABLE);
    }
}
