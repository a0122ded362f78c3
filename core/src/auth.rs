//! Credentials merged into every request.
//!
//! The remote service authenticates per request with an id/password pair in
//! the query string. Three account flavors exist, each with its own id
//! parameter name. Loaded once from the environment at startup
//! ([`Credentials::from_env`]) or constructed directly for tests.

use std::env;

use crate::error::CredentialsError;
use crate::transport::TransportMap;

/// Which account flavor the id belongs to; determines the parameter name on
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Main account (`auth-id`).
    Id(String),
    /// API sub-user by numeric id (`sub-auth-id`).
    SubId(String),
    /// API sub-user by username (`sub-auth-user`).
    SubUser(String),
}

/// The read-only credential pair consumed by the transport layer.
#[derive(Debug, Clone)]
pub struct Credentials {
    auth: Auth,
    password: String,
}

impl Credentials {
    pub fn new(auth: Auth, password: String) -> Self {
        Self { auth, password }
    }

    /// Load credentials from `CLOUDNS_API_AUTH_PASSWORD` plus the first of
    /// `CLOUDNS_API_AUTH_ID`, `CLOUDNS_API_SUB_AUTH_ID`,
    /// `CLOUDNS_API_SUB_AUTH_USER` that is set and non-empty.
    pub fn from_env() -> Result<Self, CredentialsError> {
        let password = non_empty("CLOUDNS_API_AUTH_PASSWORD")
            .ok_or(CredentialsError::MissingPassword)?;

        let auth = if let Some(id) = non_empty("CLOUDNS_API_AUTH_ID") {
            Auth::Id(id)
        } else if let Some(id) = non_empty("CLOUDNS_API_SUB_AUTH_ID") {
            Auth::SubId(id)
        } else if let Some(user) = non_empty("CLOUDNS_API_SUB_AUTH_USER") {
            Auth::SubUser(user)
        } else {
            return Err(CredentialsError::MissingAuthId);
        };

        Ok(Self { auth, password })
    }

    /// Push the authentication fields onto a prepared transport map.
    pub fn apply(&self, params: &mut TransportMap) {
        let (name, value) = match &self.auth {
            Auth::Id(id) => ("auth-id", id),
            Auth::SubId(id) => ("sub-auth-id", id),
            Auth::SubUser(user) => ("sub-auth-user", user),
        };
        params.push((name.to_string(), value.clone()));
        params.push(("auth-password".to_string(), self.password.clone()));
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_pushes_main_account_fields() {
        let creds = Credentials::new(Auth::Id("user-123".into()), "hunter2".into());
        let mut map = TransportMap::new();
        creds.apply(&mut map);
        assert_eq!(
            map,
            vec![
                ("auth-id".to_string(), "user-123".to_string()),
                ("auth-password".to_string(), "hunter2".to_string()),
            ]
        );
    }

    #[test]
    fn apply_uses_the_sub_account_parameter_names() {
        let mut map = TransportMap::new();
        Credentials::new(Auth::SubId("42".into()), "pw".into()).apply(&mut map);
        assert_eq!(map[0].0, "sub-auth-id");

        let mut map = TransportMap::new();
        Credentials::new(Auth::SubUser("sub".into()), "pw".into()).apply(&mut map);
        assert_eq!(map[0].0, "sub-auth-user");
    }

    #[test]
    fn apply_appends_without_clobbering_operation_fields() {
        let creds = Credentials::new(Auth::Id("u".into()), "p".into());
        let mut map = vec![("domain-name".to_string(), "example.com".to_string())];
        creds.apply(&mut map);
        assert_eq!(map.len(), 3);
        assert_eq!(map[0].0, "domain-name");
    }
}
