//! Internal error taxonomy for the client core.
//!
//! # Design
//! These enums circulate *inside* the crate only. Every public entity
//! operation funnels through the call guard, which converts each kind into a
//! failure `ApiResponse`: callers always receive a response value, never an
//! `Err`. `FetchError` gets its own type because the patch merger must
//! distinguish "the entity does not exist" from "the wire broke" from "the
//! remote said no."

use thiserror::Error;

/// Network-level failures reported by a [`Transport`](crate::Transport)
/// implementation. No remote status code is available for any of these.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established or broke mid-exchange.
    #[error("connection error: {0}")]
    Connection(String),

    /// The exchange did not complete in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The exchange completed but the body was not JSON.
    #[error("response body was not valid JSON: {0}")]
    BadBody(String),
}

/// Failures obtaining the current remote state during a patch merge.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The target entity does not exist on the remote service.
    #[error("{0} not found")]
    NotFound(String),

    /// The fetch never produced a remote response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The remote service answered the fetch with a failure of its own.
    #[error("{message}")]
    Remote {
        /// Status code of the failed fetch exchange.
        status_code: u16,
        /// The remote's own error text, carried verbatim.
        message: String,
    },
}

/// Failures loading credentials from the environment.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("environment variable CLOUDNS_API_AUTH_PASSWORD not set")]
    MissingPassword,

    #[error(
        "no environment variable CLOUDNS_API_AUTH_ID, CLOUDNS_API_SUB_AUTH_ID \
         or CLOUDNS_API_SUB_AUTH_USER is set"
    )]
    MissingAuthId,
}
