//! Synchronous client core for the ClouDNS management API.
//!
//! # Overview
//! Validates and normalizes request parameters, merges patch updates over
//! fetched remote state, and wraps raw HTTP exchanges into a uniform
//! [`ApiResponse`], all without touching the network. The caller supplies a
//! [`Transport`] that executes the actual round-trip, so the core stays
//! deterministic and testable.
//!
//! # Design
//! - Every operation declares a [`Template`] of fields and [`Rule`]s; a
//!   [`ParameterSet`] built from it either reaches the wire fully validated
//!   or never reaches it at all.
//! - Local names are snake_case; [`casing`] maps them to the remote API's
//!   dash-case request names and back from its camelCase response keys.
//! - The remote reports failures inside 200 bodies (`"status": "Failed"`);
//!   the response wrapper folds that, HTTP status classes, and transport
//!   faults into one success flag.
//! - Entity modules ([`soa`], [`zone`], [`record`], [`account`]) always
//!   return an [`ApiResponse`]; errors are data, not panics.

pub mod account;
pub mod auth;
pub mod casing;
pub mod error;
pub mod guard;
pub mod params;
pub mod patch;
pub mod record;
pub mod response;
pub mod soa;
pub mod transport;
pub mod validation;
pub mod zone;

pub use auth::{Auth, Credentials};
pub use error::{CredentialsError, FetchError, TransportError};
pub use guard::execute;
pub use params::{build_and_validate, FieldSpec, ParameterSet, Template};
pub use patch::merge_patch;
pub use response::{
    ApiResponse, STATUS_NOT_FOUND, STATUS_NO_EXCHANGE, STATUS_VALIDATION,
};
pub use transport::{authed, HttpMethod, Transport, TransportMap};
pub use validation::Rule;
