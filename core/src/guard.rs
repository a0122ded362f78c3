//! The single boundary that turns every outcome into an [`ApiResponse`].
//!
//! An invalid parameter set short-circuits here: the transport capability is
//! never invoked, so the remote service cannot see malformed or incomplete
//! data. Transport faults and remote failures come back as failure responses
//! rather than errors.

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::params::ParameterSet;
use crate::response::ApiResponse;
use crate::transport::TransportMap;

/// Run one operation: an already-built parameter set goes through the
/// transport capability, and whatever happens becomes an [`ApiResponse`].
///
/// A set that failed validation never reaches `call`.
pub fn execute<F>(mut set: ParameterSet, call: F) -> ApiResponse
where
    F: FnOnce(TransportMap) -> Result<(u16, String), TransportError>,
{
    if !set.is_validated() {
        set.validate();
    }
    if !set.is_valid() {
        let errors = set.errors();
        debug!(fields = errors.len(), "rejected before transport");
        return ApiResponse::validation_failure(errors);
    }

    match call(set.to_transport_map()) {
        Ok((status_code, body)) => ApiResponse::from_exchange(status_code, &body),
        Err(e) => {
            warn!(error = %e, "transport fault");
            ApiResponse::from_transport_error(e)
        }
    }
}
