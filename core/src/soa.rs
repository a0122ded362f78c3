//! SOA record operations: retrieval and (patchable) full update.

use serde_json::{json, Value};

use crate::auth::Credentials;
use crate::guard::execute;
use crate::params::{build_and_validate, FieldSpec, Template};
use crate::patch::merge_patch;
use crate::response::ApiResponse;
use crate::transport::{authed, HttpMethod, Transport};
use crate::validation::Rule;

const SOA_DETAILS: &str = "/dns/soa-details.json";
const MODIFY_SOA: &str = "/dns/modify-soa.json";

fn get_template() -> Template {
    Template::new(vec![FieldSpec::required("domain_name", Rule::DomainName)])
}

/// The full SOA field list with the remote service's timer bounds.
fn update_template() -> Template {
    Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("primary_ns", Rule::DomainName),
        FieldSpec::required("admin_mail", Rule::Email),
        FieldSpec::required("refresh", Rule::Integer { min: Some(1200), max: Some(43200) }),
        FieldSpec::required("retry", Rule::Integer { min: Some(180), max: Some(2419200) }),
        FieldSpec::required("expire", Rule::Integer { min: Some(1209600), max: Some(2419200) }),
        FieldSpec::required("default_ttl", Rule::Integer { min: Some(60), max: Some(2419200) }),
    ])
}

/// Retrieve the SOA record for `domain_name`.
pub fn get<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
) -> ApiResponse {
    let set = build_and_validate(
        &get_template(),
        vec![("domain_name".to_string(), json!(domain_name))],
    );
    execute(set, authed(transport, credentials, HttpMethod::Get, SOA_DETAILS))
}

/// Arguments for [`update`]. The remote endpoint only accepts a full SOA
/// record: with `patch` unset, every field must be supplied or validation
/// fails; with `patch` set, missing fields are filled from the current remote
/// state before submission.
#[derive(Debug, Clone, Default)]
pub struct SoaUpdate {
    pub domain_name: String,
    /// Hostname of the primary nameserver.
    pub primary_ns: Option<String>,
    /// DNS admin's email address.
    pub admin_mail: Option<String>,
    /// Refresh rate, 1200-43200 seconds.
    pub refresh: Option<i64>,
    /// Retry rate, 180-2419200 seconds.
    pub retry: Option<i64>,
    /// Expire time, 1209600-2419200 seconds.
    pub expire: Option<i64>,
    /// Default TTL, 60-2419200 seconds.
    pub default_ttl: Option<i64>,
    /// Fill unsupplied fields from the current remote state first.
    pub patch: bool,
}

impl SoaUpdate {
    fn args(&self) -> Vec<(String, Value)> {
        let mut args = vec![("domain_name".to_string(), json!(self.domain_name))];
        let mut push_opt = |name: &str, value: Option<Value>| {
            if let Some(value) = value {
                args.push((name.to_string(), value));
            }
        };
        push_opt("primary_ns", self.primary_ns.as_ref().map(|v| json!(v)));
        push_opt("admin_mail", self.admin_mail.as_ref().map(|v| json!(v)));
        push_opt("refresh", self.refresh.map(|v| json!(v)));
        push_opt("retry", self.retry.map(|v| json!(v)));
        push_opt("expire", self.expire.map(|v| json!(v)));
        push_opt("default_ttl", self.default_ttl.map(|v| json!(v)));
        args
    }
}

/// Update the SOA record for a domain.
pub fn update<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    update: &SoaUpdate,
) -> ApiResponse {
    let template = update_template();
    let set = if update.patch {
        let merged = merge_patch(&template, &update.domain_name, update.args(), |id| {
            get(transport, credentials, id).into_fetched_state()
        });
        match merged {
            Ok(set) => set,
            Err(e) => return ApiResponse::merge_failure(e),
        }
    } else {
        build_and_validate(&template, update.args())
    };
    execute(set, authed(transport, credentials, HttpMethod::Post, MODIFY_SOA))
}

/// Convenience for a patch update: unsupplied fields keep their current
/// remote values.
pub fn patch<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    args: &SoaUpdate,
) -> ApiResponse {
    let mut args = args.clone();
    args.patch = true;
    update(transport, credentials, &args)
}
