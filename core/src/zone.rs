//! Zone operations: listing, creation, lifecycle, DNSSEC and status checks.

use serde_json::{json, Value};

use crate::auth::Credentials;
use crate::guard::execute;
use crate::params::{build_and_validate, FieldSpec, Template};
use crate::response::ApiResponse;
use crate::transport::{authed, HttpMethod, Transport};
use crate::validation::Rule;

const LIST_ZONES: &str = "/dns/list-zones.json";
const PAGES_COUNT: &str = "/dns/get-pages-count.json";
const REGISTER: &str = "/dns/register.json";
const ZONE_INFO: &str = "/dns/get-zone-info.json";
const UPDATE_ZONE: &str = "/dns/update-zone.json";
const CHANGE_STATUS: &str = "/dns/change-status.json";
const DELETE: &str = "/dns/delete.json";
const ZONES_STATS: &str = "/dns/get-zones-stats.json";
const IS_UPDATED: &str = "/dns/is-updated.json";
const DNSSEC_AVAILABLE: &str = "/dns/is-dnssec-available.json";
const DNSSEC_ACTIVATE: &str = "/dns/activate-dnssec.json";
const DNSSEC_DEACTIVATE: &str = "/dns/deactivate-dnssec.json";
const DNSSEC_DS_RECORDS: &str = "/dns/get-dnssec-ds-records.json";
const GEODNS_LOCATIONS: &str = "/dns/get-geodns-locations.json";

/// Paging and filtering arguments shared by [`list`] and [`get_page_count`].
#[derive(Debug, Clone)]
pub struct ZoneQuery {
    pub page: i64,
    pub rows_per_page: i64,
    /// Keyword matched against zone names.
    pub search: Option<String>,
    /// Limit results to zones within a group.
    pub group_id: Option<i64>,
}

impl Default for ZoneQuery {
    fn default() -> Self {
        Self { page: 1, rows_per_page: 10, search: None, group_id: None }
    }
}

impl ZoneQuery {
    fn filter_args(&self) -> Vec<(String, Value)> {
        let mut args = vec![("rows_per_page".to_string(), json!(self.rows_per_page))];
        if let Some(search) = &self.search {
            args.push(("search".to_string(), json!(search)));
        }
        if let Some(group_id) = self.group_id {
            args.push(("group_id".to_string(), json!(group_id)));
        }
        args
    }
}

fn query_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("rows_per_page", Rule::RowsPerPage),
        FieldSpec::optional("search", Rule::Text),
        FieldSpec::optional("group_id", Rule::Integer { min: None, max: None }),
    ]
}

/// Return one page of the zone listing.
pub fn list<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    query: &ZoneQuery,
) -> ApiResponse {
    let mut fields = vec![FieldSpec::required(
        "page",
        Rule::Integer { min: Some(1), max: None },
    )];
    fields.extend(query_fields());
    let mut args = vec![("page".to_string(), json!(query.page))];
    args.extend(query.filter_args());
    let set = build_and_validate(&Template::new(fields), args);
    execute(set, authed(transport, credentials, HttpMethod::Get, LIST_ZONES))
}

/// Return the number of pages for the full or filtered listing.
pub fn get_page_count<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    query: &ZoneQuery,
) -> ApiResponse {
    let set = build_and_validate(&Template::new(query_fields()), query.filter_args());
    execute(set, authed(transport, credentials, HttpMethod::Get, PAGES_COUNT))
}

/// Arguments for [`create`].
#[derive(Debug, Clone, Default)]
pub struct ZoneCreate {
    pub domain_name: String,
    /// master, slave, parked or geodns.
    pub zone_type: String,
    /// Starting NS records; master zones only.
    pub ns: Vec<String>,
    /// Master server address; required for slave zones.
    pub master_ip: Option<String>,
}

/// Register a new DNS zone.
pub fn create<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    create: &ZoneCreate,
) -> ApiResponse {
    let zone_type = create.zone_type.to_ascii_lowercase();
    let mut fields = vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("zone_type", Rule::ZoneType),
    ];
    let mut args = vec![
        ("domain_name".to_string(), json!(create.domain_name)),
        ("zone_type".to_string(), json!(zone_type)),
    ];
    // The required argument set depends on the zone type being registered.
    if zone_type == "slave" {
        fields.push(FieldSpec::required("master_ip", Rule::Ipv4));
        args.push(("master_ip".to_string(), json!(create.master_ip)));
    }
    if zone_type == "master" && !create.ns.is_empty() {
        fields.push(FieldSpec::optional("ns", Rule::Text));
        args.push(("ns".to_string(), json!(create.ns)));
    }
    let set = build_and_validate(&Template::new(fields), args);
    execute(set, authed(transport, credentials, HttpMethod::Post, REGISTER))
}

fn domain_op<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    method: HttpMethod,
    path: &str,
    domain_name: &str,
) -> ApiResponse {
    let template = Template::new(vec![FieldSpec::required("domain_name", Rule::DomainName)]);
    let set = build_and_validate(
        &template,
        vec![("domain_name".to_string(), json!(domain_name))],
    );
    execute(set, authed(transport, credentials, method, path))
}

/// Retrieve the zone information for a domain.
pub fn get<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Get, ZONE_INFO, domain_name)
}

/// Bump the zone's serial number.
pub fn update<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Post, UPDATE_ZONE, domain_name)
}

/// Delete a domain's zone.
pub fn delete<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Post, DELETE, domain_name)
}

fn change_status<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    status: Option<bool>,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::optional("status", Rule::ApiBool),
    ]);
    let mut args = vec![("domain_name".to_string(), json!(domain_name))];
    if let Some(status) = status {
        args.push(("status".to_string(), json!(status)));
    }
    let set = build_and_validate(&template, args);
    execute(set, authed(transport, credentials, HttpMethod::Post, CHANGE_STATUS))
}

/// Activate the domain's zone.
pub fn activate<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    change_status(t, c, domain_name, Some(true))
}

/// Deactivate the domain's zone.
pub fn deactivate<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    change_status(t, c, domain_name, Some(false))
}

/// Flip the zone's activation state.
pub fn toggle_activation<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    change_status(t, c, domain_name, None)
}

/// Zone counts and plan limits for the account.
pub fn get_stats<T: Transport>(t: &T, c: &Credentials) -> ApiResponse {
    let set = build_and_validate(&Template::new(vec![]), vec![]);
    execute(set, authed(t, c, HttpMethod::Get, ZONES_STATS))
}

/// Whether the zone has propagated to all nameservers.
pub fn is_updated<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Get, IS_UPDATED, domain_name)
}

/// Whether DNSSEC is available for the domain.
pub fn dnssec_available<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Get, DNSSEC_AVAILABLE, domain_name)
}

/// Activate DNSSEC for the domain's zone.
pub fn dnssec_activate<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Post, DNSSEC_ACTIVATE, domain_name)
}

/// Deactivate DNSSEC for the domain's zone.
pub fn dnssec_deactivate<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Post, DNSSEC_DEACTIVATE, domain_name)
}

/// The DNSSEC DS records for the domain's zone.
pub fn dnssec_ds_records<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Get, DNSSEC_DS_RECORDS, domain_name)
}

/// The geo locations configured for this zone.
pub fn geodns_locations<T: Transport>(t: &T, c: &Credentials, domain_name: &str) -> ApiResponse {
    domain_op(t, c, HttpMethod::Get, GEODNS_LOCATIONS, domain_name)
}
