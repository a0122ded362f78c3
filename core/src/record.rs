//! DNS record operations: listing, creation, (patchable) updates, lifecycle,
//! import/export helpers.
//!
//! # Design
//! Each record type needs its own argument set and its own rule for the
//! record value (an A record holds an IPv4 address, an MX record a hostname,
//! a TLSA record a hex blob). [`RecordData`] carries the type-specific fields
//! as enum variants, and the template for a create or update is assembled
//! from the type's field list.

use serde_json::{json, Map, Value};

use crate::auth::Credentials;
use crate::error::FetchError;
use crate::guard::execute;
use crate::params::{build_and_validate, FieldSpec, Template};
use crate::patch::merge_patch;
use crate::response::ApiResponse;
use crate::transport::{authed, HttpMethod, Transport};
use crate::validation::Rule;

const RECORDS: &str = "/dns/records.json";
const ADD_RECORD: &str = "/dns/add-record.json";
const MOD_RECORD: &str = "/dns/mod-record.json";
const DELETE_RECORD: &str = "/dns/delete-record.json";
const CHANGE_RECORD_STATUS: &str = "/dns/change-record-status.json";
const AXFR_IMPORT: &str = "/dns/axfr-import.json";
const COPY_RECORDS: &str = "/dns/copy-records.json";
const RECORDS_EXPORT: &str = "/dns/records-export.json";
const DYNAMIC_URL: &str = "/dns/get-dynamic-url.json";
const AVAILABLE_RECORD_TYPES: &str = "/dns/get-available-record-types.json";
const AVAILABLE_TTL: &str = "/dns/get-available-ttl.json";

fn port_range() -> Rule {
    Rule::Integer { min: Some(0), max: Some(65535) }
}

/// Type-specific payload of a DNS record.
#[derive(Debug, Clone)]
pub enum RecordData {
    A { ip: String },
    Aaaa { ip: String },
    Mx { server: String, priority: i64 },
    Cname { target: String },
    Txt { text: String },
    Spf { text: String },
    Ns { nameserver: String },
    Srv { target: String, port: i64, priority: i64, weight: i64 },
    Wr {
        url: String,
        /// 301 (permanent) or 302 (temporary).
        redirect_type: i64,
        /// Redirect inside a frame so the URL stays "transparent".
        frame: bool,
        frame_title: Option<String>,
        frame_keywords: Option<String>,
        frame_description: Option<String>,
    },
    Alias { target: String },
    Rp { value: String },
    Sshfp { fingerprint: String, algorithm: String, fptype: String },
    Ptr { target: String },
    Naptr { order: i64, pref: i64, flag: i64, params: String, regexp: String, replace: String },
    Caa { flag: i64, tag: String, value: String },
    Tlsa { certificate: String, usage: i64, selector: i64, matching_type: i64 },
}

impl RecordData {
    /// The wire name of this record type.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordData::A { .. } => "A",
            RecordData::Aaaa { .. } => "AAAA",
            RecordData::Mx { .. } => "MX",
            RecordData::Cname { .. } => "CNAME",
            RecordData::Txt { .. } => "TXT",
            RecordData::Spf { .. } => "SPF",
            RecordData::Ns { .. } => "NS",
            RecordData::Srv { .. } => "SRV",
            RecordData::Wr { .. } => "WR",
            RecordData::Alias { .. } => "ALIAS",
            RecordData::Rp { .. } => "RP",
            RecordData::Sshfp { .. } => "SSHFP",
            RecordData::Ptr { .. } => "PTR",
            RecordData::Naptr { .. } => "NAPTR",
            RecordData::Caa { .. } => "CAA",
            RecordData::Tlsa { .. } => "TLSA",
        }
    }

    fn args(&self) -> Vec<(String, Value)> {
        let record = |v: &str| ("record".to_string(), json!(v));
        match self {
            RecordData::A { ip } => vec![record(ip)],
            RecordData::Aaaa { ip } => vec![record(ip)],
            RecordData::Mx { server, priority } => {
                vec![record(server), ("priority".to_string(), json!(priority))]
            }
            RecordData::Cname { target }
            | RecordData::Alias { target }
            | RecordData::Ptr { target } => vec![record(target)],
            RecordData::Txt { text } | RecordData::Spf { text } => vec![record(text)],
            RecordData::Ns { nameserver } => vec![record(nameserver)],
            RecordData::Srv { target, port, priority, weight } => vec![
                record(target),
                ("port".to_string(), json!(port)),
                ("priority".to_string(), json!(priority)),
                ("weight".to_string(), json!(weight)),
            ],
            RecordData::Wr {
                url,
                redirect_type,
                frame,
                frame_title,
                frame_keywords,
                frame_description,
            } => {
                let mut args = vec![
                    record(url),
                    ("redirect_type".to_string(), json!(redirect_type)),
                    ("frame".to_string(), json!(frame)),
                ];
                if let Some(title) = frame_title {
                    args.push(("frame_title".to_string(), json!(title)));
                }
                if let Some(keywords) = frame_keywords {
                    args.push(("frame_keywords".to_string(), json!(keywords)));
                }
                if let Some(description) = frame_description {
                    args.push(("frame_description".to_string(), json!(description)));
                }
                args
            }
            RecordData::Rp { value } => vec![record(value)],
            RecordData::Sshfp { fingerprint, algorithm, fptype } => vec![
                record(fingerprint),
                ("algorithm".to_string(), json!(algorithm)),
                ("fptype".to_string(), json!(fptype)),
            ],
            RecordData::Naptr { order, pref, flag, params, regexp, replace } => vec![
                ("order".to_string(), json!(order)),
                ("pref".to_string(), json!(pref)),
                ("flag".to_string(), json!(flag)),
                ("params".to_string(), json!(params)),
                ("regexp".to_string(), json!(regexp)),
                ("replace".to_string(), json!(replace)),
            ],
            RecordData::Caa { flag, tag, value } => vec![
                ("caa_flag".to_string(), json!(flag)),
                ("caa_type".to_string(), json!(tag)),
                ("caa_value".to_string(), json!(value)),
            ],
            RecordData::Tlsa { certificate, usage, selector, matching_type } => vec![
                record(certificate),
                ("tlsa_usage".to_string(), json!(usage)),
                ("tlsa_selector".to_string(), json!(selector)),
                ("tlsa_matching_type".to_string(), json!(matching_type)),
            ],
        }
    }
}

/// The validation rule for a type's record value. NAPTR and CAA carry no
/// `record` field at all.
fn record_rule(kind: &str) -> Option<Rule> {
    match kind {
        "A" => Some(Rule::Ipv4),
        "AAAA" => Some(Rule::Ipv6),
        "MX" | "CNAME" | "NS" | "SRV" | "ALIAS" | "PTR" => Some(Rule::DomainName),
        "TLSA" => Some(Rule::HexString),
        "NAPTR" | "CAA" => None,
        _ => Some(Rule::Text),
    }
}

/// The extra fields a record type requires beyond the shared base.
fn extra_fields(kind: &str) -> Vec<FieldSpec> {
    match kind {
        "MX" => vec![FieldSpec::required("priority", port_range())],
        "SRV" => vec![
            FieldSpec::required("port", port_range()),
            FieldSpec::required("priority", port_range()),
            FieldSpec::required("weight", port_range()),
        ],
        "WR" => vec![
            FieldSpec::required("redirect_type", Rule::RedirectType),
            FieldSpec::required("frame", Rule::ApiBool),
            FieldSpec::optional("frame_title", Rule::Text),
            FieldSpec::optional("frame_keywords", Rule::Text),
            FieldSpec::optional("frame_description", Rule::Text),
        ],
        "SSHFP" => vec![
            FieldSpec::required("algorithm", Rule::Algorithm),
            FieldSpec::required("fptype", Rule::FingerprintType),
        ],
        "NAPTR" => vec![
            FieldSpec::required("order", Rule::Integer { min: Some(0), max: None }),
            FieldSpec::required("pref", Rule::Integer { min: Some(0), max: None }),
            FieldSpec::required("flag", Rule::Integer { min: None, max: None }),
            FieldSpec::optional("params", Rule::Text),
            FieldSpec::optional("regexp", Rule::Text),
            FieldSpec::optional("replace", Rule::Text),
        ],
        "CAA" => vec![
            FieldSpec::required("caa_flag", Rule::CaaFlag),
            FieldSpec::required("caa_type", Rule::CaaType),
            FieldSpec::required("caa_value", Rule::Text),
        ],
        "TLSA" => vec![
            FieldSpec::required("tlsa_usage", Rule::TlsaUsage),
            FieldSpec::required("tlsa_selector", Rule::TlsaSelector),
            FieldSpec::required("tlsa_matching_type", Rule::TlsaMatchingType),
        ],
        _ => Vec::new(),
    }
}

enum WriteOp {
    Create,
    Update,
}

/// Assemble the full template for creating or updating a record of `kind`.
/// Updates carry a record id; the mod endpoint does not accept a record type.
fn write_template(kind: &str, op: WriteOp) -> Template {
    let mut fields = vec![FieldSpec::required("domain_name", Rule::DomainName)];
    match op {
        WriteOp::Create => fields.push(FieldSpec::required("record_type", Rule::RecordType)),
        WriteOp::Update => fields.push(FieldSpec::required(
            "record_id",
            Rule::Integer { min: Some(1), max: None },
        )),
    }
    fields.push(FieldSpec::optional("host", Rule::Text));
    fields.push(FieldSpec::required("ttl", Rule::Ttl));
    if let Some(rule) = record_rule(kind) {
        fields.push(FieldSpec::required("record", rule));
    }
    fields.extend(extra_fields(kind));
    fields.push(FieldSpec::optional(
        "geodns_location",
        Rule::Integer { min: None, max: None },
    ));
    Template::new(fields)
}

/// Arguments shared by every record write.
#[derive(Debug, Clone)]
pub struct RecordCreate {
    pub domain_name: String,
    /// Host the record applies to; empty or `@` for the apex.
    pub host: Option<String>,
    pub ttl: i64,
    pub data: RecordData,
    /// GeoDNS location id, for plans that support it.
    pub geodns_location: Option<i64>,
}

impl RecordCreate {
    fn base_args(&self) -> Vec<(String, Value)> {
        let mut args = vec![("domain_name".to_string(), json!(self.domain_name))];
        if let Some(host) = &self.host {
            args.push(("host".to_string(), json!(host)));
        }
        args.push(("ttl".to_string(), json!(self.ttl)));
        if let Some(location) = self.geodns_location {
            args.push(("geodns_location".to_string(), json!(location)));
        }
        args
    }
}

/// List the records of a domain, optionally filtered by host or type.
pub fn list<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    host: Option<&str>,
    record_type: Option<&str>,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::optional("host", Rule::Text),
        FieldSpec::optional("record_type", Rule::RecordType),
    ]);
    let mut args = vec![("domain_name".to_string(), json!(domain_name))];
    if let Some(host) = host {
        args.push(("host".to_string(), json!(host)));
    }
    if let Some(record_type) = record_type {
        args.push(("record_type".to_string(), json!(record_type)));
    }
    let set = build_and_validate(&template, args);
    execute(set, authed(transport, credentials, HttpMethod::Get, RECORDS))
}

/// Create a DNS record.
pub fn create<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    create: &RecordCreate,
) -> ApiResponse {
    let kind = create.data.kind();
    let mut args = create.base_args();
    args.push(("record_type".to_string(), json!(kind)));
    if matches!(create.data, RecordData::Ptr { .. }) {
        // PTR records always live at the apex.
        args.retain(|(name, _)| name != "host");
        args.push(("host".to_string(), json!("@")));
    }
    args.extend(create.data.args());
    let set = build_and_validate(&write_template(kind, WriteOp::Create), args);
    execute(set, authed(transport, credentials, HttpMethod::Post, ADD_RECORD))
}

/// Arguments for a full [`update`].
#[derive(Debug, Clone)]
pub struct RecordUpdate {
    pub domain_name: String,
    pub record_id: i64,
    pub host: Option<String>,
    pub ttl: i64,
    pub data: RecordData,
}

/// Update a DNS record. The record type itself cannot change and is never
/// submitted to the mod endpoint.
pub fn update<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    update: &RecordUpdate,
) -> ApiResponse {
    let kind = update.data.kind();
    let mut args = vec![
        ("domain_name".to_string(), json!(update.domain_name)),
        ("record_id".to_string(), json!(update.record_id)),
    ];
    if let Some(host) = &update.host {
        args.push(("host".to_string(), json!(host)));
    }
    args.push(("ttl".to_string(), json!(update.ttl)));
    args.extend(update.data.args());
    let set = build_and_validate(&write_template(kind, WriteOp::Update), args);
    execute(set, authed(transport, credentials, HttpMethod::Post, MOD_RECORD))
}

/// Arguments for [`patch_update`]: only the fields being changed.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub domain_name: String,
    pub record_id: i64,
    pub host: Option<String>,
    pub ttl: Option<i64>,
    /// The record value, validated against the record's existing type.
    pub record: Option<String>,
}

/// Patch-update a DNS record: the current record is fetched by id, its type
/// picks the rule template, and unsupplied fields keep their current values.
pub fn patch_update<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    patch: &RecordPatch,
) -> ApiResponse {
    let current = match fetch_current(transport, credentials, &patch.domain_name, patch.record_id)
    {
        Ok(current) => current,
        Err(e) => return ApiResponse::merge_failure(e),
    };
    let Some(kind) = current.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return ApiResponse::merge_failure(FetchError::Remote {
            status_code: 200,
            message: format!("record {} has no type field", patch.record_id),
        });
    };

    let mut args = vec![
        ("domain_name".to_string(), json!(patch.domain_name)),
        ("record_id".to_string(), json!(patch.record_id)),
    ];
    if let Some(host) = &patch.host {
        args.push(("host".to_string(), json!(host)));
    }
    if let Some(ttl) = patch.ttl {
        args.push(("ttl".to_string(), json!(ttl)));
    }
    if let Some(record) = &patch.record {
        args.push(("record".to_string(), json!(record)));
    }

    let template = write_template(&kind, WriteOp::Update);
    let id = patch.record_id.to_string();
    let set = match merge_patch(&template, &id, args, |_| Ok(current)) {
        Ok(set) => set,
        Err(e) => return ApiResponse::merge_failure(e),
    };
    execute(set, authed(transport, credentials, HttpMethod::Post, MOD_RECORD))
}

fn fetch_current<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> Result<Map<String, Value>, FetchError> {
    let response = get(transport, credentials, domain_name, record_id);
    if response.status_code() == crate::response::STATUS_NOT_FOUND {
        return Err(FetchError::NotFound(format!(
            "record {record_id} in zone {domain_name}"
        )));
    }
    response.into_fetched_state()
}

/// Return a single record by id. A wrapper around [`list`] that extracts the
/// requested record from the id-keyed listing payload.
pub fn get<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    let response = list(transport, credentials, domain_name, None, None);
    if !response.success() {
        return response;
    }
    let id = record_id.to_string();
    match response.payload_object().and_then(|records| records.get(&id)) {
        // The listing nests records one level down, so their keys still carry
        // the remote spelling.
        Some(Value::Object(record)) => {
            let record: Map<String, Value> = record
                .iter()
                .map(|(key, value)| (crate::casing::from_remote(key), value.clone()))
                .collect();
            ApiResponse::from_payload(response.status_code(), Value::Object(record))
        }
        Some(record) => ApiResponse::from_payload(response.status_code(), record.clone()),
        None => ApiResponse::merge_failure(FetchError::NotFound(format!(
            "record {record_id} in zone {domain_name}"
        ))),
    }
}

/// Delete a DNS record.
pub fn delete<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    record_op(transport, credentials, DELETE_RECORD, domain_name, record_id, None)
}

/// Activate a record.
pub fn activate<T: Transport>(
    t: &T,
    c: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    record_op(t, c, CHANGE_RECORD_STATUS, domain_name, record_id, Some(true))
}

/// Deactivate a record.
pub fn deactivate<T: Transport>(
    t: &T,
    c: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    record_op(t, c, CHANGE_RECORD_STATUS, domain_name, record_id, Some(false))
}

/// Flip a record's activation state.
pub fn toggle_activation<T: Transport>(
    t: &T,
    c: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    record_op(t, c, CHANGE_RECORD_STATUS, domain_name, record_id, None)
}

fn record_op<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    path: &str,
    domain_name: &str,
    record_id: i64,
    status: Option<bool>,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("record_id", Rule::Integer { min: Some(1), max: None }),
        FieldSpec::optional("status", Rule::ApiBool),
    ]);
    let mut args = vec![
        ("domain_name".to_string(), json!(domain_name)),
        ("record_id".to_string(), json!(record_id)),
    ];
    if let Some(status) = status {
        args.push(("status".to_string(), json!(status)));
    }
    let set = build_and_validate(&template, args);
    execute(set, authed(transport, credentials, HttpMethod::Post, path))
}

/// Import all records for a domain from another DNS server via AXFR.
pub fn transfer<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    server: &str,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("server", Rule::Text),
    ]);
    let set = build_and_validate(
        &template,
        vec![
            ("domain_name".to_string(), json!(domain_name)),
            ("server".to_string(), json!(server)),
        ],
    );
    execute(set, authed(transport, credentials, HttpMethod::Post, AXFR_IMPORT))
}

/// Copy all records from one zone into another.
pub fn copy<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    from_domain: &str,
    delete_current_records: bool,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("from_domain", Rule::DomainName),
        FieldSpec::required("delete_current_records", Rule::ApiBool),
    ]);
    let set = build_and_validate(
        &template,
        vec![
            ("domain_name".to_string(), json!(domain_name)),
            ("from_domain".to_string(), json!(from_domain)),
            ("delete_current_records".to_string(), json!(delete_current_records)),
        ],
    );
    execute(set, authed(transport, credentials, HttpMethod::Get, COPY_RECORDS))
}

/// Export the domain's records in BIND zone-file format.
pub fn export<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
) -> ApiResponse {
    let template = Template::new(vec![FieldSpec::required("domain_name", Rule::DomainName)]);
    let set = build_and_validate(
        &template,
        vec![("domain_name".to_string(), json!(domain_name))],
    );
    execute(set, authed(transport, credentials, HttpMethod::Get, RECORDS_EXPORT))
}

/// The URL a device calls to dynamically point an A/AAAA record at itself.
pub fn get_dynamic_url<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    domain_name: &str,
    record_id: i64,
) -> ApiResponse {
    let template = Template::new(vec![
        FieldSpec::required("domain_name", Rule::DomainName),
        FieldSpec::required("record_id", Rule::Integer { min: Some(1), max: None }),
    ]);
    let set = build_and_validate(
        &template,
        vec![
            ("domain_name".to_string(), json!(domain_name)),
            ("record_id".to_string(), json!(record_id)),
        ],
    );
    execute(set, authed(transport, credentials, HttpMethod::Get, DYNAMIC_URL))
}

/// The record types available for a zone type.
pub fn get_available_record_types<T: Transport>(
    transport: &T,
    credentials: &Credentials,
    zone_type: &str,
) -> ApiResponse {
    let template = Template::new(vec![FieldSpec::required("zone_type", Rule::ZoneType)]);
    let set = build_and_validate(
        &template,
        vec![("zone_type".to_string(), json!(zone_type))],
    );
    execute(
        set,
        authed(transport, credentials, HttpMethod::Get, AVAILABLE_RECORD_TYPES),
    )
}

/// The TTL values the remote service accepts.
pub fn get_available_ttls<T: Transport>(
    transport: &T,
    credentials: &Credentials,
) -> ApiResponse {
    let set = build_and_validate(&Template::new(vec![]), vec![]);
    execute(set, authed(transport, credentials, HttpMethod::Get, AVAILABLE_TTL))
}
