//! In-memory stand-in for the ClouDNS HTTP API, used by the core's
//! integration tests. Faithful to the real service's quirks: every endpoint
//! answers 200, failures ride inside the body as `"status": "Failed"`,
//! authentication travels in the query string, and stored numbers come back
//! as strings.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// The one account the mock knows.
pub const AUTH_ID: &str = "1001";
pub const AUTH_PASSWORD: &str = "secret";

type Record = Map<String, Value>;

#[derive(Clone, Debug)]
struct Zone {
    zone_type: String,
    active: bool,
    soa: Record,
    records: HashMap<String, Record>,
}

#[derive(Default)]
struct MockState {
    zones: HashMap<String, Zone>,
    next_record_id: u64,
}

type Db = Arc<RwLock<MockState>>;

type Params = HashMap<String, String>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(MockState { zones: HashMap::new(), next_record_id: 100 }));
    // The real API accepts every call as GET or POST alike.
    Router::new()
        .route("/dns/login.json", get(login).post(login))
        .route(
            "/dns/available-name-servers.json",
            get(available_name_servers).post(available_name_servers),
        )
        .route("/dns/get-my-ip.json", get(get_my_ip).post(get_my_ip))
        .route(
            "/dns/is-geodns-available.json",
            get(is_geodns_available).post(is_geodns_available),
        )
        .route("/dns/list-zones.json", get(list_zones).post(list_zones))
        .route("/dns/get-pages-count.json", get(get_pages_count).post(get_pages_count))
        .route("/dns/register.json", get(register_zone).post(register_zone))
        .route("/dns/get-zone-info.json", get(get_zone_info).post(get_zone_info))
        .route("/dns/delete.json", get(delete_zone).post(delete_zone))
        .route("/dns/change-status.json", get(change_zone_status).post(change_zone_status))
        .route("/dns/is-updated.json", get(is_updated).post(is_updated))
        .route("/dns/soa-details.json", get(soa_details).post(soa_details))
        .route("/dns/modify-soa.json", get(modify_soa).post(modify_soa))
        .route("/dns/records.json", get(list_records).post(list_records))
        .route("/dns/add-record.json", get(add_record).post(add_record))
        .route("/dns/mod-record.json", get(mod_record).post(mod_record))
        .route("/dns/delete-record.json", get(delete_record).post(delete_record))
        .route(
            "/dns/change-record-status.json",
            get(change_record_status).post(change_record_status),
        )
        .route("/dns/get-available-ttl.json", get(get_available_ttl).post(get_available_ttl))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn failed(description: &str) -> Json<Value> {
    Json(json!({"status": "Failed", "statusDescription": description}))
}

fn success(description: &str) -> Json<Value> {
    Json(json!({"status": "Success", "statusDescription": description}))
}

/// `None` when the query string carries the right credentials, the standard
/// rejection body otherwise.
fn check_auth(params: &Params) -> Option<Json<Value>> {
    let id = params
        .get("auth-id")
        .or_else(|| params.get("sub-auth-id"))
        .or_else(|| params.get("sub-auth-user"));
    let password = params.get("auth-password");
    if id.map(String::as_str) == Some(AUTH_ID)
        && password.map(String::as_str) == Some(AUTH_PASSWORD)
    {
        None
    } else {
        debug!(?id, "rejecting request with bad credentials");
        Some(failed("Invalid authentication, incorrect auth-id or auth-password."))
    }
}

fn fresh_soa(domain_name: &str) -> Record {
    let soa = json!({
        "serialNumber": "2024010101",
        "primaryNS": "ns1.cloudns.example",
        "adminMail": "support@cloudns.example",
        "refresh": "7200",
        "retry": "1800",
        "expire": "1209600",
        "defaultTTL": "3600",
        "domainName": domain_name,
    });
    soa.as_object().cloned().unwrap_or_default()
}

async fn login(Query(params): Query<Params>) -> Json<Value> {
    match check_auth(&params) {
        Some(rejection) => rejection,
        None => success("Success login."),
    }
}

async fn available_name_servers(Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    Json(json!([
        {"type": "premium", "name": "pns1.cloudns.example", "ip4": "192.0.2.1"},
        {"type": "premium", "name": "pns2.cloudns.example", "ip4": "192.0.2.2"},
    ]))
}

async fn get_my_ip(Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    Json(json!({"ip": "203.0.113.9"}))
}

async fn is_geodns_available(Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    Json(json!({"status": 1}))
}

async fn list_zones(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let db = db.read().await;
    let mut names: Vec<&String> = db.zones.keys().collect();
    names.sort();
    if let Some(search) = params.get("search") {
        names.retain(|name| name.contains(search.as_str()));
    }
    let zones: Vec<Value> = names
        .iter()
        .map(|name| {
            let zone = &db.zones[*name];
            json!({
                "name": name,
                "type": zone.zone_type,
                "zone": "domain",
                "status": if zone.active { "1" } else { "0" },
            })
        })
        .collect();
    Json(json!(zones))
}

async fn get_pages_count(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let rows: usize = params
        .get("rows-per-page")
        .and_then(|rows| rows.parse().ok())
        .unwrap_or(10);
    let count = db.read().await.zones.len();
    Json(json!(count.div_ceil(rows.max(1))))
}

async fn register_zone(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let (Some(domain_name), Some(zone_type)) =
        (params.get("domain-name"), params.get("zone-type"))
    else {
        return failed("Missing domain-name");
    };
    let mut db = db.write().await;
    if db.zones.contains_key(domain_name) {
        return failed("Domain name already exists.");
    }
    db.zones.insert(
        domain_name.clone(),
        Zone {
            zone_type: zone_type.clone(),
            active: true,
            soa: fresh_soa(domain_name),
            records: HashMap::new(),
        },
    );
    success("Domain zone is created.")
}

async fn get_zone_info(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let db = db.read().await;
    let Some((name, zone)) = lookup(&db, &params) else {
        return failed("Missing domain name");
    };
    Json(json!({
        "name": name,
        "type": zone.zone_type,
        "zone": "domain",
        "status": if zone.active { "1" } else { "0" },
    }))
}

async fn delete_zone(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let Some(domain_name) = params.get("domain-name") else {
        return failed("Missing domain name");
    };
    match db.write().await.zones.remove(domain_name) {
        Some(_) => success("Domain zone deleted"),
        None => failed("Missing domain name"),
    }
}

async fn change_zone_status(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let Some(domain_name) = params.get("domain-name").cloned() else {
        return failed("Missing domain name");
    };
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    zone.active = match params.get("status").map(String::as_str) {
        Some("1") => true,
        Some("0") => false,
        _ => !zone.active,
    };
    if zone.active {
        success("Domain zone is activated")
    } else {
        success("Domain zone is deactivated")
    }
}

async fn is_updated(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let db = db.read().await;
    match lookup(&db, &params) {
        Some(_) => Json(json!(true)),
        None => failed("Missing domain name"),
    }
}

async fn soa_details(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let db = db.read().await;
    match lookup(&db, &params) {
        Some((_, zone)) => Json(Value::Object(zone.soa.clone())),
        None => failed("Missing domain name"),
    }
}

const SOA_FIELDS: &[(&str, &str)] = &[
    ("primary-ns", "primaryNS"),
    ("admin-mail", "adminMail"),
    ("refresh", "refresh"),
    ("retry", "retry"),
    ("expire", "expire"),
    ("default-ttl", "defaultTTL"),
];

async fn modify_soa(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let Some(domain_name) = params.get("domain-name").cloned() else {
        return failed("Missing domain name");
    };
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    for (param, field) in SOA_FIELDS {
        let Some(value) = params.get(*param) else {
            return failed(&format!("Missing {param}"));
        };
        zone.soa.insert((*field).to_string(), json!(value));
    }
    // The real service bumps the serial on every modification.
    let serial = zone
        .soa
        .get("serialNumber")
        .and_then(Value::as_str)
        .and_then(|serial| serial.parse::<u64>().ok())
        .unwrap_or(0);
    zone.soa.insert("serialNumber".to_string(), json!((serial + 1).to_string()));
    success("SOA record is modified.")
}

async fn list_records(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let db = db.read().await;
    let Some((_, zone)) = lookup(&db, &params) else {
        return failed("Missing domain name");
    };
    let mut listing = Map::new();
    let mut ids: Vec<&String> = zone.records.keys().collect();
    ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(0));
    for id in ids {
        let record = &zone.records[id];
        if let Some(host) = params.get("host") {
            if record.get("host").and_then(Value::as_str) != Some(host) {
                continue;
            }
        }
        if let Some(record_type) = params.get("record-type") {
            if record.get("type").and_then(Value::as_str) != Some(record_type) {
                continue;
            }
        }
        listing.insert(id.clone(), Value::Object(record.clone()));
    }
    Json(Value::Object(listing))
}

/// Fields copied verbatim from the query string into a stored record.
const RECORD_FIELDS: &[&str] = &[
    "record",
    "priority",
    "weight",
    "port",
    "frame",
    "frame-title",
    "frame-keywords",
    "frame-description",
    "redirect-type",
    "algorithm",
    "fptype",
    "caa_flag",
    "caa_type",
    "caa_value",
    "tlsa_usage",
    "tlsa_selector",
    "tlsa_matching_type",
    "order",
    "pref",
    "flag",
    "params",
    "regexp",
    "replace",
    "geodns-location",
];

fn record_from_params(params: &Params, record_type: &str) -> Record {
    let mut record = Map::new();
    record.insert("type".to_string(), json!(record_type));
    record.insert(
        "host".to_string(),
        json!(params.get("host").cloned().unwrap_or_default()),
    );
    record.insert(
        "ttl".to_string(),
        json!(params.get("ttl").cloned().unwrap_or_else(|| "3600".to_string())),
    );
    record.insert("status".to_string(), json!("1"));
    for field in RECORD_FIELDS {
        if let Some(value) = params.get(*field) {
            record.insert(field.replace('-', "_"), json!(value));
        }
    }
    record
}

async fn add_record(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let Some(domain_name) = params.get("domain-name").cloned() else {
        return failed("Missing domain name");
    };
    let Some(record_type) = params.get("record-type").cloned() else {
        return failed("Invalid record type. (record-type)");
    };
    let id = db.next_record_id;
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    let mut record = record_from_params(&params, &record_type);
    record.insert("id".to_string(), json!(id.to_string()));
    zone.records.insert(id.to_string(), record);
    db.next_record_id += 1;
    Json(json!({
        "status": "Success",
        "statusDescription": "The record was added successfully.",
        "data": {"id": id},
    }))
}

async fn mod_record(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let Some(domain_name) = params.get("domain-name").cloned() else {
        return failed("Missing domain name");
    };
    let Some(record_id) = params.get("record-id").cloned() else {
        return failed("Invalid record id. (record-id)");
    };
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    let Some(existing) = zone.records.get(&record_id) else {
        return failed("Invalid record id. (record-id)");
    };
    // The mod endpoint never receives a type; it is carried over.
    let record_type = existing
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut record = record_from_params(&params, &record_type);
    record.insert("id".to_string(), json!(record_id.clone()));
    zone.records.insert(record_id, record);
    success("The record was modified successfully.")
}

async fn delete_record(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let (Some(domain_name), Some(record_id)) =
        (params.get("domain-name").cloned(), params.get("record-id").cloned())
    else {
        return failed("Invalid record id. (record-id)");
    };
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    match zone.records.remove(&record_id) {
        Some(_) => success("The record was deleted successfully."),
        None => failed("Invalid record id. (record-id)"),
    }
}

async fn change_record_status(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    let mut db = db.write().await;
    let (Some(domain_name), Some(record_id)) =
        (params.get("domain-name").cloned(), params.get("record-id").cloned())
    else {
        return failed("Invalid record id. (record-id)");
    };
    let Some(zone) = db.zones.get_mut(&domain_name) else {
        return failed("Missing domain name");
    };
    let Some(record) = zone.records.get_mut(&record_id) else {
        return failed("Invalid record id. (record-id)");
    };
    let active = match params.get("status").map(String::as_str) {
        Some("1") => true,
        Some("0") => false,
        _ => record.get("status").and_then(Value::as_str) != Some("1"),
    };
    record.insert("status".to_string(), json!(if active { "1" } else { "0" }));
    success("The record status was changed successfully.")
}

async fn get_available_ttl(Query(params): Query<Params>) -> Json<Value> {
    if let Some(rejection) = check_auth(&params) {
        return rejection;
    }
    Json(json!([
        60, 300, 900, 1800, 3600, 21600, 43200, 86400, 172800, 259200, 604800, 1209600, 2592000
    ]))
}

fn lookup<'a>(db: &'a MockState, params: &Params) -> Option<(&'a String, &'a Zone)> {
    let domain_name = params.get("domain-name")?;
    db.zones.get_key_value(domain_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed_params() -> Params {
        let mut params = Params::new();
        params.insert("auth-id".to_string(), AUTH_ID.to_string());
        params.insert("auth-password".to_string(), AUTH_PASSWORD.to_string());
        params
    }

    #[test]
    fn check_auth_accepts_the_fixed_account() {
        assert!(check_auth(&authed_params()).is_none());
    }

    #[test]
    fn check_auth_rejects_wrong_password_with_failed_body() {
        let mut params = authed_params();
        params.insert("auth-password".to_string(), "wrong".to_string());
        let Json(body) = check_auth(&params).unwrap();
        assert_eq!(body["status"], "Failed");
        assert!(body["statusDescription"]
            .as_str()
            .unwrap()
            .contains("Invalid authentication"));
    }

    #[test]
    fn check_auth_accepts_sub_auth_id() {
        let mut params = Params::new();
        params.insert("sub-auth-id".to_string(), AUTH_ID.to_string());
        params.insert("auth-password".to_string(), AUTH_PASSWORD.to_string());
        assert!(check_auth(&params).is_none());
    }

    #[test]
    fn fresh_soa_stores_numbers_as_strings() {
        let soa = fresh_soa("example.com");
        assert_eq!(soa["refresh"], json!("7200"));
        assert_eq!(soa["defaultTTL"], json!("3600"));
        assert_eq!(soa["domainName"], json!("example.com"));
    }

    #[test]
    fn record_from_params_renames_dashed_fields() {
        let mut params = authed_params();
        params.insert("record".to_string(), "https://example.com".to_string());
        params.insert("redirect-type".to_string(), "301".to_string());
        let record = record_from_params(&params, "WR");
        assert_eq!(record["type"], json!("WR"));
        assert_eq!(record["redirect_type"], json!("301"));
        assert_eq!(record["status"], json!("1"));
    }
}
