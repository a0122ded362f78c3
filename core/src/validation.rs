//! Field validators: map a raw JSON scalar to a normalized value or a
//! rejection message.
//!
//! # Design
//! Each check is a variant of [`Rule`], bound to a field when an operation's
//! template is declared; there is no dispatch by field name. [`apply`] is
//! total: malformed input of any JSON type lands in the `Err` branch, never a
//! panic. Callers are loose about types (a TTL may arrive as `3600`, `"3600"`
//! or `"1 hour"`), so validators coerce before they compare and return the
//! canonical representation the remote API expects.

use serde_json::{json, Value};

/// TTL values accepted by the remote service, in seconds.
pub const TTLS: &[i64] = &[
    60, 300, 900, 1800, 3600, 21600, 43200, 86400, 172800, 259200, 604800, 1209600, 2592000,
];

/// Period spellings accepted as TTL aliases, paired with their second counts.
const TTL_PERIODS: &[(&str, i64)] = &[
    ("1 minute", 60),
    ("5 minutes", 300),
    ("15 minutes", 900),
    ("30 minutes", 1800),
    ("1 hour", 3600),
    ("6 hours", 21600),
    ("12 hours", 43200),
    ("1 day", 86400),
    ("2 days", 172800),
    ("3 days", 259200),
    ("1 week", 604800),
    ("2 weeks", 1209600),
    ("1 month", 2592000),
];

/// DNS record types the remote service manages.
pub const RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "MX", "CNAME", "TXT", "SPF", "NS", "SRV", "WR", "RP", "SSHFP", "ALIAS", "CAA",
    "NAPTR", "PTR", "TLSA",
];

/// Zone types the remote service manages.
pub const ZONE_TYPES: &[&str] = &["master", "slave", "parked", "geodns", "domain", "reverse"];

/// SSHFP key algorithms, by name or numeric code 1-4.
pub const ALGORITHMS: &[&str] = &["RSA", "DSA", "ECDSA", "ED25519"];

/// SSHFP fingerprint types, by name or numeric code 1-2.
pub const FP_TYPES: &[&str] = &["SHA-1", "SHA-256"];

/// CAA property tags.
pub const CAA_TYPES: &[&str] = &["issue", "issuewild", "iodef"];

/// Page sizes accepted by the listing endpoints.
pub const ROWS_PER_PAGE: &[i64] = &[10, 20, 30, 50, 100];

/// A validation rule attached to one field of an operation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Integer, optionally bounded on either side (inclusive).
    Integer { min: Option<i64>, max: Option<i64> },
    /// One of the enumerated TTL values, as seconds or a period spelling.
    Ttl,
    /// A DNS record type from [`RECORD_TYPES`].
    RecordType,
    /// A zone type from [`ZONE_TYPES`].
    ZoneType,
    /// An SSHFP algorithm from [`ALGORITHMS`] or its numeric code.
    Algorithm,
    /// An SSHFP fingerprint type from [`FP_TYPES`] or its numeric code.
    FingerprintType,
    /// CAA flag: 0 (non-critical) or 128 (critical).
    CaaFlag,
    /// CAA property tag from [`CAA_TYPES`].
    CaaType,
    /// Web-redirect type: 301 (permanent) or 302 (temporary).
    RedirectType,
    /// Page size from [`ROWS_PER_PAGE`].
    RowsPerPage,
    /// TLSA certificate usage, 0-3.
    TlsaUsage,
    /// TLSA selector, 0-1.
    TlsaSelector,
    /// TLSA matching type, 0-2.
    TlsaMatchingType,
    /// Conservative domain-name syntax check.
    DomainName,
    /// Conservative email syntax check.
    Email,
    /// An IPv4 address.
    Ipv4,
    /// An IPv6 address.
    Ipv6,
    /// A flag the remote API encodes as the strings "1" / "0".
    ApiBool,
    /// A non-empty string of hex digits.
    HexString,
    /// Free text; anything non-empty passes.
    Text,
}

/// Run `rule` against `value`, returning the normalized value or a message
/// describing the rejection. Never panics.
pub fn apply(rule: &Rule, value: &Value) -> Result<Value, String> {
    match rule {
        Rule::Integer { min, max } => {
            let n = as_int(value).ok_or("must be an integer")?;
            if let Some(min) = min {
                if n < *min {
                    return Err(format!("must be at least {min}"));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(format!("must be at most {max}"));
                }
            }
            Ok(json!(n))
        }
        Rule::Ttl => validate_ttl(value),
        Rule::RecordType => match as_str(value).map(|s| s.to_ascii_uppercase()) {
            Some(upper) if RECORD_TYPES.contains(&upper.as_str()) => Ok(Value::String(upper)),
            _ => Err(format!("must be one of: {}", RECORD_TYPES.join(", "))),
        },
        Rule::ZoneType => match as_str(value).map(|s| s.to_ascii_lowercase()) {
            Some(lower) if ZONE_TYPES.contains(&lower.as_str()) => Ok(Value::String(lower)),
            _ => Err(format!("must be one of: {}", ZONE_TYPES.join(", "))),
        },
        Rule::Algorithm => {
            if let Some(s) = as_str(value) {
                let upper = s.to_ascii_uppercase();
                if ALGORITHMS.contains(&upper.as_str()) {
                    return Ok(Value::String(upper));
                }
            } else if let Some(n) = as_int(value) {
                if (1..=4).contains(&n) {
                    return Ok(json!(n));
                }
            }
            Err(format!("must be one of: {}", ALGORITHMS.join(", ")))
        }
        Rule::FingerprintType => {
            if let Some(s) = as_str(value) {
                let upper = s.to_ascii_uppercase();
                if FP_TYPES.contains(&upper.as_str()) {
                    return Ok(Value::String(upper));
                }
            } else if let Some(n) = as_int(value) {
                if (1..=2).contains(&n) {
                    return Ok(json!(n));
                }
            }
            Err(format!("must be one of: {}", FP_TYPES.join(", ")))
        }
        Rule::CaaFlag => match as_int(value) {
            Some(n @ (0 | 128)) => Ok(json!(n)),
            _ => Err("must be 0 (non-critical) or 128 (critical)".to_string()),
        },
        Rule::CaaType => match as_str(value).map(|s| s.to_ascii_lowercase()) {
            Some(lower) if CAA_TYPES.contains(&lower.as_str()) => Ok(Value::String(lower)),
            _ => Err(format!("must be one of: {}", CAA_TYPES.join(", "))),
        },
        Rule::RedirectType => match as_int(value) {
            Some(n @ (301 | 302)) => Ok(json!(n)),
            _ => Err("must be 301 (permanent) or 302 (temporary)".to_string()),
        },
        Rule::RowsPerPage => match as_int(value) {
            Some(n) if ROWS_PER_PAGE.contains(&n) => Ok(json!(n)),
            _ => Err(format!(
                "must be one of: {}",
                join_ints(ROWS_PER_PAGE)
            )),
        },
        Rule::TlsaUsage => enumerated_int(value, &[0, 1, 2, 3]),
        Rule::TlsaSelector => enumerated_int(value, &[0, 1]),
        Rule::TlsaMatchingType => enumerated_int(value, &[0, 1, 2]),
        Rule::DomainName => match as_str(value) {
            Some(s) if is_domain_name(s) => Ok(Value::String(s.to_string())),
            _ => Err("must be a valid domain name".to_string()),
        },
        Rule::Email => match as_str(value) {
            Some(s) if is_email(s) => Ok(Value::String(s.to_string())),
            _ => Err("must be a valid email address".to_string()),
        },
        Rule::Ipv4 => match as_str(value) {
            Some(s) if s.parse::<std::net::Ipv4Addr>().is_ok() => {
                Ok(Value::String(s.to_string()))
            }
            _ => Err("must be a valid IPv4 address".to_string()),
        },
        Rule::Ipv6 => match as_str(value) {
            Some(s) if s.parse::<std::net::Ipv6Addr>().is_ok() => {
                Ok(Value::String(s.to_string()))
            }
            _ => Err("must be a valid IPv6 address".to_string()),
        },
        Rule::ApiBool => validate_api_bool(value),
        Rule::HexString => match as_str(value) {
            Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(Value::String(s.to_string()))
            }
            _ => Err("must be a string of hex digits".to_string()),
        },
        Rule::Text => Ok(value.clone()),
    }
}

/// Coerce a JSON value to an integer: native integers pass through, strings
/// of digits are parsed. Floats and anything else are rejected.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn join_ints(set: &[i64]) -> String {
    set.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn enumerated_int(value: &Value, allowed: &[i64]) -> Result<Value, String> {
    match as_int(value) {
        Some(n) if allowed.contains(&n) => Ok(json!(n)),
        _ => Err(format!("must be one of: {}", join_ints(allowed))),
    }
}

fn validate_ttl(value: &Value) -> Result<Value, String> {
    if let Some(n) = as_int(value) {
        if TTLS.contains(&n) {
            return Ok(json!(n));
        }
    } else if let Some(s) = as_str(value) {
        let lower = s.to_ascii_lowercase();
        if let Some((_, seconds)) = TTL_PERIODS.iter().find(|(name, _)| *name == lower) {
            return Ok(json!(seconds));
        }
    }
    Err(format!("must be a valid ttl: {}", join_ints(TTLS)))
}

fn validate_api_bool(value: &Value) -> Result<Value, String> {
    let canonical = match value {
        Value::Bool(true) => "1",
        Value::Bool(false) => "0",
        Value::Number(n) => match n.as_i64() {
            Some(1) => "1",
            Some(0) => "0",
            _ => return Err("must be 0 or 1".to_string()),
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "1" | "true" => "1",
            "0" | "false" => "0",
            _ => return Err("must be 0 or 1".to_string()),
        },
        _ => return Err("must be 0 or 1".to_string()),
    };
    Ok(Value::String(canonical.to_string()))
}

/// Conservative domain-name check: at least two dot-separated labels of 1-63
/// lowercase alphanumeric characters (inner hyphens allowed), alphabetic TLD.
/// Exists to reject obviously malformed input before a remote round-trip, not
/// to enforce the full RFC.
fn is_domain_name(s: &str) -> bool {
    let labels: Vec<&str> = s.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || tld.len() > 63 || !tld.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    labels[..labels.len() - 1].iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}

/// Conservative email check: one `@`, plausible local part, dotted domain.
fn is_email(s: &str) -> bool {
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
    {
        return false;
    }
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(rule: &Rule, value: Value) -> Value {
        apply(rule, &value).unwrap()
    }

    fn err(rule: &Rule, value: Value) -> String {
        apply(rule, &value).unwrap_err()
    }

    #[test]
    fn integer_accepts_native_and_digit_strings() {
        let rule = Rule::Integer { min: None, max: None };
        assert_eq!(ok(&rule, json!(42)), json!(42));
        assert_eq!(ok(&rule, json!("42")), json!(42));
    }

    #[test]
    fn integer_rejects_floats_and_garbage() {
        let rule = Rule::Integer { min: None, max: None };
        assert_eq!(err(&rule, json!(1.5)), "must be an integer");
        assert_eq!(err(&rule, json!("12a")), "must be an integer");
        assert_eq!(err(&rule, json!(null)), "must be an integer");
    }

    #[test]
    fn integer_bounds_name_the_violated_bound() {
        let rule = Rule::Integer { min: Some(1200), max: Some(43200) };
        assert_eq!(err(&rule, json!(100)), "must be at least 1200");
        assert_eq!(err(&rule, json!(100_000)), "must be at most 43200");
        assert_eq!(ok(&rule, json!("7200")), json!(7200));
    }

    #[test]
    fn ttl_normalizes_every_literal_to_seconds() {
        for &ttl in TTLS {
            assert_eq!(ok(&Rule::Ttl, json!(ttl)), json!(ttl), "int {ttl}");
            assert_eq!(ok(&Rule::Ttl, json!(ttl.to_string())), json!(ttl), "string {ttl}");
        }
    }

    #[test]
    fn ttl_accepts_period_spellings() {
        assert_eq!(ok(&Rule::Ttl, json!("1 hour")), json!(3600));
        assert_eq!(ok(&Rule::Ttl, json!("1 Month")), json!(2592000));
        assert_eq!(ok(&Rule::Ttl, json!("2 weeks")), json!(1209600));
    }

    #[test]
    fn ttl_rejects_values_outside_the_set() {
        assert!(err(&Rule::Ttl, json!(61)).contains("valid ttl"));
        assert!(apply(&Rule::Ttl, &json!("2 hours")).is_err());
        assert!(apply(&Rule::Ttl, &json!(3601)).is_err());
    }

    #[test]
    fn record_type_is_case_insensitive_and_normalized_upper() {
        assert_eq!(ok(&Rule::RecordType, json!("a")), json!("A"));
        assert_eq!(ok(&Rule::RecordType, json!("Cname")), json!("CNAME"));
        assert!(err(&Rule::RecordType, json!("SOA")).contains("AAAA"));
        assert!(apply(&Rule::RecordType, &json!(12)).is_err());
    }

    #[test]
    fn zone_type_is_normalized_lower() {
        assert_eq!(ok(&Rule::ZoneType, json!("Master")), json!("master"));
        assert!(apply(&Rule::ZoneType, &json!("primary")).is_err());
    }

    #[test]
    fn algorithm_accepts_names_and_codes() {
        assert_eq!(ok(&Rule::Algorithm, json!("rsa")), json!("RSA"));
        assert_eq!(ok(&Rule::Algorithm, json!(3)), json!(3));
        assert!(apply(&Rule::Algorithm, &json!(5)).is_err());
        assert!(apply(&Rule::Algorithm, &json!("MD5")).is_err());
    }

    #[test]
    fn fingerprint_type_accepts_names_and_codes() {
        assert_eq!(ok(&Rule::FingerprintType, json!("sha-256")), json!("SHA-256"));
        assert_eq!(ok(&Rule::FingerprintType, json!(1)), json!(1));
        assert!(apply(&Rule::FingerprintType, &json!(3)).is_err());
    }

    #[test]
    fn caa_flag_is_0_or_128() {
        assert_eq!(ok(&Rule::CaaFlag, json!(128)), json!(128));
        assert!(apply(&Rule::CaaFlag, &json!(1)).is_err());
    }

    #[test]
    fn redirect_type_is_301_or_302() {
        assert_eq!(ok(&Rule::RedirectType, json!("301")), json!(301));
        assert!(apply(&Rule::RedirectType, &json!(303)).is_err());
    }

    #[test]
    fn rows_per_page_is_a_closed_set() {
        assert_eq!(ok(&Rule::RowsPerPage, json!("50")), json!(50));
        let msg = err(&Rule::RowsPerPage, json!(25));
        assert!(msg.contains("10, 20, 30, 50, 100"), "{msg}");
    }

    #[test]
    fn tlsa_fields_accept_ints_or_digit_strings() {
        assert_eq!(ok(&Rule::TlsaUsage, json!("3")), json!(3));
        assert_eq!(ok(&Rule::TlsaSelector, json!(0)), json!(0));
        assert_eq!(ok(&Rule::TlsaMatchingType, json!(2)), json!(2));
        assert!(apply(&Rule::TlsaUsage, &json!(4)).is_err());
        assert!(apply(&Rule::TlsaSelector, &json!(2)).is_err());
    }

    #[test]
    fn domain_name_accepts_plausible_names() {
        for name in ["example.com", "sub.example.com", "xn--bcher-kva.example", "a-b.co"] {
            assert!(apply(&Rule::DomainName, &json!(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn domain_name_rejects_malformed_names() {
        for name in ["", "example", "-bad.com", "bad-.com", "example.c", "exa mple.com"] {
            assert!(apply(&Rule::DomainName, &json!(name)).is_err(), "{name}");
        }
        assert!(apply(&Rule::DomainName, &json!(12)).is_err());
    }

    #[test]
    fn email_requires_a_single_at_and_dotted_domain() {
        assert!(apply(&Rule::Email, &json!("admin@example.com")).is_ok());
        assert!(apply(&Rule::Email, &json!("a.b+c@sub.example.com")).is_ok());
        for bad in ["admin", "admin@", "@example.com", "a@b@c.com", "admin@example"] {
            assert!(apply(&Rule::Email, &json!(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn ipv4_uses_strict_parsing() {
        assert!(apply(&Rule::Ipv4, &json!("10.0.0.1")).is_ok());
        for bad in ["10.0.0", "10.0.0.256", "10.0.0.1.2", "not-an-ip"] {
            assert!(apply(&Rule::Ipv4, &json!(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn ipv6_uses_strict_parsing() {
        assert!(apply(&Rule::Ipv6, &json!("2001:db8::1")).is_ok());
        assert!(apply(&Rule::Ipv6, &json!("2001:db8::g")).is_err());
        assert!(apply(&Rule::Ipv6, &json!("1.2.3.4")).is_err());
    }

    #[test]
    fn api_bool_normalizes_to_wire_strings() {
        assert_eq!(ok(&Rule::ApiBool, json!(true)), json!("1"));
        assert_eq!(ok(&Rule::ApiBool, json!(false)), json!("0"));
        assert_eq!(ok(&Rule::ApiBool, json!(1)), json!("1"));
        assert_eq!(ok(&Rule::ApiBool, json!("TRUE")), json!("1"));
        assert_eq!(ok(&Rule::ApiBool, json!("0")), json!("0"));
        assert!(apply(&Rule::ApiBool, &json!(2)).is_err());
        assert!(apply(&Rule::ApiBool, &json!("yes")).is_err());
    }

    #[test]
    fn hexstring_rejects_non_hex() {
        assert!(apply(&Rule::HexString, &json!("deadBEEF01")).is_ok());
        assert!(apply(&Rule::HexString, &json!("xyz")).is_err());
        assert!(apply(&Rule::HexString, &json!("")).is_err());
    }

    #[test]
    fn text_passes_anything_through() {
        assert_eq!(ok(&Rule::Text, json!("v=spf1 -all")), json!("v=spf1 -all"));
        assert_eq!(ok(&Rule::Text, json!(5)), json!(5));
    }
}
