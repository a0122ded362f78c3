//! Field-name conversion between the local convention and the remote API's.
//!
//! # Design
//! Locally every field is snake_case. The remote service is inconsistent:
//! request parameters are dash-separated (`domain-name`, `rows-per-page`),
//! response bodies come back camelCase (`statusDescription`, `serialNumber`),
//! and a handful of request parameters keep their underscores (the CAA and
//! TLSA families). The irregular names live in an explicit override table;
//! everything else converts mechanically. `from_remote(to_remote(x)) == x`
//! holds for every field name used by a rule template, not for arbitrary
//! strings.

/// Field names whose remote spelling does not follow the snake→dash rule.
/// `(local, remote)` pairs, consulted in both directions.
const OVERRIDES: &[(&str, &str)] = &[
    ("caa_flag", "caa_flag"),
    ("caa_type", "caa_type"),
    ("caa_value", "caa_value"),
    ("tlsa_usage", "tlsa_usage"),
    ("tlsa_selector", "tlsa_selector"),
    ("tlsa_matching_type", "tlsa_matching_type"),
];

/// Convert a local snake_case field name to the remote request spelling.
pub fn to_remote(local: &str) -> String {
    if let Some((_, remote)) = OVERRIDES.iter().find(|(l, _)| *l == local) {
        return (*remote).to_string();
    }
    local.replace('_', "-")
}

/// Convert a remote field name (dash-separated or camelCase) to the local
/// snake_case spelling.
pub fn from_remote(remote: &str) -> String {
    if let Some((local, _)) = OVERRIDES.iter().find(|(_, r)| *r == remote) {
        return (*local).to_string();
    }

    let mut out = String::with_capacity(remote.len() + 4);
    let chars: Vec<char> = remote.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
        } else if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_ascii_lowercase()
                || i > 0 && chars[i - 1].is_ascii_digit();
            // Last capital of an acronym run starts a new word: testTTLValue
            // splits as test_ttl_value.
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_converts_to_dash() {
        assert_eq!(to_remote("domain_name"), "domain-name");
        assert_eq!(to_remote("rows_per_page"), "rows-per-page");
        assert_eq!(to_remote("ttl"), "ttl");
    }

    #[test]
    fn overrides_keep_underscores() {
        assert_eq!(to_remote("caa_flag"), "caa_flag");
        assert_eq!(to_remote("tlsa_matching_type"), "tlsa_matching_type");
        assert_eq!(from_remote("caa_flag"), "caa_flag");
    }

    #[test]
    fn dash_converts_to_snake() {
        assert_eq!(from_remote("domain-name"), "domain_name");
        assert_eq!(from_remote("rows-per-page"), "rows_per_page");
    }

    #[test]
    fn camel_converts_to_snake() {
        assert_eq!(from_remote("test"), "test");
        assert_eq!(from_remote("testTest"), "test_test");
        assert_eq!(from_remote("testTestTest"), "test_test_test");
        assert_eq!(from_remote("testTTL"), "test_ttl");
        assert_eq!(from_remote("statusDescription"), "status_description");
        assert_eq!(from_remote("serialNumber"), "serial_number");
        assert_eq!(from_remote("dynamicURL"), "dynamic_url");
        assert_eq!(from_remote("primaryNS"), "primary_ns");
    }

    #[test]
    fn acronym_run_followed_by_word() {
        assert_eq!(from_remote("testTTLValue"), "test_ttl_value");
    }

    #[test]
    fn round_trips_for_representative_field_names() {
        for name in [
            "domain_name",
            "primary_ns",
            "admin_mail",
            "refresh",
            "retry",
            "expire",
            "default_ttl",
            "rows_per_page",
            "record_id",
            "record_type",
            "caa_flag",
            "caa_type",
            "caa_value",
            "tlsa_usage",
            "tlsa_selector",
            "tlsa_matching_type",
            "frame_title",
            "master_ip",
        ] {
            assert_eq!(from_remote(&to_remote(name)), name, "round-trip: {name}");
        }
    }
}
