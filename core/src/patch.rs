//! Patch semantics: merge a partial argument set over the entity's current
//! remote state, producing the full set a complete update requires.
//!
//! # Design
//! A two-phase protocol: fetch the authoritative current values, then rebuild
//! the argument list field by field (the caller's value where supplied, the
//! fetched value otherwise) and validate the whole thing as if it were
//! freshly supplied. Fetched data is *not* trusted to satisfy the rules
//! verbatim: the remote service stores numbers as strings, so every merged
//! value goes through normalization again. A fetch failure aborts the merge;
//! nothing is ever partially submitted.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FetchError;
use crate::params::{build_and_validate, ParameterSet, Template};

/// Merge `args` (the fields the caller wants to change) over the current
/// state of `entity_id` as reported by `fetch`, and validate the result.
///
/// Caller-supplied values always win, including invalid ones: the resulting
/// set carries their validation errors rather than silently falling back to
/// fetched data. Fetched keys the template does not name are ignored.
pub fn merge_patch<F>(
    template: &Template,
    entity_id: &str,
    args: Vec<(String, Value)>,
    fetch: F,
) -> Result<ParameterSet, FetchError>
where
    F: FnOnce(&str) -> Result<Map<String, Value>, FetchError>,
{
    let current = fetch(entity_id).map_err(|e| {
        debug!(entity = entity_id, error = %e, "patch fetch failed; aborting merge");
        e
    })?;

    let mut merged: Vec<(String, Value)> = Vec::with_capacity(template.fields().len());
    for field in template.fields() {
        if let Some((name, value)) = args.iter().find(|(name, _)| name == field.name) {
            merged.push((name.clone(), value.clone()));
        } else if let Some(value) = current.get(field.name) {
            merged.push((field.name.to_string(), value.clone()));
        }
    }
    // Unknown caller arguments still have to surface as field errors.
    for (name, value) in args {
        if !template.contains(&name) {
            merged.push((name, value));
        }
    }

    Ok(build_and_validate(template, merged))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::TransportError;
    use crate::params::FieldSpec;
    use crate::validation::Rule;

    fn template() -> Template {
        Template::new(vec![
            FieldSpec::required("domain_name", Rule::DomainName),
            FieldSpec::required("primary_ns", Rule::DomainName),
            FieldSpec::required("admin_mail", Rule::Email),
            FieldSpec::required("refresh", Rule::Integer { min: Some(1200), max: Some(43200) }),
        ])
    }

    /// The remote stores numbers as strings; that is deliberate here.
    fn fetched_state() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("domain_name".to_string(), json!("example.com"));
        map.insert("primary_ns".to_string(), json!("ns1.example.com"));
        map.insert("admin_mail".to_string(), json!("admin@example.com"));
        map.insert("refresh".to_string(), json!("7200"));
        map.insert("serial_number".to_string(), json!("2024010101"));
        map
    }

    #[test]
    fn empty_partial_set_validates_to_the_fetched_values() {
        let set = merge_patch(&template(), "example.com", vec![], |_| Ok(fetched_state()))
            .unwrap();
        assert!(set.is_valid());
        assert_eq!(set.get("refresh").unwrap().normalized(), Some(&json!(7200)));
        assert_eq!(
            set.get("admin_mail").unwrap().normalized(),
            Some(&json!("admin@example.com"))
        );
        // Fetched keys outside the template never enter the set.
        assert!(set.get("serial_number").is_none());
    }

    #[test]
    fn caller_values_override_fetched_values() {
        let set = merge_patch(
            &template(),
            "example.com",
            vec![("admin_mail".to_string(), json!("root@example.com"))],
            |_| Ok(fetched_state()),
        )
        .unwrap();
        assert!(set.is_valid());
        assert_eq!(
            set.get("admin_mail").unwrap().normalized(),
            Some(&json!("root@example.com"))
        );
        assert_eq!(
            set.get("primary_ns").unwrap().normalized(),
            Some(&json!("ns1.example.com"))
        );
    }

    #[test]
    fn full_partial_set_ignores_the_fetch_result() {
        let args = vec![
            ("domain_name".to_string(), json!("other.org")),
            ("primary_ns".to_string(), json!("ns9.other.org")),
            ("admin_mail".to_string(), json!("dns@other.org")),
            ("refresh".to_string(), json!(1200)),
        ];
        let set = merge_patch(&template(), "other.org", args, |_| Ok(fetched_state())).unwrap();
        assert!(set.is_valid());
        assert_eq!(
            set.get("domain_name").unwrap().normalized(),
            Some(&json!("other.org"))
        );
        assert_eq!(set.get("refresh").unwrap().normalized(), Some(&json!(1200)));
    }

    #[test]
    fn invalid_caller_value_is_not_masked_by_fetched_data() {
        let set = merge_patch(
            &template(),
            "example.com",
            vec![("refresh".to_string(), json!(100))],
            |_| Ok(fetched_state()),
        )
        .unwrap();
        assert!(!set.is_valid());
        assert_eq!(set.errors()["refresh"], json!("must be at least 1200"));
    }

    #[test]
    fn unknown_caller_argument_still_fails_validation() {
        let set = merge_patch(
            &template(),
            "example.com",
            vec![("bogus".to_string(), json!(1))],
            |_| Ok(fetched_state()),
        )
        .unwrap();
        assert!(!set.is_valid());
        assert!(set.errors().contains_key("bogus"));
    }

    #[test]
    fn fetch_failure_aborts_the_merge() {
        let err = merge_patch(&template(), "gone.example", vec![], |id| {
            Err(FetchError::NotFound(format!("zone {id}")))
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));

        let err = merge_patch(&template(), "example.com", vec![], |_| {
            Err(FetchError::Transport(TransportError::Timeout("t".into())))
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn fetch_receives_the_entity_id() {
        merge_patch(&template(), "example.com", vec![], |id| {
            assert_eq!(id, "example.com");
            Ok(fetched_state())
        })
        .unwrap();
    }
}
