//! Self-validating parameter sets: one operation's full argument list bound
//! to its rule template.
//!
//! # Design
//! A [`Template`] declares every field an operation recognizes, in order,
//! with its [`Rule`] and required/optional flag. [`build_and_validate`] binds
//! caller-supplied arguments to the template and validates eagerly; arguments
//! the template does not name are rejected rather than silently dropped.
//! Validation never short-circuits: a failure report enumerates every
//! invalid field, in declaration order. A raw value of JSON null or an empty
//! string counts as absent: an error for required fields, a no-op for
//! optional ones.

use serde_json::{Map, Value};

use crate::casing;
use crate::transport::TransportMap;
use crate::validation::{self, Rule};

/// One field of an operation template: local name, rule, required flag.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: true }
    }

    pub fn optional(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: false }
    }
}

/// The fixed, ordered field list one operation validates against.
#[derive(Debug, Clone)]
pub struct Template {
    fields: Vec<FieldSpec>,
}

impl Template {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

/// A single named value bound to its validation rule.
///
/// After validation, at most one of `normalized` / `error` is set; both stay
/// unset only for an optional parameter whose raw value was absent.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    raw: Option<Value>,
    rule: Rule,
    required: bool,
    normalized: Option<Value>,
    error: Option<String>,
}

impl Parameter {
    fn new(name: String, raw: Option<Value>, rule: Rule, required: bool) -> Self {
        Self { name, raw, rule, required, normalized: None, error: None }
    }

    /// Absence means no value at all, JSON null, or an empty string.
    fn is_absent(&self) -> bool {
        match &self.raw {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    fn validate(&mut self) {
        if self.is_absent() {
            if self.required {
                self.error = Some("this field is required".to_string());
            }
            return;
        }
        let raw = self.raw.as_ref().unwrap_or(&Value::Null);
        match validation::apply(&self.rule, raw) {
            Ok(normalized) => self.normalized = Some(normalized),
            Err(message) => self.error = Some(message),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized(&self) -> Option<&Value> {
        self.normalized.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// An ordered, named collection of [`Parameter`]s for one operation.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    params: Vec<Parameter>,
    validated: bool,
}

/// Bind `args` to `template` and validate the whole set at once.
pub fn build_and_validate(template: &Template, args: Vec<(String, Value)>) -> ParameterSet {
    let mut set = ParameterSet::build(template, args);
    set.validate();
    set
}

impl ParameterSet {
    /// Bind arguments without validating; [`validate`](Self::validate) must
    /// run before the set is handed to a transport.
    pub fn build(template: &Template, mut args: Vec<(String, Value)>) -> Self {
        let mut params = Vec::with_capacity(template.fields().len());
        for field in template.fields() {
            let raw = args
                .iter()
                .position(|(name, _)| name == field.name)
                .map(|i| args.remove(i).1);
            params.push(Parameter::new(
                field.name.to_string(),
                raw,
                field.rule.clone(),
                field.required,
            ));
        }
        // Whatever the caller supplied beyond the template is an error, not
        // something to forward to the remote service.
        for (name, value) in args {
            let mut unknown = Parameter::new(name, Some(value), Rule::Text, false);
            unknown.error = Some("not a recognized parameter for this operation".to_string());
            params.push(unknown);
        }
        Self { params, validated: false }
    }

    /// Validate every parameter, collecting rather than short-circuiting.
    pub fn validate(&mut self) {
        for param in &mut self.params {
            if param.error.is_none() {
                param.validate();
            }
        }
        self.validated = true;
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// True iff every parameter normalized successfully or was legitimately
    /// absent and optional.
    pub fn is_valid(&self) -> bool {
        self.validated && self.params.iter().all(|p| p.error.is_none())
    }

    /// Field-name → message map of every validation failure, in declaration
    /// order.
    pub fn errors(&self) -> Map<String, Value> {
        self.params
            .iter()
            .filter_map(|p| {
                p.error
                    .as_ref()
                    .map(|msg| (p.name.clone(), Value::String(msg.clone())))
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The transport-ready mapping: remote-cased names paired with the
    /// stringified normalized values. Absent-optional parameters are omitted
    /// entirely; array values expand to repeated keys.
    pub fn to_transport_map(&self) -> TransportMap {
        let mut map = TransportMap::new();
        for param in &self.params {
            let Some(value) = &param.normalized else { continue };
            let remote = casing::to_remote(&param.name);
            match value {
                Value::Array(items) => {
                    for item in items {
                        map.push((remote.clone(), scalar_to_string(item)));
                    }
                }
                other => map.push((remote, scalar_to_string(other))),
            }
        }
        map
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
