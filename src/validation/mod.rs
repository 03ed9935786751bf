pub mod schema;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

pub use schema::{FieldKind, FieldSpec, Schema, PLANET_SCHEMA};

/// Request section a schema applies to. Ordering drives the order of
/// sections in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Body,
    Params,
    Query,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Body => "body",
            Section::Params => "params",
            Section::Query => "query",
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub path: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self { message: message.into(), path: path.into() }
    }
}

/// Per-section field errors collected by [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("request validation failed")]
pub struct ValidationError {
    errors: BTreeMap<Section, Vec<FieldError>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a failure confined to one section.
    pub fn single(section: Section, error: FieldError) -> Self {
        let mut err = Self::new();
        err.extend(section, vec![error]);
        err
    }

    pub fn extend(&mut self, section: Section, errors: Vec<FieldError>) {
        if errors.is_empty() {
            return;
        }
        self.errors.entry(section).or_default().extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn section(&self, section: Section) -> Option<&[FieldError]> {
        self.errors.get(&section).map(Vec::as_slice)
    }

    /// `{"body": [...], "params": [...]}` for the sections that failed.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (section, errors) in &self.errors {
            map.insert(section.as_str().to_string(), json!(errors));
        }
        Value::Object(map)
    }
}

/// Raw request sections handed to the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub body: Value,
    pub params: Value,
    pub query: Value,
}

impl Default for ValidationRequest {
    fn default() -> Self {
        Self {
            body: Value::Object(Map::new()),
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
        }
    }
}

/// Which sections to check. A section without a schema passes through as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSchemas {
    pub body: Option<Schema>,
    pub params: Option<Schema>,
    pub query: Option<Schema>,
}

impl ValidationSchemas {
    pub const fn none() -> Self {
        Self { body: None, params: None, query: None }
    }

    pub const fn body(schema: Schema) -> Self {
        Self { body: Some(schema), params: None, query: None }
    }

    pub const fn with_params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    pub const fn with_query(mut self, schema: Schema) -> Self {
        self.query = Some(schema);
        self
    }
}

/// Payload types that carry the schemas their request must satisfy.
pub trait Validation {
    const SCHEMAS: ValidationSchemas;
}

/// Check every section that has a schema and collect all errors.
///
/// On success the checked sections are replaced by their sanitized values.
/// Params and query arrive as strings, so integer and boolean fields in those
/// sections are coerced from their string forms.
pub fn validate(
    schemas: &ValidationSchemas,
    request: ValidationRequest,
) -> Result<ValidationRequest, ValidationError> {
    let ValidationRequest { body, params, query } = request;
    let mut failure = ValidationError::new();

    let body = run_section(schemas.body.as_ref(), body, false, Section::Body, &mut failure);
    let params = run_section(schemas.params.as_ref(), params, true, Section::Params, &mut failure);
    let query = run_section(schemas.query.as_ref(), query, true, Section::Query, &mut failure);

    if failure.is_empty() {
        Ok(ValidationRequest { body, params, query })
    } else {
        Err(failure)
    }
}

fn run_section(
    schema: Option<&Schema>,
    input: Value,
    coerce_strings: bool,
    section: Section,
    failure: &mut ValidationError,
) -> Value {
    let Some(schema) = schema else {
        return input;
    };
    match check_section(schema, input, coerce_strings) {
        Ok(value) => value,
        Err(errors) => {
            failure.extend(section, errors);
            Value::Null
        }
    }
}

/// Check one section against a closed object schema.
///
/// Errors are reported in declaration order, then undeclared keys.
pub fn check_section(
    schema: &Schema,
    input: Value,
    coerce_strings: bool,
) -> Result<Value, Vec<FieldError>> {
    let Value::Object(mut object) = input else {
        return Err(vec![FieldError::new("Expected object", "")]);
    };

    let mut errors = Vec::new();
    let mut sanitized = Map::new();

    for field in schema.fields {
        let path = pointer(field.name);
        match object.remove(field.name) {
            None => {
                if field.required {
                    errors.push(FieldError::new("Expected required property", path));
                }
            }
            Some(Value::Null) if field.nullable => {
                sanitized.insert(field.name.to_string(), Value::Null);
            }
            Some(value) => match coerce(field.kind, value, coerce_strings) {
                Some(value) => {
                    sanitized.insert(field.name.to_string(), value);
                }
                None => errors.push(FieldError::new(field.kind.expected_message(), path)),
            },
        }
    }

    for key in object.keys() {
        errors.push(FieldError::new("Unexpected property", pointer(key)));
    }

    if errors.is_empty() {
        Ok(Value::Object(sanitized))
    } else {
        Err(errors)
    }
}

fn coerce(kind: FieldKind, value: Value, from_strings: bool) -> Option<Value> {
    match (kind, value) {
        (FieldKind::String, value @ Value::String(_)) => Some(value),
        (FieldKind::Boolean, value @ Value::Bool(_)) => Some(value),
        (FieldKind::Integer, Value::Number(n)) => whole_number(&n),
        (FieldKind::Integer, Value::String(s)) if from_strings => {
            s.parse::<i32>().ok().map(Value::from)
        }
        (FieldKind::Boolean, Value::String(s)) if from_strings => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

// Integers are 32-bit columns. 12.0 is an integer as far as JSON clients
// are concerned.
fn whole_number(n: &Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok().map(Value::from);
    }
    if n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(Value::from(f as i32))
    } else {
        None
    }
}

fn pointer(key: &str) -> String {
    format!("/{}", key.replace('~', "~0").replace('/', "~1"))
}
