//! Field-level validation of JSON attribute mappings.
//!
//! Every entity describes its accepted attributes with a [`Schema`]. Create
//! payloads are checked in a fixed order: unknown keys, missing required
//! keys, value types, then empty required strings. Update payloads skip the
//! required-key step and are checked against the schema's updatable keys.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{errors::ValidationError, log_and_wrap_custom_internal, AppError};

/// A proposed attribute mapping, as decoded from a request body.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    String,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Integer => value.is_i64(),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "an integer"),
            Self::Float => write!(f, "a number"),
            Self::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field(pub &'static str, pub FieldKind);

#[derive(Debug)]
pub struct Schema {
    /// Every key accepted on create, with its expected kind.
    pub fields: &'static [Field],
    pub required: &'static [&'static str],
    /// Subset of `fields` accepted on update.
    pub updatable: &'static [&'static str],
}

impl Schema {
    fn kind_of(&self, key: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|Field(name, _)| *name == key)
            .map(|Field(_, kind)| *kind)
    }

    fn valid_keys(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|Field(name, _)| (*name).to_owned())
            .collect()
    }

    pub fn validate(&self, mut payload: Payload) -> Result<Payload, ValidationError> {
        check_known_keys(&payload, self.valid_keys())?;

        for key in self.required {
            if !payload.contains_key(*key) {
                return Err(ValidationError::MissingField {
                    required_keys: self.required.iter().map(|k| (*k).to_owned()).collect(),
                    missing_key: (*key).to_owned(),
                });
            }
        }

        self.check_types(&payload)?;
        self.check_not_empty(&payload)?;

        normalize_name(&mut payload);
        Ok(payload)
    }

    pub fn validate_update(&self, mut payload: Payload) -> Result<Payload, ValidationError> {
        check_known_keys(
            &payload,
            self.updatable.iter().map(|k| (*k).to_owned()).collect(),
        )?;

        self.check_types(&payload)?;
        self.check_not_empty(&payload)?;

        normalize_name(&mut payload);
        Ok(payload)
    }

    fn check_types(&self, payload: &Payload) -> Result<(), ValidationError> {
        for (key, value) in payload {
            if let Some(kind) = self.kind_of(key) {
                if !kind.accepts(value) {
                    return Err(ValidationError::TypeMismatch {
                        key: key.clone(),
                        expected: kind,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_not_empty(&self, payload: &Payload) -> Result<(), ValidationError> {
        for key in self.required {
            if let Some(Value::String(value)) = payload.get(*key) {
                if value.is_empty() {
                    return Err(ValidationError::EmptyValue((*key).to_owned()));
                }
            }
        }
        Ok(())
    }
}

fn check_known_keys(payload: &Payload, valid_keys: Vec<String>) -> Result<(), ValidationError> {
    if payload.keys().any(|key| !valid_keys.contains(key)) {
        let mut received_keys: Vec<String> = payload.keys().cloned().collect();
        received_keys.sort();
        return Err(ValidationError::UnknownField {
            valid_keys,
            received_keys,
        });
    }
    Ok(())
}

fn normalize_name(payload: &mut Payload) {
    if let Some(Value::String(name)) = payload.get_mut("name") {
        *name = title_case(name);
    }
}

/// Upper-cases the first cased letter of every word and lower-cases the rest.
pub fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut previous_is_cased = false;
    for c in value.chars() {
        if previous_is_cased {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        previous_is_cased = c.is_lowercase() || c.is_uppercase();
    }
    titled
}

/// Turns an already validated mapping into a typed record.
pub fn decode<T: DeserializeOwned>(payload: Payload) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(payload)).map_err(|e| log_and_wrap_custom_internal!(e))
}

#[cfg(test)]
pub(crate) fn to_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
