use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EnumConstantRef;

/// Plain scalar carried by a native attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Scalar {
    Boolean(bool),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

/// Pointer to another CRM record as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
        }
    }
}

/// CRM-side attribute value. The converters only ever read and write through this union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NativeValue {
    Null,
    Scalar(Scalar),
    OptionCode(i32),
    Money(Decimal),
    Reference(EntityReference),
}

impl NativeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        NativeValue::Scalar(Scalar::String(value.into()))
    }
}

impl From<Scalar> for NativeValue {
    fn from(value: Scalar) -> Self {
        NativeValue::Scalar(value)
    }
}

/// Attribute name to native value, in the order the attributes were produced.
pub type NativeValues = IndexMap<String, NativeValue>;

/// Foreign-key style pointer held by generated record fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupReference {
    pub entity_name: String,
    pub id: String,
}

impl LookupReference {
    pub fn new(entity_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            id: id.into(),
        }
    }

    /// Both the target entity and the record id are filled in.
    pub fn is_complete(&self) -> bool {
        !self.entity_name.is_empty() && !self.id.is_empty()
    }
}

impl From<&EntityReference> for LookupReference {
    fn from(reference: &EntityReference) -> Self {
        Self {
            entity_name: reference.logical_name.clone(),
            id: reference.id.to_string(),
        }
    }
}

/// Value held by (or destined for) a field of a generated record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Enum(EnumConstantRef),
    Lookup(LookupReference),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_empty_string(&self) -> bool {
        matches!(self, FieldValue::String(text) if text.is_empty())
    }

    /// Short name of the variant, used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::BigInt(_) => "bigint",
            FieldValue::Double(_) => "double",
            FieldValue::Decimal(_) => "decimal",
            FieldValue::String(_) => "string",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::Enum(_) => "option set",
            FieldValue::Lookup(_) => "lookup",
        }
    }

    /// Converts a plain value to its native scalar; `None` for null, enum and lookup values.
    pub fn to_scalar(&self) -> Option<Scalar> {
        Some(match self {
            FieldValue::Boolean(value) => Scalar::Boolean(*value),
            FieldValue::Integer(value) => Scalar::Integer(*value),
            FieldValue::BigInt(value) => Scalar::BigInt(*value),
            FieldValue::Double(value) => Scalar::Double(*value),
            FieldValue::Decimal(value) => Scalar::Decimal(*value),
            FieldValue::String(value) => Scalar::String(value.clone()),
            FieldValue::DateTime(value) => Scalar::DateTime(*value),
            FieldValue::Uuid(value) => Scalar::Uuid(*value),
            FieldValue::Null | FieldValue::Enum(_) | FieldValue::Lookup(_) => return None,
        })
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Boolean(value) => FieldValue::Boolean(value),
            Scalar::Integer(value) => FieldValue::Integer(value),
            Scalar::BigInt(value) => FieldValue::BigInt(value),
            Scalar::Double(value) => FieldValue::Double(value),
            Scalar::Decimal(value) => FieldValue::Decimal(value),
            Scalar::String(value) => FieldValue::String(value),
            Scalar::DateTime(value) => FieldValue::DateTime(value),
            Scalar::Uuid(value) => FieldValue::Uuid(value),
        }
    }
}

/// String form used when matching a value against option names: constant name for enums,
/// plain text for everything else.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Boolean(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::BigInt(value) => write!(f, "{value}"),
            FieldValue::Double(value) => write!(f, "{value}"),
            FieldValue::Decimal(value) => write!(f, "{value}"),
            FieldValue::String(value) => f.write_str(value),
            FieldValue::DateTime(value) => write!(f, "{}", value.to_rfc3339()),
            FieldValue::Uuid(value) => write!(f, "{value}"),
            FieldValue::Enum(constant) => f.write_str(constant.name()),
            FieldValue::Lookup(reference) => write!(f, "{}:{}", reference.entity_name, reference.id),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::BigInt(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<LookupReference> for FieldValue {
    fn from(value: LookupReference) -> Self {
        FieldValue::Lookup(value)
    }
}

impl From<EnumConstantRef> for FieldValue {
    fn from(value: EnumConstantRef) -> Self {
        FieldValue::Enum(value)
    }
}

/// Field name to typed value; the egress input.
pub type FieldValues = IndexMap<String, FieldValue>;
