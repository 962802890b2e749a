use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// CRM attribute type code as reported by the metadata service.
///
/// Only `Picklist`, `Money`, `Lookup` and `Customer` get special treatment during conversion;
/// every other tag is carried through unchanged. Unknown tags round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    BigInt,
    Boolean,
    CalendarRules,
    Customer,
    DateTime,
    Decimal,
    Double,
    EntityName,
    Integer,
    Lookup,
    ManagedProperty,
    Memo,
    Money,
    Owner,
    PartyList,
    Picklist,
    State,
    Status,
    String,
    Uniqueidentifier,
    Virtual,
    Other(String),
}

const KNOWN_ATTRIBUTE_TYPES: &[(&str, AttributeType)] = &[
    ("BigInt", AttributeType::BigInt),
    ("Boolean", AttributeType::Boolean),
    ("CalendarRules", AttributeType::CalendarRules),
    ("Customer", AttributeType::Customer),
    ("DateTime", AttributeType::DateTime),
    ("Decimal", AttributeType::Decimal),
    ("Double", AttributeType::Double),
    ("EntityName", AttributeType::EntityName),
    ("Integer", AttributeType::Integer),
    ("Lookup", AttributeType::Lookup),
    ("ManagedProperty", AttributeType::ManagedProperty),
    ("Memo", AttributeType::Memo),
    ("Money", AttributeType::Money),
    ("Owner", AttributeType::Owner),
    ("PartyList", AttributeType::PartyList),
    ("Picklist", AttributeType::Picklist),
    ("State", AttributeType::State),
    ("Status", AttributeType::Status),
    ("String", AttributeType::String),
    ("Uniqueidentifier", AttributeType::Uniqueidentifier),
    ("Virtual", AttributeType::Virtual),
];

impl AttributeType {
    pub fn as_str(&self) -> &str {
        match self {
            AttributeType::Other(name) => name,
            known => KNOWN_ATTRIBUTE_TYPES
                .iter()
                .find(|(_, ty)| ty == known)
                .map(|(name, _)| *name)
                .unwrap_or("Other"),
        }
    }

    pub fn is_picklist(&self) -> bool {
        matches!(self, AttributeType::Picklist)
    }

    pub fn is_money(&self) -> bool {
        matches!(self, AttributeType::Money)
    }

    /// Lookup and Customer attributes both hold a reference to another record.
    pub fn is_reference(&self) -> bool {
        matches!(self, AttributeType::Lookup | AttributeType::Customer)
    }
}

impl From<&str> for AttributeType {
    fn from(value: &str) -> Self {
        KNOWN_ATTRIBUTE_TYPES
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, ty)| ty.clone())
            .unwrap_or_else(|| AttributeType::Other(value.to_string()))
    }
}

impl From<String> for AttributeType {
    fn from(value: String) -> Self {
        AttributeType::from(value.as_str())
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a Picklist option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMetadata {
    pub value: i32,
    pub name: String,
}

impl OptionMetadata {
    pub fn new(value: i32, name: impl Into<String>) -> Self {
        Self { value, name: name.into() }
    }
}

/// Static description of one CRM field on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub attribute_type: AttributeType,
    #[serde(default, rename = "updatable")]
    pub is_updatable: bool,
    /// Ordered option list; only meaningful for Picklist fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_set: Vec<OptionMetadata>,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<AttributeType>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
            is_updatable: true,
            option_set: Vec::new(),
        }
    }

    /// Picklist field with the given `(value, name)` options.
    pub fn picklist<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let mut field = Self::new(name, AttributeType::Picklist);
        field.option_set = options.into_iter().map(|(value, name)| OptionMetadata::new(value, name)).collect();
        field
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.is_updatable = updatable;
        self
    }

    pub fn option_by_value(&self, value: i32) -> Option<&OptionMetadata> {
        self.option_set.iter().find(|option| option.value == value)
    }

    /// First option whose name matches exactly; option names are not guaranteed unique.
    pub fn option_by_name(&self, name: &str) -> Option<&OptionMetadata> {
        self.option_set.iter().find(|option| option.name == name)
    }

    pub fn option_names(&self) -> Vec<&str> {
        self.option_set.iter().map(|option| option.name.as_str()).collect()
    }
}

/// Everything the metadata collaborator supplies for one CRM entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// CRM logical name, e.g. `account`.
    pub logical_name: String,
    #[serde(default)]
    pub display_name: String,
    /// Full name of the generated record type; option-set enums are named `{type_name}_{field}`.
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

impl EntitySchema {
    pub fn new(logical_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let logical_name = logical_name.into();
        Self {
            display_name: logical_name.clone(),
            logical_name,
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Names of every Picklist field, in declaration order.
    pub fn picklist_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.attribute_type.is_picklist())
            .map(|field| field.name.as_str())
            .collect()
    }

    /// Full name of the generated enumeration backing a Picklist field.
    pub fn option_set_type_name(&self, field_name: &str) -> String {
        option_set_type_name(&self.type_name, field_name)
    }

    /// Dumps the field list at debug level, tagged with the caller's context.
    pub fn log_fields(&self, context: &str) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for field in &self.fields {
            log::debug!(
                "[{context}] {}.{}: type={} updatable={} options=[{}]",
                self.logical_name,
                field.name,
                field.attribute_type,
                field.is_updatable,
                field.option_names().join(", ")
            );
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a schema file, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(ConfigError::UnsupportedFormat {
                extension: other.unwrap_or_default().to_string(),
            }),
        }
    }
}

/// `{entity_type_name}_{field_name}`, the naming rule for generated option-set enumerations.
pub fn option_set_type_name(entity_type_name: &str, field_name: &str) -> String {
    format!("{entity_type_name}_{field_name}")
}
