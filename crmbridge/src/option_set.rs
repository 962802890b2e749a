//! Translation between CRM option codes, CRM option names and generated enum constants.
//!
//! Ingest direction ([`code_to_enum_constant`]) is strict: an unknown code or label means the
//! generated code and the CRM have drifted apart, and is an error. Egress direction
//! ([`name_to_code`]) is lenient: anything it cannot map yields `None` so the caller can skip
//! the write.

use crate::enums::{EnumConstantRef, EnumDescriptor};
use crate::errors::MappingError;
use crate::registry;
use crate::types::{FieldMetadata, option_set_type_name};

/// Finds the generated constant for an option code.
pub fn code_to_enum_constant(
    field: &FieldMetadata,
    enum_type: &'static EnumDescriptor,
    code: i32,
) -> Result<EnumConstantRef, MappingError> {
    let option = field.option_by_value(code).ok_or_else(|| MappingError::OptionNotFound {
        field: field.name.clone(),
        enum_type: enum_type.type_name.to_string(),
        code,
    })?;

    enum_type
        .by_label(&option.name)
        .ok_or_else(|| MappingError::EnumConstantNotFound {
            enum_type: enum_type.type_name.to_string(),
            label: option.name.clone(),
            code,
        })
}

/// Finds the option code for either a CRM option name or a generated constant name.
///
/// The constant-name path needs the enumeration generated for this field, which is looked up in
/// the registry as `{entity_type_name}_{field}`.
pub fn name_to_code(field: &FieldMetadata, entity_type_name: &str, candidate: &str) -> Option<i32> {
    if let Some(option) = field.option_by_name(candidate) {
        return Some(option.value);
    }
    if field.option_set.is_empty() {
        return None;
    }

    log::debug!("Value '{candidate}' not found in option set, checking enum type directly.");
    let enum_type_name = option_set_type_name(entity_type_name, &field.name);
    match registry::find_option_set(&enum_type_name) {
        Some(enum_type) => name_to_code_via(field, enum_type, candidate),
        None => {
            log::debug!(
                "Field '{}' not updated: option set value '{candidate}' not found in option set ({}) and enum type '{enum_type_name}' was not found.",
                field.name,
                field.option_names().join(", ")
            );
            None
        }
    }
}

/// Same as [`name_to_code`], with the field's enumeration already in hand.
pub fn name_to_code_via(field: &FieldMetadata, enum_type: &'static EnumDescriptor, candidate: &str) -> Option<i32> {
    if let Some(option) = field.option_by_name(candidate) {
        return Some(option.value);
    }

    let Some(constant) = enum_type.parse_ignore_case(candidate) else {
        log::debug!(
            "Field '{}' not updated: option set value '{candidate}' not found in option set ({}) or in enum type '{}'.",
            field.name,
            field.option_names().join(", "),
            enum_type.type_name
        );
        return None;
    };

    let code = field.option_by_name(constant.label()).map(|option| option.value);
    if code.is_none() {
        log::debug!(
            "Field '{}' not updated: no option found matching name '{}'.",
            field.name,
            constant.label()
        );
    }
    code
}

/// Option name registered in the CRM for a code.
pub fn option_name(field: &FieldMetadata, code: i32) -> Option<&str> {
    field.option_by_value(code).map(|option| option.name.as_str())
}
