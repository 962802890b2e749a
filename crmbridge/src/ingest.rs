//! CRM attributes to generated record.

use crate::errors::MappingError;
use crate::option_set::code_to_enum_constant;
use crate::record::{CrmRecord, FieldHandle, Record, RecordDescriptor};
use crate::resolver::resolve_field;
use crate::types::FieldMetadata;
use crate::value::{FieldValue, LookupReference, NativeValue, NativeValues};

/// Builds a `T` from a set of native attributes.
///
/// Attributes with no matching field on `T` are dropped. Any coercion failure aborts the whole
/// conversion; no partially populated record is returned.
pub fn ingest<T: CrmRecord>(fields: &[FieldMetadata], attributes: &NativeValues) -> Result<T, MappingError> {
    let mut record = T::default();
    populate(&mut record, fields, attributes)?;
    Ok(record)
}

/// Same as [`ingest`] for a record type known only through its descriptor.
pub fn ingest_dyn(
    descriptor: &RecordDescriptor,
    fields: &[FieldMetadata],
    attributes: &NativeValues,
) -> Result<Box<dyn Record>, MappingError> {
    let mut record = descriptor.instantiate();
    populate(record.as_mut(), fields, attributes)?;
    Ok(record)
}

fn populate(record: &mut dyn Record, fields: &[FieldMetadata], attributes: &NativeValues) -> Result<(), MappingError> {
    let descriptor = record.descriptor();
    for (name, value) in attributes {
        let Some(handle) = resolve_field(descriptor, name) else {
            log::trace!("{}: attribute '{name}' has no matching field, dropped", descriptor.type_name);
            continue;
        };
        let coerced = coerce(descriptor, handle, fields, name, value)?;
        record.set_field(handle, coerced)?;
    }
    Ok(())
}

fn coerce(
    descriptor: &RecordDescriptor,
    handle: &FieldHandle,
    fields: &[FieldMetadata],
    name: &str,
    value: &NativeValue,
) -> Result<FieldValue, MappingError> {
    match value {
        NativeValue::OptionCode(code) => {
            let enum_type = handle.kind.option_set().ok_or_else(|| {
                MappingError::schema_mismatch(
                    descriptor.type_name,
                    handle.name,
                    format!("option code {code} received for a {} field", handle.kind),
                )
            })?;
            let field = fields
                .iter()
                .find(|field| field.name == name)
                .ok_or_else(|| MappingError::OptionNotFound {
                    field: name.to_string(),
                    enum_type: enum_type.type_name.to_string(),
                    code: *code,
                })?;
            code_to_enum_constant(field, enum_type, *code).map(FieldValue::Enum)
        }
        NativeValue::Money(amount) => Ok(FieldValue::Decimal(*amount)),
        NativeValue::Reference(reference) => Ok(FieldValue::Lookup(LookupReference::from(reference))),
        NativeValue::Scalar(scalar) => Ok(FieldValue::from(scalar.clone())),
        NativeValue::Null => Ok(FieldValue::Null),
    }
}
