//! Typed field values to CRM attributes.
//!
//! Only updatable fields are written. Unmapped option names and incomplete lookups are skipped
//! with a debug log entry rather than failing, since callers routinely submit best-effort
//! partial updates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MappingError;
use crate::option_set::name_to_code;
use crate::record::Record;
use crate::resolver::resolve_field;
use crate::types::{EntitySchema, FieldMetadata};
use crate::value::{EntityReference, FieldValue, FieldValues, NativeValue, NativeValues};

/// Null and empty-string policies applied by [`egress`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressOptions {
    /// Leave null-valued fields out of the payload instead of writing an explicit null.
    #[serde(default)]
    pub treat_null_as_ignore: bool,
    /// Handle zero-length strings as null.
    #[serde(default)]
    pub treat_empty_string_as_null: bool,
}

impl EgressOptions {
    pub fn new(treat_null_as_ignore: bool, treat_empty_string_as_null: bool) -> Self {
        Self {
            treat_null_as_ignore,
            treat_empty_string_as_null,
        }
    }
}

/// Builds the native attribute payload for an update or create of `schema`'s entity.
pub fn egress(schema: &EntitySchema, source: &FieldValues, options: EgressOptions) -> Result<NativeValues, MappingError> {
    let mut payload = NativeValues::new();

    for field in &schema.fields {
        if !field.is_updatable {
            log::debug!("Skipping field '{}', not valid for update.", field.name);
            continue;
        }

        let Some(value) = source.get(&field.name) else {
            log::debug!("Field '{}' is not being updated (no new value supplied).", field.name);
            continue;
        };

        let value = if options.treat_empty_string_as_null && value.is_empty_string() {
            log::debug!("Empty string '{}' is being treated as null.", field.name);
            &FieldValue::Null
        } else {
            value
        };

        if value.is_null() {
            if options.treat_null_as_ignore {
                log::debug!("Null field '{}' is being ignored.", field.name);
            } else {
                payload.insert(field.name.clone(), NativeValue::Null);
                log::debug!("Null field '{}' updated normally.", field.name);
            }
            continue;
        }

        if let Some(native) = coerce(schema, field, value)? {
            payload.insert(field.name.clone(), native);
        }
    }

    Ok(payload)
}

/// Reads `record` into a value map keyed by CRM logical names, for the fields `schema` knows.
///
/// Fields the record does not supply (`None`, [`crate::record::FieldState::Unset`]) get no
/// entry, so egress leaves them untouched in the CRM. An assigned null is kept.
pub fn record_values(record: &dyn Record, schema: &EntitySchema) -> FieldValues {
    let descriptor = record.descriptor();
    schema
        .fields
        .iter()
        .filter_map(|field| {
            let handle = resolve_field(descriptor, &field.name)?;
            if !record.is_supplied(handle) {
                log::trace!("{}: field '{}' not supplied", descriptor.type_name, handle.name);
                return None;
            }
            Some((field.name.clone(), record.get_field(handle)))
        })
        .collect()
}

/// [`record_values`] followed by [`egress`].
pub fn egress_record(
    schema: &EntitySchema,
    record: &dyn Record,
    options: EgressOptions,
) -> Result<NativeValues, MappingError> {
    egress(schema, &record_values(record, schema), options)
}

fn coerce(schema: &EntitySchema, field: &FieldMetadata, value: &FieldValue) -> Result<Option<NativeValue>, MappingError> {
    let attribute_type = &field.attribute_type;

    if attribute_type.is_money() {
        let amount = money_amount(schema, field, value)?;
        log::debug!("Field '{}[Money/decimal]' updated normally.", field.name);
        return Ok(Some(NativeValue::Money(amount)));
    }

    if attribute_type.is_picklist() {
        let candidate = value.to_string();
        return Ok(name_to_code(field, &schema.type_name, &candidate).map(|code| {
            log::debug!("Field '{}[OptionSet]' updated normally.", field.name);
            NativeValue::OptionCode(code)
        }));
    }

    if attribute_type.is_reference() {
        return match value {
            FieldValue::Lookup(lookup) if lookup.is_complete() => {
                let reference = entity_reference(field, &lookup.entity_name, &lookup.id)?;
                log::debug!("Field '{}[Lookup]' updated normally.", field.name);
                Ok(Some(NativeValue::Reference(reference)))
            }
            _ => {
                log::debug!("Field '{}' not updated: lookup field value not found.", field.name);
                Ok(None)
            }
        };
    }

    let native = match value {
        FieldValue::Enum(constant) => {
            return Err(MappingError::schema_mismatch(
                &schema.type_name,
                &field.name,
                format!("option set constant '{constant}' supplied for a {attribute_type} attribute"),
            ));
        }
        FieldValue::Lookup(lookup) => NativeValue::Reference(entity_reference(field, &lookup.entity_name, &lookup.id)?),
        other => match other.to_scalar() {
            Some(scalar) => NativeValue::Scalar(scalar),
            None => NativeValue::Null,
        },
    };
    log::debug!("Field '{}' updated normally.", field.name);
    Ok(Some(native))
}

fn money_amount(schema: &EntitySchema, field: &FieldMetadata, value: &FieldValue) -> Result<Decimal, MappingError> {
    match value {
        FieldValue::Decimal(amount) => Ok(*amount),
        FieldValue::Integer(amount) => Ok(Decimal::from(*amount)),
        FieldValue::BigInt(amount) => Ok(Decimal::from(*amount)),
        FieldValue::Double(amount) => Decimal::try_from(*amount).map_err(|_| {
            MappingError::schema_mismatch(&schema.type_name, &field.name, format!("{amount} is not a representable amount"))
        }),
        other => Err(MappingError::schema_mismatch(
            &schema.type_name,
            &field.name,
            format!("{} value supplied for a Money attribute", other.kind_name()),
        )),
    }
}

fn entity_reference(field: &FieldMetadata, entity_name: &str, id: &str) -> Result<EntityReference, MappingError> {
    let id = Uuid::parse_str(id).map_err(|_| MappingError::InvalidReferenceId {
        field: field.name.clone(),
        id: id.to_string(),
    })?;
    Ok(EntityReference::new(entity_name, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeType;
    use crate::value::LookupReference;

    fn schema() -> EntitySchema {
        EntitySchema::new("account", "tests::Account")
            .with_field(FieldMetadata::new("name", AttributeType::String))
            .with_field(FieldMetadata::new("revenue", AttributeType::Money))
            .with_field(FieldMetadata::picklist("prioritycode", [(1, "High"), (2, "Normal")]))
            .with_field(FieldMetadata::new("primarycontactid", AttributeType::Lookup))
            .with_field(FieldMetadata::new("createdon", AttributeType::DateTime).updatable(false))
    }

    fn values(entries: impl IntoIterator<Item = (&'static str, FieldValue)>) -> FieldValues {
        entries.into_iter().map(|(name, value)| (name.to_string(), value)).collect()
    }

    #[test]
    fn picklist_name_becomes_option_code() {
        let payload = egress(&schema(), &values([("prioritycode", "High".into())]), EgressOptions::default())
            .expect("egress succeeds");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["prioritycode"], NativeValue::OptionCode(1));
    }

    #[test]
    fn unknown_picklist_name_is_skipped() {
        let payload = egress(&schema(), &values([("prioritycode", "Unknown".into())]), EgressOptions::default())
            .expect("egress succeeds");
        assert!(payload.is_empty());
    }

    #[test]
    fn non_updatable_and_absent_fields_are_skipped() {
        let now = chrono::Utc::now();
        let payload = egress(
            &schema(),
            &values([("createdon", FieldValue::DateTime(now)), ("unrelated", "x".into())]),
            EgressOptions::default(),
        )
        .expect("egress succeeds");
        assert!(payload.is_empty());
    }

    #[test]
    fn null_policy() {
        let source = values([("name", FieldValue::Null), ("revenue", FieldValue::Null)]);

        let written = egress(&schema(), &source, EgressOptions::default()).expect("egress succeeds");
        assert_eq!(written["name"], NativeValue::Null);
        assert_eq!(written["revenue"], NativeValue::Null);

        let ignored = egress(&schema(), &source, EgressOptions::new(true, false)).expect("egress succeeds");
        assert!(ignored.is_empty());
    }

    #[test]
    fn empty_string_policy() {
        let source = values([("name", "".into())]);

        let literal = egress(&schema(), &source, EgressOptions::default()).expect("egress succeeds");
        assert_eq!(literal["name"], NativeValue::string(""));

        let nulled = egress(&schema(), &source, EgressOptions::new(false, true)).expect("egress succeeds");
        assert_eq!(nulled["name"], NativeValue::Null);

        let dropped = egress(&schema(), &source, EgressOptions::new(true, true)).expect("egress succeeds");
        assert!(dropped.is_empty());
    }

    #[test]
    fn money_accepts_numeric_values() {
        let payload = egress(&schema(), &values([("revenue", 1500.into())]), EgressOptions::default())
            .expect("egress succeeds");
        assert_eq!(payload["revenue"], NativeValue::Money(Decimal::from(1500)));

        let err = egress(&schema(), &values([("revenue", "lots".into())]), EgressOptions::default()).unwrap_err();
        assert!(matches!(err, MappingError::SchemaMismatch { .. }));
    }

    #[test]
    fn lookup_requires_entity_and_id() {
        let id = Uuid::new_v4();
        let complete = values([(
            "primarycontactid",
            LookupReference::new("contact", id.to_string()).into(),
        )]);
        let payload = egress(&schema(), &complete, EgressOptions::default()).expect("egress succeeds");
        assert_eq!(
            payload["primarycontactid"],
            NativeValue::Reference(EntityReference::new("contact", id))
        );

        let partial = values([("primarycontactid", LookupReference::new("contact", "").into())]);
        assert!(egress(&schema(), &partial, EgressOptions::default()).expect("egress succeeds").is_empty());

        let wrong_type = values([("primarycontactid", "contact".into())]);
        assert!(egress(&schema(), &wrong_type, EgressOptions::default()).expect("egress succeeds").is_empty());
    }

    #[test]
    fn malformed_lookup_id_fails() {
        let source = values([("primarycontactid", LookupReference::new("contact", "not-a-guid").into())]);
        let err = egress(&schema(), &source, EgressOptions::default()).unwrap_err();
        assert!(matches!(err, MappingError::InvalidReferenceId { ref id, .. } if id == "not-a-guid"));
    }

    #[test]
    fn payload_follows_schema_order() {
        let source = values([("prioritycode", "Normal".into()), ("name", "Contoso".into())]);
        let payload = egress(&schema(), &source, EgressOptions::default()).expect("egress succeeds");
        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["name", "prioritycode"]);
    }
}
