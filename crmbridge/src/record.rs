//! Capability layer for generated record types.
//!
//! Each `#[derive(CrmRecord)]` struct gets a static [`RecordDescriptor`]: its field handles, a
//! factory for fresh instances, and generated getters/setters keyed by handle. Converters work
//! exclusively through this surface, so a record type known only by name at run time (looked up
//! in the [`crate::registry`]) is as usable as a concrete `T`.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::enums::EnumDescriptor;
use crate::errors::MappingError;
use crate::value::{FieldValue, LookupReference};

/// What a generated field can hold.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Boolean,
    Integer,
    BigInt,
    Double,
    Decimal,
    String,
    DateTime,
    Uuid,
    Lookup,
    OptionSet(&'static EnumDescriptor),
}

impl FieldKind {
    /// The enumeration behind an option-set field.
    pub fn option_set(&self) -> Option<&'static EnumDescriptor> {
        match self {
            FieldKind::OptionSet(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Boolean => f.write_str("boolean"),
            FieldKind::Integer => f.write_str("integer"),
            FieldKind::BigInt => f.write_str("bigint"),
            FieldKind::Double => f.write_str("double"),
            FieldKind::Decimal => f.write_str("decimal"),
            FieldKind::String => f.write_str("string"),
            FieldKind::DateTime => f.write_str("datetime"),
            FieldKind::Uuid => f.write_str("uuid"),
            FieldKind::Lookup => f.write_str("lookup"),
            FieldKind::OptionSet(descriptor) => write!(f, "option set {}", descriptor.type_name),
        }
    }
}

/// Handle to one field of a generated record type.
#[derive(Debug)]
pub struct FieldHandle {
    /// Field name on the generated type (after reserved-word renaming).
    pub name: &'static str,
    pub kind: FieldKind,
    /// `Option<T>` fields accept null.
    pub nullable: bool,
}

/// Static description of a generated record type.
#[derive(Debug)]
pub struct RecordDescriptor {
    pub type_name: &'static str,
    /// CRM logical name of the entity the type was generated from.
    pub entity: &'static str,
    pub fields: &'static [FieldHandle],
    pub factory: fn() -> Box<dyn Record>,
}

impl RecordDescriptor {
    /// Exact-name field lookup. See [`crate::resolver::resolve_field`] for CRM names.
    pub fn field(&self, name: &str) -> Option<&'static FieldHandle> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Allocates a default instance of the described type.
    pub fn instantiate(&self) -> Box<dyn Record> {
        (self.factory)()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|field| field.name)
    }
}

/// Rust types that may appear as fields of a generated record.
pub trait FieldType: Sized {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    /// Takes ownership of `value`, handing it back when this type cannot hold it.
    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue>;

    fn to_field_value(&self) -> FieldValue;

    /// False when the field holds no value at all; egress leaves such fields out of the payload.
    fn is_supplied(&self) -> bool {
        true
    }
}

macro_rules! scalar_field_type {
    ($ty:ty, $kind:ident) => {
        impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
                match value {
                    FieldValue::$kind(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn to_field_value(&self) -> FieldValue {
                FieldValue::$kind(self.clone())
            }
        }
    };
}

scalar_field_type!(bool, Boolean);
scalar_field_type!(i32, Integer);
scalar_field_type!(i64, BigInt);
scalar_field_type!(f64, Double);
scalar_field_type!(Decimal, Decimal);
scalar_field_type!(String, String);
scalar_field_type!(DateTime<Utc>, DateTime);
scalar_field_type!(Uuid, Uuid);

impl FieldType for LookupReference {
    const KIND: FieldKind = FieldKind::Lookup;

    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
        match value {
            FieldValue::Lookup(reference) => Ok(reference),
            other => Err(other),
        }
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Lookup(self.clone())
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }

    fn to_field_value(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Null, T::to_field_value)
    }

    /// `None` means "not supplied". Use [`FieldState`] when an explicit null must be written.
    fn is_supplied(&self) -> bool {
        self.as_ref().is_some_and(T::is_supplied)
    }
}

/// A field value that tells "never assigned" apart from "assigned null".
///
/// Ingest of a null attribute yields [`FieldState::Null`], and egress writes it back as an
/// explicit null (subject to `treat_null_as_ignore`). [`FieldState::Unset`] is left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldState<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> FieldState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldState::Value(value) => Some(value),
            FieldState::Unset | FieldState::Null => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldState::Unset)
    }
}

impl<T> From<Option<T>> for FieldState<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldState::Null, FieldState::Value)
    }
}

impl<T: FieldType> FieldType for FieldState<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
        match value {
            FieldValue::Null => Ok(FieldState::Null),
            other => T::from_field_value(other).map(FieldState::Value),
        }
    }

    fn to_field_value(&self) -> FieldValue {
        self.value().map_or(FieldValue::Null, T::to_field_value)
    }

    fn is_supplied(&self) -> bool {
        !self.is_unset()
    }
}

/// Object-safe access to a generated record instance.
pub trait Record: Any + fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &'static RecordDescriptor;

    fn get_field(&self, field: &FieldHandle) -> FieldValue;

    /// Whether `field` carries a value to write, including an explicit null.
    fn is_supplied(&self, field: &FieldHandle) -> bool;

    fn set_field(&mut self, field: &FieldHandle, value: FieldValue) -> Result<(), MappingError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn Record {
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Record>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }
}

/// Implemented by `#[derive(CrmRecord)]` on the concrete type.
pub trait CrmRecord: Record + Default + Sized {
    const DESCRIPTOR: &'static RecordDescriptor;
}

/// Factory stored in every generated descriptor.
pub fn instantiate<T: CrmRecord>() -> Box<dyn Record> {
    Box::new(T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_wrapper_accepts_null() {
        assert_eq!(<Option<i32>>::from_field_value(FieldValue::Null), Ok(None));
        assert_eq!(<Option<i32>>::from_field_value(FieldValue::Integer(4)), Ok(Some(4)));
        assert!(<Option<i32> as FieldType>::NULLABLE);
        assert!(matches!(<Option<Decimal> as FieldType>::KIND, FieldKind::Decimal));
    }

    #[test]
    fn mismatched_values_are_handed_back() {
        assert_eq!(i32::from_field_value(FieldValue::Null), Err(FieldValue::Null));
        assert_eq!(
            String::from_field_value(FieldValue::Integer(1)),
            Err(FieldValue::Integer(1))
        );
        assert_eq!(
            <Option<bool>>::from_field_value(FieldValue::from("yes")),
            Err(FieldValue::from("yes"))
        );
    }

    #[test]
    fn to_field_value_round_trips() {
        let lookup = LookupReference::new("account", "42");
        assert_eq!(lookup.to_field_value(), FieldValue::Lookup(lookup.clone()));
        assert_eq!(None::<String>.to_field_value(), FieldValue::Null);
        assert_eq!(Some(7i64).to_field_value(), FieldValue::BigInt(7));
    }

    #[test]
    fn supplied_tracks_absence() {
        assert!(!None::<String>.is_supplied());
        assert!(Some(3).is_supplied());
        assert!(false.is_supplied());

        assert!(!FieldState::<String>::Unset.is_supplied());
        assert!(FieldState::<String>::Null.is_supplied());
        assert_eq!(FieldState::<String>::Null.to_field_value(), FieldValue::Null);
    }

    #[test]
    fn field_state_keeps_assigned_null() {
        assert_eq!(<FieldState<i32>>::from_field_value(FieldValue::Null), Ok(FieldState::Null));
        assert_eq!(
            <FieldState<i32>>::from_field_value(FieldValue::Integer(9)),
            Ok(FieldState::Value(9))
        );
        assert_eq!(FieldState::from(Some("x")).value(), Some(&"x"));
        assert_eq!(FieldState::<i32>::from(None), FieldState::Null);
    }
}
