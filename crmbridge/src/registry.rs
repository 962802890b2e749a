//! Compile-time registration of generated types.
//!
//! `#[derive(CrmRecord)]` and `#[derive(OptionSetEnum)]` submit their descriptors to the
//! inventory; the first lookup builds a by-name index that stays immutable for the life of the
//! process.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::enums::EnumDescriptor;
use crate::record::{CrmRecord, RecordDescriptor};

/// Submitted for every derived record type.
pub struct RecordRegistration {
    pub descriptor: &'static RecordDescriptor,
}

/// Submitted for every derived option-set enumeration.
pub struct OptionSetRegistration {
    pub descriptor: &'static EnumDescriptor,
}

inventory::collect!(RecordRegistration);
inventory::collect!(OptionSetRegistration);

static RECORDS: OnceLock<HashMap<&'static str, &'static RecordDescriptor>> = OnceLock::new();
static OPTION_SETS: OnceLock<HashMap<&'static str, &'static EnumDescriptor>> = OnceLock::new();

fn index_by_name<T: 'static>(
    kind: &str,
    entries: impl Iterator<Item = &'static T>,
    name_of: fn(&T) -> &'static str,
) -> HashMap<&'static str, &'static T> {
    let mut index = HashMap::new();
    for entry in entries {
        let name = name_of(entry);
        if index.contains_key(name) {
            log::warn!("duplicate {kind} registration for '{name}', keeping the first");
            continue;
        }
        index.insert(name, entry);
    }
    index
}

fn records() -> &'static HashMap<&'static str, &'static RecordDescriptor> {
    RECORDS.get_or_init(|| {
        index_by_name("record type", registered_records(), |descriptor| descriptor.type_name)
    })
}

fn option_sets() -> &'static HashMap<&'static str, &'static EnumDescriptor> {
    OPTION_SETS.get_or_init(|| {
        index_by_name("option set", registered_option_sets(), |descriptor| descriptor.type_name)
    })
}

/// Every registered record descriptor, in link order.
pub fn registered_records() -> impl Iterator<Item = &'static RecordDescriptor> {
    inventory::iter::<RecordRegistration>().map(|registration| registration.descriptor)
}

pub fn registered_option_sets() -> impl Iterator<Item = &'static EnumDescriptor> {
    inventory::iter::<OptionSetRegistration>().map(|registration| registration.descriptor)
}

/// Resolves a generated record type by its full type name.
pub fn find_record_type(type_name: &str) -> Option<&'static RecordDescriptor> {
    records().get(type_name).copied()
}

/// First registered record type generated from the given CRM entity.
pub fn find_record_for_entity(logical_name: &str) -> Option<&'static RecordDescriptor> {
    registered_records().find(|descriptor| descriptor.entity == logical_name)
}

/// Resolves a generated option-set enumeration by its full type name.
pub fn find_option_set(type_name: &str) -> Option<&'static EnumDescriptor> {
    option_sets().get(type_name).copied()
}

pub fn is_record_registered<T: CrmRecord>() -> bool {
    find_record_type(T::DESCRIPTOR.type_name).is_some()
}
