//! crmbridge core library.
//!
//! Translates between a CRM's loosely typed attribute sets and strongly typed, derived record
//! types: field name resolution, option-set translation, and the ingest/egress converters, plus
//! the workflow step runners that drive them against a [`CrmService`].

extern crate self as crmbridge;

pub mod config;
pub mod egress;
pub mod enums;
pub mod errors;
pub mod ingest;
pub mod naming;
pub mod option_set;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod types;
pub mod value;
pub mod workflow;

pub use config::BridgeConfig;
pub use egress::{EgressOptions, egress, egress_record, record_values};
pub use enums::{EnumConstant, EnumConstantRef, EnumDescriptor, OptionSetEnum};
pub use errors::*;
pub use ingest::{ingest, ingest_dyn};
pub use option_set::{code_to_enum_constant, name_to_code, name_to_code_via};
pub use record::{CrmRecord, FieldHandle, FieldKind, FieldState, FieldType, Record, RecordDescriptor};
pub use registry::*;
pub use resolver::resolve_field;
pub use service::{ColumnSet, CrmService, Entity, InMemoryService};
pub use types::{AttributeType, EntitySchema, FieldMetadata, OptionMetadata};
pub use value::{EntityReference, FieldValue, FieldValues, LookupReference, NativeValue, NativeValues, Scalar};
pub use workflow::{
    CreateEntityStep, DeleteEntityStep, GetAllEntitiesStep, GetOptionFromValueStep, StepOutcome, UpdateEntityStep,
};

pub use crmbridge_macros::{CrmRecord, OptionSetEnum};

// Generated code refers to `::crmbridge::inventory`.
pub use inventory;
