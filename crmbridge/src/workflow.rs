//! Run logic of the CRM workflow steps.
//!
//! Each runner reports through a two-path [`StepOutcome`]: `Success` with the step's output, or
//! `Error` with a message the flow can branch on. Only configuration problems that no flow could
//! handle surface as a [`StepError`].

use std::fmt;

use uuid::Uuid;

use crate::egress::{EgressOptions, egress, record_values};
use crate::enums::{EnumConstantRef, EnumDescriptor, OptionSetEnum};
use crate::errors::{MappingError, StepError, ValidationIssue};
use crate::ingest::{ingest, ingest_dyn};
use crate::record::{CrmRecord, Record, RecordDescriptor};
use crate::registry;
use crate::resolver::resolve_field;
use crate::service::{ColumnSet, CrmService, Entity};
use crate::types::EntitySchema;
use crate::value::{EntityReference, FieldValues, NativeValues};

pub const PATH_SUCCESS: &str = "Success";
pub const PATH_ERROR: &str = "Error";

pub const ENTITY_ID_REQUIRED: &str = "Entity Id cannot be null.";

/// Result of running a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Success(T),
    Error { message: String },
}

impl<T> StepOutcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    /// Name of the outgoing path.
    pub fn path(&self) -> &'static str {
        match self {
            StepOutcome::Success(_) => PATH_SUCCESS,
            StepOutcome::Error { .. } => PATH_ERROR,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            StepOutcome::Success(value) => Some(value),
            StepOutcome::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            StepOutcome::Success(_) => None,
            StepOutcome::Error { message } => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepOutcome<U> {
        match self {
            StepOutcome::Success(value) => StepOutcome::Success(f(value)),
            StepOutcome::Error { message } => StepOutcome::Error { message },
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for StepOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => StepOutcome::Success(value),
            Err(err) => {
                log::warn!("step failed: {err}");
                StepOutcome::error(err.to_string())
            }
        }
    }
}

fn record_type(schema: &EntitySchema) -> Result<&'static RecordDescriptor, StepError> {
    registry::find_record_type(&schema.type_name).ok_or_else(|| {
        StepError::misconfigured(
            "type_name",
            "record_type_not_found",
            format!("Entity type '{}' not found", schema.type_name),
        )
    })
}

fn parse_entity_id(entity_id: &str) -> Result<Uuid, StepError> {
    Uuid::parse_str(entity_id.trim()).map_err(|_| StepError::InvalidInput {
        message: format!("'{entity_id}' is not a valid entity id"),
    })
}

/// Retrieves every record of an entity and ingests each one.
#[derive(Debug, Clone)]
pub struct GetAllEntitiesStep {
    pub schema: EntitySchema,
}

impl GetAllEntitiesStep {
    pub fn new(schema: EntitySchema) -> Self {
        Self { schema }
    }

    pub fn step_name(&self) -> String {
        format!("Get All {} Entities", self.schema.display_name)
    }

    pub async fn run<T: CrmRecord>(&self, service: &dyn CrmService) -> StepOutcome<Vec<T>> {
        self.fetch(service, |attributes| ingest::<T>(&self.schema.fields, attributes))
            .await
            .into()
    }

    /// Same as [`Self::run`], with the record type looked up in the registry by the schema's
    /// type name.
    pub async fn run_dyn(&self, service: &dyn CrmService) -> StepOutcome<Vec<Box<dyn Record>>> {
        self.fetch_dyn(service).await.into()
    }

    async fn fetch_dyn(&self, service: &dyn CrmService) -> Result<Vec<Box<dyn Record>>, StepError> {
        let descriptor = record_type(&self.schema)?;
        self.fetch(service, |attributes| ingest_dyn(descriptor, &self.schema.fields, attributes))
            .await
    }

    async fn fetch<R>(
        &self,
        service: &dyn CrmService,
        convert: impl Fn(&NativeValues) -> Result<R, MappingError>,
    ) -> Result<Vec<R>, StepError> {
        self.schema.log_fields("GetAllEntitiesStep");
        let entities = service.retrieve_multiple(&self.schema.logical_name, &ColumnSet::All).await?;
        log::debug!("retrieved {} {} records", entities.len(), self.schema.logical_name);
        entities
            .iter()
            .map(|entity| convert(&entity.attributes).map_err(StepError::from))
            .collect()
    }
}

/// Writes typed values onto an existing record.
#[derive(Debug, Clone)]
pub struct UpdateEntityStep {
    pub schema: EntitySchema,
    pub options: EgressOptions,
}

impl UpdateEntityStep {
    pub fn new(schema: EntitySchema, options: EgressOptions) -> Self {
        Self { schema, options }
    }

    pub fn step_name(&self) -> String {
        format!("Update {} Entity", self.schema.display_name)
    }

    /// `entity_id` is the record's id as text; `None` or blank takes the Error path.
    pub async fn run(&self, service: &dyn CrmService, entity_id: Option<&str>, values: &FieldValues) -> StepOutcome<()> {
        let Some(entity_id) = entity_id.filter(|id| !id.trim().is_empty()) else {
            return StepOutcome::error(ENTITY_ID_REQUIRED);
        };
        self.update(service, entity_id, values).await.into()
    }

    pub async fn run_record(&self, service: &dyn CrmService, entity_id: Option<&str>, record: &dyn Record) -> StepOutcome<()> {
        self.run(service, entity_id, &record_values(record, &self.schema)).await
    }

    async fn update(&self, service: &dyn CrmService, entity_id: &str, values: &FieldValues) -> Result<(), StepError> {
        let id = parse_entity_id(entity_id)?;
        self.schema.log_fields("UpdateEntityStep");
        let attributes = egress(&self.schema, values, self.options)?;
        let entity = Entity::new(self.schema.logical_name.clone(), id).with_attributes(attributes);
        service.update(entity).await?;
        Ok(())
    }
}

/// Creates a record from typed values and returns its id.
#[derive(Debug, Clone)]
pub struct CreateEntityStep {
    pub schema: EntitySchema,
    pub options: EgressOptions,
}

impl CreateEntityStep {
    pub fn new(schema: EntitySchema, options: EgressOptions) -> Self {
        Self { schema, options }
    }

    pub fn step_name(&self) -> String {
        format!("Create {} Entity", self.schema.display_name)
    }

    pub async fn run(&self, service: &dyn CrmService, values: &FieldValues) -> StepOutcome<Uuid> {
        self.create(service, values).await.into()
    }

    pub async fn run_record(&self, service: &dyn CrmService, record: &dyn Record) -> StepOutcome<Uuid> {
        self.run(service, &record_values(record, &self.schema)).await
    }

    async fn create(&self, service: &dyn CrmService, values: &FieldValues) -> Result<Uuid, StepError> {
        let attributes = egress(&self.schema, values, self.options)?;
        let entity = Entity::new(self.schema.logical_name.clone(), Uuid::nil()).with_attributes(attributes);
        Ok(service.create(entity).await?)
    }
}

/// Deletes a record by id.
#[derive(Debug, Clone)]
pub struct DeleteEntityStep {
    pub schema: EntitySchema,
}

impl DeleteEntityStep {
    pub fn new(schema: EntitySchema) -> Self {
        Self { schema }
    }

    pub fn step_name(&self) -> String {
        format!("Delete {} Entity", self.schema.display_name)
    }

    pub async fn run(&self, service: &dyn CrmService, entity_id: Option<&str>) -> StepOutcome<()> {
        let Some(entity_id) = entity_id.filter(|id| !id.trim().is_empty()) else {
            return StepOutcome::error(ENTITY_ID_REQUIRED);
        };
        self.delete(service, entity_id).await.into()
    }

    async fn delete(&self, service: &dyn CrmService, entity_id: &str) -> Result<(), StepError> {
        let id = parse_entity_id(entity_id)?;
        let reference = EntityReference::new(self.schema.logical_name.clone(), id);
        service.delete(&reference).await?;
        Ok(())
    }
}

/// Turns an option code into the generated enum constant of a chosen Picklist field.
#[derive(Debug, Clone)]
pub struct GetOptionFromValueStep {
    pub schema: EntitySchema,
    /// CRM name of the Picklist field to translate for.
    pub option_set_field: Option<String>,
}

impl GetOptionFromValueStep {
    pub fn new(schema: EntitySchema, option_set_field: Option<String>) -> Self {
        Self {
            schema,
            option_set_field,
        }
    }

    pub fn step_name(&self) -> String {
        format!("Get Option For {}", self.schema.display_name)
    }

    /// Fields that can be chosen as the option set.
    pub fn available_option_sets(&self) -> Vec<&str> {
        self.schema.picklist_fields()
    }

    /// Problems that prevent the step from running at all.
    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.chosen_field().is_none() {
            issues.push(ValidationIssue::new(
                "option_set_field",
                "required",
                "No option set property chosen",
            ));
        }
        if registry::find_record_type(&self.schema.type_name).is_none() {
            issues.push(ValidationIssue::new(
                "type_name",
                "record_type_not_found",
                format!("Entity type '{}' not found", self.schema.type_name),
            ));
        }
        issues
    }

    fn chosen_field(&self) -> Option<&str> {
        self.option_set_field.as_deref().filter(|name| !name.is_empty())
    }

    /// Enumeration generated for the chosen field.
    pub fn option_set_type(&self) -> Result<&'static EnumDescriptor, StepError> {
        let descriptor = record_type(&self.schema)?;
        let name = self
            .chosen_field()
            .ok_or_else(|| StepError::misconfigured("option_set_field", "required", "No option set chosen"))?;
        resolve_field(descriptor, name)
            .and_then(|field| field.kind.option_set())
            .ok_or_else(|| {
                StepError::misconfigured(
                    "option_set_field",
                    "not_an_option_set",
                    format!("Couldn't find option set property {name}"),
                )
            })
    }

    pub fn run(&self, value: Option<i32>) -> Result<StepOutcome<EnumConstantRef>, StepError> {
        let enum_type = self.option_set_type()?;
        let name = self.chosen_field().unwrap_or_default();

        let Some(code) = value else {
            return Ok(StepOutcome::error("No option value input was given"));
        };
        let Some(field) = self.schema.field(name) else {
            return Ok(StepOutcome::error(format!("No option set field found with name {name}")));
        };
        let Some(option) = field.option_by_value(code).filter(|option| !option.name.is_empty()) else {
            return Ok(StepOutcome::error(format!("No option found with value {code}")));
        };

        let constant = enum_type
            .by_label(&option.name)
            .ok_or_else(|| MappingError::EnumConstantNotFound {
                enum_type: enum_type.type_name.to_string(),
                label: option.name.clone(),
                code,
            })?;
        Ok(StepOutcome::Success(constant))
    }

    /// [`Self::run`] narrowed to the concrete enumeration.
    pub fn run_typed<E: OptionSetEnum>(&self, value: Option<i32>) -> Result<StepOutcome<E>, StepError> {
        match self.run(value)? {
            StepOutcome::Success(constant) => E::from_constant(constant).map(StepOutcome::Success).ok_or_else(|| {
                StepError::misconfigured(
                    "option_set_field",
                    "type_mismatch",
                    format!("option set is {}, not {}", constant.type_name(), E::DESCRIPTOR.type_name),
                )
            }),
            StepOutcome::Error { message } => Ok(StepOutcome::Error { message }),
        }
    }
}
