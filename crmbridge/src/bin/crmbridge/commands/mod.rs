pub mod egress;
pub mod option;
pub mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use crmbridge::{EntitySchema, FieldMetadata};

pub fn load_schema(path: &Path) -> Result<EntitySchema> {
    EntitySchema::load(path).with_context(|| format!("Failed to load entity schema from {}", path.display()))
}

pub fn find_field<'a>(schema: &'a EntitySchema, name: &str) -> Result<&'a FieldMetadata> {
    schema
        .field(name)
        .with_context(|| format!("Entity '{}' has no field named '{name}'", schema.logical_name))
}
