use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use crmbridge::naming::generated_field_name;
use crmbridge::{EntitySchema, FieldMetadata};
use serde::Serialize;

use crate::commands::load_schema;
use crate::examples::ExampleGroup;
use crate::output::{Console, Status, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect a schema",
    commands: &[
        "crmbridge schema account.json           # Fields, types and option sets",
        "crmbridge --output json schema lead.toml  # Same, as JSON",
    ],
}];

#[derive(Args)]
pub struct SchemaArgs {
    /// Entity schema file (.json or .toml)
    pub file: PathBuf,
}

#[derive(Serialize)]
struct SchemaReport<'a> {
    logical_name: &'a str,
    display_name: &'a str,
    type_name: &'a str,
    fields: Vec<FieldRow<'a>>,
}

#[derive(Serialize)]
struct FieldRow<'a> {
    name: &'a str,
    generated_name: String,
    attribute_type: String,
    updatable: bool,
    options: Vec<String>,
}

impl<'a> FieldRow<'a> {
    fn new(field: &'a FieldMetadata) -> Self {
        Self {
            name: &field.name,
            generated_name: generated_field_name(&field.name),
            attribute_type: field.attribute_type.to_string(),
            updatable: field.is_updatable,
            options: field
                .option_set
                .iter()
                .map(|option| format!("{}={}", option.value, option.name))
                .collect(),
        }
    }
}

impl<'a> SchemaReport<'a> {
    fn new(schema: &'a EntitySchema) -> Self {
        Self {
            logical_name: &schema.logical_name,
            display_name: &schema.display_name,
            type_name: &schema.type_name,
            fields: schema.fields.iter().map(FieldRow::new).collect(),
        }
    }
}

impl TableDisplay for SchemaReport<'_> {
    fn to_table(&self, console: &Console) -> Table {
        let mut table = console.table(&["Field", "Generated", "Type", "Updatable", "Options"]);
        for field in &self.fields {
            let generated = if field.generated_name == field.name {
                String::new()
            } else {
                field.generated_name.clone()
            };
            table.add_row(vec![
                Cell::new(field.name),
                Cell::new(generated),
                Cell::new(&field.attribute_type),
                Cell::new(if field.updatable { "yes" } else { "no" }),
                Cell::new(field.options.join(", ")),
            ]);
        }
        table
    }
}

pub fn handle_schema(args: SchemaArgs, console: &Console) -> Result<()> {
    let schema = load_schema(&args.file)?;
    schema.log_fields("schema");

    console.title(&format!("Entity: {}", schema.display_name));
    console.field("Logical name", &schema.logical_name);
    console.field("Generated type", &schema.type_name);

    let report = SchemaReport::new(&schema);
    console.render(&report)?;

    let renamed = report.fields.iter().filter(|field| field.generated_name != field.name).count();
    if renamed > 0 {
        console.status(Status::Note, &format!("{renamed} field(s) are renamed on the generated type"));
    }
    let picklists = schema.picklist_fields();
    if !picklists.is_empty() {
        console.status(Status::Note, &format!("Option sets: {}", picklists.join(", ")));
    }
    Ok(())
}
