use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use crmbridge::option_set::{name_to_code, option_name};
use serde::Serialize;

use crate::commands::{find_field, load_schema};
use crate::examples::ExampleGroup;
use crate::output::{Console, Status, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Translate option set values",
        commands: &[
            "crmbridge option account.json prioritycode 1            # Code to option name",
            "crmbridge option account.json prioritycode High         # Option name to code",
            "crmbridge option account.json prioritycode \"very low\"   # Names match case-insensitively",
        ],
    },
    ExampleGroup {
        title: "Generated constant names (VeryLow) only resolve inside a program linking the generated types",
        commands: &["crmbridge option account.json prioritycode \"Very Low\"   # Use the CRM option name instead"],
    },
];

#[derive(Args)]
pub struct OptionArgs {
    /// Entity schema file (.json or .toml)
    pub schema: PathBuf,

    /// Picklist field name
    pub field: String,

    /// Option code or CRM option name (case-insensitive)
    ///
    /// Generated enum constant names are not accepted here: they resolve only in a
    /// program that links the generated record types.
    pub value: String,
}

#[derive(Serialize)]
struct OptionMatch {
    field: String,
    code: i32,
    name: String,
}

impl TableDisplay for OptionMatch {
    fn to_table(&self, console: &Console) -> Table {
        let mut table = console.table(&["Field", "Code", "Name"]);
        table.add_row(vec![
            Cell::new(&self.field),
            Cell::new(self.code),
            Cell::new(&self.name),
        ]);
        table
    }
}

pub fn handle_option(args: OptionArgs, console: &Console) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let field = find_field(&schema, &args.field)?;
    if !field.attribute_type.is_picklist() {
        bail!("Field '{}' is a {} field, not an option set", field.name, field.attribute_type);
    }

    let found = match args.value.trim().parse::<i32>() {
        Ok(code) => option_name(field, code).map(|name| (code, name.to_string())),
        Err(_) => name_to_code(field, &schema.type_name, &args.value)
            .and_then(|code| option_name(field, code).map(|name| (code, name.to_string()))),
    };

    let Some((code, name)) = found else {
        console.status(
            Status::Caution,
            &format!(
                "Available options: {}",
                field
                    .option_set
                    .iter()
                    .map(|option| format!("{}={}", option.value, option.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
        console.status(
            Status::Note,
            "Generated constant names are not known to the CLI; pass the CRM option name or code.",
        );
        bail!("No option matching '{}' in {}.{}", args.value, schema.logical_name, field.name);
    };

    console.render(&OptionMatch {
        field: field.name.clone(),
        code,
        name,
    })
}
