use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::{Cell, Table};
use crmbridge::{
    AttributeType, BridgeConfig, EntitySchema, FieldMetadata, FieldValue, FieldValues, LookupReference, NativeValue,
    NativeValues, egress,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::commands::load_schema;
use crate::examples::ExampleGroup;
use crate::output::{Console, Status, TableDisplay};
use crate::theme::PALETTE;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Preview an update payload",
        commands: &[
            "crmbridge egress account.json values.json                          # Native attributes to be written",
            "crmbridge egress account.json values.json --treat-null-as-ignore   # Leave nulls out",
        ],
    },
    ExampleGroup {
        title: "Values file",
        commands: &[
            r#"{ "name": "Contoso", "revenue": 1500.00, "prioritycode": "High" }"#,
            r#"{ "primarycontactid": { "entity_name": "contact", "id": "<guid>" } }"#,
        ],
    },
];

#[derive(Args)]
pub struct EgressArgs {
    /// Entity schema file (.json or .toml)
    pub schema: PathBuf,

    /// JSON object of field name to value
    pub values: PathBuf,

    /// Leave null-valued fields out of the payload
    #[arg(long)]
    pub treat_null_as_ignore: bool,

    /// Handle empty strings as null
    #[arg(long)]
    pub treat_empty_string_as_null: bool,
}

#[derive(Serialize)]
#[serde(transparent)]
struct Payload(NativeValues);

impl TableDisplay for Payload {
    fn to_table(&self, console: &Console) -> Table {
        let mut table = console.table(&["Attribute", "Kind", "Value"]);
        for (name, value) in &self.0 {
            let (kind, rendered) = describe(value);
            let kind = Cell::new(kind);
            let kind = if console.is_plain() { kind } else { kind.fg(PALETTE.native_value(value)) };
            table.add_row(vec![Cell::new(name), kind, Cell::new(rendered)]);
        }
        table
    }
}

fn describe(value: &NativeValue) -> (&'static str, String) {
    match value {
        NativeValue::Null => ("null", String::new()),
        NativeValue::OptionCode(code) => ("option", code.to_string()),
        NativeValue::Money(amount) => ("money", amount.to_string()),
        NativeValue::Reference(reference) => ("reference", format!("{}:{}", reference.logical_name, reference.id)),
        NativeValue::Scalar(scalar) => ("scalar", FieldValue::from(scalar.clone()).to_string()),
    }
}

pub fn handle_egress(args: EgressArgs, config: BridgeConfig, console: &Console) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let source = load_values(&schema, &args.values)?;
    let options = config
        .with_overrides(args.treat_null_as_ignore, args.treat_empty_string_as_null)
        .update;

    log::debug!("egress options: {options:?}");
    let payload = egress(&schema, &source, options).context("Egress conversion failed")?;

    let skipped: Vec<&str> = source
        .keys()
        .filter(|name| !payload.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();

    console.title(&format!("Update payload for {}", schema.display_name));
    console.render(&Payload(payload))?;
    if skipped.is_empty() {
        console.status(Status::Ok, "Every supplied value is written");
    } else {
        console.status(Status::Caution, &format!("Not written: {}", skipped.join(", ")));
        console.status(Status::Note, "Run with RUST_LOG=debug to see why each field was skipped");
    }
    Ok(())
}

fn load_values(schema: &EntitySchema, path: &Path) -> Result<FieldValues> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let object: Map<String, Value> =
        serde_json::from_str(&content).with_context(|| format!("{} must contain a JSON object", path.display()))?;

    let mut values = FieldValues::new();
    for (name, value) in object {
        let converted = match schema.field(&name) {
            Some(field) => field_value(field, value).with_context(|| format!("Invalid value for field '{name}'"))?,
            None => untyped_value(value)?,
        };
        values.insert(name, converted);
    }
    Ok(values)
}

/// Interprets a JSON value according to the field's attribute type.
fn field_value(field: &FieldMetadata, value: Value) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }

    Ok(match &field.attribute_type {
        AttributeType::Money | AttributeType::Decimal => FieldValue::Decimal(decimal(&value)?),
        AttributeType::Integer | AttributeType::State | AttributeType::Status => {
            let number = value.as_i64().ok_or_else(|| anyhow!("expected an integer, got {value}"))?;
            FieldValue::Integer(i32::try_from(number).context("integer out of range")?)
        }
        AttributeType::BigInt => FieldValue::BigInt(value.as_i64().ok_or_else(|| anyhow!("expected an integer, got {value}"))?),
        AttributeType::Double => FieldValue::Double(value.as_f64().ok_or_else(|| anyhow!("expected a number, got {value}"))?),
        AttributeType::Boolean => FieldValue::Boolean(value.as_bool().ok_or_else(|| anyhow!("expected a boolean, got {value}"))?),
        AttributeType::DateTime => {
            let text = value.as_str().ok_or_else(|| anyhow!("expected an RFC 3339 timestamp, got {value}"))?;
            FieldValue::DateTime(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
        }
        AttributeType::Uniqueidentifier => {
            let text = value.as_str().ok_or_else(|| anyhow!("expected a GUID, got {value}"))?;
            FieldValue::Uuid(Uuid::parse_str(text)?)
        }
        AttributeType::Lookup | AttributeType::Customer | AttributeType::Owner => match value {
            object @ Value::Object(_) => FieldValue::Lookup(serde_json::from_value::<LookupReference>(object)?),
            other => untyped_value(other)?,
        },
        AttributeType::Picklist => match value {
            Value::String(text) => FieldValue::String(text),
            Value::Number(number) => FieldValue::String(number.to_string()),
            other => bail!("expected an option name, got {other}"),
        },
        _ => untyped_value(value)?,
    })
}

/// Best-effort conversion for fields without a specific rule.
fn untyped_value(value: Value) -> Result<FieldValue> {
    Ok(match value {
        Value::Null => FieldValue::Null,
        Value::Bool(flag) => FieldValue::Boolean(flag),
        Value::String(text) => FieldValue::String(text),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => match i32::try_from(integer) {
                Ok(small) => FieldValue::Integer(small),
                Err(_) => FieldValue::BigInt(integer),
            },
            None => FieldValue::Double(number.as_f64().unwrap_or_default()),
        },
        Value::Array(_) | Value::Object(_) => bail!("arrays and objects are only accepted for lookup fields"),
    })
}

fn decimal(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        other => bail!("expected a decimal amount, got {other}"),
    };
    Decimal::from_str(&text).with_context(|| format!("'{text}' is not a decimal amount"))
}
