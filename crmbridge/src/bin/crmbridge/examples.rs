use crate::commands::{egress, option, schema};

/// A titled set of example invocations shown under a subcommand's `--help`.
#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

/// Examples for the named subcommand, if it has any.
pub fn examples_for(subcommand: &str) -> Option<&'static [ExampleGroup]> {
    match subcommand {
        "schema" => Some(schema::EXAMPLES),
        "option" => Some(option::EXAMPLES),
        "egress" => Some(egress::EXAMPLES),
        _ => None,
    }
}
