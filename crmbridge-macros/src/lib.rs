use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::{ParsedOptionSet, ParsedRecord};

/// Derives the crmbridge record capability layer for a struct with named fields.
///
/// ```text
/// #[derive(Debug, Default, CrmRecord)]
/// #[crm(entity = "account", type_name = "Crm::Account")]
/// struct Account {
///     name: Option<String>,
///     #[crm(name = "Class")]
///     class: Option<String>,
///     #[crm(skip)]
///     cached: Vec<u8>,
/// }
/// ```
///
/// `entity` is required. `type_name` defaults to the module path plus the struct name.
#[proc_macro_derive(CrmRecord, attributes(crm))]
pub fn derive_crm_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derives the option-set lookup tables for a fieldless enum.
///
/// Each variant's label defaults to its name; `#[crm(label = "...")]` sets the CRM option name
/// it stands for.
#[proc_macro_derive(OptionSetEnum, attributes(crm))]
pub fn derive_option_set_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedOptionSet::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
