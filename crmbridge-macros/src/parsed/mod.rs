mod option_set;
mod record;

pub(crate) use option_set::ParsedOptionSet;
pub(crate) use record::ParsedRecord;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Ident, LitStr};

/// Identifier text without a raw-identifier prefix.
pub(crate) fn ident_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// `type_name` as given, or `module_path!()::Name`.
pub(crate) fn type_name_tokens(explicit: Option<&LitStr>, ident: &Ident) -> TokenStream2 {
    match explicit {
        Some(lit) => quote!(#lit),
        None => {
            let name = ident_name(ident);
            quote!(::core::concat!(::core::module_path!(), "::", #name))
        }
    }
}
