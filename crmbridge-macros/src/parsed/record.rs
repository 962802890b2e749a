use std::collections::HashSet;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type};

use super::{ident_name, type_name_tokens};

pub(crate) struct ParsedRecord {
    name: Ident,
    entity: LitStr,
    type_name: Option<LitStr>,
    fields: Vec<ParsedField>,
}

struct ParsedField {
    ident: Ident,
    /// Name exposed through the field handle.
    name: String,
    ty: Type,
}

impl ParsedRecord {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new_spanned(&input.generics, "CrmRecord cannot be derived for generic types"));
        }

        let mut entity = None;
        let mut type_name = None;
        for attr in &input.attrs {
            if attr.path().is_ident("crm") {
                Self::parse_container_attr(attr, &mut entity, &mut type_name)?;
            }
        }
        let entity = entity.ok_or_else(|| {
            Error::new(input.ident.span(), "CrmRecord requires #[crm(entity = \"logical_name\")]")
        })?;

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => return Err(Error::new(input.ident.span(), "CrmRecord requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "CrmRecord can only be derived for structs")),
        };

        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        for field in named {
            let Some(parsed) = ParsedField::from_field(field)? else {
                continue;
            };
            if !seen.insert(parsed.name.clone()) {
                return Err(Error::new(
                    parsed.ident.span(),
                    format!("duplicate CrmRecord field name '{}'", parsed.name),
                ));
            }
            fields.push(parsed);
        }

        Ok(Self {
            name: input.ident.clone(),
            entity,
            type_name,
            fields,
        })
    }

    fn parse_container_attr(attr: &Attribute, entity: &mut Option<LitStr>, type_name: &mut Option<LitStr>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("entity") {
                *entity = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("type_name") {
                *type_name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported crm attribute; expected `entity` or `type_name`"))
            }
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let entity = &self.entity;
        let type_name = type_name_tokens(self.type_name.as_ref(), name);

        let idents: Vec<_> = self.fields.iter().map(|field| &field.ident).collect();
        let names: Vec<_> = self.fields.iter().map(|field| field.name.as_str()).collect();
        let tys: Vec<_> = self.fields.iter().map(|field| &field.ty).collect();

        quote! {
            impl ::crmbridge::record::CrmRecord for #name {
                const DESCRIPTOR: &'static ::crmbridge::record::RecordDescriptor = &::crmbridge::record::RecordDescriptor {
                    type_name: #type_name,
                    entity: #entity,
                    fields: &[
                        #(
                            ::crmbridge::record::FieldHandle {
                                name: #names,
                                kind: <#tys as ::crmbridge::record::FieldType>::KIND,
                                nullable: <#tys as ::crmbridge::record::FieldType>::NULLABLE,
                            }
                        ),*
                    ],
                    factory: ::crmbridge::record::instantiate::<#name>,
                };
            }

            impl ::crmbridge::record::Record for #name {
                fn descriptor(&self) -> &'static ::crmbridge::record::RecordDescriptor {
                    <Self as ::crmbridge::record::CrmRecord>::DESCRIPTOR
                }

                fn get_field(&self, field: &::crmbridge::record::FieldHandle) -> ::crmbridge::value::FieldValue {
                    match field.name {
                        #(
                            #names => ::crmbridge::record::FieldType::to_field_value(&self.#idents),
                        )*
                        _ => ::crmbridge::value::FieldValue::Null,
                    }
                }

                fn is_supplied(&self, field: &::crmbridge::record::FieldHandle) -> bool {
                    match field.name {
                        #(
                            #names => ::crmbridge::record::FieldType::is_supplied(&self.#idents),
                        )*
                        _ => false,
                    }
                }

                #[allow(unused_variables)]
                fn set_field(
                    &mut self,
                    field: &::crmbridge::record::FieldHandle,
                    value: ::crmbridge::value::FieldValue,
                ) -> ::core::result::Result<(), ::crmbridge::errors::MappingError> {
                    let descriptor = <Self as ::crmbridge::record::CrmRecord>::DESCRIPTOR;
                    match field.name {
                        #(
                            #names => {
                                self.#idents = <#tys as ::crmbridge::record::FieldType>::from_field_value(value)
                                    .map_err(|rejected| {
                                        ::crmbridge::errors::MappingError::field_type_mismatch(descriptor, field, &rejected)
                                    })?;
                                Ok(())
                            }
                        )*
                        _ => Err(::crmbridge::errors::MappingError::unknown_field(descriptor, field)),
                    }
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }
            }

            ::crmbridge::inventory::submit! {
                ::crmbridge::registry::RecordRegistration {
                    descriptor: <#name as ::crmbridge::record::CrmRecord>::DESCRIPTOR,
                }
            }
        }
    }
}

impl ParsedField {
    /// `None` for `#[crm(skip)]` fields.
    fn from_field(field: &Field) -> Result<Option<Self>> {
        let Some(ident) = field.ident.clone() else {
            return Err(Error::new_spanned(field, "CrmRecord requires named fields"));
        };

        let mut name: Option<LitStr> = None;
        let mut skip = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("crm") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    name = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported crm field attribute; expected `name` or `skip`"))
                }
            })?;
        }

        if skip {
            return Ok(None);
        }

        let name = match name {
            Some(lit) if lit.value().is_empty() => {
                return Err(Error::new(lit.span(), "crm field name cannot be empty"));
            }
            Some(lit) => lit.value(),
            None => ident_name(&ident),
        };

        Ok(Some(Self {
            ident,
            name,
            ty: field.ty.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn rejection(input: DeriveInput) -> String {
        match ParsedRecord::from_input(&input) {
            Ok(_) => panic!("expected CrmRecord input to be rejected"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn accepts_renamed_and_skipped_fields() {
        let input: DeriveInput = parse_quote! {
            #[crm(entity = "account", type_name = "crm::Account")]
            struct Account {
                name: Option<String>,
                #[crm(name = "Class")]
                class: Option<String>,
                #[crm(skip)]
                scratch: Vec<u8>,
            }
        };
        let Ok(parsed) = ParsedRecord::from_input(&input) else {
            panic!("valid input rejected");
        };
        let names: Vec<&str> = parsed.fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["name", "Class"]);
        assert_eq!(parsed.entity.value(), "account");
        assert!(parsed.emit().to_string().contains("is_supplied"));
    }

    #[test]
    fn missing_entity_is_rejected() {
        let message = rejection(parse_quote! {
            struct Account { name: Option<String> }
        });
        assert!(message.contains("requires #[crm(entity"));
    }

    #[test]
    fn generic_records_are_rejected() {
        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            struct Account<T> { name: Option<T> }
        });
        assert!(message.contains("cannot be derived for generic types"));
    }

    #[test]
    fn only_named_structs_are_accepted() {
        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            struct Account(Option<String>);
        });
        assert!(message.contains("requires named fields"));

        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            enum Account { Active }
        });
        assert!(message.contains("can only be derived for structs"));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            struct Account {
                name: Option<String>,
                #[crm(name = "name")]
                display_name: Option<String>,
            }
        });
        assert!(message.contains("duplicate CrmRecord field name 'name'"));
    }

    #[test]
    fn empty_field_name_is_rejected() {
        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            struct Account {
                #[crm(name = "")]
                name: Option<String>,
            }
        });
        assert!(message.contains("field name cannot be empty"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let message = rejection(parse_quote! {
            #[crm(entity = "account", table = "accounts")]
            struct Account { name: Option<String> }
        });
        assert!(message.contains("expected `entity` or `type_name`"));

        let message = rejection(parse_quote! {
            #[crm(entity = "account")]
            struct Account {
                #[crm(rename = "title")]
                name: Option<String>,
            }
        });
        assert!(message.contains("expected `name` or `skip`"));
    }
}
