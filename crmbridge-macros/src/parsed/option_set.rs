use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Variant};

use super::{ident_name, type_name_tokens};

pub(crate) struct ParsedOptionSet {
    name: Ident,
    type_name: Option<LitStr>,
    variants: Vec<ParsedVariant>,
}

struct ParsedVariant {
    ident: Ident,
    label: String,
}

impl ParsedOptionSet {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new_spanned(&input.generics, "OptionSetEnum cannot be derived for generic types"));
        }

        let mut type_name = None;
        for attr in &input.attrs {
            if attr.path().is_ident("crm") {
                Self::parse_container_attr(attr, &mut type_name)?;
            }
        }

        let Data::Enum(data) = &input.data else {
            return Err(Error::new(input.ident.span(), "OptionSetEnum can only be derived for enums"));
        };

        let variants = data
            .variants
            .iter()
            .map(ParsedVariant::from_variant)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: input.ident.clone(),
            type_name,
            variants,
        })
    }

    fn parse_container_attr(attr: &Attribute, type_name: &mut Option<LitStr>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                *type_name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported crm attribute; expected `type_name`"))
            }
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let type_name = type_name_tokens(self.type_name.as_ref(), name);

        let variants: Vec<_> = self.variants.iter().map(|variant| &variant.ident).collect();
        let constant_names: Vec<_> = self.variants.iter().map(|variant| ident_name(&variant.ident)).collect();
        let labels: Vec<_> = self.variants.iter().map(|variant| variant.label.as_str()).collect();
        let indices: Vec<_> = (0..self.variants.len()).map(Literal::usize_unsuffixed).collect();

        quote! {
            impl #name {
                #[doc(hidden)]
                #[allow(unreachable_patterns)]
                fn __crm_index_of_label(label: &str) -> ::core::option::Option<usize> {
                    match label {
                        #( #labels => ::core::option::Option::Some(#indices), )*
                        _ => ::core::option::Option::None,
                    }
                }
            }

            impl ::crmbridge::enums::OptionSetEnum for #name {
                const DESCRIPTOR: &'static ::crmbridge::enums::EnumDescriptor = &::crmbridge::enums::EnumDescriptor {
                    type_name: #type_name,
                    constants: &[
                        #(
                            ::crmbridge::enums::EnumConstant {
                                name: #constant_names,
                                label: #labels,
                            }
                        ),*
                    ],
                    index_of_label: <#name>::__crm_index_of_label,
                };

                fn from_index(index: usize) -> ::core::option::Option<Self> {
                    match index {
                        #( #indices => ::core::option::Option::Some(Self::#variants), )*
                        _ => ::core::option::Option::None,
                    }
                }

                fn index(self) -> usize {
                    match self {
                        #( Self::#variants => #indices, )*
                    }
                }
            }

            impl ::crmbridge::record::FieldType for #name {
                const KIND: ::crmbridge::record::FieldKind =
                    ::crmbridge::record::FieldKind::OptionSet(<Self as ::crmbridge::enums::OptionSetEnum>::DESCRIPTOR);

                fn from_field_value(
                    value: ::crmbridge::value::FieldValue,
                ) -> ::core::result::Result<Self, ::crmbridge::value::FieldValue> {
                    match value {
                        ::crmbridge::value::FieldValue::Enum(constant) => {
                            <Self as ::crmbridge::enums::OptionSetEnum>::from_constant(constant)
                                .ok_or(::crmbridge::value::FieldValue::Enum(constant))
                        }
                        other => ::core::result::Result::Err(other),
                    }
                }

                fn to_field_value(&self) -> ::crmbridge::value::FieldValue {
                    ::crmbridge::value::FieldValue::Enum(::crmbridge::enums::OptionSetEnum::constant(*self))
                }
            }

            ::crmbridge::inventory::submit! {
                ::crmbridge::registry::OptionSetRegistration {
                    descriptor: <#name as ::crmbridge::enums::OptionSetEnum>::DESCRIPTOR,
                }
            }
        }
    }
}

impl ParsedVariant {
    fn from_variant(variant: &Variant) -> Result<Self> {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(variant, "OptionSetEnum variants cannot carry data"));
        }

        let mut label: Option<LitStr> = None;
        for attr in &variant.attrs {
            if !attr.path().is_ident("crm") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("label") {
                    label = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported crm variant attribute; expected `label`"))
                }
            })?;
        }

        Ok(Self {
            label: label.map(|lit| lit.value()).unwrap_or_else(|| ident_name(&variant.ident)),
            ident: variant.ident.clone(),
        })
    }
}
