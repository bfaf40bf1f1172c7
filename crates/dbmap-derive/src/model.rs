//! Model derive macro implementation

use crate::common::{get_field_attrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = named_fields(&input, "Model")?;

    let mut column_stmts: Vec<TokenStream> = Vec::new();
    let mut value_stmts: Vec<TokenStream> = Vec::new();
    let mut auto_field: Option<syn::Field> = None;
    let mut flatten_fields: Vec<syn::Field> = Vec::new();

    for field in fields.iter() {
        let attrs = get_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let field_ident = field.ident.as_ref().unwrap();
        let field_ty = &field.ty;

        if attrs.flatten {
            if attrs.auto {
                return Err(syn::Error::new_spanned(
                    field,
                    "#[orm(flatten)] and #[orm(auto)] cannot be combined",
                ));
            }
            column_stmts.push(quote! {
                columns.extend(
                    <#field_ty as dbmap::Model>::mapping().columns().iter().copied(),
                );
            });
            value_stmts.push(quote! {
                values.extend(<#field_ty as dbmap::Model>::values(&self.#field_ident));
            });
            flatten_fields.push(field.clone());
            continue;
        }

        let column_name = attrs.column.unwrap_or_else(|| field_ident.to_string());

        if attrs.auto {
            if auto_field.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "at most one field may be tagged #[orm(auto)]",
                ));
            }
            auto_field = Some(field.clone());
            column_stmts.push(quote! {
                columns.push(dbmap::Column { name: #column_name, auto: true });
            });
            // Auto column contributes no insert value.
            continue;
        }

        column_stmts.push(quote! {
            columns.push(dbmap::Column { name: #column_name, auto: false });
        });
        value_stmts.push(quote! {
            values.push(dbmap::ToValue::to_value(&self.#field_ident));
        });
    }

    let set_auto_key_body = if let Some(field) = &auto_field {
        let field_ident = field.ident.as_ref().unwrap();
        let field_ty = &field.ty;
        quote! {
            if let Ok(value) =
                <#field_ty as dbmap::FromValue>::from_value(dbmap::Value::Int(key))
            {
                self.#field_ident = value;
            }
        }
    } else if !flatten_fields.is_empty() {
        // No auto field of our own: delegate to the embedded models, each of
        // which no-ops unless it carries the auto column.
        let delegates = flatten_fields.iter().map(|field| {
            let field_ident = field.ident.as_ref().unwrap();
            quote! { dbmap::Model::set_auto_key(&mut self.#field_ident, key); }
        });
        quote! { #(#delegates)* }
    } else {
        quote! { let _ = key; }
    };

    Ok(quote! {
        impl #impl_generics dbmap::Model for #name #ty_generics #where_clause {
            fn mapping() -> &'static dbmap::FieldMapping {
                static MAPPING: ::std::sync::OnceLock<dbmap::FieldMapping> =
                    ::std::sync::OnceLock::new();
                MAPPING.get_or_init(|| {
                    let mut columns: ::std::vec::Vec<dbmap::Column> = ::std::vec::Vec::new();
                    #(#column_stmts)*
                    dbmap::FieldMapping::new(columns)
                })
            }

            fn values(&self) -> ::std::vec::Vec<dbmap::Value> {
                let mut values: ::std::vec::Vec<dbmap::Value> = ::std::vec::Vec::new();
                #(#value_stmts)*
                values
            }

            fn set_auto_key(&mut self, key: i64) {
                #set_auto_key_body
            }
        }
    })
}
