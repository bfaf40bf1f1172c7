//! FromRow derive macro implementation

use crate::common::{get_field_attrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = named_fields(&input, "FromRow")?;

    let field_inits = fields
        .iter()
        .map(|field| {
            let field_ident = field.ident.as_ref().unwrap();
            let attrs = get_field_attrs(field)?;

            if attrs.skip {
                return Ok(quote! {
                    #field_ident: ::std::default::Default::default()
                });
            }

            if attrs.flatten {
                let field_ty = &field.ty;
                return Ok(quote! {
                    #field_ident: <#field_ty as dbmap::FromRow>::from_row(row)?
                });
            }

            let column_name = attrs.column.unwrap_or_else(|| field_ident.to_string());
            Ok(quote! {
                #field_ident: row.try_get(#column_name)?
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics dbmap::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &dbmap::Row) -> dbmap::DbResult<Self> {
                Ok(Self {
                    #(#field_inits,)*
                })
            }
        }
    })
}
