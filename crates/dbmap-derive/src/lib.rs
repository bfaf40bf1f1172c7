//! Derive macros for dbmap
//!
//! Provides `#[derive(Model)]` and `#[derive(FromRow)]` macros.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod from_row;
mod model;

/// Derive the `Model` mapping table for a struct.
///
/// # Example
///
/// ```ignore
/// use dbmap::Model;
///
/// #[derive(Model)]
/// struct User {
///     #[orm(auto)]
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(skip)]
///     cached_display_name: String,
/// }
/// ```
///
/// # Generated
///
/// - `fn mapping() -> &'static FieldMapping` — column table, built once
/// - `fn values(&self) -> Vec<Value>` — leaf values in column order
/// - `fn set_auto_key(&mut self, key: i64)` — write-back for the auto field
///
/// # Attributes
///
/// - `#[orm(skip)]` - Omit the field from the mapping entirely
/// - `#[orm(auto)]` - Mark the database-assigned key (at most one per struct)
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(flatten)]` - Splice an embedded `Model`'s columns in place
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` for a struct.
///
/// Column names follow the same `#[orm(column = "...")]` rules as `Model`;
/// `#[orm(skip)]` fields decode to `Default::default()` and
/// `#[orm(flatten)]` fields decode from the same row.
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
