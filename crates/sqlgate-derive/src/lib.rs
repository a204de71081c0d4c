//! Derive macros for table definitions used by the checked SQL builder.
//!
//! This crate provides the `#[derive(Table)]` macro. Besides compile-time
//! checked column names, it records the value type each column holds so the
//! WHERE clause checker can tell a boolean column from any other one.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, Meta,
    PathArguments, Type,
};

/// Derives the `Table` trait for a struct, generating typed column markers.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(nullable)]` - Marks the column as nullable (implied by
///   `Option<T>` fields)
/// - `#[column(aggregate)]` - Marks the column as holding an aggregate
///   result, such as a view column defined with `COUNT(*)`. Such columns are
///   rejected in WHERE clauses.
///
/// # Generated Items
///
/// For a struct `User`, this macro generates:
///
/// - `UserTable` - A type implementing `Table` trait with table metadata
/// - `UserColumns` - A module containing column types (`Id`, `Name`, etc.),
///   each implementing `Column` with the value type of its field
/// - Column accessor methods on `UserTable` and `User`
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        columns.push(ColumnInfo {
            type_name: format_ident!("{}", to_pascal_case(&field_name.to_string())),
            column_name: attrs.name.unwrap_or_else(|| field_name.to_string()),
            field_name,
            field_type: field.ty.clone(),
            is_primary_key: attrs.primary_key,
            is_nullable: attrs.nullable || is_option(&field.ty),
            is_aggregate: attrs.aggregate,
        });
    }

    if columns.iter().filter(|c| c.is_primary_key).count() > 1 {
        return Err(syn::Error::new_spanned(
            input,
            "Table derive supports at most one #[column(primary_key)]",
        ));
    }

    let table_struct_name = format_ident!("{}Table", struct_name);
    let columns_mod_name = format_ident!("{}Columns", struct_name);

    let column_structs = columns.iter().map(|info| {
        let ColumnInfo {
            type_name,
            column_name,
            field_type,
            is_primary_key,
            is_nullable,
            is_aggregate,
            ..
        } = info;

        quote! {
            /// Column type for compile-time checked queries.
            #[derive(Debug, Clone, Copy)]
            pub struct #type_name;

            impl ::sqlgate_core::schema::Column for #type_name {
                type Table = super::#table_struct_name;
                type Type = #field_type;

                const NAME: &'static str = #column_name;
                const NULLABLE: bool = #is_nullable;
                const PRIMARY_KEY: bool = #is_primary_key;
                const VALUE_TYPE: ::sqlgate_core::schema::ValueType =
                    <#field_type as ::sqlgate_core::schema::SqlType>::VALUE_TYPE;
                const AGGREGATE: bool = #is_aggregate;
            }

            impl ::sqlgate_core::schema::TypedColumn<#field_type> for #type_name {}
        }
    });

    let column_accessors: Vec<TokenStream2> = columns
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let type_name = &info.type_name;
            quote! {
                /// Returns the column type for type-safe queries.
                #[inline]
                pub const fn #method_name() -> #columns_mod_name::#type_name {
                    #columns_mod_name::#type_name
                }
            }
        })
        .collect();

    let all_column_names = columns.iter().map(|c| c.column_name.as_str());

    let primary_key = match columns.iter().find(|c| c.is_primary_key) {
        Some(pk) => {
            let name = &pk.column_name;
            quote! { Some(#name) }
        }
        None => quote! { None },
    };

    let expanded = quote! {
        /// Column types for `#struct_name` table.
        #[allow(non_snake_case)]
        pub mod #columns_mod_name {
            #(#column_structs)*
        }

        /// Table metadata for `#struct_name`.
        #[derive(Debug, Clone, Copy)]
        pub struct #table_struct_name;

        impl ::sqlgate_core::schema::Table for #table_struct_name {
            type Row = #struct_name;

            const NAME: &'static str = #table_name;
            const COLUMNS: &'static [&'static str] = &[#(#all_column_names),*];
            const PRIMARY_KEY: Option<&'static str> = #primary_key;
        }

        impl #table_struct_name {
            /// Returns the table name.
            #[inline]
            pub const fn table_name() -> &'static str {
                #table_name
            }

            #(#column_accessors)*
        }

        impl #struct_name {
            /// Returns the table metadata type.
            #[inline]
            pub const fn table() -> #table_struct_name {
                #table_struct_name
            }

            #(#column_accessors)*
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    type_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
    is_nullable: bool,
    is_aggregate: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    nullable: bool,
    aggregate: bool,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("table")) {
        let mut table_name = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                table_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported table attribute, expected `name`"))
            }
        })?;
        if let Some(name) = table_name {
            return Ok(name);
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("column")) {
        // Bare #[column]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                result.primary_key = true;
            } else if meta.path.is_ident("nullable") {
                result.nullable = true;
            } else if meta.path.is_ident("aggregate") {
                result.aggregate = true;
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.name = Some(value.value());
            } else {
                return Err(meta.error(
                    "unsupported column attribute, expected one of \
                     `primary_key`, `nullable`, `aggregate`, `name`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Returns true for `Option<T>` written with any path prefix.
fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| {
        segment.ident == "Option"
            && matches!(
                &segment.arguments,
                PathArguments::AngleBracketed(args)
                    if matches!(args.args.first(), Some(GenericArgument::Type(_)))
            )
    })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("TabBar"), "tab_bar");
        assert_eq!(to_snake_case("User"), "user");
        assert_eq!(to_pascal_case("created_at"), "CreatedAt");
        assert_eq!(to_pascal_case("id"), "Id");
    }

    #[test]
    fn test_is_option() {
        let ty: Type = syn::parse_quote!(Option<i64>);
        assert!(is_option(&ty));
        let ty: Type = syn::parse_quote!(std::option::Option<String>);
        assert!(is_option(&ty));
        let ty: Type = syn::parse_quote!(i64);
        assert!(!is_option(&ty));
    }

    #[test]
    fn test_derive_emits_value_type() {
        let input: DeriveInput = syn::parse_quote! {
            #[table(name = "tab_bar")]
            struct TabBar {
                #[column(primary_key)]
                alpha: i64,
                gamma: bool,
                #[column(aggregate)]
                total: i64,
            }
        };
        let tokens = derive_table_impl(&input).unwrap().to_string();
        assert!(tokens.contains("\"tab_bar\""));
        assert!(tokens.contains("VALUE_TYPE"));
        assert!(tokens.contains("const AGGREGATE : bool = true"));
    }

    #[test]
    fn test_derive_rejects_bad_input() {
        let tuple: DeriveInput = syn::parse_quote! { struct Pair(i64, i64); };
        assert!(derive_table_impl(&tuple).is_err());

        let unknown: DeriveInput = syn::parse_quote! {
            struct Row {
                #[column(unique)]
                id: i64,
            }
        };
        let err = derive_table_impl(&unknown).unwrap_err();
        assert!(err.to_string().contains("unsupported column attribute"));

        let two_keys: DeriveInput = syn::parse_quote! {
            struct Row {
                #[column(primary_key)]
                a: i64,
                #[column(primary_key)]
                b: i64,
            }
        };
        assert!(derive_table_impl(&two_keys).is_err());
    }
}
