//! Schema traits for type-safe table and column definitions.
//!
//! This module provides traits that are implemented by the `#[derive(Table)]`
//! macro. Besides naming tables and columns, they carry the metadata the WHERE
//! clause checker relies on: the declared value type of every column and
//! whether the column is backed by an aggregate computation.

use core::fmt;

/// The value category of a column or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean (`TRUE`/`FALSE`).
    Boolean,
    /// Any integer width.
    Integer,
    /// Floating point and decimal values.
    Float,
    /// Character data.
    Text,
    /// Binary data.
    Blob,
    /// The `NULL` literal.
    Null,
    /// Type could not be determined (raw SQL, untyped columns).
    Unknown,
}

impl ValueType {
    /// Returns true for [`ValueType::Boolean`].
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Returns true for integer and float values.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns the SQL type name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Null => "NULL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a Rust type to the SQL value category it is stored as.
///
/// The derive macro uses this to fill in [`Column::VALUE_TYPE`].
pub trait SqlType {
    /// The value category of this type.
    const VALUE_TYPE: ValueType;
}

macro_rules! impl_sql_type {
    ($value_type:ident: $($ty:ty),+) => {
        $(
            impl SqlType for $ty {
                const VALUE_TYPE: ValueType = ValueType::$value_type;
            }
        )+
    };
}

impl_sql_type!(Boolean: bool);
impl_sql_type!(Integer: i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
impl_sql_type!(Float: f32, f64);
impl_sql_type!(Text: String, &str, char);
impl_sql_type!(Blob: Vec<u8>, &[u8]);

impl<T: SqlType> SqlType for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
}

/// Trait for table metadata.
///
/// Implemented by types generated from `#[derive(Table)]` to provide
/// table-level information.
pub trait Table {
    /// The row type (the original struct).
    type Row;

    /// The SQL table name.
    const NAME: &'static str;

    /// List of all column names.
    const COLUMNS: &'static [&'static str];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;
}

/// Trait for column metadata.
///
/// Implemented by column types generated from `#[derive(Table)]` to provide
/// column-level information and enable type-safe queries.
pub trait Column {
    /// The table this column belongs to.
    type Table: Table;

    /// The Rust type of this column.
    type Type;

    /// The SQL column name.
    const NAME: &'static str;

    /// Whether this column is nullable.
    const NULLABLE: bool;

    /// Whether this column is the primary key.
    const PRIMARY_KEY: bool;

    /// The declared value category of this column.
    const VALUE_TYPE: ValueType;

    /// Whether the column holds the result of an aggregate computation
    /// (for example a view column defined as `COUNT(*)`).
    const AGGREGATE: bool;
}

/// Marker trait for columns with a specific Rust type.
///
/// Used for compile-time type checking of values in queries.
pub trait TypedColumn<T>: Column<Type = T> {}

/// Trait for selecting specific columns from a table.
///
/// Implemented for tuples of column types to enable type-safe SELECT queries.
pub trait Selectable<T: Table> {
    /// Returns the column names to select.
    fn column_names() -> &'static [&'static str];
}

impl<T: Table, C: Column<Table = T>> Selectable<T> for C {
    fn column_names() -> &'static [&'static str] {
        &[C::NAME]
    }
}

macro_rules! impl_selectable_tuple {
    ($($col:ident),+) => {
        impl<T: Table, $($col: Column<Table = T>),+> Selectable<T> for ($($col,)+) {
            fn column_names() -> &'static [&'static str] {
                &[$($col::NAME),+]
            }
        }
    };
}

impl_selectable_tuple!(C0, C1);
impl_selectable_tuple!(C0, C1, C2);
impl_selectable_tuple!(C0, C1, C2, C3);
impl_selectable_tuple!(C0, C1, C2, C3, C4);
impl_selectable_tuple!(C0, C1, C2, C3, C4, C5);
impl_selectable_tuple!(C0, C1, C2, C3, C4, C5, C6);
impl_selectable_tuple!(C0, C1, C2, C3, C4, C5, C6, C7);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_mapping() {
        assert_eq!(<bool as SqlType>::VALUE_TYPE, ValueType::Boolean);
        assert_eq!(<i64 as SqlType>::VALUE_TYPE, ValueType::Integer);
        assert_eq!(<f32 as SqlType>::VALUE_TYPE, ValueType::Float);
        assert_eq!(<String as SqlType>::VALUE_TYPE, ValueType::Text);
        assert_eq!(<Vec<u8> as SqlType>::VALUE_TYPE, ValueType::Blob);
    }

    #[test]
    fn test_option_keeps_inner_type() {
        assert_eq!(<Option<bool> as SqlType>::VALUE_TYPE, ValueType::Boolean);
        assert_eq!(<Option<String> as SqlType>::VALUE_TYPE, ValueType::Text);
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Boolean.to_string(), "BOOLEAN");
        assert_eq!(ValueType::Unknown.to_string(), "UNKNOWN");
        assert!(ValueType::Float.is_numeric());
        assert!(!ValueType::Text.is_boolean());
    }
}
