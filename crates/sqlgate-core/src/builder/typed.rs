//! Type-safe query builders using schema traits.
//!
//! Table names, column lists and column value types come from the `Table`
//! and `Column` traits, usually generated by `#[derive(Table)]`. Columns
//! referenced through [`typed_col`] carry their declared value type, which
//! is what lets the WHERE clause checker tell a boolean column from an
//! integer one.

use std::marker::PhantomData;

use crate::check::{DynamicCapability, Gated, RuleId};
use crate::exec::BuildSql;
use crate::schema::{self, Selectable, Table};

use super::expr::{Column, IntoExpr};
use super::value::SqlValue;
use super::where_clause::{build_dynamic_clause, build_static_clause, WhereClause, WhereTarget};

// Typestate markers

/// Marker: No WHERE clause attached yet.
pub struct NoWhere;
/// Marker: A checked WHERE clause is attached.
pub struct HasWhere;

/// Creates a column reference from schema metadata.
///
/// The reference carries the column's declared value type and aggregate
/// flag into the expression tree.
#[must_use]
pub fn typed_col<C: schema::Column>(_col: C) -> Column {
    let column = Column::typed(C::NAME, C::VALUE_TYPE);
    if C::AGGREGATE {
        column.aggregate()
    } else {
        column
    }
}

/// Starts a DELETE on table `T`.
#[must_use]
pub fn remove_from<T: Table>() -> TypedDelete<T, NoWhere> {
    TypedDelete::new(DynamicCapability::Unsupported)
}

/// Starts a DELETE on table `T` that accepts `dynamic_where()`.
#[must_use]
pub fn dynamic_remove_from<T: Table>() -> TypedDelete<T, NoWhere> {
    TypedDelete::new(DynamicCapability::Supported)
}

/// Starts a SELECT of all columns of table `T`.
#[must_use]
pub fn select_from<T: Table>() -> TypedSelect<T, NoWhere> {
    TypedSelect::new(DynamicCapability::Unsupported)
}

/// Starts a SELECT of all columns of table `T` that accepts
/// `dynamic_where()`.
#[must_use]
pub fn dynamic_select_from<T: Table>() -> TypedSelect<T, NoWhere> {
    TypedSelect::new(DynamicCapability::Supported)
}

// ============================================================================
// TypedDelete
// ============================================================================

/// A DELETE builder whose table name is derived from the type.
pub struct TypedDelete<T, State>
where
    T: Table,
{
    capability: DynamicCapability,
    where_clause: Option<WhereClause>,
    _table: PhantomData<(T, State)>,
}

impl<T: Table> TypedDelete<T, NoWhere> {
    const fn new(capability: DynamicCapability) -> Self {
        Self {
            capability,
            where_clause: None,
            _table: PhantomData,
        }
    }

    /// Adds a WHERE clause with a single condition.
    pub fn where_clause<E: IntoExpr>(self, expr: E) -> Gated<TypedDelete<T, HasWhere>> {
        build_static_clause(self, [expr])
    }

    /// Adds a WHERE clause with a fixed list of conditions, joined by AND.
    pub fn where_all<I>(self, exprs: I) -> Gated<TypedDelete<T, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_static_clause(self, exprs)
    }

    /// Adds a WHERE clause that can be extended later with `add_where()`.
    pub fn dynamic_where<I>(self, exprs: I) -> Gated<TypedDelete<T, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_dynamic_clause(self, exprs)
    }
}

impl<T: Table> WhereTarget for TypedDelete<T, NoWhere> {
    type Filtered = TypedDelete<T, HasWhere>;

    fn dynamic_capability(&self) -> DynamicCapability {
        self.capability
    }

    fn attach_where(self, clause: WhereClause) -> Self::Filtered {
        TypedDelete {
            capability: self.capability,
            where_clause: Some(clause),
            _table: PhantomData,
        }
    }
}

impl<T: Table> TypedDelete<T, HasWhere> {
    /// Adds a condition to a dynamic WHERE clause.
    pub fn add_where<E: IntoExpr>(&mut self, expr: E) -> Result<(), RuleId> {
        match self.where_clause.as_mut() {
            Some(clause) => clause.push(expr),
            None => Err(RuleId::DynamicNotSupported),
        }
    }
}

impl<T: Table, State> TypedDelete<T, State> {
    /// Builds the query and returns (SQL, parameters).
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }
}

impl<T: Table, State> BuildSql for TypedDelete<T, State> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::from("DELETE FROM ");
        let mut params = vec![];
        sql.push_str(T::NAME);
        if let Some(ref clause) = self.where_clause {
            clause.write_sql(&mut sql, &mut params);
        }
        (sql, params)
    }
}

// ============================================================================
// TypedSelect
// ============================================================================

/// A SELECT builder whose table and column names are derived from the type.
///
/// All columns of `T` are selected unless narrowed with `select()`.
pub struct TypedSelect<T, State>
where
    T: Table,
{
    capability: DynamicCapability,
    columns: &'static [&'static str],
    where_clause: Option<WhereClause>,
    order_by: Vec<(&'static str, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
    _table: PhantomData<(T, State)>,
}

impl<T: Table> TypedSelect<T, NoWhere> {
    const fn new(capability: DynamicCapability) -> Self {
        Self {
            capability,
            columns: T::COLUMNS,
            where_clause: None,
            order_by: vec![],
            limit: None,
            offset: None,
            _table: PhantomData,
        }
    }

    /// Narrows the selected columns.
    ///
    /// The columns must implement `Selectable<T>`, so columns of another
    /// table fail to compile.
    #[must_use]
    pub fn select<S: Selectable<T>>(mut self) -> Self {
        self.columns = S::column_names();
        self
    }

    /// Adds a WHERE clause with a single condition.
    pub fn where_clause<E: IntoExpr>(self, expr: E) -> Gated<TypedSelect<T, HasWhere>> {
        build_static_clause(self, [expr])
    }

    /// Adds a WHERE clause with a fixed list of conditions, joined by AND.
    pub fn where_all<I>(self, exprs: I) -> Gated<TypedSelect<T, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_static_clause(self, exprs)
    }

    /// Adds a WHERE clause that can be extended later with `add_where()`.
    pub fn dynamic_where<I>(self, exprs: I) -> Gated<TypedSelect<T, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_dynamic_clause(self, exprs)
    }
}

impl<T: Table> WhereTarget for TypedSelect<T, NoWhere> {
    type Filtered = TypedSelect<T, HasWhere>;

    fn dynamic_capability(&self) -> DynamicCapability {
        self.capability
    }

    fn attach_where(self, clause: WhereClause) -> Self::Filtered {
        TypedSelect {
            capability: self.capability,
            columns: self.columns,
            where_clause: Some(clause),
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            _table: PhantomData,
        }
    }
}

impl<T: Table> TypedSelect<T, HasWhere> {
    /// Adds a condition to a dynamic WHERE clause.
    pub fn add_where<E: IntoExpr>(&mut self, expr: E) -> Result<(), RuleId> {
        match self.where_clause.as_mut() {
            Some(clause) => clause.push(expr),
            None => Err(RuleId::DynamicNotSupported),
        }
    }
}

impl<T: Table, State> TypedSelect<T, State> {
    /// Adds an ORDER BY entry for a column of `T`.
    #[must_use]
    pub fn order_by<C: schema::Column<Table = T>>(mut self, _col: C, ascending: bool) -> Self {
        self.order_by.push((C::NAME, ascending));
        self
    }

    /// Sets the LIMIT clause.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the OFFSET clause.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds the query and returns (SQL, parameters).
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }

    /// Builds the query and returns only the SQL string.
    #[must_use]
    pub fn build_sql(self) -> String {
        self.to_sql().0
    }
}

impl<T: Table, State> BuildSql for TypedSelect<T, State> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::from("SELECT ");
        let mut params = vec![];

        sql.push_str(&self.columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(T::NAME);

        if let Some(ref clause) = self.where_clause {
            clause.write_sql(&mut sql, &mut params);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders: Vec<String> = self
                .order_by
                .iter()
                .map(|(col, asc)| {
                    if *asc {
                        (*col).to_string()
                    } else {
                        format!("{col} DESC")
                    }
                })
                .collect();
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    // The derive crate depends on this one, so the schema is written by hand
    // here. Integration tests cover the derived version.
    use super::*;
    use crate::builder::aggregate::count_all;
    use crate::schema::ValueType;

    struct Post;

    struct PostsTable;

    impl Table for PostsTable {
        type Row = Post;
        const NAME: &'static str = "posts";
        const COLUMNS: &'static [&'static str] = &["id", "published", "hits"];
        const PRIMARY_KEY: Option<&'static str> = Some("id");
    }

    macro_rules! column {
        ($ty:ident, $name:literal, $rust:ty, $aggregate:literal) => {
            #[derive(Clone, Copy)]
            struct $ty;

            impl schema::Column for $ty {
                type Table = PostsTable;
                type Type = $rust;
                const NAME: &'static str = $name;
                const NULLABLE: bool = false;
                const PRIMARY_KEY: bool = false;
                const VALUE_TYPE: ValueType = <$rust as schema::SqlType>::VALUE_TYPE;
                const AGGREGATE: bool = $aggregate;
            }
        };
    }

    column!(Id, "id", i64, false);
    column!(Published, "published", bool, false);
    column!(Hits, "hits", i64, true);

    #[test]
    fn test_typed_col_carries_metadata() {
        let published = typed_col(Published);
        assert_eq!(published.value_type, ValueType::Boolean);
        assert!(!published.aggregate);
        assert!(typed_col(Hits).aggregate);
    }

    #[test]
    fn test_typed_delete() {
        let (sql, params) = remove_from::<PostsTable>()
            .where_clause(typed_col(Id).eq(3))
            .unwrap_valid()
            .build();
        assert_eq!(sql, "DELETE FROM posts WHERE id = ?");
        assert_eq!(params, vec![SqlValue::Int(3)]);
    }

    #[test]
    fn test_typed_delete_boolean_column() {
        let (sql, _) = remove_from::<PostsTable>()
            .where_clause(typed_col(Published))
            .unwrap_valid()
            .build();
        assert_eq!(sql, "DELETE FROM posts WHERE published");
    }

    #[test]
    fn test_typed_delete_rejections() {
        assert_eq!(
            remove_from::<PostsTable>()
                .where_clause(typed_col(Id))
                .rule(),
            Some(RuleId::NonBooleanExpression)
        );
        assert_eq!(
            remove_from::<PostsTable>()
                .where_clause(typed_col(Hits).gt(10))
                .rule(),
            Some(RuleId::AggregateNotAllowed)
        );
        assert_eq!(
            remove_from::<PostsTable>()
                .dynamic_where([typed_col(Published)])
                .rule(),
            Some(RuleId::DynamicNotSupported)
        );
    }

    #[test]
    fn test_typed_dynamic_delete() {
        let mut delete = dynamic_remove_from::<PostsTable>()
            .dynamic_where([typed_col(Published)])
            .unwrap_valid();
        assert_eq!(
            delete.add_where(typed_col(Published).assign(true)),
            Err(RuleId::AssignmentNotAllowed)
        );
        delete.add_where(typed_col(Id).gt(5)).unwrap();
        assert_eq!(
            delete.build().0,
            "DELETE FROM posts WHERE (published) AND (id > ?)"
        );
    }

    #[test]
    fn test_typed_select_defaults_to_all_columns() {
        let sql = select_from::<PostsTable>().build_sql();
        assert_eq!(sql, "SELECT id, published, hits FROM posts");
    }

    #[test]
    fn test_typed_select_narrowed() {
        let sql = select_from::<PostsTable>()
            .select::<(Id, Published)>()
            .where_clause(typed_col(Published))
            .unwrap_valid()
            .order_by(Id, false)
            .limit(10)
            .offset(20)
            .build_sql();
        assert_eq!(
            sql,
            "SELECT id, published FROM posts WHERE published ORDER BY id DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_typed_select_rejects_aggregate_condition() {
        let gated = dynamic_select_from::<PostsTable>().where_clause(count_all().gt(1));
        assert_eq!(gated.rule(), Some(RuleId::AggregateNotAllowed));
    }
}
