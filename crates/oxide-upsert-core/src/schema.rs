//! Entity schema descriptions.
//!
//! An [`EntitySchema`] maps the properties of a Rust type onto the columns
//! of a table. It is the only source of identifiers that end up in a
//! compiled statement, so it must be built from trusted metadata.
//!
//! ```rust
//! use oxide_upsert_core::schema::EntitySchema;
//! use oxide_upsert_core::value::ToSqlValue;
//!
//! struct Counter {
//!     id: i64,
//!     name: String,
//!     count: i64,
//! }
//!
//! let schema = EntitySchema::new("counters")
//!     .column("id", |c: &Counter| c.id.to_sql_value())
//!     .column_as("name", "display_name", |c: &Counter| c.name.clone().to_sql_value())
//!     .column("count", |c: &Counter| c.count.to_sql_value())
//!     .generated("updated_at");
//!
//! assert_eq!(schema.find_property("name").unwrap().column(), "display_name");
//! assert_eq!(schema.insert_columns().count(), 3);
//! ```

use std::fmt;

use crate::error::{Result, UpsertError};
use crate::value::SqlValue;

/// Reads the value of one property from an entity.
pub type Getter<E> = fn(&E) -> SqlValue;

/// A table name with an optional schema (namespace) qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    /// Schema qualifier, e.g. `public` or `dbo`.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A resolved column: the property it is read from and its storage name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    property: String,
    column: String,
    generated: bool,
}

impl ColumnRef {
    /// Property (member) name used by callers.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Column name in the database.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether the database generates this column's value.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }
}

enum ColumnSource<E> {
    Stored(Getter<E>),
    Generated,
}

struct ColumnDef<E> {
    meta: ColumnRef,
    source: ColumnSource<E>,
}

impl<E> Clone for ColumnDef<E> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            source: match self.source {
                ColumnSource::Stored(getter) => ColumnSource::Stored(getter),
                ColumnSource::Generated => ColumnSource::Generated,
            },
        }
    }
}

/// Describes how an entity type `E` is stored.
pub struct EntitySchema<E> {
    table: TableName,
    columns: Vec<ColumnDef<E>>,
}

impl<E> Clone for EntitySchema<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            columns: self.columns.clone(),
        }
    }
}

impl<E> fmt::Debug for EntitySchema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("table", &self.table)
            .field("columns", &self.columns.iter().map(|c| &c.meta).collect::<Vec<_>>())
            .finish()
    }
}

impl<E> EntitySchema<E> {
    /// Creates an empty schema for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: TableName::new(table),
            columns: Vec::new(),
        }
    }

    /// Qualifies the table with a database schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.table.schema = Some(schema.into());
        self
    }

    /// Adds a stored column whose name equals the property name.
    #[must_use]
    pub fn column(self, property: &str, getter: Getter<E>) -> Self {
        self.column_as(property, property, getter)
    }

    /// Adds a stored column with an explicit storage name.
    #[must_use]
    pub fn column_as(mut self, property: &str, column: &str, getter: Getter<E>) -> Self {
        self.push(property, column, ColumnSource::Stored(getter));
        self
    }

    /// Adds a database-generated column. It is never inserted or updated.
    #[must_use]
    pub fn generated(self, property: &str) -> Self {
        self.generated_as(property, property)
    }

    /// Adds a database-generated column with an explicit storage name.
    #[must_use]
    pub fn generated_as(mut self, property: &str, column: &str) -> Self {
        self.push(property, column, ColumnSource::Generated);
        self
    }

    fn push(&mut self, property: &str, column: &str, source: ColumnSource<E>) {
        let generated = matches!(source, ColumnSource::Generated);
        self.columns.push(ColumnDef {
            meta: ColumnRef {
                property: property.to_string(),
                column: column.to_string(),
                generated,
            },
            source,
        });
    }

    /// The table this entity is stored in.
    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    /// Name used for the entity in error messages.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.table.name
    }

    /// All columns, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.columns.iter().map(|c| &c.meta)
    }

    /// Columns written by an insert: every non-generated column, in order.
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.columns().filter(|c| !c.generated)
    }

    /// Getters for the insert columns, in the same order as [`Self::insert_columns`].
    pub(crate) fn getters(&self) -> impl Iterator<Item = Getter<E>> + '_ {
        self.columns.iter().filter_map(|c| match c.source {
            ColumnSource::Stored(getter) => Some(getter),
            ColumnSource::Generated => None,
        })
    }

    /// Looks up a column by property name.
    #[must_use]
    pub fn find_property(&self, property: &str) -> Option<&ColumnRef> {
        self.columns().find(|c| c.property == property)
    }

    /// Looks up a column by property name, failing with `UnknownColumn`.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::UnknownColumn`] when no column has that property name.
    pub fn resolve(&self, property: &str) -> Result<&ColumnRef> {
        self.find_property(property)
            .ok_or_else(|| UpsertError::unknown_column(self.entity_name(), property))
    }

    /// Resolves the match (conflict key) properties to columns.
    ///
    /// Repeated properties are kept once, at their first position. Match
    /// columns are compared against the inserted rows, so they must be
    /// stored columns; a schema without any stored column therefore has no
    /// valid match.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::InvalidMatchSpec`] for an empty list or a
    /// generated column, and [`UpsertError::UnknownColumn`] for a property
    /// that does not resolve.
    pub fn resolve_match(&self, properties: &[&str]) -> Result<Vec<ColumnRef>> {
        if properties.is_empty() {
            return Err(UpsertError::InvalidMatchSpec(format!(
                "no match columns given for `{}`",
                self.entity_name()
            )));
        }
        let mut resolved: Vec<ColumnRef> = Vec::with_capacity(properties.len());
        for property in properties {
            let column = self.resolve(property)?;
            if column.generated {
                return Err(UpsertError::InvalidMatchSpec(format!(
                    "column `{}` of `{}` is generated by the database and not part of the inserted rows",
                    column.column,
                    self.entity_name()
                )));
            }
            if !resolved.contains(column) {
                resolved.push(column.clone());
            }
        }
        Ok(resolved)
    }
}
