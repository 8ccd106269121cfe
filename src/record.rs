//! Record declarations - the mapping between Rust types and tables
//!
//! A record type names its table, declares its columns in order and knows how
//! to turn itself into column values and back. Every table also carries an
//! engine-assigned `id` column that is not part of the declared columns.

use std::fmt;
use std::marker::PhantomData;

use rusqlite::Row;

use crate::value::Value;
use crate::{Error, Result};

/// Name of the identity column every record table carries
pub const ID_COLUMN: &str = "id";

/// Storage class of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

/// A declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn blob(name: &'static str) -> Self {
        Self::new(name, ColumnType::Blob)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    /// Allow NULL in this column
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Add a UNIQUE constraint to this column
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Column definition as it appears inside CREATE TABLE
    pub fn definition(&self) -> String {
        let mut def = format!("{} {}", quote_ident(self.name), self.kind.as_sql());
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        def
    }
}

/// Table name plus declared columns of one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn of<R: Record>() -> Self {
        Self {
            name: R::TABLE,
            columns: R::COLUMNS,
        }
    }

    /// Whether `name` is a declared column or the identity column
    pub fn has_field(&self, name: &str) -> bool {
        name == ID_COLUMN || self.columns.iter().any(|c| c.name == name)
    }

    /// Check a field name, reporting undeclared ones as [`Error::UnknownField`]
    pub fn check_field(&self, name: &str) -> Result<()> {
        if self.has_field(name) {
            Ok(())
        } else {
            Err(Error::UnknownField {
                table: self.name,
                field: name.to_string(),
            })
        }
    }

    /// Quoted column list for SELECT, identity first
    pub fn select_list(&self) -> String {
        std::iter::once(ID_COLUMN)
            .chain(self.columns.iter().map(|c| c.name))
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_table_sql(&self) -> String {
        let mut defs = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quote_ident(ID_COLUMN))];
        defs.extend(self.columns.iter().map(Column::definition));
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.name),
            defs.join(", ")
        )
    }
}

/// A type persisted as rows of one table
///
/// `from_row` receives rows whose column 0 is the identity and whose
/// following columns are `COLUMNS` in declaration order. `to_values` returns
/// one value per declared column, in the same order.
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];

    /// Engine-assigned identity, `None` until first persisted
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Reference to one field of record type `R`, used for equality filters
pub struct Field<R> {
    name: &'static str,
    _record: PhantomData<fn() -> R>,
}

impl<R> Field<R> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _record: PhantomData,
        }
    }

    /// The identity column
    pub const fn id() -> Self {
        Self::new(ID_COLUMN)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Field<R> {}

impl<R: Record> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", R::TABLE, self.name)
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
