//! Selections and change sets
//!
//! Equality on a single field is the only predicate a selection supports.

use std::marker::PhantomData;

use crate::record::{quote_ident, Field, Record, TableSchema, ID_COLUMN};
use crate::value::Value;
use crate::{Error, Result};

/// A SELECT over the rows of record type `R`
pub struct Select<R> {
    filter: Option<(&'static str, Value)>,
    limit: Option<usize>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Select<R> {
    /// Every row of `R`
    pub fn all() -> Self {
        Self {
            filter: None,
            limit: None,
            _record: PhantomData,
        }
    }

    /// Rows where `field == value`
    pub fn filter(mut self, field: &Field<R>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.name(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Human-readable predicate, used in not-found errors
    pub fn predicate(&self) -> String {
        match &self.filter {
            Some((field, Value::Null)) => format!("{} IS NULL", field),
            Some((field, value)) => format!("{} = {}", field, value),
            None => "any row exists".to_string(),
        }
    }

    /// SQL text and bound parameters
    ///
    /// Rows come back in identity order, which is insertion order for
    /// engine-assigned identities.
    pub fn to_sql(&self) -> Result<(String, Vec<Value>)> {
        let schema = TableSchema::of::<R>();
        let mut sql = format!(
            "SELECT {} FROM {}",
            schema.select_list(),
            quote_ident(schema.name)
        );
        let mut params = Vec::new();

        match &self.filter {
            Some((field, Value::Null)) => {
                schema.check_field(field)?;
                sql.push_str(&format!(" WHERE {} IS NULL", quote_ident(field)));
            }
            Some((field, value)) => {
                schema.check_field(field)?;
                sql.push_str(&format!(" WHERE {} = ?1", quote_ident(field)));
                params.push(value.clone());
            }
            None => {}
        }

        sql.push_str(&format!(" ORDER BY {}", quote_ident(ID_COLUMN)));
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        Ok((sql, params))
    }
}

/// Named column assignments applied by an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    values: Vec<(String, Value)>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`; a later set of the same field wins
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field.to_string(), value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Check every key names a declared, writable column of `R`
    pub fn validate<R: Record>(&self) -> Result<()> {
        let schema = TableSchema::of::<R>();
        for (name, _) in &self.values {
            if name == ID_COLUMN {
                return Err(Error::Validation(format!(
                    "identity column of {} cannot be changed",
                    schema.name
                )));
            }
            schema.check_field(name)?;
        }
        Ok(())
    }

    /// UPDATE statement for the row with identity `?N`, where N follows the
    /// assigned values
    pub(crate) fn to_sql<R: Record>(&self) -> (String, Vec<Value>) {
        let assignments = self
            .values
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", quote_ident(name), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote_ident(R::TABLE),
            assignments,
            quote_ident(ID_COLUMN),
            self.values.len() + 1
        );
        let params = self.values.iter().map(|(_, v)| v.clone()).collect();
        (sql, params)
    }
}
