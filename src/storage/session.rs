//! Transactional sessions
//!
//! A session wraps one SQLite transaction. Work staged through it becomes
//! durable only on [`Session::commit`]; dropping the session rolls back.

use rusqlite::{params_from_iter, Connection, Transaction};

use super::query::{Changes, Select};
use crate::record::{quote_ident, Field, Record, TableSchema, ID_COLUMN};
use crate::value::Value;
use crate::{Error, Result};

/// One unit of work against the database
pub struct Session<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> Session<'conn> {
    /// Begin a transaction on `conn`
    ///
    /// Sessions do not nest; the store opens exactly one per operation.
    pub fn begin(conn: &'conn Connection) -> Result<Self> {
        Ok(Self {
            tx: conn.unchecked_transaction()?,
        })
    }

    /// Stage an insert, returning the identity of the new row
    ///
    /// A record that already carries an identity is inserted with it.
    pub fn add<R: Record>(&self, record: &R) -> Result<i64> {
        let schema = TableSchema::of::<R>();
        let mut columns: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
        let mut values = record.to_values();
        if values.len() != columns.len() {
            return Err(Error::Validation(format!(
                "{} declares {} columns but the record produced {} values",
                schema.name,
                columns.len(),
                values.len()
            )));
        }
        if let Some(id) = record.id() {
            columns.insert(0, ID_COLUMN);
            values.insert(0, Value::Integer(id));
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(schema.name))
        } else {
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(schema.name),
                columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "),
                placeholders
            )
        };

        self.tx.execute(&sql, params_from_iter(values.iter()))?;
        Ok(self.tx.last_insert_rowid())
    }

    /// Stage inserts for every record, in order
    pub fn add_all<R: Record>(&self, records: &[R]) -> Result<Vec<i64>> {
        records.iter().map(|r| self.add(r)).collect()
    }

    /// Run a selection, collecting every row
    pub fn exec<R: Record>(&self, select: &Select<R>) -> Result<Vec<R>> {
        let (sql, params) = select.to_sql()?;
        let mut stmt = self.tx.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<R>>>()?;
        Ok(rows)
    }

    /// Run a selection, returning only its first row if any
    pub fn exec_first<R: Record>(&self, select: Select<R>) -> Result<Option<R>> {
        let mut rows = self.exec(&select.limit(1))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Load the row with the given identity
    pub fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
        self.exec_first(Select::all().filter(&Field::id(), id))
    }

    /// Reload `record` from its row, picking up engine-side state
    pub fn refresh<R: Record>(&self, record: &mut R) -> Result<()> {
        let id = require_id(record)?;
        match self.get::<R>(id)? {
            Some(fresh) => {
                *record = fresh;
                Ok(())
            }
            None => Err(Error::NotFound {
                table: R::TABLE,
                predicate: format!("{} = {}", ID_COLUMN, id),
            }),
        }
    }

    /// Apply `changes` to the row with identity `id`
    pub fn apply<R: Record>(&self, id: i64, changes: &Changes) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let (sql, mut params) = changes.to_sql::<R>();
        params.push(Value::Integer(id));
        let updated = self.tx.execute(&sql, params_from_iter(params.iter()))?;
        if updated == 0 {
            return Err(Error::NotFound {
                table: R::TABLE,
                predicate: format!("{} = {}", ID_COLUMN, id),
            });
        }
        Ok(())
    }

    /// Stage removal of the record's row
    pub fn delete<R: Record>(&self, record: &R) -> Result<()> {
        let id = require_id(record)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote_ident(R::TABLE),
            quote_ident(ID_COLUMN)
        );
        let removed = self.tx.execute(&sql, [id])?;
        if removed == 0 {
            return Err(Error::NotFound {
                table: R::TABLE,
                predicate: format!("{} = {}", ID_COLUMN, id),
            });
        }
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn require_id<R: Record>(record: &R) -> Result<i64> {
    record.id().ok_or_else(|| {
        Error::Validation(format!(
            "{} record has no identity; it was never persisted",
            R::TABLE
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Person};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        fixtures::registry().create_all(&conn).unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM person", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_commit_persists() {
        let conn = setup();
        let session = Session::begin(&conn).unwrap();
        let id = session.add(&Person::new("a", "a@example.com")).unwrap();
        session.commit().unwrap();

        assert_eq!(id, 1);
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_drop_rolls_back() {
        let conn = setup();
        {
            let session = Session::begin(&conn).unwrap();
            session
                .add_all(&[Person::new("a", "a@example.com"), Person::new("b", "b@example.com")])
                .unwrap();
        }
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_refresh_reads_own_writes() {
        let conn = setup();
        let session = Session::begin(&conn).unwrap();
        let mut person = Person::new("a", "a@example.com");
        person.id = Some(session.add(&person).unwrap());
        session.apply::<Person>(person.id.unwrap(), &Changes::new().set("age", 40)).unwrap();
        session.refresh(&mut person).unwrap();
        assert_eq!(person.age, Some(40));
    }

    #[test]
    fn test_delete_requires_identity() {
        let conn = setup();
        let session = Session::begin(&conn).unwrap();
        let err = session.delete(&Person::new("a", "a@example.com")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_exec_first_on_empty_table() {
        let conn = setup();
        let session = Session::begin(&conn).unwrap();
        assert!(session.exec_first(Select::<Person>::all()).unwrap().is_none());
    }
}
