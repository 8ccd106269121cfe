//! The record store
//!
//! A [`RecordStore`] owns the connection to one database file under a
//! per-application directory. Every public operation runs in its own
//! [`Session`]: it commits once on success and rolls back on any error.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::paths;
use crate::record::{quote_ident, Field, Record};
use crate::storage::{Changes, Registry, Select, Session};
use crate::value::Value;
use crate::{Error, Result};

/// Typed create/read/update/delete over one SQLite database file
pub struct RecordStore {
    conn: Connection,
    base_path: PathBuf,
    db_path: PathBuf,
    registry: Registry,
}

/// Row count of one table, as reported by [`RecordStore::table_stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStat {
    pub name: String,
    pub rows: u64,
}

impl RecordStore {
    /// Open (creating if needed) `<config dir>/<app>/<db_name>.db` and
    /// create the tables of every registered record type
    pub fn open(app_name: &str, db_name: &str, registry: &Registry) -> Result<Self> {
        Self::open_with(app_name, db_name, registry, &StoreConfig::default())
    }

    /// Like [`RecordStore::open`], with explicit configuration
    pub fn open_with(
        app_name: &str,
        db_name: &str,
        registry: &Registry,
        config: &StoreConfig,
    ) -> Result<Self> {
        let app_dir = paths::app_dir(app_name, config.base_dir.as_deref())?;
        paths::validate_db_name(db_name)?;
        let base_path = paths::ensure_dir(&app_dir)?;
        let db_path = paths::database_file(&base_path, db_name)?;

        let conn = Connection::open(&db_path)?;
        if let Some(timeout) = config.busy_timeout() {
            conn.busy_timeout(timeout)?;
        }
        registry.create_all(&conn)?;

        info!(
            "Opened database {} ({} record types)",
            db_path.display(),
            registry.tables().len()
        );
        Ok(Self {
            conn,
            base_path,
            db_path,
            registry: registry.clone(),
        })
    }

    /// Where `open_with` would place the database, without touching the disk
    pub fn locate(app_name: &str, db_name: &str, config: &StoreConfig) -> Result<PathBuf> {
        let app_dir = paths::app_dir(app_name, config.base_dir.as_deref())?;
        paths::database_file(&app_dir, db_name)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run `work` in a fresh session, committing only if it succeeds
    fn with_session<T>(&self, work: impl FnOnce(&Session<'_>) -> Result<T>) -> Result<T> {
        let session = Session::begin(&self.conn)?;
        let out = work(&session)?;
        session.commit()?;
        Ok(out)
    }

    // ========== Create ==========

    /// Insert one record, returning it with its assigned identity
    pub fn create_one<R: Record>(&self, record: R) -> Result<R> {
        let mut created = self.create_many(vec![record])?;
        created.pop().ok_or_else(|| {
            Error::Validation(format!("insert into {} returned no record", R::TABLE))
        })
    }

    /// Insert all records in one transaction; either every record is
    /// persisted or none is
    pub fn create_many<R: Record>(&self, mut records: Vec<R>) -> Result<Vec<R>> {
        self.registry.require::<R>()?;
        self.with_session(|session| {
            let ids = session.add_all(&records)?;
            for (record, id) in records.iter_mut().zip(ids) {
                record.set_id(id);
                session.refresh(record)?;
            }
            Ok(())
        })?;
        debug!(table = R::TABLE, count = records.len(), "created records");
        Ok(records)
    }

    // ========== Read ==========

    /// Every record of type `R`, in identity order
    pub fn read_all<R: Record>(&self) -> Result<Vec<R>> {
        self.select_all(Select::all())
    }

    /// The first record of type `R`; `NotFound` when the table is empty
    pub fn read_first<R: Record>(&self) -> Result<R> {
        self.select_first(Select::all())
    }

    /// Every record where `field == value`; a null value selects rows whose
    /// column is NULL
    pub fn read_all_by<R: Record>(&self, field: &Field<R>, value: impl Into<Value>) -> Result<Vec<R>> {
        self.select_all(Select::all().filter(field, value))
    }

    /// The first record where `field == value`; `NotFound` when none matches
    pub fn read_first_by<R: Record>(&self, field: &Field<R>, value: impl Into<Value>) -> Result<R> {
        self.select_first(Select::all().filter(field, value))
    }

    /// The first record where `field == value`, or `None`
    pub fn find_first_by<R: Record>(
        &self,
        field: &Field<R>,
        value: impl Into<Value>,
    ) -> Result<Option<R>> {
        self.registry.require::<R>()?;
        self.with_session(|session| session.exec_first(Select::all().filter(field, value)))
    }

    /// Number of rows of type `R`
    pub fn count<R: Record>(&self) -> Result<usize> {
        self.registry.require::<R>()?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(R::TABLE)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn select_all<R: Record>(&self, select: Select<R>) -> Result<Vec<R>> {
        self.registry.require::<R>()?;
        let rows = self.with_session(|session| session.exec(&select))?;
        debug!(table = R::TABLE, rows = rows.len(), "read records");
        Ok(rows)
    }

    fn select_first<R: Record>(&self, select: Select<R>) -> Result<R> {
        self.registry.require::<R>()?;
        let predicate = select.predicate();
        self.with_session(|session| session.exec_first(select))?
            .ok_or(Error::NotFound {
                table: R::TABLE,
                predicate,
            })
    }

    // ========== Update ==========

    /// Apply `changes` to the first record (lowest identity) where
    /// `field == value` and return it as persisted
    ///
    /// Change keys are checked before any row is touched. No match is a
    /// `NotFound` error and leaves every row unchanged.
    pub fn update<R: Record>(
        &self,
        field: &Field<R>,
        value: impl Into<Value>,
        changes: &Changes,
    ) -> Result<R> {
        self.registry.require::<R>()?;
        changes.validate::<R>()?;

        let select = Select::all().filter(field, value);
        let predicate = select.predicate();
        let record = self.with_session(|session| {
            let mut record = session.exec_first(select)?.ok_or_else(|| Error::NotFound {
                table: R::TABLE,
                predicate: predicate.clone(),
            })?;
            let id = record.id().ok_or_else(|| {
                Error::Validation(format!("{} row was loaded without an identity", R::TABLE))
            })?;
            session.apply::<R>(id, changes)?;
            session.refresh(&mut record)?;
            Ok(record)
        })?;

        debug!(
            table = R::TABLE,
            id = record.id(),
            fields = changes.len(),
            "updated record where {}",
            predicate
        );
        Ok(record)
    }

    // ========== Delete ==========

    /// Remove one record's row; the record is consumed
    pub fn delete_one<R: Record>(&self, record: R) -> Result<()> {
        self.delete_many(std::iter::once(record))
    }

    /// Remove every record's row in one transaction
    ///
    /// A record without identity, or whose row is already gone, fails the
    /// whole batch.
    pub fn delete_many<R: Record>(&self, records: impl IntoIterator<Item = R>) -> Result<()> {
        self.registry.require::<R>()?;
        let removed = self.with_session(|session| {
            let mut removed = 0usize;
            for record in records {
                session.delete(&record)?;
                removed += 1;
            }
            Ok(removed)
        })?;
        debug!(table = R::TABLE, count = removed, "deleted records");
        Ok(())
    }

    // ========== Inspection ==========

    /// User tables in the file (including ones no registered type maps to)
    /// with their row counts
    pub fn table_stats(&self) -> Result<Vec<TableStat>> {
        let names: Vec<String> = {
            let mut stmt = self.conn.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?
        };

        names
            .into_iter()
            .map(|name| {
                let rows: i64 = self.conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
                    [],
                    |row| row.get(0),
                )?;
                Ok(TableStat {
                    name,
                    rows: rows as u64,
                })
            })
            .collect()
    }

    // ========== Teardown ==========

    /// Close the connection and delete this database's file
    ///
    /// The application directory is shared by every database of the same
    /// application, so it is removed only when nothing else is left in it.
    /// Otherwise the file is still deleted and
    /// [`Error::DirectoryNotEmpty`] is returned.
    ///
    /// SQLite holds file locks only while a transaction is open, so another
    /// idle connection to the same file does not block the erase. That
    /// connection is left pointing at a deleted file and its next write fails
    /// with a read-only or can't-open error.
    pub fn erase_database(self) -> Result<()> {
        let RecordStore {
            conn,
            base_path,
            db_path,
            ..
        } = self;

        conn.close().map_err(|(_, err)| Error::Storage(err))?;
        std::fs::remove_file(&db_path)?;
        for sidecar in paths::sidecar_files(&db_path) {
            if sidecar.exists() {
                std::fs::remove_file(&sidecar)?;
            }
        }
        info!("Erased database {}", db_path.display());

        if std::fs::read_dir(&base_path)?.next().is_some() {
            warn!(
                "Keeping {}: other files remain in the application directory",
                base_path.display()
            );
            return Err(Error::DirectoryNotEmpty(base_path));
        }
        std::fs::remove_dir(&base_path)?;
        debug!("Removed directory {}", base_path.display());
        Ok(())
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("db_path", &self.db_path)
            .field("tables", &self.registry.tables().len())
            .finish()
    }
}
