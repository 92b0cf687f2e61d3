/// Connection Management Module
///
/// This module provides the `DatabaseHandler`, which owns the full lifecycle
/// from configuration resolution to query execution, and the `Session` guard
/// it hands out. No session or connection handle leaks on either success or
/// failure paths: a session commits when its scope completes, rolls back when
/// its scope fails or when the guard is dropped, and a handler releases its
/// connection handle on `rollback_and_close`.
use crate::config::{self, DbConfig, DEFAULT_CONFIG_FILE, DEFAULT_SECTION};
use crate::core::db::query::{self, QueryResult};
use crate::core::{DbvizError, Result};
use postgres::types::ToSql;
use postgres::{Client, NoTls, Transaction};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Database handler owning one connection handle and the configuration it
/// was resolved from.
///
/// Configuration loading and connection establishment are lazy: both happen
/// on first use and are cached for the lifetime of the handler. One handler
/// supports at most one live session at a time; the session mutably borrows
/// the handler, so releasing the handle while a session is open does not
/// compile.
///
/// # Examples
///
/// ```no_run
/// use dbviz::DatabaseHandler;
///
/// let mut handler = DatabaseHandler::default();
/// let result = handler.execute_query("SELECT 1", &[])?;
/// assert_eq!(result.rows[0][0], "1");
/// handler.rollback_and_close()?;
/// # Ok::<(), dbviz::DbvizError>(())
/// ```
pub struct DatabaseHandler {
    config_file: PathBuf,
    section: String,
    config: Option<DbConfig>,
    client: Option<Client>,
}

impl DatabaseHandler {
    /// Creates a handler for the given configuration file and section.
    ///
    /// Nothing is read or connected until the handler is first used.
    pub fn new(config_file: impl Into<PathBuf>, section: impl Into<String>) -> Self {
        DatabaseHandler {
            config_file: config_file.into(),
            section: section.into(),
            config: None,
            client: None,
        }
    }

    /// The section this handler resolves its parameters from.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Whether a connection handle is currently live.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Resolves and caches the connection parameters for this handler's
    /// section.
    ///
    /// # Errors
    ///
    /// `ConfigFileMissing` when the file cannot be located,
    /// `ConfigSectionMissing` when the section is absent, and
    /// `ConfigKeyMissing`/`Config` for incomplete or invalid sections.
    pub fn load_config(&mut self) -> Result<&DbConfig> {
        let config = match self.config.take() {
            Some(config) => config,
            None => {
                let path = config::find_config_file(&self.config_file)?;
                debug!(path = %path.display(), section = %self.section, "loading configuration");
                config::load_config(&path, &self.section)?
            }
        };
        Ok(self.config.insert(config))
    }

    /// Establishes the connection handle if not already connected.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`load_config`](Self::load_config), or
    /// `Connection` when the handshake with the engine fails. There is no
    /// automatic retry.
    pub fn connect(&mut self) -> Result<()> {
        self.connected_client().map(|_| ())
    }

    fn connected_client(&mut self) -> Result<&mut Client> {
        let client = match self.client.take() {
            Some(client) => client,
            None => {
                let config = self.load_config()?;
                debug!(
                    host = %config.host,
                    port = config.port,
                    database = %config.database,
                    "connecting to database"
                );
                config
                    .client_config()
                    .connect(NoTls)
                    .map_err(DbvizError::Connection)?
            }
        };
        Ok(self.client.insert(client))
    }

    /// Opens a session bound to this handler's connection handle, connecting
    /// first if necessary.
    ///
    /// This is the manual-mode acquisition form: the caller resolves the
    /// session by calling [`Session::commit`] or [`Session::rollback`], and
    /// a session dropped unresolved rolls back. Prefer
    /// [`with_session`](Self::with_session), which cannot be misused.
    pub fn create_session(&mut self) -> Result<Session<'_>> {
        let client = self.connected_client()?;
        let tx = client.transaction().map_err(DbvizError::Connection)?;
        debug!("session opened");
        Ok(Session { tx: Some(tx) })
    }

    /// Runs `f` inside a scoped session.
    ///
    /// On normal completion the session commits; when `f` fails the session
    /// rolls back and the original error propagates. Cleanup executes
    /// exactly once on every exit path.
    pub fn with_session<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut session = self.create_session()?;
        match f(&mut session) {
            Ok(value) => {
                session.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback() {
                    warn!(error = %rollback_err, "rollback after failed session also failed");
                }
                Err(err)
            }
        }
    }

    /// Executes a parameterized statement inside a scoped session and
    /// returns the materialized result set.
    ///
    /// Parameters are bound, never string-interpolated. A failed statement
    /// leaves nothing committed: the session rolls back before the `Query`
    /// error reaches the caller.
    pub fn execute_query(
        &mut self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<QueryResult> {
        self.with_session(|session| session.query(sql, params))
    }

    /// Releases the connection handle.
    ///
    /// Any pending transaction was already rolled back when its `Session`
    /// guard dropped; a live session borrows the handler and keeps this
    /// method uncallable. Safe to call on an unconnected handler.
    pub fn rollback_and_close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().map_err(DbvizError::Connection)?;
            debug!("database connection closed");
        }
        Ok(())
    }
}

impl Default for DatabaseHandler {
    fn default() -> Self {
        DatabaseHandler::new(DEFAULT_CONFIG_FILE, DEFAULT_SECTION)
    }
}

/// A unit of work bound to one connection handle.
///
/// Wraps one database transaction. `commit` and `rollback` consume the
/// session; dropping an unresolved session rolls its transaction back.
pub struct Session<'a> {
    tx: Option<Transaction<'a>>,
}

impl<'a> Session<'a> {
    fn tx(&mut self) -> &mut Transaction<'a> {
        self.tx.as_mut().expect("session transaction still open")
    }

    /// Executes a parameterized statement and materializes its rows.
    pub fn query(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<QueryResult> {
        let tx = self.tx();
        let stmt = tx.prepare(sql).map_err(DbvizError::Query)?;
        let columns = stmt
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();
        let rows = tx.query(&stmt, params).map_err(DbvizError::Query)?;
        Ok(query::materialize(columns, &rows))
    }

    /// Executes a statement that returns no rows; yields the affected count.
    pub fn execute(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        self.tx().execute(sql, params).map_err(DbvizError::Query)
    }

    /// Commits the unit of work.
    pub fn commit(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().map_err(DbvizError::Query)?;
            debug!("session committed");
        }
        Ok(())
    }

    /// Rolls the unit of work back.
    pub fn rollback(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().map_err(DbvizError::Query)?;
            debug!("session rolled back");
        }
        Ok(())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        // Dropping the inner transaction issues the rollback.
        if self.tx.take().is_some() {
            debug!("session dropped unresolved; transaction rolled back");
        }
    }
}
