use tracing::debug;

use crate::client::{MssqlClient, connect_mssql};
use crate::config::MssqlConfig;
use crate::error::EasyMssqlError;
use crate::params::Params;
use crate::request::{InvocationKind, run_request};
use crate::results::{QueryResult, Row};
use crate::statement::ensure_command;

/// The crate's entry point: holds connection settings and runs statements
/// and stored procedures, one fresh connection per call.
///
/// Calls issued concurrently each get an independent connection, so there is
/// no shared state to contend over; the tradeoff is a handshake per call.
///
/// ```rust,no_run
/// use easy_mssql::{MssqlConfig, Params, Sql};
///
/// # async fn demo() -> Result<(), easy_mssql::EasyMssqlError> {
/// let sql = Sql::new(MssqlConfig::new("localhost", "master", "sa", "pw"));
/// let rows = sql
///     .query_rows("select name from users where id = @id", &Params::new().with("id", 1_i64))
///     .await?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Sql {
    config: MssqlConfig,
}

impl Sql {
    /// Store the settings for later calls. Nothing is validated or opened
    /// here; the first connection happens on the first query.
    #[must_use]
    pub fn new(config: MssqlConfig) -> Self {
        debug!(server = %config.server, database = %config.database, "creating sql client");
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MssqlConfig {
        &self.config
    }

    /// Open a fresh connection with the stored settings.
    ///
    /// The query/execute methods call this themselves; it is public for
    /// callers who want a raw driver client.
    ///
    /// # Errors
    /// Returns `EasyMssqlError::ConnectionError` if the connection fails.
    pub async fn connect(&self) -> Result<MssqlClient, EasyMssqlError> {
        connect_mssql(&self.config).await
    }

    /// Run a SQL statement with named parameters and collect the full result.
    ///
    /// # Errors
    /// Returns an error if the statement is empty, the connection fails, or
    /// execution fails. Rows received before a failure are discarded.
    pub async fn query(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<QueryResult, EasyMssqlError> {
        self.run(statement, params, InvocationKind::Statement).await
    }

    /// [`Sql::query`], shaped to just the rows.
    ///
    /// # Errors
    /// Same conditions as [`Sql::query`].
    pub async fn query_rows(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<Vec<Row>, EasyMssqlError> {
        Ok(self.query(statement, params).await?.into_rows())
    }

    /// [`Sql::query`], shaped to the first row if any.
    ///
    /// # Errors
    /// Same conditions as [`Sql::query`].
    pub async fn query_single_row(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<Option<Row>, EasyMssqlError> {
        Ok(self.query(statement, params).await?.into_single_row())
    }

    /// Invoke a stored procedure by name with named parameters and collect
    /// the full result.
    ///
    /// # Errors
    /// Returns an error if the name is empty, the connection fails, or
    /// execution fails.
    pub async fn execute(
        &self,
        procedure: &str,
        params: &Params,
    ) -> Result<QueryResult, EasyMssqlError> {
        self.run(procedure, params, InvocationKind::Procedure).await
    }

    /// [`Sql::execute`], shaped to just the rows.
    ///
    /// # Errors
    /// Same conditions as [`Sql::execute`].
    pub async fn execute_rows(
        &self,
        procedure: &str,
        params: &Params,
    ) -> Result<Vec<Row>, EasyMssqlError> {
        Ok(self.execute(procedure, params).await?.into_rows())
    }

    /// [`Sql::execute`], shaped to the first row if any.
    ///
    /// # Errors
    /// Same conditions as [`Sql::execute`].
    pub async fn execute_single_row(
        &self,
        procedure: &str,
        params: &Params,
    ) -> Result<Option<Row>, EasyMssqlError> {
        Ok(self.execute(procedure, params).await?.into_single_row())
    }

    async fn run(
        &self,
        command: &str,
        params: &Params,
        kind: InvocationKind,
    ) -> Result<QueryResult, EasyMssqlError> {
        ensure_command(command)?;
        let client = self.connect().await?;
        run_request(client, command, params, kind).await
    }
}
