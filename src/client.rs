use std::net::ToSocketAddrs;

use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::config::MssqlConfig;
use crate::error::EasyMssqlError;

/// Type alias for a connected SQL Server client.
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Open a fresh SQL Server connection.
///
/// Every call builds a new connection; there is no pooling or reuse. A failed
/// handshake drops the half-open connection and surfaces the cause.
///
/// # Errors
/// Returns `EasyMssqlError::ConnectionError` if address resolution, the TCP
/// connect, or the TDS handshake fails.
pub async fn connect_mssql(config: &MssqlConfig) -> Result<MssqlClient, EasyMssqlError> {
    debug!(
        server = %config.server,
        database = %config.database,
        port = config.port(),
        instance = config.instance_name.as_deref().unwrap_or(""),
        "connecting to sql server"
    );

    let tiberius_config = config.to_tiberius();

    // Named instances resolve their port through the SQL Browser service;
    // everything else is a plain TCP connect to the configured port.
    let tcp = if config.instance_name.is_some() {
        TcpStream::connect_named(&tiberius_config).await.map_err(|e| {
            EasyMssqlError::ConnectionError(format!("SQL Browser connection error: {e}"))
        })?
    } else {
        let addr_iter = (config.server.as_str(), config.port())
            .to_socket_addrs()
            .map_err(|e| {
                EasyMssqlError::ConnectionError(format!("Failed to resolve server address: {e}"))
            })?;

        let server_addr = addr_iter.into_iter().next().ok_or_else(|| {
            EasyMssqlError::ConnectionError(format!(
                "No valid address found for {}",
                config.server
            ))
        })?;

        TcpStream::connect(server_addr).await.map_err(|e| {
            EasyMssqlError::ConnectionError(format!("TCP connection error: {e}"))
        })?
    };

    // Make compatible with Tiberius
    let tcp = tcp.compat_write();

    Client::connect(tiberius_config, tcp).await.map_err(|e| {
        EasyMssqlError::ConnectionError(format!("SQL Server connection error: {e}"))
    })
}
