//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::client::{MssqlClient, connect_mssql};
pub use crate::config::{MssqlConfig, MssqlConfigBuilder};
pub use crate::convenience::Sql;
pub use crate::error::EasyMssqlError;
pub use crate::params::Params;
pub use crate::results::{QueryResult, Row};
pub use crate::types::{SqlType, SqlValue, TypedValue};
