//! Lightweight async convenience wrapper for [tiberius].
//!
//! One fresh connection per request, named `@parameter` binding with type
//! inference for plain Rust values, and a single aggregate [`QueryResult`]
//! (rows, row count, duration) per call. Connection pooling, retries, and
//! transactions are deliberately out of scope; the driver owns the protocol.
//!
//! ```rust,no_run
//! use easy_mssql::{MssqlConfig, Params, Sql};
//!
//! # async fn demo() -> Result<(), easy_mssql::EasyMssqlError> {
//! let sql = Sql::new(
//!     MssqlConfig::builder("localhost", "master", "sa", "password")
//!         .trust_cert()
//!         .finish(),
//! );
//!
//! let result = sql
//!     .query(
//!         "select @a as a, @b as b",
//!         &Params::new().with("a", 1_i64).with("b", "hello"),
//!     )
//!     .await?;
//!
//! assert_eq!(result.row_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! [tiberius]: https://docs.rs/tiberius

mod client;
mod config;
mod convenience;
mod error;
mod params;
mod request;
mod results;
mod statement;
mod types;

pub mod prelude;

pub use client::{MssqlClient, connect_mssql};
pub use config::{MssqlConfig, MssqlConfigBuilder};
pub use convenience::Sql;
pub use error::EasyMssqlError;
pub use params::Params;
pub use results::{QueryResult, Row};
pub use statement::{positionalize, procedure_call};
pub use types::{SqlType, SqlValue, TypedValue};
