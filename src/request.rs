use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, QueryItem};
use tracing::{debug, warn};

use crate::client::MssqlClient;
use crate::error::EasyMssqlError;
use crate::params::Params;
use crate::results::{Columns, QueryResult, Row};
use crate::statement::{positionalize, procedure_call};
use crate::types::SqlValue;

/// How the command text is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InvocationKind {
    /// Direct SQL text.
    Statement,
    /// Stored procedure invoked by name.
    Procedure,
}

/// Run one request over a connection the caller just opened, and close that
/// connection unconditionally once the request completes. One request per
/// connection; the duration window starts here, not at connection open.
pub(crate) async fn run_request(
    mut client: MssqlClient,
    command: &str,
    params: &Params,
    kind: InvocationKind,
) -> Result<QueryResult, EasyMssqlError> {
    let started = Instant::now();

    let sql: Cow<'_, str> = match kind {
        InvocationKind::Statement => positionalize(command, params),
        InvocationKind::Procedure => Cow::Owned(procedure_call(command, params)),
    };

    debug!(command = %command, kind = ?kind, "dispatching request");
    for (name, value) in params.iter() {
        debug!(parameter = %name, wire_type = ?value.wire_type(), "binding parameter");
    }

    let outcome = collect_result(&mut client, sql.as_ref(), params, started).await;

    // One request per connection: close regardless of outcome. A close
    // failure after a completed request is logged, not returned.
    match outcome {
        Ok(result) => {
            if let Err(e) = client.close().await {
                warn!(error = %e, "connection close failed after completed request");
            }
            Ok(result)
        }
        Err(e) => {
            debug!(command = %command, error = %e, "request failed");
            let _ = client.close().await;
            Err(e)
        }
    }
}

// Fold the driver's item stream into the accumulating result: metadata items
// re-key subsequent rows, row items append. Finalized exactly once.
async fn collect_result(
    client: &mut MssqlClient,
    sql: &str,
    params: &Params,
    started: Instant,
) -> Result<QueryResult, EasyMssqlError> {
    let refs = params.as_refs();

    let mut stream = client
        .query(sql, &refs)
        .await
        .map_err(|e| EasyMssqlError::ExecutionError(format!("SQL Server query error: {e}")))?;

    let mut result = QueryResult::new();
    let mut columns = Arc::new(Columns::default());

    while let Some(item) = stream
        .try_next()
        .await
        .map_err(|e| EasyMssqlError::ExecutionError(format!("SQL Server row fetch error: {e}")))?
    {
        match item {
            QueryItem::Metadata(meta) => {
                columns = Arc::new(Columns::new(
                    meta.columns()
                        .iter()
                        .map(|col| col.name().to_string())
                        .collect(),
                ));
            }
            QueryItem::Row(row) => {
                let values = extract_values(&row);
                result.push_row(Row::new(columns.clone(), values));
            }
        }
    }

    result.finish(started.elapsed());
    Ok(result)
}

// Convert one driver row into our values. Date/time columns go through the
// chrono getters since their raw representations are driver-internal.
fn extract_values(row: &tiberius::Row) -> Vec<SqlValue> {
    row.cells()
        .enumerate()
        .map(|(idx, (_col, data))| match data {
            ColumnData::DateTime(Some(_))
            | ColumnData::SmallDateTime(Some(_))
            | ColumnData::DateTime2(Some(_)) => row
                .try_get::<NaiveDateTime, _>(idx)
                .ok()
                .flatten()
                .map_or(SqlValue::Null, SqlValue::Timestamp),
            ColumnData::DateTimeOffset(Some(_)) => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
                .ok()
                .flatten()
                .map_or(SqlValue::Null, |dt| SqlValue::Timestamp(dt.naive_utc())),
            ColumnData::Date(Some(_)) => row
                .try_get::<chrono::NaiveDate, _>(idx)
                .ok()
                .flatten()
                .map_or(SqlValue::Null, |d| {
                    SqlValue::Timestamp(d.and_time(NaiveTime::MIN))
                }),
            ColumnData::Time(Some(_)) => row
                .try_get::<NaiveTime, _>(idx)
                .ok()
                .flatten()
                .map_or(SqlValue::Null, |t| {
                    SqlValue::Text(t.format("%H:%M:%S%.f").to_string())
                }),
            other => from_column_data(other),
        })
        .collect()
}

fn from_column_data(data: &ColumnData<'_>) -> SqlValue {
    match data {
        ColumnData::Bit(Some(b)) => SqlValue::Bool(*b),
        ColumnData::U8(Some(v)) => SqlValue::Int(i64::from(*v)),
        ColumnData::I16(Some(v)) => SqlValue::Int(i64::from(*v)),
        ColumnData::I32(Some(v)) => SqlValue::Int(i64::from(*v)),
        ColumnData::I64(Some(v)) => SqlValue::Int(*v),
        ColumnData::F32(Some(v)) => SqlValue::Float(f64::from(*v)),
        ColumnData::F64(Some(v)) => SqlValue::Float(*v),
        ColumnData::Numeric(Some(n)) => {
            SqlValue::Float(n.value() as f64 / 10f64.powi(i32::from(n.scale())))
        }
        ColumnData::String(Some(s)) => SqlValue::Text(s.to_string()),
        ColumnData::Guid(Some(g)) => SqlValue::Text(g.to_string()),
        ColumnData::Binary(Some(b)) => SqlValue::Blob(b.to_vec()),
        ColumnData::Xml(Some(xml)) => SqlValue::Text(xml.to_string()),
        // All None variants, and date/time handled by the caller
        _ => SqlValue::Null,
    }
}
