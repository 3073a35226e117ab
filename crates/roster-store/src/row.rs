//! Result-row decoding
//!
//! The driver does not know the field-to-column mapping, so records decode
//! themselves column by column through [`get_column`], using the same
//! designations the fragment generator writes into projections.

use roster_errors::{mapping_error, store_error, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;

/// Decode one column from a result row by its column designation
///
/// A column missing from the row means the projection and the metadata
/// disagree - a mapping defect, not a storage failure.
pub fn get_column<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(|err| match err {
        sqlx::Error::ColumnNotFound(name) => mapping_error(format!("column {name}")),
        other => store_error("row_decode", other),
    })
}
