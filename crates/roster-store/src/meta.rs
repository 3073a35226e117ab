//! Declarative storage metadata
//!
//! Each record type carries a static table designation and an ordered
//! field-to-column mapping. The mapping is registered once per type in a
//! process-wide table keyed by type identity and is read-only thereafter;
//! queries against an unregistered type fail with a mapping error rather
//! than falling back to any runtime introspection.

use crate::query::SqlValue;
use once_cell::sync::Lazy;
use roster_errors::{mapping_error, Result};
use sqlx::postgres::PgRow;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

/// One field-to-column designation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// In-memory field name, used in exclusion sets and value lookups
    pub field: &'static str,
    /// Storage column name
    pub column: &'static str,
}

/// Static storage metadata for one record type
#[derive(Debug)]
pub struct TableMeta {
    pub table: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableMeta {
    /// Find the designation for a field name
    pub fn column_for(&self, field: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|def| def.field == field)
    }
}

/// A record type mapped onto a storage table
pub trait Record: Sized + Send + Sync {
    /// Declarative table/column metadata for this type
    fn meta() -> &'static TableMeta;

    /// Current value of a field, `None` when the field is absent
    fn value(&self, field: &str) -> Option<SqlValue>;

    /// Decode a result row using this type's column designations
    fn from_row(row: &PgRow) -> Result<Self>;
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, &'static TableMeta>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a record type's metadata. Idempotent.
pub fn register<R: Record + 'static>() {
    let mut table = REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    table.entry(TypeId::of::<R>()).or_insert_with(R::meta);
}

/// Resolved metadata for a registered record type
pub fn table_meta<R: Record + 'static>() -> Result<&'static TableMeta> {
    let table = REGISTRY
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    table.get(&TypeId::of::<R>()).copied().ok_or_else(|| {
        mapping_error(format!(
            "unregistered record type {}",
            std::any::type_name::<R>()
        ))
    })
}

/// Storage table name for a registered record type
pub fn table_name<R: Record + 'static>() -> Result<&'static str> {
    table_meta::<R>().map(|meta| meta.table)
}

/// Ordered field-to-column designations for a registered record type
pub fn column_map<R: Record + 'static>() -> Result<&'static [ColumnDef]> {
    table_meta::<R>().map(|meta| meta.columns)
}
