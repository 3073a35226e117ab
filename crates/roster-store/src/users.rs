//! Per-entity record store for user rows
//!
//! Every mutating operation acquires one connection, opens one transaction
//! and commits before returning; a failed operation surfaces a store error
//! after the transaction rolls back (explicitly or on drop). No transaction
//! ever spans two operations. Reads re-query storage on every call; nothing
//! is cached in-process.
//!
//! The name upsert reads the current row and then writes in a second
//! transaction. The gap between the two is protected only by the version
//! guard: a concurrent writer that gets there first leaves the guarded
//! update matching zero rows, which this module reports as a conflict for
//! the caller to resolve by re-fetching.

use crate::meta::{self, ColumnDef, Record};
use crate::query::{self, SqlValue};
use crate::records::{Email, Item, ListEntry, Name};
use crate::row::get_column;
use async_trait::async_trait;
use roster_errors::{conflict_error, store_error, validation_error, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// SQLSTATE class for unique-constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Storage operations for user records and their child records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Allocate a new primary record, returning its public token
    async fn create(&self) -> Result<Uuid>;

    /// Fetch the primary record for a token; `None` when no row matches
    async fn fetch(&self, guid: Uuid) -> Result<Option<Item>>;

    /// Delete the primary record for a token, returning rows affected
    async fn delete(&self, guid: Uuid) -> Result<u64>;

    /// Fetch the name record owned by an internal key
    async fn fetch_name(&self, item_id: i64) -> Result<Option<Name>>;

    /// Insert the name record for `name.item_id`, or update it behind the
    /// version guard when one already exists
    async fn upsert_name(&self, name: Name) -> Result<()>;

    /// One page of the list projection
    ///
    /// The cursor is inclusive: the anchor row leads the page. A cursor
    /// that resolves to no row yields an empty page, not an error.
    async fn list(&self, after: Option<Uuid>, limit: i64) -> Result<Vec<ListEntry>>;

    /// Email records owned by an internal key, in key order
    async fn list_emails(&self, item_id: i64) -> Result<Vec<Email>>;

    /// Engine-reported estimate of the primary-record count
    ///
    /// May lag recent writes and deletes; 0 when no estimate is available.
    async fn approximate_count(&self) -> Result<i64>;
}

/// Postgres-backed [`UserStore`]
pub struct PgUserStore {
    pool: PgPool,
    schema: String,
}

impl PgUserStore {
    /// Create a store over an existing pool
    ///
    /// Registers the record metadata on first construction; repeated
    /// construction re-registers idempotently.
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        register_records();
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Insert a new name record; the version column is excluded from the
    /// column list so it takes its column default
    pub async fn insert_name(&self, name: &Name) -> Result<u64> {
        let (sql, values) = insert_name_parts(&self.schema, name)?;
        if values.is_empty() {
            return Err(validation_error("name", "no fields to insert"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| store_error("create_name", err))?;
        let mut insert = sqlx::query(&sql);
        for (_, value) in values {
            insert = query::bind_value(insert, value);
        }
        let result = insert.execute(&mut *tx).await.map_err(|err| {
            if is_unique_violation(&err) {
                conflict_error("name", "a name record already exists for this key")
            } else {
                store_error("create_name", err)
            }
        })?;
        tx.commit()
            .await
            .map_err(|err| store_error("create_name", err))?;
        Ok(result.rows_affected())
    }

    /// Version-guarded conditional update, incrementing the version by one
    ///
    /// Zero matched rows means another writer advanced the version between
    /// the caller's read and this write; that loss surfaces as a conflict.
    pub async fn update_name(&self, name: &Name) -> Result<u64> {
        let Some(item_id) = name.item_id else {
            return Err(validation_error("name", "missing owning key"));
        };
        let Some(version) = name.version else {
            return Err(validation_error("name", "missing version guard"));
        };
        let (sql, values) = update_name_parts(&self.schema, name)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| store_error("set_name", err))?;
        let mut update = sqlx::query(&sql);
        for (_, value) in values {
            update = query::bind_value(update, value);
        }
        let result = update
            .bind(item_id)
            .bind(version)
            .execute(&mut *tx)
            .await
            .map_err(|err| store_error("set_name", err))?;
        tx.commit()
            .await
            .map_err(|err| store_error("set_name", err))?;

        let rows = result.rows_affected();
        if rows < 1 {
            tracing::debug!(item_id, version, "guarded name update matched no rows");
            return Err(conflict_error("name", "version guard matched no rows"));
        }
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self) -> Result<Uuid> {
        let sql = create_sql(&self.schema)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| store_error("create", err))?;
        let row = sqlx::query(&sql)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| store_error("create", err))?;
        let guid = row
            .map(|row| get_column::<Option<Uuid>>(&row, "guid"))
            .transpose()?
            .flatten()
            .unwrap_or_else(Uuid::nil);
        tx.commit()
            .await
            .map_err(|err| store_error("create", err))?;

        if guid.is_nil() {
            return Err(conflict_error("item", "storage produced no public token"));
        }
        tracing::debug!(%guid, "created primary record");
        Ok(guid)
    }

    async fn fetch(&self, guid: Uuid) -> Result<Option<Item>> {
        let sql = fetch_sql(&self.schema)?;
        let row = sqlx::query(&sql)
            .bind(guid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| store_error("fetch", err))?;
        row.map(|row| Item::from_row(&row)).transpose()
    }

    async fn delete(&self, guid: Uuid) -> Result<u64> {
        let sql = delete_sql(&self.schema)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| store_error("delete", err))?;
        let result = sqlx::query(&sql)
            .bind(guid)
            .execute(&mut *tx)
            .await
            .map_err(|err| store_error("delete", err))?;
        tx.commit()
            .await
            .map_err(|err| store_error("delete", err))?;
        tracing::debug!(%guid, rows = result.rows_affected(), "deleted primary record");
        Ok(result.rows_affected())
    }

    async fn fetch_name(&self, item_id: i64) -> Result<Option<Name>> {
        if item_id < 1 {
            return Err(validation_error("item_id", "must be positive"));
        }
        let sql = fetch_name_sql(&self.schema)?;
        let row = sqlx::query(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| store_error("get_name", err))?;
        row.map(|row| Name::from_row(&row)).transpose()
    }

    async fn upsert_name(&self, name: Name) -> Result<()> {
        let Some(item_id) = name.item_id else {
            return Err(validation_error("name", "missing owning key"));
        };

        // Read and write run in separate transactions; the version guard
        // alone protects the gap between them.
        match self.fetch_name(item_id).await? {
            Some(existing) => {
                let guarded = Name {
                    version: existing.version,
                    ..name
                };
                self.update_name(&guarded).await?;
            }
            None => {
                self.insert_name(&name).await?;
            }
        }
        Ok(())
    }

    async fn list(&self, after: Option<Uuid>, limit: i64) -> Result<Vec<ListEntry>> {
        let limit = query::clamp_limit(limit);
        let sql = list_sql(&self.schema, after.is_some())?;
        let rows = sqlx::query(&sql)
            .bind(after.unwrap_or_else(Uuid::nil))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| store_error("list", err))?;
        rows.iter().map(ListEntry::from_row).collect()
    }

    async fn list_emails(&self, item_id: i64) -> Result<Vec<Email>> {
        if item_id < 1 {
            return Err(validation_error("item_id", "must be positive"));
        }
        let sql = list_emails_sql(&self.schema)?;
        let rows = sqlx::query(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| store_error("list_emails", err))?;
        rows.iter().map(Email::from_row).collect()
    }

    async fn approximate_count(&self) -> Result<i64> {
        let table = meta::table_name::<Item>()?;
        let row = sqlx::query(APPROXIMATE_COUNT_SQL)
            .bind(&self.schema)
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| store_error("total_count", err))?;
        match row {
            Some(row) => Ok(get_column::<Option<i64>>(&row, "n_live_tup")?.unwrap_or(0)),
            None => Ok(0),
        }
    }
}

/// Register every record type this store maps. Idempotent.
pub(crate) fn register_records() {
    meta::register::<Item>();
    meta::register::<Name>();
    meta::register::<ListEntry>();
    meta::register::<Email>();
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

/// Statistics-collector estimate, keyed by schema and table name
const APPROXIMATE_COUNT_SQL: &str = "SELECT \"n_live_tup\" \
     FROM \"pg_catalog\".\"pg_stat_user_tables\" \
     WHERE \"schemaname\" = $1 AND \"relname\" = $2";

fn create_sql(schema: &str) -> Result<String> {
    let table = query::qualified_table(schema, meta::table_meta::<Item>()?);
    Ok(format!(
        "INSERT INTO {table} DEFAULT VALUES RETURNING \"guid\""
    ))
}

fn fetch_sql(schema: &str) -> Result<String> {
    let meta = meta::table_meta::<Item>()?;
    let table = query::qualified_table(schema, meta);
    let columns = query::column_list(meta, &[]);
    Ok(format!(
        "SELECT {columns} FROM {table} WHERE \"guid\" = $1"
    ))
}

fn delete_sql(schema: &str) -> Result<String> {
    let table = query::qualified_table(schema, meta::table_meta::<Item>()?);
    Ok(format!("DELETE FROM {table} WHERE \"guid\" = $1"))
}

fn fetch_name_sql(schema: &str) -> Result<String> {
    let meta = meta::table_meta::<Name>()?;
    let table = query::qualified_table(schema, meta);
    let columns = query::column_list(meta, &[]);
    Ok(format!(
        "SELECT {columns} FROM {table} WHERE \"item_id\" = $1"
    ))
}

fn insert_name_parts(
    schema: &str,
    name: &Name,
) -> Result<(String, Vec<(&'static ColumnDef, SqlValue)>)> {
    let meta = meta::table_meta::<Name>()?;
    let table = query::qualified_table(schema, meta);
    let values = query::present_values(name, &["version"]);
    let columns = query::column_list_of(&values);
    let params = query::placeholders(1, values.len());
    let sql = format!("INSERT INTO {table} ({columns}) VALUES ({params})");
    Ok((sql, values))
}

fn update_name_parts(
    schema: &str,
    name: &Name,
) -> Result<(String, Vec<(&'static ColumnDef, SqlValue)>)> {
    let meta = meta::table_meta::<Name>()?;
    let table = query::qualified_table(schema, meta);
    let values = query::present_values(name, &["item_id", "version"]);
    let assignments = query::update_set_list(&values, 1);
    // With no present fields the update degrades to a pure version bump.
    let set_clause = if assignments.is_empty() {
        "\"version\" = \"version\" + 1".to_string()
    } else {
        format!("{assignments},\"version\" = \"version\" + 1")
    };
    let key_param = values.len() + 1;
    let guard_param = values.len() + 2;
    let sql = format!(
        "UPDATE {table} SET {set_clause} \
         WHERE \"item_id\" = ${key_param} AND \"version\" = ${guard_param}"
    );
    Ok((sql, values))
}

fn list_sql(schema: &str, cursored: bool) -> Result<String> {
    let anchor_table = query::qualified_table(schema, meta::table_meta::<Item>()?);
    let list_meta = meta::table_meta::<ListEntry>()?;
    let table = query::qualified_table(schema, list_meta);
    let columns = query::column_list(list_meta, &[]);
    // Inclusive cursor: the anchor row itself leads the page. An anchor
    // that matches no row makes the subquery empty and the page empty.
    let condition = if cursored {
        "\"id\" >= (SELECT \"id\" FROM \"id_cte\")"
    } else {
        "TRUE"
    };
    Ok(format!(
        "WITH \"id_cte\" AS (SELECT \"id\" FROM {anchor_table} WHERE \"guid\" = $1) \
         SELECT {columns} FROM {table} WHERE {condition} ORDER BY \"id\" LIMIT $2"
    ))
}

fn list_emails_sql(schema: &str) -> Result<String> {
    let meta = meta::table_meta::<Email>()?;
    let table = query::qualified_table(schema, meta);
    let columns = query::column_list(meta, &[]);
    Ok(format!(
        "SELECT {columns} FROM {table} WHERE \"item_id\" = $1 ORDER BY \"id\""
    ))
}
