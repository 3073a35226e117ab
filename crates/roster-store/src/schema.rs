//! Embedded schema definition
//!
//! Idempotent DDL for the service's tables and the read-optimized list
//! projection. Used for provisioning and by the live integration tests.
//! Version columns take their initial value from the column default.

use roster_errors::{store_error, Result};
use sqlx::PgPool;

/// Apply the schema, creating anything that does not yet exist
pub async fn apply_schema(pool: &PgPool, schema: &str) -> Result<()> {
    for statement in statements(schema) {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(|err| store_error("apply_schema", err))?;
    }
    Ok(())
}

fn statements(schema: &str) -> Vec<String> {
    vec![
        format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}"."item" (
                "id" BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
                "guid" UUID NOT NULL UNIQUE DEFAULT gen_random_uuid()
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}"."name" (
                "item_id" BIGINT PRIMARY KEY
                    REFERENCES "{schema}"."item" ("id") ON DELETE CASCADE,
                "version" INTEGER NOT NULL DEFAULT 1,
                "first" TEXT,
                "middle" TEXT,
                "last" TEXT,
                "display" TEXT
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}"."email" (
                "id" BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
                "version" INTEGER NOT NULL DEFAULT 1,
                "item_id" BIGINT NOT NULL
                    REFERENCES "{schema}"."item" ("id") ON DELETE CASCADE,
                "address" TEXT NOT NULL,
                "description" TEXT,
                "verified" BOOLEAN
            )"#
        ),
        format!(
            r#"CREATE OR REPLACE VIEW "{schema}"."list" AS
                SELECT "i"."id", "i"."guid", "n"."display"
                FROM "{schema}"."item" "i"
                LEFT JOIN "{schema}"."name" "n" ON "n"."item_id" = "i"."id""#
        ),
    ]
}
