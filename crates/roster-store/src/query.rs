//! SQL fragment generation
//!
//! Pure string-building over static metadata plus a caller-supplied
//! exclusion set. Only column and table identifiers from trusted metadata
//! are ever interpolated into SQL text; every data value travels as a
//! bound parameter.
//!
//! Partial records filter twice: excluded fields are dropped first, then
//! fields whose value is absent. Column lists and bind lists both derive
//! from the single [`present_values`] pass, so the i-th column always
//! corresponds to the i-th bound value.

use crate::meta::{ColumnDef, Record, TableMeta};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

/// Smallest accepted list page size
pub const MIN_LIST_LIMIT: i64 = 1;
/// Largest accepted list page size
pub const MAX_LIST_LIMIT: i64 = 128;

/// A value bound into a generated query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    BigInt(i64),
    Int(i32),
    Text(String),
    Uuid(Uuid),
    Bool(bool),
}

/// Bind one value onto a query, preserving the caller's ordering
pub fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::BigInt(v) => query.bind(v),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Uuid(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
    }
}

/// Schema-qualified, quoted table reference
pub fn qualified_table(schema: &str, meta: &TableMeta) -> String {
    format!("\"{}\".\"{}\"", schema, meta.table)
}

/// Ordered, comma-joined, quoted column list for a record type
pub fn column_list(meta: &TableMeta, exclude: &[&str]) -> String {
    meta.columns
        .iter()
        .filter(|def| !exclude.contains(&def.field))
        .map(|def| format!("\"{}\"", def.column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fields of an instance that survive exclusion and carry a value
pub fn present_values<R: Record>(
    record: &R,
    exclude: &[&str],
) -> Vec<(&'static ColumnDef, SqlValue)> {
    R::meta()
        .columns
        .iter()
        .filter(|def| !exclude.contains(&def.field))
        .filter_map(|def| record.value(def.field).map(|value| (def, value)))
        .collect()
}

/// Quoted column list for surviving fields
pub fn column_list_of(pairs: &[(&'static ColumnDef, SqlValue)]) -> String {
    pairs
        .iter()
        .map(|(def, _)| format!("\"{}\"", def.column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Positional bound-parameter list `$start ..= $start+n-1`
pub fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// `"column" = $i` assignment list for surviving fields
pub fn update_set_list(pairs: &[(&'static ColumnDef, SqlValue)], start: usize) -> String {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (def, _))| format!("\"{}\" = ${}", def.column, start + i))
        .collect::<Vec<_>>()
        .join(",")
}

/// Clamp a requested page size into the supported range
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Name;
    use proptest::prelude::*;

    fn sample_name() -> Name {
        Name {
            item_id: Some(7),
            version: Some(1),
            first: Some("Ada".to_string()),
            middle: None,
            last: Some("Lovelace".to_string()),
            display: None,
        }
    }

    #[test]
    fn test_qualified_table_quotes_both_parts() {
        assert_eq!(
            qualified_table("app", Name::meta()),
            "\"app\".\"name\"".to_string()
        );
    }

    #[test]
    fn test_column_list_honors_exclusions() {
        let all = column_list(Name::meta(), &[]);
        assert_eq!(
            all,
            "\"item_id\",\"version\",\"first\",\"middle\",\"last\",\"display\""
        );
        let trimmed = column_list(Name::meta(), &["version", "item_id"]);
        assert_eq!(trimmed, "\"first\",\"middle\",\"last\",\"display\"");
    }

    #[test]
    fn test_present_values_skips_absent_fields() {
        let name = sample_name();
        let pairs = present_values(&name, &["version"]);
        let fields: Vec<&str> = pairs.iter().map(|(def, _)| def.field).collect();
        assert_eq!(fields, vec!["item_id", "first", "last"]);
        assert_eq!(column_list_of(&pairs), "\"item_id\",\"first\",\"last\"");
    }

    #[test]
    fn test_placeholders_are_positional_from_start() {
        assert_eq!(placeholders(1, 3), "$1,$2,$3");
        assert_eq!(placeholders(4, 2), "$4,$5");
        assert_eq!(placeholders(1, 0), "");
    }

    #[test]
    fn test_update_set_list_aligns_with_offsets() {
        let name = sample_name();
        let pairs = present_values(&name, &["item_id", "version"]);
        assert_eq!(
            update_set_list(&pairs, 1),
            "\"first\" = $1,\"last\" = $2"
        );
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-5), 1);
        assert_eq!(clamp_limit(20), 20);
        assert_eq!(clamp_limit(128), 128);
        assert_eq!(clamp_limit(500), 128);
    }

    proptest! {
        // Column list and placeholder list always have the same arity and
        // the i-th column belongs to the i-th surviving field.
        #[test]
        fn prop_column_and_value_lists_align(
            item_id in proptest::option::of(1i64..1_000_000),
            version in proptest::option::of(1i32..100),
            first in proptest::option::of("[a-z]{1,8}"),
            middle in proptest::option::of("[a-z]{1,8}"),
            last in proptest::option::of("[a-z]{1,8}"),
            display in proptest::option::of("[a-z ]{1,16}"),
            exclude_version in any::<bool>(),
            exclude_item in any::<bool>(),
        ) {
            let name = Name { item_id, version, first, middle, last, display };
            let mut exclude: Vec<&str> = Vec::new();
            if exclude_version { exclude.push("version"); }
            if exclude_item { exclude.push("item_id"); }

            let pairs = present_values(&name, &exclude);
            let columns = column_list_of(&pairs);
            let params = placeholders(1, pairs.len());

            let column_count = if columns.is_empty() { 0 } else { columns.split(',').count() };
            let param_count = if params.is_empty() { 0 } else { params.split(',').count() };
            prop_assert_eq!(column_count, pairs.len());
            prop_assert_eq!(param_count, pairs.len());

            for (def, value) in &pairs {
                prop_assert!(!exclude.contains(&def.field));
                prop_assert_eq!(Some(value.clone()), name.value(def.field));
            }
        }
    }
}
