//! Storage records
//!
//! One struct per table, fields optional so that partial records omit
//! absent values from generated SQL instead of forcing explicit nulls.

use crate::meta::{ColumnDef, Record, TableMeta};
use crate::query::SqlValue;
use crate::row::get_column;
use roster_errors::Result;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// Primary record: one row per user
///
/// `id` is the internal surrogate key (ordering, joins); `guid` is the
/// public token exposed as the user's identifier. Neither changes after
/// creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: Option<i64>,
    pub guid: Option<Uuid>,
}

static ITEM_META: TableMeta = TableMeta {
    table: "item",
    columns: &[
        ColumnDef {
            field: "id",
            column: "id",
        },
        ColumnDef {
            field: "guid",
            column: "guid",
        },
    ],
};

impl Record for Item {
    fn meta() -> &'static TableMeta {
        &ITEM_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.map(SqlValue::BigInt),
            "guid" => self.guid.map(SqlValue::Uuid),
            _ => None,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: get_column(row, "id")?,
            guid: get_column(row, "guid")?,
        })
    }
}

/// Name child record, at most one per primary record
///
/// `version` is the optimistic-concurrency guard: it starts at the column
/// default and increments exactly once per successful update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Name {
    pub item_id: Option<i64>,
    pub version: Option<i32>,
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub display: Option<String>,
}

static NAME_META: TableMeta = TableMeta {
    table: "name",
    columns: &[
        ColumnDef {
            field: "item_id",
            column: "item_id",
        },
        ColumnDef {
            field: "version",
            column: "version",
        },
        ColumnDef {
            field: "first",
            column: "first",
        },
        ColumnDef {
            field: "middle",
            column: "middle",
        },
        ColumnDef {
            field: "last",
            column: "last",
        },
        ColumnDef {
            field: "display",
            column: "display",
        },
    ],
};

impl Record for Name {
    fn meta() -> &'static TableMeta {
        &NAME_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "item_id" => self.item_id.map(SqlValue::BigInt),
            "version" => self.version.map(SqlValue::Int),
            "first" => self.first.clone().map(SqlValue::Text),
            "middle" => self.middle.clone().map(SqlValue::Text),
            "last" => self.last.clone().map(SqlValue::Text),
            "display" => self.display.clone().map(SqlValue::Text),
            _ => None,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            item_id: get_column(row, "item_id")?,
            version: get_column(row, "version")?,
            first: get_column(row, "first")?,
            middle: get_column(row, "middle")?,
            last: get_column(row, "last")?,
            display: get_column(row, "display")?,
        })
    }
}

/// Read-only row of the list projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntry {
    pub id: Option<i64>,
    pub guid: Option<Uuid>,
    pub display: Option<String>,
}

static LIST_META: TableMeta = TableMeta {
    table: "list",
    columns: &[
        ColumnDef {
            field: "id",
            column: "id",
        },
        ColumnDef {
            field: "guid",
            column: "guid",
        },
        ColumnDef {
            field: "display",
            column: "display",
        },
    ],
};

impl Record for ListEntry {
    fn meta() -> &'static TableMeta {
        &LIST_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.map(SqlValue::BigInt),
            "guid" => self.guid.map(SqlValue::Uuid),
            "display" => self.display.clone().map(SqlValue::Text),
            _ => None,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: get_column(row, "id")?,
            guid: get_column(row, "guid")?,
            display: get_column(row, "display")?,
        })
    }
}

/// Email child record, read-only in the store (listing only)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub id: Option<i64>,
    pub version: Option<i32>,
    pub item_id: Option<i64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub verified: Option<bool>,
}

static EMAIL_META: TableMeta = TableMeta {
    table: "email",
    columns: &[
        ColumnDef {
            field: "id",
            column: "id",
        },
        ColumnDef {
            field: "version",
            column: "version",
        },
        ColumnDef {
            field: "item_id",
            column: "item_id",
        },
        ColumnDef {
            field: "address",
            column: "address",
        },
        ColumnDef {
            field: "description",
            column: "description",
        },
        ColumnDef {
            field: "verified",
            column: "verified",
        },
    ],
};

impl Record for Email {
    fn meta() -> &'static TableMeta {
        &EMAIL_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.map(SqlValue::BigInt),
            "version" => self.version.map(SqlValue::Int),
            "item_id" => self.item_id.map(SqlValue::BigInt),
            "address" => self.address.clone().map(SqlValue::Text),
            "description" => self.description.clone().map(SqlValue::Text),
            "verified" => self.verified.map(SqlValue::Bool),
            _ => None,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: get_column(row, "id")?,
            version: get_column(row, "version")?,
            item_id: get_column(row, "item_id")?,
            address: get_column(row, "address")?,
            description: get_column(row, "description")?,
            verified: get_column(row, "verified")?,
        })
    }
}
