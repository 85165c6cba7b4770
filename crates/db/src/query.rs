//! Rendering of core [`Predicate`]s and orderings into SQL.
//!
//! Logical field names are resolved through a per-table [`ColumnMap`], so
//! only whitelisted column expressions ever reach the query text. Values are
//! always bound as parameters.

use gigflow_core::filter::{Condition, Predicate, Value};
use gigflow_core::types::{Price, Timestamp};
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

// ---------------------------------------------------------------------------
// Column mapping and ordering
// ---------------------------------------------------------------------------

/// Maps logical field names to SQL column expressions for one table (or join).
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn column(&self, field: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort keys over logical field names, most significant first.
#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    keys: &'static [(&'static str, Direction)],
}

impl OrderBy {
    pub const fn new(keys: &'static [(&'static str, Direction)]) -> Self {
        Self { keys }
    }

    /// Render an `ORDER BY` clause. Unknown fields are skipped.
    pub fn to_sql(&self, columns: &ColumnMap) -> String {
        let parts: Vec<String> = self
            .keys
            .iter()
            .filter_map(|(field, dir)| {
                columns
                    .column(field)
                    .map(|col| format!("{col} {}", dir.as_sql()))
            })
            .collect();
        if parts.is_empty() {
            String::new()
        } else {
            format!("ORDER BY {}", parts.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate rendering
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Bool(bool),
    BigInt(i64),
    Text(String),
    Decimal(Price),
    Timestamp(Timestamp),
}

impl From<&Value> for BindValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(v) => BindValue::Bool(*v),
            Value::Id(v) => BindValue::BigInt(*v),
            Value::Text(v) => BindValue::Text(v.clone()),
            Value::Decimal(v) => BindValue::Decimal(*v),
            Value::Timestamp(v) => BindValue::Timestamp(*v),
        }
    }
}

/// A rendered WHERE clause with its bind values.
#[derive(Debug, Clone)]
pub struct SqlFilter {
    where_clause: String,
    binds: Vec<BindValue>,
    next_index: u32,
}

impl SqlFilter {
    /// Empty, or starting with `WHERE `.
    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// The next free `$n` placeholder index.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Bind the filter values, in placeholder order, to a `query_as`.
    pub fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for val in &self.binds {
            match val {
                BindValue::Bool(v) => q = q.bind(*v),
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Decimal(v) => q = q.bind(*v),
                BindValue::Timestamp(v) => q = q.bind(*v),
            }
        }
        q
    }

    /// Bind the filter values to a `query_scalar`.
    pub fn bind_scalar<'q>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    ) -> QueryScalar<'q, Postgres, i64, PgArguments> {
        for val in &self.binds {
            match val {
                BindValue::Bool(v) => q = q.bind(*v),
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Decimal(v) => q = q.bind(*v),
                BindValue::Timestamp(v) => q = q.bind(*v),
            }
        }
        q
    }
}

/// Render `predicate` as a WHERE clause whose placeholders start at `$1`.
///
/// A condition on a field missing from `columns` renders as `FALSE`, the same
/// outcome the in-memory evaluator gives for a missing field.
pub fn build_filter(predicate: &Predicate, columns: &ColumnMap) -> SqlFilter {
    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    for condition in predicate.conditions() {
        let Some(col) = columns.column(condition.field()) else {
            conditions.push("FALSE".to_string());
            continue;
        };

        match condition {
            Condition::Equals { value, .. } => {
                conditions.push(format!("{col} = ${bind_idx}"));
                bind_idx += 1;
                binds.push(value.into());
            }
            Condition::Contains { needle, .. } => {
                conditions.push(format!("{col} ILIKE ${bind_idx} ESCAPE '\\'"));
                bind_idx += 1;
                binds.push(BindValue::Text(format!("%{}%", escape_like(needle))));
            }
            Condition::Range { low, high, .. } => {
                conditions.push(format!(
                    "{col} BETWEEN ${bind_idx} AND ${}",
                    bind_idx + 1
                ));
                bind_idx += 2;
                binds.push(low.into());
                binds.push(high.into());
            }
            Condition::Gte { value, .. } => {
                conditions.push(format!("{col} >= ${bind_idx}"));
                bind_idx += 1;
                binds.push(value.into());
            }
            Condition::Lte { value, .. } => {
                conditions.push(format!("{col} <= ${bind_idx}"));
                bind_idx += 1;
                binds.push(value.into());
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    SqlFilter {
        where_clause,
        binds,
        next_index: bind_idx,
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
