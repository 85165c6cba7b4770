//! Query-parameter driven filter predicates.
//!
//! A [`Predicate`] is a conjunction of typed [`Condition`]s over logical field
//! names (see [`fields`]). It carries no storage knowledge: the repository
//! layer renders it to SQL, and [`Predicate::matches`] evaluates it against
//! any in-memory [`Record`].
//!
//! Builders ([`service_type_predicate`], [`service_predicate`]) recognise a
//! fixed set of parameters per entity and ignore everything else. Values that
//! cannot be parsed are reported as field-level validation errors keyed by
//! the parameter name.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::{DbId, Price, Timestamp};
use crate::validation::FieldErrors;

/// Raw query parameters as received on the request.
pub type QueryParams = HashMap<String, String>;

/// Logical field names understood by the predicate evaluators.
pub mod fields {
    pub const ID: &str = "id";
    pub const ACTIVE: &str = "active";
    pub const NAME: &str = "name";
    pub const TITLE: &str = "title";
    pub const SERVICE_TYPE: &str = "service_type";
    pub const PRICE: &str = "price";
    pub const CREATED_AT: &str = "created_at";
}

/// Query parameter names.
pub mod params {
    pub const ACTIVE: &str = "active";
    pub const NAME: &str = "name";
    pub const TITLE: &str = "title";
    pub const SERVICE_TYPE: &str = "service_type";
    pub const MINIMUM_PRICE: &str = "minimum_price";
    pub const MAXIMUM_PRICE: &str = "maximum_price";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
}

// ---------------------------------------------------------------------------
// Predicate model
// ---------------------------------------------------------------------------

/// A typed operand for a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Id(DbId),
    Text(String),
    Decimal(Price),
    Timestamp(Timestamp),
}

impl Value {
    /// Order two values of the same kind. Mixed kinds are incomparable.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Id(a), Value::Id(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// A single field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field = value`
    Equals { field: &'static str, value: Value },
    /// Case-insensitive substring match on a text field.
    Contains { field: &'static str, needle: String },
    /// `low <= field <= high`
    Range {
        field: &'static str,
        low: Value,
        high: Value,
    },
    /// `field >= value`
    Gte { field: &'static str, value: Value },
    /// `field <= value`
    Lte { field: &'static str, value: Value },
}

impl Condition {
    pub fn field(&self) -> &'static str {
        match self {
            Condition::Equals { field, .. }
            | Condition::Contains { field, .. }
            | Condition::Range { field, .. }
            | Condition::Gte { field, .. }
            | Condition::Lte { field, .. } => *field,
        }
    }

    /// Evaluate against a record. A missing field never matches.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let Some(actual) = record.field(self.field()) else {
            return false;
        };
        match self {
            Condition::Equals { value, .. } => actual.compare(value) == Some(Ordering::Equal),
            Condition::Contains { needle, .. } => match actual {
                Value::Text(text) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Condition::Range { low, high, .. } => {
                matches!(
                    actual.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(actual.compare(high), Some(Ordering::Less | Ordering::Equal))
            }
            Condition::Gte { value, .. } => {
                matches!(
                    actual.compare(value),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }
            Condition::Lte { value, .. } => {
                matches!(actual.compare(value), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// Anything exposing named field values can be filtered in memory.
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;
}

/// Conjunction of conditions. The empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// The predicate with no constraints.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition (logical AND).
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the list filter for service types (`active`, `name`).
pub fn service_type_predicate(query: &QueryParams) -> Result<Predicate, CoreError> {
    let mut predicate = Predicate::all();

    if let Some(active) = query.get(params::ACTIVE) {
        predicate = predicate.and(active_condition(active));
    }
    if let Some(name) = query.get(params::NAME) {
        predicate = predicate.and(Condition::Contains {
            field: fields::NAME,
            needle: name.clone(),
        });
    }

    Ok(predicate)
}

/// Build the list filter for services.
///
/// `end_date` only applies together with a non-empty `start_date`; on its own
/// it is ignored.
pub fn service_predicate(query: &QueryParams) -> Result<Predicate, CoreError> {
    let mut predicate = Predicate::all();
    let mut errors = FieldErrors::new();

    if let Some(active) = query.get(params::ACTIVE) {
        predicate = predicate.and(active_condition(active));
    }

    if let Some(title) = query.get(params::TITLE) {
        predicate = predicate.and(Condition::Contains {
            field: fields::TITLE,
            needle: title.clone(),
        });
    }

    if let Some(raw) = query.get(params::SERVICE_TYPE) {
        match parse_id(raw) {
            Some(id) => {
                predicate = predicate.and(Condition::Equals {
                    field: fields::SERVICE_TYPE,
                    value: Value::Id(id),
                });
            }
            None => errors.add(params::SERVICE_TYPE, "A valid integer is required."),
        }
    }

    if let Some(raw) = query.get(params::MINIMUM_PRICE) {
        match parse_price(raw) {
            Some(min) => {
                predicate = predicate.and(Condition::Gte {
                    field: fields::PRICE,
                    value: Value::Decimal(min),
                });
            }
            None => errors.add(params::MINIMUM_PRICE, "A valid number is required."),
        }
    }

    if let Some(raw) = query.get(params::MAXIMUM_PRICE) {
        match parse_price(raw) {
            Some(max) => {
                predicate = predicate.and(Condition::Lte {
                    field: fields::PRICE,
                    value: Value::Decimal(max),
                });
            }
            None => errors.add(params::MAXIMUM_PRICE, "A valid number is required."),
        }
    }

    let start_raw = query
        .get(params::START_DATE)
        .filter(|s| !s.trim().is_empty());
    if let Some(start_raw) = start_raw {
        let start = parse_timestamp(start_raw);
        if start.is_none() {
            errors.add(params::START_DATE, "Enter a valid date/time.");
        }

        let end_raw = query.get(params::END_DATE).filter(|s| !s.trim().is_empty());
        match (start, end_raw) {
            (Some(start), Some(end_raw)) => match parse_timestamp(end_raw) {
                Some(end) => {
                    predicate = predicate.and(Condition::Range {
                        field: fields::CREATED_AT,
                        low: Value::Timestamp(start),
                        high: Value::Timestamp(end),
                    });
                }
                None => errors.add(params::END_DATE, "Enter a valid date/time."),
            },
            (Some(start), None) => {
                predicate = predicate.and(Condition::Gte {
                    field: fields::CREATED_AT,
                    value: Value::Timestamp(start),
                });
            }
            (None, Some(end_raw)) => {
                if parse_timestamp(end_raw).is_none() {
                    errors.add(params::END_DATE, "Enter a valid date/time.");
                }
            }
            (None, None) => {}
        }
    }

    errors.into_result()?;
    Ok(predicate)
}

fn active_condition(raw: &str) -> Condition {
    Condition::Equals {
        field: fields::ACTIVE,
        value: Value::Bool(raw == "true"),
    }
}

fn parse_id(raw: &str) -> Option<DbId> {
    raw.trim().parse::<DbId>().ok()
}

fn parse_price(raw: &str) -> Option<Price> {
    Price::from_str(raw.trim()).ok()
}

/// Parse an RFC 3339 datetime, a naive `YYYY-MM-DD[ T]HH:MM:SS` (taken as
/// UTC), or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    struct Row {
        active: bool,
        title: &'static str,
        service_type: DbId,
        price: Decimal,
        created_at: Timestamp,
    }

    impl Record for Row {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                fields::ACTIVE => Some(Value::Bool(self.active)),
                fields::TITLE => Some(Value::Text(self.title.to_string())),
                fields::SERVICE_TYPE => Some(Value::Id(self.service_type)),
                fields::PRICE => Some(Value::Decimal(self.price)),
                fields::CREATED_AT => Some(Value::Timestamp(self.created_at)),
                _ => None,
            }
        }
    }

    fn row(title: &'static str, price: i64, day: u32) -> Row {
        Row {
            active: true,
            title,
            service_type: 1,
            price: Decimal::new(price, 0),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        }
    }

    // -- builders ------------------------------------------------------------

    #[test]
    fn empty_query_builds_empty_predicate() {
        assert!(service_predicate(&QueryParams::new()).unwrap().is_empty());
        assert!(service_type_predicate(&QueryParams::new()).unwrap().is_empty());
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let p = service_type_predicate(&query(&[("colour", "red"), ("page", "2")])).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn active_is_true_only_for_literal_true() {
        for (raw, expected) in [("true", true), ("True", false), ("1", false), ("", false)] {
            let p = service_type_predicate(&query(&[("active", raw)])).unwrap();
            assert_eq!(
                p.conditions(),
                &[Condition::Equals {
                    field: fields::ACTIVE,
                    value: Value::Bool(expected)
                }]
            );
        }
    }

    #[test]
    fn service_type_param_must_be_integer() {
        let err = service_predicate(&query(&[("service_type", "abc")])).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e.contains("service_type"));
    }

    #[test]
    fn malformed_prices_report_each_field() {
        let err = service_predicate(&query(&[
            ("minimum_price", "cheap"),
            ("maximum_price", "x"),
        ]))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e)
            if e.contains("minimum_price") && e.contains("maximum_price"));
    }

    #[test]
    fn start_date_alone_is_lower_bound() {
        let p = service_predicate(&query(&[("start_date", "2024-01-10")])).unwrap();
        assert_matches!(
            p.conditions(),
            [Condition::Gte { field: fields::CREATED_AT, .. }]
        );
    }

    #[test]
    fn start_and_end_date_build_range() {
        let p = service_predicate(&query(&[
            ("start_date", "2024-01-10"),
            ("end_date", "2024-01-20T00:00:00Z"),
        ]))
        .unwrap();
        assert_matches!(
            p.conditions(),
            [Condition::Range { field: fields::CREATED_AT, .. }]
        );
    }

    #[test]
    fn end_date_without_start_is_ignored() {
        let p = service_predicate(&query(&[("end_date", "2024-01-20")])).unwrap();
        assert!(p.is_empty());
        let p = service_predicate(&query(&[("end_date", "garbage")])).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn invalid_end_date_with_start_is_rejected() {
        let err = service_predicate(&query(&[
            ("start_date", "2024-01-10"),
            ("end_date", "soon"),
        ]))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e.contains("end_date"));
    }

    #[test]
    fn timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-05T00:00:00Z"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-05T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-05 00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("05/03/2024"), None);
    }

    // -- evaluation ----------------------------------------------------------

    #[test]
    fn contains_is_case_insensitive() {
        let p = service_predicate(&query(&[("title", "GARDEN")])).unwrap();
        assert!(p.matches(&row("Garden cleanup", 10, 1)));
        assert!(!p.matches(&row("Plumbing", 10, 1)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let p = service_predicate(&query(&[
            ("minimum_price", "10"),
            ("maximum_price", "20.00"),
        ]))
        .unwrap();
        assert!(p.matches(&row("a", 10, 1)));
        assert!(p.matches(&row("a", 20, 1)));
        assert!(!p.matches(&row("a", 21, 1)));
        assert!(!p.matches(&row("a", 9, 1)));
    }

    #[test]
    fn date_range_is_inclusive() {
        let p = service_predicate(&query(&[
            ("start_date", "2024-01-02T12:00:00Z"),
            ("end_date", "2024-01-04T12:00:00Z"),
        ]))
        .unwrap();
        let matched: Vec<u32> = (1..=5)
            .filter(|day| p.matches(&row("a", 1, *day)))
            .collect();
        assert_eq!(matched, vec![2, 3, 4]);
    }

    #[test]
    fn conditions_are_conjunctive() {
        let p = service_predicate(&query(&[("title", "garden"), ("service_type", "2")])).unwrap();
        assert!(!p.matches(&row("garden", 1, 1)));
    }

    #[test]
    fn unknown_field_never_matches() {
        let p = Predicate::all().and(Condition::Equals {
            field: "colour",
            value: Value::Text("red".into()),
        });
        assert!(!p.matches(&row("a", 1, 1)));
    }
}
