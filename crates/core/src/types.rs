/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Prices are stored as `NUMERIC(11, 2)`.
pub type Price = rust_decimal::Decimal;
