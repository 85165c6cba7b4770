//! Repository for the `service_types` table.

use gigflow_core::filter::{fields, Predicate};
use gigflow_core::pagination::PageRequest;
use gigflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_type::{CreateServiceType, ServiceType, UpdateServiceType};
use crate::query::{build_filter, ColumnMap, Direction, OrderBy};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, active, created_at, updated_at";

/// Filterable and sortable fields.
const FILTER_COLUMNS: ColumnMap = ColumnMap::new(&[
    (fields::ID, "id"),
    (fields::NAME, "name"),
    (fields::ACTIVE, "active"),
    (fields::CREATED_AT, "created_at"),
]);

/// Provides CRUD and filtered listing for service types.
pub struct ServiceTypeRepo;

impl ServiceTypeRepo {
    /// Default list ordering: oldest id first.
    pub const DEFAULT_ORDER: OrderBy = OrderBy::new(&[(fields::ID, Direction::Asc)]);

    /// Insert a new service type, returning the created row.
    ///
    /// If `active` is `None`, defaults to `true`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateServiceType,
    ) -> Result<ServiceType, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_types (name, active)
             VALUES ($1, COALESCE($2, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceType>(&query)
            .bind(&input.name)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a service type by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_types WHERE id = $1");
        sqlx::query_as::<_, ServiceType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a service type by id only if it is active.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<ServiceType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_types WHERE id = $1 AND active = true");
        sqlx::query_as::<_, ServiceType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `name` is used by any row other than `exclude_id`.
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM service_types
                WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of service types matching `predicate`.
    pub async fn list(
        pool: &PgPool,
        predicate: &Predicate,
        order: OrderBy,
        page: PageRequest,
    ) -> Result<Vec<ServiceType>, sqlx::Error> {
        let filter = build_filter(predicate, &FILTER_COLUMNS);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM service_types {} {} LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            order.to_sql(&FILTER_COLUMNS),
            idx + 1
        );

        filter
            .bind_as(sqlx::query_as::<_, ServiceType>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count service types matching `predicate` (for pagination metadata).
    pub async fn count(pool: &PgPool, predicate: &Predicate) -> Result<i64, sqlx::Error> {
        let filter = build_filter(predicate, &FILTER_COLUMNS);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM service_types {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a service type. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateServiceType,
    ) -> Result<Option<ServiceType>, sqlx::Error> {
        let query = format!(
            "UPDATE service_types SET
                name = COALESCE($2, name),
                active = COALESCE($3, active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceType>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a service type by clearing `active`.
    ///
    /// Returns `true` only if an active row was deactivated; a second call
    /// returns `false`.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_types SET active = false WHERE id = $1 AND active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
