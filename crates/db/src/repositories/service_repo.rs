//! Repository for the `services` table.
//!
//! Reads join `service_types` so each row carries its embedded type.

use gigflow_core::filter::{fields, Predicate};
use gigflow_core::pagination::PageRequest;
use gigflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::service::{CreateService, Service, ServiceRow, UpdateService};
use crate::query::{build_filter, ColumnMap, Direction, OrderBy};

/// Select list for the `services s JOIN service_types t` projection.
const COLUMNS: &str = "s.id, s.title, s.description, s.price, s.tasks, \
    s.service_type_id, t.name AS service_type_name, t.active AS service_type_active, \
    s.active, s.created_at, s.updated_at";

const FROM: &str = "services s JOIN service_types t ON t.id = s.service_type_id";

/// Filterable and sortable fields.
const FILTER_COLUMNS: ColumnMap = ColumnMap::new(&[
    (fields::ID, "s.id"),
    (fields::TITLE, "s.title"),
    (fields::ACTIVE, "s.active"),
    (fields::SERVICE_TYPE, "s.service_type_id"),
    (fields::PRICE, "s.price"),
    (fields::CREATED_AT, "s.created_at"),
]);

/// Provides CRUD and filtered listing for services.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Default list ordering: most recently created first, ties by id.
    pub const DEFAULT_ORDER: OrderBy = OrderBy::new(&[
        (fields::CREATED_AT, Direction::Desc),
        (fields::ID, Direction::Desc),
    ]);

    /// Insert a new service, returning the created row with its type.
    ///
    /// If `active` is `None`, defaults to `true`.
    pub async fn create(pool: &PgPool, input: &CreateService) -> Result<Service, sqlx::Error> {
        let query = format!(
            "WITH s AS (
                INSERT INTO services
                    (title, description, price, tasks, service_type_id, active)
                VALUES ($1, $2, $3, $4, $5, COALESCE($6, true))
                RETURNING *
             )
             SELECT {COLUMNS} FROM s JOIN service_types t ON t.id = s.service_type_id"
        );
        let row = sqlx::query_as::<_, ServiceRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.tasks)
            .bind(input.service_type_id)
            .bind(input.active)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a service by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE s.id = $1");
        let row = sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Service::from))
    }

    /// Find a service by id only if it is active.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE s.id = $1 AND s.active = true");
        let row = sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Service::from))
    }

    /// Whether `(title, service_type_id)` is used by any row other than
    /// `exclude_id`, active or not.
    pub async fn title_exists(
        pool: &PgPool,
        title: &str,
        service_type_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM services
                WHERE title = $1 AND service_type_id = $2
                  AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(title)
        .bind(service_type_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of services matching `predicate`.
    pub async fn list(
        pool: &PgPool,
        predicate: &Predicate,
        order: OrderBy,
        page: PageRequest,
    ) -> Result<Vec<Service>, sqlx::Error> {
        let filter = build_filter(predicate, &FILTER_COLUMNS);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} {} {} LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            order.to_sql(&FILTER_COLUMNS),
            idx + 1
        );

        let rows = filter
            .bind_as(sqlx::query_as::<_, ServiceRow>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Count services matching `predicate` (for pagination metadata).
    pub async fn count(pool: &PgPool, predicate: &Predicate) -> Result<i64, sqlx::Error> {
        let filter = build_filter(predicate, &FILTER_COLUMNS);
        let query = format!("SELECT COUNT(*)::BIGINT FROM {FROM} {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a service. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateService,
    ) -> Result<Option<Service>, sqlx::Error> {
        let query = format!(
            "WITH s AS (
                UPDATE services SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    price = COALESCE($4, price),
                    tasks = COALESCE($5, tasks),
                    service_type_id = COALESCE($6, service_type_id),
                    active = COALESCE($7, active)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM s JOIN service_types t ON t.id = s.service_type_id"
        );
        let row = sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.tasks)
            .bind(input.service_type_id)
            .bind(input.active)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Service::from))
    }

    /// Soft-delete a service by clearing `active`.
    ///
    /// Returns `true` only if an active row was deactivated.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE services SET active = false WHERE id = $1 AND active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
