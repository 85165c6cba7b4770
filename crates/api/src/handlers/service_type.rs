//! Handlers for the `/services/service-types` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gigflow_core::catalog::{self, SERVICE_TYPE_ENTITY};
use gigflow_core::error::CoreError;
use gigflow_core::filter::service_type_predicate;
use gigflow_core::pagination::Page;
use gigflow_core::types::DbId;
use gigflow_db::models::service_type::{CreateServiceType, ServiceType, UpdateServiceType};
use gigflow_db::repositories::ServiceTypeRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{EntityId, JsonBody, ListQuery};
use crate::openapi::{ErrorDoc, ServiceTypeDoc, ServiceTypeInputDoc, ServiceTypePageDoc};
use crate::state::AppState;

/// GET /services/service-types/
///
/// Filters: `active` (`true` selects active rows, any other value inactive
/// ones) and `name` (case-insensitive substring).
#[utoipa::path(
    get,
    path = "/services/service-types/",
    tag = "service-types",
    operation_id = "list_service_types",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default 1)"),
        ("page_size" = Option<i64>, Query, description = "Rows per page, 1..=100 (default 5)"),
        ("active" = Option<String>, Query, description = "`true` for active rows, anything else for inactive"),
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
    ),
    responses(
        (status = 200, body = ServiceTypePageDoc),
        (status = 400, body = ErrorDoc),
    )
)]
pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> AppResult<Json<Page<ServiceType>>> {
    let predicate = service_type_predicate(&query.params)?;
    let count = ServiceTypeRepo::count(&state.pool, &predicate).await?;
    let rows = ServiceTypeRepo::list(
        &state.pool,
        &predicate,
        ServiceTypeRepo::DEFAULT_ORDER,
        query.page,
    )
    .await?;
    Ok(Json(Page::new(query.page, rows, count, &query.links)))
}

/// POST /services/service-types/
#[utoipa::path(
    post,
    path = "/services/service-types/",
    tag = "service-types",
    operation_id = "create_service_type",
    request_body = ServiceTypeInputDoc,
    responses(
        (status = 201, body = ServiceTypeDoc),
        (status = 400, body = ErrorDoc),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateServiceType>,
) -> AppResult<(StatusCode, Json<ServiceType>)> {
    input.validate().map_err(CoreError::from)?;
    if let Some(name) = input.name.as_deref() {
        ensure_name_available(&state, name, None).await?;
    }

    let service_type = ServiceTypeRepo::create(&state.pool, &input).await?;
    tracing::info!(service_type_id = service_type.id, name = %service_type.name, "Service type created");
    Ok((StatusCode::CREATED, Json(service_type)))
}

/// GET /services/service-types/{id}/
///
/// Inactive service types are still returned.
#[utoipa::path(
    get,
    path = "/services/service-types/{id}/",
    tag = "service-types",
    operation_id = "get_service_type",
    params(("id" = i64, Path, description = "Service type id")),
    responses(
        (status = 200, body = ServiceTypeDoc),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<ServiceType>> {
    let service_type = find_or_404(&state, id).await?;
    Ok(Json(service_type))
}

/// PATCH /services/service-types/{id}/
#[utoipa::path(
    patch,
    path = "/services/service-types/{id}/",
    tag = "service-types",
    operation_id = "update_service_type",
    params(("id" = i64, Path, description = "Service type id")),
    request_body = ServiceTypeInputDoc,
    responses(
        (status = 200, body = ServiceTypeDoc),
        (status = 400, body = ErrorDoc),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateServiceType>,
) -> AppResult<Json<ServiceType>> {
    find_or_404(&state, id).await?;

    input.validate().map_err(CoreError::from)?;
    if let Some(name) = input.name.as_deref() {
        ensure_name_available(&state, name, Some(id)).await?;
    }

    let service_type = ServiceTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(service_type_id = id, "Service type updated");
    Ok(Json(service_type))
}

/// DELETE /services/service-types/{id}/
///
/// Soft delete. A second delete of the same row is a 404.
#[utoipa::path(
    delete,
    path = "/services/service-types/{id}/",
    tag = "service-types",
    operation_id = "delete_service_type",
    params(("id" = i64, Path, description = "Service type id")),
    responses(
        (status = 204, description = "Deactivated"),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn delete(State(state): State<AppState>, EntityId(id): EntityId) -> AppResult<StatusCode> {
    if !ServiceTypeRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(service_type_id = id, "Service type deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: SERVICE_TYPE_ENTITY,
        id,
    })
}

async fn find_or_404(state: &AppState, id: DbId) -> AppResult<ServiceType> {
    ServiceTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn ensure_name_available(state: &AppState, name: &str, exclude: Option<DbId>) -> AppResult<()> {
    if ServiceTypeRepo::name_exists(&state.pool, name, exclude).await? {
        return Err(catalog::duplicate_name().into());
    }
    Ok(())
}
