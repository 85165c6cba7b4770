//! Handlers for the `/services` resource.
//!
//! Writes reference their type by `service_type_id`, which must point at an
//! active service type. Reads embed the type as `service_type`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gigflow_core::catalog::{self, SERVICE_ENTITY};
use gigflow_core::error::CoreError;
use gigflow_core::filter::service_predicate;
use gigflow_core::pagination::Page;
use gigflow_core::types::{DbId, Price};
use gigflow_core::validation::FieldErrors;
use gigflow_db::models::service::{CreateService, Service, UpdateService};
use gigflow_db::repositories::{ServiceRepo, ServiceTypeRepo};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::extract::{EntityId, JsonBody, ListQuery};
use crate::openapi::{ErrorDoc, ServiceDoc, ServiceInputDoc, ServicePageDoc};
use crate::state::AppState;

/// GET /services/
///
/// Newest first. `end_date` only narrows the range when `start_date` is also
/// given.
#[utoipa::path(
    get,
    path = "/services/",
    tag = "services",
    operation_id = "list_services",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default 1)"),
        ("page_size" = Option<i64>, Query, description = "Rows per page, 1..=100 (default 5)"),
        ("active" = Option<String>, Query, description = "`true` for active rows, anything else for inactive"),
        ("title" = Option<String>, Query, description = "Case-insensitive substring of the title"),
        ("service_type" = Option<i64>, Query, description = "Service type id"),
        ("minimum_price" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("maximum_price" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("start_date" = Option<String>, Query, description = "Created at or after (date or datetime)"),
        ("end_date" = Option<String>, Query, description = "Created at or before; ignored without start_date"),
    ),
    responses(
        (status = 200, body = ServicePageDoc),
        (status = 400, body = ErrorDoc),
    )
)]
pub async fn list(State(state): State<AppState>, query: ListQuery) -> AppResult<Json<Page<Service>>> {
    let predicate = service_predicate(&query.params)?;
    let count = ServiceRepo::count(&state.pool, &predicate).await?;
    let rows =
        ServiceRepo::list(&state.pool, &predicate, ServiceRepo::DEFAULT_ORDER, query.page).await?;
    Ok(Json(Page::new(query.page, rows, count, &query.links)))
}

/// POST /services/
#[utoipa::path(
    post,
    path = "/services/",
    tag = "services",
    operation_id = "create_service",
    request_body = ServiceInputDoc,
    responses(
        (status = 201, body = ServiceDoc),
        (status = 400, body = ErrorDoc),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let mut errors = collect(input.validate());
    check_fields(&state, input.price, input.service_type_id, &mut errors).await?;
    errors.into_result()?;

    if let (Some(title), Some(service_type_id)) = (input.title.as_deref(), input.service_type_id) {
        ensure_unique(&state, title, service_type_id, None).await?;
    }

    let service = ServiceRepo::create(&state.pool, &input).await?;
    tracing::info!(
        service_id = service.id,
        service_type_id = service.service_type.id,
        "Service created"
    );
    Ok((StatusCode::CREATED, Json(service)))
}

/// GET /services/{id}/
///
/// Inactive services are a 404.
#[utoipa::path(
    get,
    path = "/services/{id}/",
    tag = "services",
    operation_id = "get_service",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, body = ServiceDoc),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<Service>> {
    let service = ServiceRepo::find_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(service))
}

/// PATCH /services/{id}/
///
/// Applies to inactive services too, so `{"active": true}` restores one.
#[utoipa::path(
    patch,
    path = "/services/{id}/",
    tag = "services",
    operation_id = "update_service",
    params(("id" = i64, Path, description = "Service id")),
    request_body = ServiceInputDoc,
    responses(
        (status = 200, body = ServiceDoc),
        (status = 400, body = ErrorDoc),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateService>,
) -> AppResult<Json<Service>> {
    let existing = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut errors = collect(input.validate());
    check_fields(&state, input.price, input.service_type_id, &mut errors).await?;
    errors.into_result()?;

    if input.title.is_some() || input.service_type_id.is_some() {
        let title = input.title.as_deref().unwrap_or(&existing.title);
        let service_type_id = input.service_type_id.unwrap_or(existing.service_type.id);
        ensure_unique(&state, title, service_type_id, Some(id)).await?;
    }

    let service = ServiceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(service_id = id, "Service updated");
    Ok(Json(service))
}

/// DELETE /services/{id}/
///
/// Soft delete. Deleting an inactive service is a 404.
#[utoipa::path(
    delete,
    path = "/services/{id}/",
    tag = "services",
    operation_id = "delete_service",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 204, description = "Deactivated"),
        (status = 404, body = ErrorDoc),
    )
)]
pub async fn delete(State(state): State<AppState>, EntityId(id): EntityId) -> AppResult<StatusCode> {
    if !ServiceRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(service_id = id, "Service deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: SERVICE_ENTITY,
        id,
    })
}

fn collect(result: Result<(), ValidationErrors>) -> FieldErrors {
    match result {
        Ok(()) => FieldErrors::new(),
        Err(errors) => FieldErrors::from(errors),
    }
}

/// Price limits and the `service_type_id` reference, added to `errors`.
async fn check_fields(
    state: &AppState,
    price: Option<Price>,
    service_type_id: Option<DbId>,
    errors: &mut FieldErrors,
) -> AppResult<()> {
    if let Some(price) = price {
        merge_validation(errors, catalog::validate_price(price))?;
    }
    if let Some(type_id) = service_type_id {
        if ServiceTypeRepo::find_active(&state.pool, type_id).await?.is_none() {
            merge_validation(errors, Err(catalog::unknown_service_type(type_id)))?;
        }
    }
    Ok(())
}

fn merge_validation(errors: &mut FieldErrors, result: Result<(), CoreError>) -> AppResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(CoreError::Validation(fields)) => {
            errors.merge(fields);
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}

async fn ensure_unique(
    state: &AppState,
    title: &str,
    service_type_id: DbId,
    exclude: Option<DbId>,
) -> AppResult<()> {
    if ServiceRepo::title_exists(&state.pool, title, service_type_id, exclude).await? {
        return Err(catalog::duplicate_service().into());
    }
    Ok(())
}
