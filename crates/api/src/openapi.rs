//! OpenAPI document and Swagger UI.
//!
//! Request and response shapes are described by the `*Doc` schemas below,
//! which mirror the JSON the handlers produce. Keeping them here leaves the
//! db models free of documentation derives.

use std::collections::BTreeMap;

use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{service, service_type};
use crate::state::AppState;

/// Path of the OpenAPI JSON document.
pub const SCHEMA_PATH: &str = "/schema/";

/// Path of the Swagger UI.
pub const SWAGGER_PATH: &str = "/swagger";

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Error body returned by every 4xx/5xx response.
#[derive(ToSchema)]
pub struct ErrorDoc {
    /// Human-readable summary.
    pub error: String,
    /// `VALIDATION_ERROR`, `BAD_REQUEST`, `NOT_FOUND` or `INTERNAL_ERROR`.
    pub code: String,
    /// Field name to messages; present on validation errors only.
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// A service type. Timestamps are not exposed.
#[derive(ToSchema)]
pub struct ServiceTypeDoc {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// Body for creating (all required fields) or patching (any subset) a service type.
#[derive(ToSchema)]
pub struct ServiceTypeInputDoc {
    /// Unique, at most 255 characters.
    pub name: Option<String>,
    /// Defaults to `true` on create.
    pub active: Option<bool>,
}

/// A service with its embedded service type.
#[derive(ToSchema)]
pub struct ServiceDoc {
    pub id: i64,
    pub service_type: ServiceTypeDoc,
    pub title: String,
    pub description: String,
    /// Decimal serialized as a string, two decimal places.
    #[schema(example = "150.00")]
    pub price: String,
    pub tasks: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or patching a service.
#[derive(ToSchema)]
pub struct ServiceInputDoc {
    /// At most 255 characters; unique together with `service_type_id`.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Non-negative, at most 9 integer digits and 2 decimal places. Number or string.
    #[schema(example = "150.00")]
    pub price: Option<String>,
    pub tasks: Option<String>,
    /// Id of an active service type.
    pub service_type_id: Option<i64>,
    /// Defaults to `true` on create.
    pub active: Option<bool>,
}

/// One page of service types.
#[derive(ToSchema)]
pub struct ServiceTypePageDoc {
    pub current_page: i64,
    pub data: Vec<ServiceTypeDoc>,
    /// URL of the previous page, if any.
    pub last_page_url: Option<String>,
    /// URL of the next page, if any.
    pub next_page_url: Option<String>,
    /// Total matching rows across all pages.
    pub count: i64,
}

/// One page of services.
#[derive(ToSchema)]
pub struct ServicePageDoc {
    pub current_page: i64,
    pub data: Vec<ServiceDoc>,
    /// URL of the previous page, if any.
    pub last_page_url: Option<String>,
    /// URL of the next page, if any.
    pub next_page_url: Option<String>,
    /// Total matching rows across all pages.
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(title = "Gigflow catalog API", description = "Service types and services."),
    paths(
        service_type::list,
        service_type::create,
        service_type::get_by_id,
        service_type::update,
        service_type::delete,
        service::list,
        service::create,
        service::get_by_id,
        service::update,
        service::delete,
    ),
    components(schemas(
        ErrorDoc,
        ServiceTypeDoc,
        ServiceTypeInputDoc,
        ServiceDoc,
        ServiceInputDoc,
        ServiceTypePageDoc,
        ServicePageDoc,
    )),
    tags(
        (name = "service-types", description = "Service type catalog"),
        (name = "services", description = "Services offered under a service type"),
    )
)]
pub struct ApiDoc;

async fn schema() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Mount `/schema/` (OpenAPI JSON) and `/swagger/` (Swagger UI).
///
/// The UI serves the document at [`SCHEMA_PATH`]; `/schema` without the
/// trailing slash is added here.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schema", get(schema))
        .merge(SwaggerUi::new(SWAGGER_PATH).url(SCHEMA_PATH, ApiDoc::openapi()))
}
