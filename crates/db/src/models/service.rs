//! Service entity model and DTOs.
//!
//! Services are read through a join with `service_types` so the response can
//! embed the referenced type. Writes take a plain `service_type_id`.

use gigflow_core::filter::{fields, Record, Value};
use gigflow_core::input::{FieldKind, FieldTypes};
use gigflow_core::types::{DbId, Price, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A `services` row joined with its service type.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub tasks: String,
    pub service_type_id: DbId,
    pub service_type_name: String,
    pub service_type_active: bool,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The service type as embedded in a service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceTypeRef {
    pub id: DbId,
    pub name: String,
    pub active: bool,
}

/// A service as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: DbId,
    pub service_type: ServiceTypeRef,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub tasks: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            service_type: ServiceTypeRef {
                id: row.service_type_id,
                name: row.service_type_name,
                active: row.service_type_active,
            },
            title: row.title,
            description: row.description,
            price: row.price,
            tasks: row.tasks,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Record for Service {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::TITLE => Some(Value::Text(self.title.clone())),
            fields::ACTIVE => Some(Value::Bool(self.active)),
            fields::SERVICE_TYPE => Some(Value::Id(self.service_type.id)),
            fields::PRICE => Some(Value::Decimal(self.price)),
            fields::CREATED_AT => Some(Value::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// DTO for creating a new service.
///
/// Fields are optional at the serde level so that missing values surface as
/// field-level validation errors instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateService {
    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank.")
    )]
    pub description: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub price: Option<Price>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank.")
    )]
    pub tasks: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub service_type_id: Option<DbId>,
    /// Defaults to `true` if omitted.
    pub active: Option<bool>,
}

const SERVICE_FIELDS: &[(&str, FieldKind)] = &[
    ("title", FieldKind::Text),
    ("description", FieldKind::Text),
    ("price", FieldKind::Decimal),
    ("tasks", FieldKind::Text),
    ("service_type_id", FieldKind::Id),
    ("active", FieldKind::Boolean),
];

impl FieldTypes for CreateService {
    const FIELDS: &'static [(&'static str, FieldKind)] = SERVICE_FIELDS;
}

/// DTO for updating an existing service. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateService {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters."))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub description: Option<String>,
    pub price: Option<Price>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub tasks: Option<String>,
    pub service_type_id: Option<DbId>,
    pub active: Option<bool>,
}

impl FieldTypes for UpdateService {
    const FIELDS: &'static [(&'static str, FieldKind)] = SERVICE_FIELDS;
}
