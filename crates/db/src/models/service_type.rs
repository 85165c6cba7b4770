//! Service type entity model and DTOs.

use gigflow_core::filter::{fields, Record, Value};
use gigflow_core::input::{FieldKind, FieldTypes};
use gigflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `service_types` table.
///
/// Timestamps are kept for ordering and filtering but are not part of the
/// JSON representation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceType {
    pub id: DbId,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

impl Record for ServiceType {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::NAME => Some(Value::Text(self.name.clone())),
            fields::ACTIVE => Some(Value::Bool(self.active)),
            fields::CREATED_AT => Some(Value::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// DTO for creating a new service type.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateServiceType {
    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters.")
    )]
    pub name: Option<String>,
    /// Defaults to `true` if omitted.
    pub active: Option<bool>,
}

const SERVICE_TYPE_FIELDS: &[(&str, FieldKind)] =
    &[("name", FieldKind::Text), ("active", FieldKind::Boolean)];

impl FieldTypes for CreateServiceType {
    const FIELDS: &'static [(&'static str, FieldKind)] = SERVICE_TYPE_FIELDS;
}

/// DTO for updating an existing service type. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateServiceType {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters."))]
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl FieldTypes for UpdateServiceType {
    const FIELDS: &'static [(&'static str, FieldKind)] = SERVICE_TYPE_FIELDS;
}
