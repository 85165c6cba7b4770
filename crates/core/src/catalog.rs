//! Catalog field rules shared by the repository and HTTP layers.
//!
//! Covers the limits on service type names, service titles and prices, plus
//! the canonical validation errors for references and duplicates.

use crate::error::CoreError;
use crate::types::{DbId, Price};
use crate::validation::{FieldErrors, NON_FIELD_ERRORS};

/// Entity label used in not-found errors.
pub const SERVICE_TYPE_ENTITY: &str = "ServiceType";

/// Entity label used in not-found errors.
pub const SERVICE_ENTITY: &str = "Service";

/// Total significant digits allowed in a price (`NUMERIC(11, 2)`).
pub const PRICE_MAX_DIGITS: u32 = 11;

/// Digits allowed after the decimal point.
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Validate a price: non-negative and representable as `NUMERIC(11, 2)`.
///
/// Trailing zeros are ignored, so `10.500` is accepted.
pub fn validate_price(price: Price) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    let normalized = price.normalize();

    if normalized.is_sign_negative() && !normalized.is_zero() {
        errors.add("price", "Ensure this value is greater than or equal to 0.");
    }

    if normalized.scale() > PRICE_DECIMAL_PLACES {
        errors.add(
            "price",
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        );
    }

    let whole_digits = integer_digits(normalized);
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if whole_digits > max_whole {
        errors.add(
            "price",
            format!("Ensure that there are no more than {max_whole} digits before the decimal point."),
        );
    }

    errors.into_result()
}

fn integer_digits(value: Price) -> u32 {
    let whole = value.trunc().abs();
    if whole.is_zero() {
        0
    } else {
        whole.normalize().to_string().len() as u32
    }
}

/// The service type name is already taken.
pub fn duplicate_name() -> CoreError {
    CoreError::invalid("name", "service type with this name already exists.")
}

/// The `(title, service_type)` pair is already taken.
pub fn duplicate_service() -> CoreError {
    CoreError::invalid(
        NON_FIELD_ERRORS,
        "The fields title, service_type must make a unique set.",
    )
}

/// `service_type_id` does not reference an active service type.
pub fn unknown_service_type(id: DbId) -> CoreError {
    CoreError::invalid(
        "service_type_id",
        format!("Invalid pk \"{id}\" - object does not exist."),
    )
}
