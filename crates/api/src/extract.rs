//! Request extractors that reject with [`AppError`] instead of axum's
//! plain-text rejections, so every 4xx carries the JSON error body.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, OriginalUri, Path, Query, Request};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::Uri;
use axum::Json;
use gigflow_core::filter::QueryParams;
use gigflow_core::input::{check_body, FieldTypes};
use gigflow_core::pagination::{PageLinks, PageRequest};
use gigflow_core::types::DbId;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JSON body
// ---------------------------------------------------------------------------

/// A JSON write body.
///
/// Bodies that are not valid JSON are a 400 `BAD_REQUEST`. Once the body
/// parses, declared fields of the wrong type are a `VALIDATION_ERROR` keyed by
/// field name, and text fields arrive trimmed.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + FieldTypes,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut body) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        check_body::<T>(&mut body).into_result()?;

        let value = serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(JsonBody(value))
    }
}

// ---------------------------------------------------------------------------
// Path id
// ---------------------------------------------------------------------------

/// The `{id}` path segment. Non-integer ids are a 400 `BAD_REQUEST`.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub DbId);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<DbId>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(EntityId(id))
    }
}

// ---------------------------------------------------------------------------
// List query
// ---------------------------------------------------------------------------

/// Everything a list handler needs from the query string: the raw filter
/// parameters, the validated page window, and a link builder for the
/// neighbouring pages.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub params: QueryParams,
    pub page: PageRequest,
    pub links: PageLinks,
}

impl FromRequestParts<AppState> for ListQuery {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri)
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        let page = PageRequest::from_query(&params)?;

        let origin = request_origin(parts, &uri, state.config.public_base_url.as_deref());
        let links = PageLinks::new(format!("{origin}{}", uri.path()), uri.query());

        Ok(ListQuery {
            params,
            page,
            links,
        })
    }
}

/// Scheme and authority for absolute links.
///
/// A configured public base URL wins; otherwise the request's own authority
/// or `Host` header is used over plain `http`.
fn request_origin(parts: &Parts, uri: &Uri, public_base_url: Option<&str>) -> String {
    if let Some(base) = public_base_url {
        return base.to_string();
    }
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{scheme}://{authority}");
    }
    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}
