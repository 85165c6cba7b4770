pub mod health;

use axum::routing::{get, MethodRouter};
use axum::Router;

use crate::handlers::{service, service_type};
use crate::state::AppState;

/// Build the catalog route tree.
///
/// Every path is served with and without its trailing slash.
///
/// ```text
/// /services/service-types/                         list, create
/// /services/service-types/{id}/                    get, patch, delete
/// /services/                                       list, create
/// /services/{id}/                                  get, patch, delete
/// ```
pub fn catalog_routes() -> Router<AppState> {
    let router = Router::new();
    let router = with_and_without_slash(
        router,
        "/services/service-types/",
        get(service_type::list).post(service_type::create),
    );
    let router = with_and_without_slash(
        router,
        "/services/service-types/{id}/",
        get(service_type::get_by_id)
            .patch(service_type::update)
            .delete(service_type::delete),
    );
    let router = with_and_without_slash(
        router,
        "/services/",
        get(service::list).post(service::create),
    );
    with_and_without_slash(
        router,
        "/services/{id}/",
        get(service::get_by_id)
            .patch(service::update)
            .delete(service::delete),
    )
}

fn with_and_without_slash(
    router: Router<AppState>,
    path: &str,
    methods: MethodRouter<AppState>,
) -> Router<AppState> {
    let bare = path.trim_end_matches('/');
    router.route(path, methods.clone()).route(bare, methods)
}
