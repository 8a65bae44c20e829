use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::templates::{
    create_template, delete_template, get_template, list_templates, render_template,
    update_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        // Template endpoints
        .nest(
            "/api/v1",
            Router::new()
                .route("/templates", get(list_templates).post(create_template))
                .route(
                    "/templates/{name}",
                    get(get_template)
                        .put(update_template)
                        .delete(delete_template),
                )
                .route("/templates/{name}/render", post(render_template)),
        )
}
