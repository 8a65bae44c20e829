//! API layer - HTTP endpoint handlers.

mod health;
mod routes;
mod templates;

// Re-export all handlers for use in server/app.rs
pub use health::health;
pub use routes::api_routes;
pub use templates::{
    create_template, delete_template, get_template, list_templates, render_template,
    update_template, TemplateErrorInfo, TemplateErrorResponse,
};
