//! Template CRUD and render endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::server::AppState;
use crate::template::{
    normalize_name, CreateTemplateRequest, RenderTemplateRequest, RenderTemplateResponse,
    Template, TemplateError, TemplateKind, TemplateListResponse, UpdateTemplateRequest,
};

#[derive(Debug, Serialize)]
pub struct TemplateErrorResponse {
    pub error: TemplateErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct TemplateErrorInfo {
    pub code: String,
    pub message: String,
}

impl From<TemplateError> for (StatusCode, Json<TemplateErrorResponse>) {
    fn from(err: TemplateError) -> Self {
        let (status, code) = match &err {
            TemplateError::NotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
            TemplateError::DuplicateName(_) => (StatusCode::CONFLICT, "TEMPLATE_EXISTS"),
            TemplateError::EmptyVariableSet => (StatusCode::BAD_REQUEST, "EMPTY_VARIABLE_SET"),
            TemplateError::InvalidName(_) => (StatusCode::BAD_REQUEST, "INVALID_NAME"),
            TemplateError::ReadOnly(_) => (StatusCode::FORBIDDEN, "TEMPLATE_READ_ONLY"),
            TemplateError::IncompleteBindings { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INCOMPLETE_BINDINGS")
            }
            TemplateError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(code = %code, error = %err, "Template storage failure");
        }

        (
            status,
            Json(TemplateErrorResponse {
                error: TemplateErrorInfo {
                    code: code.to_string(),
                    message: err.to_string(),
                },
            }),
        )
    }
}

/// POST /api/v1/templates - Create a new user-defined template
#[tracing::instrument(
    name = "http.create_template",
    skip(state, request),
    fields(template_name = %request.name)
)]
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>), (StatusCode, Json<TemplateErrorResponse>)> {
    let template = Template::new(&request.name, &request.text, TemplateKind::UserDefined)?;

    match state.store.create(template).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/templates - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, (StatusCode, Json<TemplateErrorResponse>)> {
    let templates = state.store.list().await?;
    let total = templates.len();

    Ok(Json(TemplateListResponse { templates, total }))
}

/// GET /api/v1/templates/{name} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Template>, (StatusCode, Json<TemplateErrorResponse>)> {
    match state.store.get(&normalize_name(&name)).await {
        Ok(template) => Ok(Json(template)),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/templates/{name}/render - Fill a template with values
#[tracing::instrument(name = "http.render_template", skip(state, request))]
pub async fn render_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RenderTemplateRequest>,
) -> Result<Json<RenderTemplateResponse>, (StatusCode, Json<TemplateErrorResponse>)> {
    let template = state.store.get(&normalize_name(&name)).await?;
    let prompt = template.render(&request.variables)?;

    Ok(Json(RenderTemplateResponse { prompt }))
}

/// PUT /api/v1/templates/{name} - Replace the text of a user-defined template
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>, (StatusCode, Json<TemplateErrorResponse>)> {
    match state
        .store
        .update(&normalize_name(&name), &request.text)
        .await
    {
        Ok(updated) => Ok(Json(updated)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/v1/templates/{name} - Delete a user-defined template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<TemplateErrorResponse>)> {
    match state.store.delete(&normalize_name(&name)).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}
