//! Prompt template domain types.
//!
//! A [`Template`] couples normalized body text with the set of canonical
//! variable names derived from it. The pairing is maintained by construction:
//! both fields are only ever replaced together, so `variables` can never go
//! stale relative to `text`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template already exists: {0}")]
    DuplicateName(String),

    #[error("Template contains no placeholders")]
    EmptyVariableSet,

    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Template is read-only: {0}")]
    ReadOnly(String),

    #[error("Missing values for: {}", missing.join(", "))]
    IncompleteBindings { missing: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for TemplateError {
    fn from(e: std::io::Error) -> Self {
        TemplateError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(e: serde_json::Error) -> Self {
        TemplateError::Storage(e.to_string())
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Distinguishes templates shipped with the service from user-created ones.
/// Only `UserDefined` templates may be edited or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Prebuilt,
    UserDefined,
}

/// A stored prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique name, normalized; used as the storage key
    pub name: String,

    /// Normalized template body with `[placeholder]` tokens
    pub text: String,

    /// Canonical variable names extracted from `text`
    pub variables: BTreeSet<String>,

    /// Whether this template is prebuilt (read-only) or user-defined
    pub kind: TemplateKind,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Normalize a user-supplied template name: trimmed, lower-cased, spaces
/// replaced with underscores.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

impl Template {
    /// Build a template from raw user text.
    ///
    /// The name is normalized, the text's placeholders are rewritten to their
    /// canonical spelling, and `variables` is derived from the normalized
    /// text. Text without any placeholder is rejected.
    pub fn new(name: &str, raw_text: &str, kind: TemplateKind) -> TemplateResult<Self> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(TemplateError::InvalidName(
                "name must not be empty".to_string(),
            ));
        }
        // Name doubles as a file stem in the file backend.
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidName(
                "name must contain only alphanumeric, dash, or underscore".to_string(),
            ));
        }

        let text = engine::normalize_template(raw_text);
        let variables = engine::extract_variable_names(&text);
        if variables.is_empty() {
            return Err(TemplateError::EmptyVariableSet);
        }

        let now = Utc::now();
        Ok(Template {
            name,
            text,
            variables,
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the template body with new raw text, re-deriving `variables`
    /// in the same step so the two never diverge.
    pub fn apply_text(&mut self, raw_text: &str) -> TemplateResult<()> {
        let text = engine::normalize_template(raw_text);
        let variables = engine::extract_variable_names(&text);
        if variables.is_empty() {
            return Err(TemplateError::EmptyVariableSet);
        }

        self.text = text;
        self.variables = variables;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Render the template with the given bindings.
    ///
    /// Every declared variable must have a non-empty value; otherwise the
    /// fill is refused with the list of missing names.
    pub fn render(&self, bindings: &BTreeMap<String, String>) -> TemplateResult<String> {
        let missing: Vec<String> = self
            .variables
            .iter()
            .filter(|name| {
                bindings
                    .get(*name)
                    .map_or(true, |value| value.trim().is_empty())
            })
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(TemplateError::IncompleteBindings { missing });
        }

        Ok(engine::substitute(&self.text, bindings))
    }

    pub fn is_prebuilt(&self) -> bool {
        self.kind == TemplateKind::Prebuilt
    }
}

/// Request to create a new user-defined template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// Template name (normalized before storage)
    pub name: String,

    /// Raw template text with `[placeholder]` tokens
    pub text: String,
}

/// Request to replace the text of an existing template
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    /// New raw template text
    pub text: String,
}

/// Request to render a template
#[derive(Debug, Deserialize)]
pub struct RenderTemplateRequest {
    /// Values keyed by canonical variable name
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Response for a rendered template
#[derive(Debug, Serialize)]
pub struct RenderTemplateResponse {
    /// Fully substituted text
    pub prompt: String,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}
