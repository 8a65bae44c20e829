//! Template storage backends.
//!
//! Storage is a key-value collaborator keyed by template name. The
//! [`TemplateStore`] trait abstracts the backend so the in-memory and
//! file-based implementations are interchangeable; both enforce the same
//! strict checks (duplicate names on create, not-found on update/delete,
//! read-only protection for prebuilt templates).
//!
//! Use [`create_template_store`] to create the appropriate backend based on
//! configuration.

mod file;
mod memory;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::StorageConfig;
use crate::template::{Template, TemplateKind, TemplateResult};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Backend trait for template storage.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// across request handlers. Validation errors surface as
/// [`crate::template::TemplateError`]; backend I/O faults map to its
/// `Storage` variant.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Backend identifier for health reporting.
    fn backend_name(&self) -> &'static str;

    /// Insert a prebuilt template during startup seeding.
    ///
    /// Prebuilt entries live outside the user persistence path and are
    /// rejected by `update`/`delete` afterwards.
    async fn seed(&self, template: Template) -> TemplateResult<()>;

    /// List every stored template.
    async fn list(&self) -> TemplateResult<Vec<Template>>;

    /// Fetch a template by its normalized name.
    async fn get(&self, name: &str) -> TemplateResult<Template>;

    /// Store a new user-defined template; the name must be free.
    async fn create(&self, template: Template) -> TemplateResult<Template>;

    /// Replace the text of an existing user-defined template. The stored
    /// `text` and `variables` are swapped together as one unit.
    async fn update(&self, name: &str, raw_text: &str) -> TemplateResult<Template>;

    /// Remove a user-defined template.
    async fn delete(&self, name: &str) -> TemplateResult<()>;

    /// Number of stored templates.
    async fn count(&self) -> TemplateResult<usize>;
}

/// Create a template storage backend based on configuration.
///
/// - `"file"`: one JSON document per template under `storage.data_dir`
/// - `"memory"` (default): process-local, contents lost on restart
pub async fn create_template_store(
    config: &StorageConfig,
) -> TemplateResult<Arc<dyn TemplateStore>> {
    match config.backend.as_str() {
        "file" => {
            tracing::info!(
                backend = "file",
                data_dir = %config.data_dir,
                "Using file-based template store"
            );
            Ok(Arc::new(FileStore::new(&config.data_dir).await?))
        }
        other => {
            if other != "memory" {
                tracing::warn!(
                    backend = %other,
                    "Unknown storage backend, falling back to memory"
                );
            } else {
                tracing::info!(backend = "memory", "Using in-memory template store");
            }
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// On-disk shape of a prebuilt template document: only the text is trusted,
/// variables are always re-derived from it.
#[derive(Debug, Deserialize)]
struct PrebuiltDocument {
    text: String,
}

/// Load every `*.json` document under `dir` into the store as a prebuilt,
/// read-only template. The template name is the file stem.
///
/// A missing directory is not an error (no prebuilt templates shipped).
/// Individual documents that fail to parse or contain no placeholders are
/// skipped with a warning rather than failing startup.
pub async fn seed_prebuilt_templates(
    store: &dyn TemplateStore,
    dir: &Path,
) -> TemplateResult<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "No prebuilt template directory");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let mut seeded = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let bytes = tokio::fs::read(&path).await?;
        let document: PrebuiltDocument = match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed prebuilt template");
                continue;
            }
        };

        match Template::new(stem, &document.text, TemplateKind::Prebuilt) {
            Ok(template) => {
                let name = template.name.clone();
                store.seed(template).await?;
                tracing::debug!(name = %name, "Seeded prebuilt template");
                seeded += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping invalid prebuilt template");
            }
        }
    }

    Ok(seeded)
}
