//! File-based template storage: one JSON document per template.
//!
//! User-defined templates are persisted as `<data_dir>/<name>.json` and
//! survive restarts. Prebuilt templates are seeded into an in-memory map at
//! startup and never written to the data directory, which keeps them
//! structurally immune to the update/delete paths.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;

use crate::template::{Template, TemplateError, TemplateResult};

use super::TemplateStore;

pub struct FileStore {
    data_dir: PathBuf,
    prebuilt: DashMap<String, Template>,
}

impl FileStore {
    /// Open a file store rooted at `data_dir`, creating the directory if it
    /// does not exist yet.
    pub async fn new(data_dir: impl AsRef<Path>) -> TemplateResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;

        Ok(Self {
            data_dir,
            prebuilt: DashMap::new(),
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    // Lookup names arrive from URL paths; anything that could escape the
    // data directory is treated as absent.
    fn is_safe_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    async fn read_document(&self, name: &str) -> TemplateResult<Option<Template>> {
        match fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, template: &Template) -> TemplateResult<()> {
        let bytes = serde_json::to_vec_pretty(template)?;
        fs::write(self.path_for(&template.name), bytes).await?;
        Ok(())
    }

    async fn user_defined(&self) -> TemplateResult<Vec<Template>> {
        let mut entries = fs::read_dir(&self.data_dir).await?;
        let mut templates = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<Template>(&bytes) {
                Ok(template) => templates.push(template),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable template document"
                    );
                }
            }
        }

        Ok(templates)
    }
}

#[async_trait]
impl TemplateStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn seed(&self, template: Template) -> TemplateResult<()> {
        self.prebuilt.insert(template.name.clone(), template);
        Ok(())
    }

    async fn list(&self) -> TemplateResult<Vec<Template>> {
        let mut templates: Vec<Template> = self
            .prebuilt
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        templates.extend(self.user_defined().await?);
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn get(&self, name: &str) -> TemplateResult<Template> {
        if let Some(entry) = self.prebuilt.get(name) {
            return Ok(entry.clone());
        }
        if !Self::is_safe_name(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        self.read_document(name)
            .await?
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    async fn create(&self, template: Template) -> TemplateResult<Template> {
        if self.prebuilt.contains_key(&template.name)
            || self.read_document(&template.name).await?.is_some()
        {
            return Err(TemplateError::DuplicateName(template.name));
        }

        self.write_document(&template).await?;
        Ok(template)
    }

    async fn update(&self, name: &str, raw_text: &str) -> TemplateResult<Template> {
        if self.prebuilt.contains_key(name) {
            return Err(TemplateError::ReadOnly(name.to_string()));
        }
        if !Self::is_safe_name(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        let mut template = self
            .read_document(name)
            .await?
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        template.apply_text(raw_text)?;
        self.write_document(&template).await?;
        Ok(template)
    }

    async fn delete(&self, name: &str) -> TemplateResult<()> {
        if self.prebuilt.contains_key(name) {
            return Err(TemplateError::ReadOnly(name.to_string()));
        }
        if !Self::is_safe_name(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        match fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TemplateError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self) -> TemplateResult<usize> {
        Ok(self.prebuilt.len() + self.user_defined().await?.len())
    }
}
