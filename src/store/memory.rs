//! In-memory template storage backed by a concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::template::{Template, TemplateError, TemplateKind, TemplateResult};

use super::TemplateStore;

/// Process-local template store. Contents are lost on restart, so prebuilt
/// seeding runs on every startup.
pub struct MemoryStore {
    templates: DashMap<String, Template>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    fn kind_of(&self, name: &str) -> Option<TemplateKind> {
        self.templates.get(name).map(|entry| entry.kind)
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn seed(&self, template: Template) -> TemplateResult<()> {
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    async fn list(&self) -> TemplateResult<Vec<Template>> {
        let mut templates: Vec<Template> = self
            .templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn get(&self, name: &str) -> TemplateResult<Template> {
        self.templates
            .get(name)
            .map(|entry| entry.clone())
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    async fn create(&self, template: Template) -> TemplateResult<Template> {
        if self.templates.contains_key(&template.name) {
            return Err(TemplateError::DuplicateName(template.name));
        }

        self.templates
            .insert(template.name.clone(), template.clone());
        Ok(template)
    }

    async fn update(&self, name: &str, raw_text: &str) -> TemplateResult<Template> {
        let mut entry = self
            .templates
            .get_mut(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        if entry.is_prebuilt() {
            return Err(TemplateError::ReadOnly(name.to_string()));
        }

        entry.apply_text(raw_text)?;
        Ok(entry.clone())
    }

    async fn delete(&self, name: &str) -> TemplateResult<()> {
        match self.kind_of(name) {
            None => return Err(TemplateError::NotFound(name.to_string())),
            Some(TemplateKind::Prebuilt) => {
                return Err(TemplateError::ReadOnly(name.to_string()))
            }
            Some(TemplateKind::UserDefined) => {}
        }

        self.templates.remove(name);
        Ok(())
    }

    async fn count(&self) -> TemplateResult<usize> {
        Ok(self.templates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_template(name: &str, text: &str) -> Template {
        Template::new(name, text, TemplateKind::UserDefined).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        store
            .create(user_template("welcome", "Hello [name]"))
            .await
            .unwrap();

        let fetched = store.get("welcome").await.unwrap();
        assert_eq!(fetched.text, "Hello [name]");
        assert_eq!(fetched.kind, TemplateKind::UserDefined);
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let store = MemoryStore::new();
        store
            .create(user_template("welcome", "Hello [name]"))
            .await
            .unwrap();

        let result = store.create(user_template("welcome", "Hi [name]")).await;
        assert!(matches!(result, Err(TemplateError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_update_swaps_text_and_variables() {
        let store = MemoryStore::new();
        store
            .create(user_template("welcome", "Hello [name]"))
            .await
            .unwrap();

        let updated = store.update("welcome", "Bye [City]").await.unwrap();
        assert_eq!(updated.text, "Bye [city]");
        assert!(updated.variables.contains("city"));
        assert!(!updated.variables.contains("name"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let result = store.update("ghost", "[name]").await;
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prebuilt_is_read_only() {
        let store = MemoryStore::new();
        store
            .seed(Template::new("builtin", "Hi [name]", TemplateKind::Prebuilt).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            store.update("builtin", "[other]").await,
            Err(TemplateError::ReadOnly(_))
        ));
        assert!(matches!(
            store.delete("builtin").await,
            Err(TemplateError::ReadOnly(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store
            .create(user_template("welcome", "Hello [name]"))
            .await
            .unwrap();

        store.delete("welcome").await.unwrap();
        assert!(matches!(
            store.get("welcome").await,
            Err(TemplateError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("welcome").await,
            Err(TemplateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let store = MemoryStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store
                .create(user_template(name, "Hello [name]"))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
