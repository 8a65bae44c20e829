//! Cross-component integration tests
//!
//! These tests exercise the template engine, domain types, and both storage
//! backends together, without starting an HTTP server.

use std::collections::BTreeMap;
use std::path::Path;

use prompt_library_service::store::{
    create_template_store, seed_prebuilt_templates, FileStore, MemoryStore, TemplateStore,
};
use prompt_library_service::config::StorageConfig;
use prompt_library_service::template::{Template, TemplateError, TemplateKind};

fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn user_template(name: &str, text: &str) -> Template {
    Template::new(name, text, TemplateKind::UserDefined).unwrap()
}

#[tokio::test]
async fn test_create_then_render_full_flow() {
    let store = MemoryStore::new();

    store
        .create(user_template(
            "Cover Letter",
            "Dear [Hiring Manager], I am [NAME] applying for [Role].",
        ))
        .await
        .unwrap();

    // Name and placeholders are normalized before storage
    let stored = store.get("cover_letter").await.unwrap();
    assert_eq!(
        stored.text,
        "Dear [hiring_manager], I am [name] applying for [role]."
    );

    let prompt = stored
        .render(&bindings(&[
            ("hiring_manager", "Ms. Doe"),
            ("name", "Ada"),
            ("role", "Engineer"),
        ]))
        .unwrap();
    assert_eq!(prompt, "Dear Ms. Doe, I am Ada applying for Engineer.");
}

#[tokio::test]
async fn test_render_refused_until_all_variables_bound() {
    let store = MemoryStore::new();
    store
        .create(user_template("t", "[greeting] [name], it is [day]"))
        .await
        .unwrap();

    let template = store.get("t").await.unwrap();
    let result = template.render(&bindings(&[("greeting", "Hi"), ("name", "Ada")]));

    match result {
        Err(TemplateError::IncompleteBindings { missing }) => {
            assert_eq!(missing, vec!["day".to_string()]);
        }
        other => panic!("expected IncompleteBindings, got {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_keeps_variables_in_sync() {
    let store = MemoryStore::new();
    store
        .create(user_template("t", "Hello [name]"))
        .await
        .unwrap();

    let updated = store
        .update("t", "Welcome to [CITY], [First Name]!")
        .await
        .unwrap();

    assert_eq!(updated.text, "Welcome to [city], [first_name]!");
    let expected: Vec<&str> = vec!["city", "first_name"];
    let actual: Vec<&String> = updated.variables.iter().collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileStore::new(dir.path()).await.unwrap();
        store
            .create(user_template("saved", "Hello [Name] of [City]"))
            .await
            .unwrap();
    }

    // A fresh store over the same directory sees the normalized document
    let store = FileStore::new(dir.path()).await.unwrap();
    let template = store.get("saved").await.unwrap();
    assert_eq!(template.text, "Hello [name] of [city]");
    assert_eq!(template.kind, TemplateKind::UserDefined);
    assert!(template.variables.contains("name"));
    assert!(template.variables.contains("city"));
}

#[tokio::test]
async fn test_file_store_crud() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path()).await.unwrap();

    store
        .create(user_template("one", "Hi [name]"))
        .await
        .unwrap();

    assert!(matches!(
        store.create(user_template("one", "Other [token]")).await,
        Err(TemplateError::DuplicateName(_))
    ));

    let updated = store.update("one", "Bye [name], see you [when]").await.unwrap();
    assert!(updated.variables.contains("when"));

    store.delete("one").await.unwrap();
    assert!(matches!(
        store.get("one").await,
        Err(TemplateError::NotFound(_))
    ));
    assert!(matches!(
        store.delete("one").await,
        Err(TemplateError::NotFound(_))
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_prebuilt_seeding_and_read_only() {
    let prebuilt_dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        prebuilt_dir.path().join("daily standup.json"),
        r#"{"text": "Yesterday: [Yesterday]. Today: [Today]."}"#,
    )
    .await
    .unwrap();
    // Malformed documents are skipped, not fatal
    tokio::fs::write(prebuilt_dir.path().join("broken.json"), "not json")
        .await
        .unwrap();
    // Documents without placeholders are skipped too
    tokio::fs::write(
        prebuilt_dir.path().join("static.json"),
        r#"{"text": "nothing to fill in"}"#,
    )
    .await
    .unwrap();

    let store = MemoryStore::new();
    let seeded = seed_prebuilt_templates(&store, prebuilt_dir.path())
        .await
        .unwrap();
    assert_eq!(seeded, 1);

    let template = store.get("daily_standup").await.unwrap();
    assert_eq!(template.kind, TemplateKind::Prebuilt);
    assert_eq!(template.text, "Yesterday: [yesterday]. Today: [today].");

    assert!(matches!(
        store.update("daily_standup", "[x]").await,
        Err(TemplateError::ReadOnly(_))
    ));
    assert!(matches!(
        store.delete("daily_standup").await,
        Err(TemplateError::ReadOnly(_))
    ));
}

#[tokio::test]
async fn test_prebuilt_seeding_into_file_store_leaves_no_documents() {
    let prebuilt_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        prebuilt_dir.path().join("intro.json"),
        r#"{"text": "I am [name]"}"#,
    )
    .await
    .unwrap();

    let store = FileStore::new(data_dir.path()).await.unwrap();
    let seeded = seed_prebuilt_templates(&store, prebuilt_dir.path())
        .await
        .unwrap();
    assert_eq!(seeded, 1);

    // Prebuilt entries are visible but never written to the data directory
    assert_eq!(store.count().await.unwrap(), 1);
    let mut entries = std::fs::read_dir(data_dir.path()).unwrap();
    assert!(entries.next().is_none());

    // A user template with a different name coexists with the prebuilt one
    store
        .create(user_template("mine", "Hello [name]"))
        .await
        .unwrap();
    assert!(matches!(
        store.create(user_template("intro", "Hello [name]")).await,
        Err(TemplateError::DuplicateName(_))
    ));

    let names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["intro", "mine"]);
}

#[tokio::test]
async fn test_seeding_missing_directory_is_empty() {
    let store = MemoryStore::new();
    let seeded = seed_prebuilt_templates(&store, Path::new("does/not/exist"))
        .await
        .unwrap();
    assert_eq!(seeded, 0);
}

#[tokio::test]
async fn test_store_factory_selects_backend() {
    let memory = create_template_store(&StorageConfig {
        backend: "memory".to_string(),
        ..StorageConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(memory.backend_name(), "memory");

    let dir = tempfile::tempdir().unwrap();
    let file = create_template_store(&StorageConfig {
        backend: "file".to_string(),
        data_dir: dir.path().to_string_lossy().into_owned(),
        ..StorageConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(file.backend_name(), "file");

    // Unknown backend falls back to memory
    let fallback = create_template_store(&StorageConfig {
        backend: "mongodb".to_string(),
        ..StorageConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(fallback.backend_name(), "memory");
}
