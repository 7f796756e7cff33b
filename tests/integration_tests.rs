//! Integration tests for the onboarding translation pipeline
//!
//! These tests run the splitter against nested sources on disk, serve the
//! resulting store over a real socket, and load it back through the client
//! loader.

use onboarding_i18n::{
    config::LoaderConfig,
    i18n::{LanguageRegistry, NamespaceTable, MANIFEST_FILE},
    loader::TranslationLoader,
    retry::RetryConfig,
    server::{router, AppState, API_BASE_PATH},
    splitter::{Splitter, SplitterConfig},
    storage::{FileStorage, NoopStorage},
    store::TranslationStore,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ==================== Test Helpers ====================

fn write_sources(dir: &Path) {
    let en = json!({
        "common": {"next": "Next", "back": "Back"},
        "navigation": {"title": "Onboarding"},
        "steps": {"products": "Choose a product"},
        "validation": {"required": "This field is required", "email": "Invalid email"},
        "bankInfo": {"iban": "IBAN"},
        "marketing": {"banner": "Welcome!"}
    });
    let es = json!({
        "common": {"next": "Siguiente", "back": "Atrás"},
        "navigation": {"title": "Alta de cliente"},
        "validation": {"required": "Este campo es obligatorio", "email": ""},
        "bankInfo": {"iban": "IBAN"}
    });

    std::fs::write(dir.join("en.json"), serde_json::to_string_pretty(&en).unwrap()).unwrap();
    std::fs::write(dir.join("es.json"), serde_json::to_string_pretty(&es).unwrap()).unwrap();
}

fn splitter_for(temp_dir: &TempDir) -> Splitter {
    let source_dir = temp_dir.path().join("locales");
    std::fs::create_dir_all(&source_dir).unwrap();
    write_sources(&source_dir);

    Splitter::new(SplitterConfig {
        source_dir,
        output_dir: temp_dir.path().join("translations"),
        languages: vec!["en".to_string(), "es".to_string()],
        fallback_language: "en".to_string(),
        table: NamespaceTable::default(),
    })
}

/// Serve `store_dir` on an ephemeral port and return the API base URL.
async fn spawn_service(store_dir: &Path) -> String {
    let state = AppState::new(
        TranslationStore::new(store_dir),
        LanguageRegistry::default(),
        NamespaceTable::default(),
    );
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}{}", addr, API_BASE_PATH)
}

fn loader_config(base_url: &str) -> LoaderConfig {
    LoaderConfig {
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        retry: RetryConfig::single_attempt(),
        ..LoaderConfig::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ==================== Splitter Output ====================

#[test]
fn test_splitter_writes_namespaced_store() {
    let temp_dir = TempDir::new().unwrap();
    let summary = splitter_for(&temp_dir).write_all().unwrap();
    let out = temp_dir.path().join("translations");

    let common = read_json(&out.join("en").join("common.json"));
    assert_eq!(common["common.next"], "Next");

    // "steps" belongs to navigation
    let navigation = read_json(&out.join("en").join("navigation.json"));
    assert_eq!(navigation["steps.products"], "Choose a product");
    assert_eq!(navigation["navigation.title"], "Onboarding");

    // Unmatched keys land in the default namespace
    assert_eq!(common["marketing.banner"], "Welcome!");
    assert_eq!(summary.unmatched["en"], vec!["marketing.banner"]);

    // Empty namespaces are not written
    assert!(!out.join("es").join("products.json").exists());

    let manifest = read_json(&out.join(MANIFEST_FILE));
    assert_eq!(manifest["languages"], json!(["en", "es"]));
    assert_eq!(manifest["version"], "1.0.0");
    assert!(manifest["lastModified"].is_string());
}

#[test]
fn test_splitter_audit_reports_gaps_without_failing() {
    let temp_dir = TempDir::new().unwrap();
    let summary = splitter_for(&temp_dir).write_all().unwrap();

    let es = &summary.audits["es"];
    assert!(es.errors.contains(&"Missing key: steps.products".to_string()));
    assert!(es.warnings.contains(&"Empty value: validation.email".to_string()));
    assert!(!summary.audits.contains_key("en"));
}

// ==================== Service + Loader ====================

#[tokio::test]
async fn test_loader_reads_split_store_over_http() {
    let temp_dir = TempDir::new().unwrap();
    splitter_for(&temp_dir).write_all().unwrap();
    let base_url = spawn_service(&temp_dir.path().join("translations")).await;

    let loader = TranslationLoader::new(loader_config(&base_url), Arc::new(NoopStorage)).unwrap();

    let bundle = loader.load_language("es").await.unwrap();
    assert_eq!(bundle["common"]["common.next"], "Siguiente");
    // Every namespace is present, missing ones as empty maps
    assert!(bundle["products"].is_empty());
    assert_eq!(bundle.len(), NamespaceTable::default().names().len());

    let validation = loader.load_namespace("es", "validation").await;
    assert_eq!(validation["validation.required"], "Este campo es obligatorio");

    let manifest = loader.get_manifest().await;
    assert_eq!(manifest.languages, vec!["en", "es"]);
    assert!(manifest.namespaces.contains(&"bank-info".to_string()));
}

#[tokio::test]
async fn test_unsupported_language_falls_back_to_english() {
    let temp_dir = TempDir::new().unwrap();
    splitter_for(&temp_dir).write_all().unwrap();
    let base_url = spawn_service(&temp_dir.path().join("translations")).await;

    let loader = TranslationLoader::new(loader_config(&base_url), Arc::new(NoopStorage)).unwrap();

    // The service answers 404 for fr, the loader substitutes en
    let bundle = loader.load_language("fr").await.unwrap();
    assert_eq!(bundle["common"]["common.next"], "Next");

    let translations = loader.load_namespace("es", "unknown").await;
    assert!(translations.is_empty());
    assert_eq!(loader.metrics().fallbacks, 2);
}

#[tokio::test]
async fn test_file_backed_cache_survives_service_outage() {
    let temp_dir = TempDir::new().unwrap();
    splitter_for(&temp_dir).write_all().unwrap();
    let base_url = spawn_service(&temp_dir.path().join("translations")).await;
    let storage = Arc::new(FileStorage::in_dir(temp_dir.path()));

    let first = TranslationLoader::new(loader_config(&base_url), storage.clone()).unwrap();
    first.load_namespace("es", "common").await;
    assert!(temp_dir.path().join("translation-cache.json").exists());

    // Point the second loader at nothing; the persisted entry answers
    let offline = loader_config("http://127.0.0.1:9/api/translations");
    let second = TranslationLoader::new(offline, storage).unwrap();
    let common = second.load_namespace("es", "common").await;

    assert_eq!(common["common.back"], "Atrás");
    assert_eq!(second.metrics().fetches, 0);
}

#[tokio::test]
async fn test_service_etag_is_stable_across_requests() {
    let temp_dir = TempDir::new().unwrap();
    splitter_for(&temp_dir).write_all().unwrap();
    let base_url = spawn_service(&temp_dir.path().join("translations")).await;

    let client = reqwest::Client::new();
    let url = format!("{}/en/common", base_url);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), 200);
    let etag = first.headers()["etag"].to_str().unwrap().to_string();
    assert_eq!(first.headers()["cache-control"], "public, max-age=300");

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.headers()["etag"].to_str().unwrap(), etag);

    let revalidated = client
        .get(&url)
        .header("If-None-Match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(revalidated.status(), 304);
}
