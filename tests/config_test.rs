mod common;

use assert2::{check, let_assert};
use common::names;
use game_search::catalog::InMemoryCatalog;
use game_search::config::SearchConfig;
use game_search::error::{CatalogError, ConfigError};
use game_search::search::SearchPipeline;
use game_search::types::SearchOptions;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CATALOG_JSON: &str = r#"[
    {"igdb_id": 30, "name": "Celeste Classic", "release_date": "2015-08-20"},
    {"igdb_id": 31, "name": "Celeste", "release_date": "2018-01-25", "platforms": ["PC", "Nintendo Switch"]}
]"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn config_file_drives_catalog_and_thresholds() {
    let dir = TempDir::new().unwrap();
    let catalog_path = write(&dir, "catalog.json", CATALOG_JSON);
    let config_path = write(
        &dir,
        "config.toml",
        &format!(
            "catalog_path = {:?}\n\n[ranking]\ntitle_relevance_threshold = 90\n",
            catalog_path.display().to_string()
        ),
    );

    let config = SearchConfig::load(Some(&config_path)).unwrap();
    let_assert!(Some(path) = config.catalog_path.as_deref());
    let catalog = InMemoryCatalog::load(path).unwrap();
    check!(catalog.len() == 2);

    let pipeline = SearchPipeline::builder()
        .catalog(Arc::new(catalog))
        .config(config)
        .reference_year(common::REFERENCE_YEAR)
        .build()
        .unwrap();
    let results = pipeline.search("celeste", SearchOptions::default()).await;

    // "Celeste Classic" is only a prefix match (80) and misses the raised threshold
    check!(names(&results) == vec!["Celeste"]);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = SearchConfig::load(Some(&dir.path().join("absent.toml")));
    let_assert!(Err(ConfigError::Read { path, .. }) = result);
    check!(path.ends_with("absent.toml"));
}

#[test]
fn invalid_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.toml", "[cache]\ncapacity = 0\n");
    let_assert!(Err(error) = SearchConfig::load(Some(&path)));
    check!(error.to_string().contains("cache.capacity"));
}

#[test]
fn malformed_catalog_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "catalog.json", "{ not json");
    let_assert!(Err(CatalogError::Parse { .. }) = InMemoryCatalog::load(&path));
    let_assert!(
        Err(CatalogError::Io { .. }) =
            InMemoryCatalog::load(Path::new("/nonexistent/catalog.json"))
    );
}
