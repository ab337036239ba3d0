use repodrop::config::{
    ContentStoreConfig, DatabaseConfig, ImportConfig, ServerConfig, Settings,
};
use repodrop::db;
use repodrop::github::GitHubConfig;
use repodrop::import::Importer;
use repodrop::Error;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), options)
                .unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

fn settings_for(store_url: &str, max_repo_size_mb: u64) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            external_url: Some("https://drop.example.com".to_string()),
            max_request_body_size: 1048576,
        },
        content_store: ContentStoreConfig {
            base_url: store_url.to_string(),
            api_key: None,
        },
        import: ImportConfig {
            max_repo_size_mb,
            rate_limit_per_window: 5,
            rate_window_seconds: 60,
            rate_sweep_seconds: 300,
        },
    }
}

fn github_config_for(base_url: &str) -> GitHubConfig {
    GitHubConfig {
        token: None,
        api_base_url: base_url.to_string(),
        archive_base_url: base_url.to_string(),
        max_redirects: 5,
        timeout_secs: 5,
    }
}

fn metadata_body(size_kb: u64) -> String {
    serde_json::json!({
        "name": "widgets",
        "full_name": "acme/widgets",
        "description": "A widget factory",
        "stargazers_count": 42,
        "forks_count": 7,
        "language": "JavaScript",
        "size": size_kb,
        "default_branch": "main"
    })
    .to_string()
}

const STORE_OK_BODY: &str =
    r#"{"publicId":"stored_key","secureUrl":"https://cdn.example/stored_key","resourceType":"raw"}"#;

async fn importer_with(server: &mockito::Server, max_repo_size_mb: u64) -> (Importer, sqlx::SqlitePool) {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let importer = Importer::new(
        settings_for(&server.url(), max_repo_size_mb),
        github_config_for(&server.url()),
        pool.clone(),
    )
    .unwrap();

    (importer, pool)
}

#[tokio::test]
async fn import_filters_blocked_files_and_persists_the_rest() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(500))
        .create_async()
        .await;

    let archive = build_zip(&[
        ("widgets-main/", b"" as &[u8]),
        ("widgets-main/README.md", &[b'r'; 100]),
        ("widgets-main/src/app.js", &[b'j'; 2048]),
        ("widgets-main/notes.exe", &[b'x'; 1024]),
    ]);
    let _archive = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let _store = server
        .mock("PUT", mockito::Matcher::Regex(r"^/objects/".to_string()))
        .with_status(200)
        .with_body(STORE_OK_BODY)
        .expect(2)
        .create_async()
        .await;

    let (importer, pool) = importer_with(&server, 100).await;

    let outcome = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.7")
        .await
        .unwrap();

    assert_eq!(outcome.file_count, 2);
    assert_eq!(outcome.skipped_count, 1);
    assert_eq!(outcome.total_size_bytes, 100 + 2048);
    assert_eq!(outcome.reference.branch, "main");
    assert_eq!(outcome.container_name, "acme-widgets");
    assert_eq!(outcome.metadata.star_count, 42);

    // The .exe never reaches the persisted file list
    let files = db::files::list_for_container(&pool, outcome.container_id)
        .await
        .unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| !f.relative_path.ends_with(".exe")));
    assert!(files.iter().any(|f| f.relative_path == "README.md"));
    assert!(files.iter().any(|f| f.relative_path == "src/app.js"));

    // The stored password hash matches the issued password
    let container = db::containers::get_by_name(&pool, "acme-widgets")
        .await
        .unwrap();
    assert_eq!(
        container.password_hash,
        repodrop::utils::names::hash_password(&outcome.password)
    );
}

#[tokio::test]
async fn import_falls_back_to_master_when_main_is_missing() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(500))
        .create_async()
        .await;

    let _main = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(404)
        .create_async()
        .await;

    let archive = build_zip(&[("widgets-master/README.md", b"hello" as &[u8])]);
    let _master = server
        .mock("GET", "/acme/widgets/archive/refs/heads/master.zip")
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let _store = server
        .mock("PUT", mockito::Matcher::Regex(r"^/objects/".to_string()))
        .with_status(200)
        .with_body(STORE_OK_BODY)
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let outcome = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.8")
        .await
        .unwrap();

    assert_eq!(outcome.reference.branch, "master");
    assert_eq!(outcome.file_count, 1);
}

#[tokio::test]
async fn explicit_branch_is_never_retried_against_master() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(500))
        .create_async()
        .await;

    let _dev = server
        .mock("GET", "/acme/widgets/archive/refs/heads/dev.zip")
        .with_status(404)
        .create_async()
        .await;

    // The fallback must not fire for an explicitly requested branch
    let _master = server
        .mock("GET", "/acme/widgets/archive/refs/heads/master.zip")
        .expect(0)
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let err = importer
        .import(
            "https://github.com/acme/widgets",
            Some("dev".to_string()),
            "198.51.100.9",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn empty_archive_fails_instead_of_creating_an_empty_container() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(10))
        .create_async()
        .await;

    // Valid archive containing only the root directory entry
    let archive = build_zip(&[("widgets-main/", b"" as &[u8])]);
    let _archive = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let (importer, pool) = importer_with(&server, 100).await;

    let err = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.10")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoAdmissibleFiles));

    // Nothing was committed
    assert!(db::containers::find_by_name(&pool, "acme-widgets")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn zero_successful_uploads_is_a_hard_failure() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(10))
        .create_async()
        .await;

    let archive = build_zip(&[
        ("widgets-main/a.txt", b"a" as &[u8]),
        ("widgets-main/b.txt", b"b"),
    ]);
    let _archive = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    // Every upload is rejected by the store
    let _store = server
        .mock("PUT", mockito::Matcher::Regex(r"^/objects/".to_string()))
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let (importer, pool) = importer_with(&server, 100).await;

    let err = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.11")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UploadFailed));
    assert!(db::containers::find_by_name(&pool, "acme-widgets")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn oversized_repository_is_rejected_before_any_download() {
    let mut server = mockito::Server::new_async().await;

    // 2 GB reported size against a 100 MB ceiling
    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(2 * 1024 * 1024))
        .create_async()
        .await;

    let _archive = server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/acme/widgets/archive/".to_string()),
        )
        .expect(0)
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let err = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.12")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TooLarge(_)));
}

#[tokio::test]
async fn missing_repository_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/gone")
        .with_status(404)
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let err = importer
        .import("https://github.com/acme/gone", None, "198.51.100.13")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn corrupt_archive_surfaces_as_integrity_failure() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(10))
        .create_async()
        .await;

    let _archive = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(200)
        .with_body(b"this is definitely not a zip".to_vec())
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let err = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.14")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CorruptArchive(_)));
}

#[tokio::test]
async fn rate_limit_gates_before_any_other_work() {
    let server = mockito::Server::new_async().await;
    let (importer, _pool) = importer_with(&server, 100).await;

    // Even invalid locators consume the window budget; the gate runs first
    for _ in 0..5 {
        let err = importer
            .import("not-a-repo", None, "203.0.113.5")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    let err = importer
        .import("not-a-repo", None, "203.0.113.5")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited));

    // A different client is unaffected
    let err = importer
        .import("not-a-repo", None, "203.0.113.6")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn second_import_of_same_repository_gets_a_suffixed_name() {
    let mut server = mockito::Server::new_async().await;

    let _meta = server
        .mock("GET", "/repos/acme/widgets")
        .with_status(200)
        .with_body(metadata_body(10))
        .expect(2)
        .create_async()
        .await;

    let archive = build_zip(&[("widgets-main/README.md", b"hi" as &[u8])]);
    let _archive = server
        .mock("GET", "/acme/widgets/archive/refs/heads/main.zip")
        .with_status(200)
        .with_body(archive)
        .expect(2)
        .create_async()
        .await;

    let _store = server
        .mock("PUT", mockito::Matcher::Regex(r"^/objects/".to_string()))
        .with_status(200)
        .with_body(STORE_OK_BODY)
        .expect(2)
        .create_async()
        .await;

    let (importer, _pool) = importer_with(&server, 100).await;

    let first = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.20")
        .await
        .unwrap();
    let second = importer
        .import("https://github.com/acme/widgets", None, "198.51.100.21")
        .await
        .unwrap();

    assert_eq!(first.container_name, "acme-widgets");
    assert!(second.container_name.starts_with("acme-widgets-"));
    assert_ne!(first.container_name, second.container_name);
}
