//! Test helpers: build the router over a temporary storage root.
//!
//! Run from workspace root: `cargo test -p filedrop-api`.

#![allow(dead_code)]

use axum_test::{TestResponse, TestServer};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use filedrop_api::setup::build_app;
use filedrop_api::AppState;
use filedrop_core::config::default_allowed_content_types;
use filedrop_core::{Config, Environment, PartialUploadPolicy};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_USERNAME: &str = "tester";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test application: server plus the owned temporary directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &Path {
        &self.state.config.storage_root
    }

    /// Names of the batch directories currently on disk.
    pub fn batch_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = std::fs::read_dir(self.storage_root())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort();
        dirs
    }
}

pub fn create_test_config(temp_dir: &Path) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        storage_root: temp_dir.join("uploads"),
        max_file_size_bytes: 2 * 1024 * 1024,
        max_files_per_batch: 10,
        allowed_content_types: default_allowed_content_types(),
        url_prefix: "http://localhost:3000/files".to_string(),
        username: TEST_USERNAME.to_string(),
        password: TEST_PASSWORD.to_string(),
        environment: Environment::Development,
        log_file: temp_dir.join("filedrop.log"),
        partial_upload_policy: PartialUploadPolicy::Keep,
        serve_files: true,
    }
}

/// Setup test app with default configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    customize(&mut config);

    let (state, router) = build_app(config).await.unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// `Authorization` header value for the test credential.
pub fn basic_auth() -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", TEST_USERNAME, TEST_PASSWORD))
    )
}

/// `name=value` part of the flash cookie set by `response`.
pub fn flash_cookie(response: &TestResponse) -> String {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("response sets a cookie")
        .to_str()
        .unwrap()
        .to_string();
    set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string()
}
