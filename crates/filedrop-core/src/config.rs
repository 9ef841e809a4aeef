//! Configuration module
//!
//! Settings are read from command-line flags with `FILEDROP_*` environment
//! variable fallbacks. `validate()` is called once at startup and fails fast.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::storage_types::PartialUploadPolicy;
use crate::validation::UploadPolicy;

const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const DEFAULT_MAX_FILES_PER_BATCH: usize = 10;
/// Slack added on top of the file payload budget for multipart framing.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Content types accepted when nothing else is configured.
pub fn default_allowed_content_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/svg+xml",
        "text/javascript",
        "text/css",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(name = "filedrop", version, about = "Self-hosted file drop server")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "FILEDROP_LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// Directory holding one sub-directory per upload batch
    #[arg(long, env = "FILEDROP_STORAGE_ROOT", default_value = "/tmp/uploads")]
    pub storage_root: PathBuf,

    /// Largest accepted size for a single file, in bytes
    #[arg(long, env = "FILEDROP_MAX_FILE_SIZE_BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE_BYTES)]
    pub max_file_size_bytes: u64,

    /// Largest number of files accepted in one upload
    #[arg(long, env = "FILEDROP_MAX_FILES_PER_BATCH", default_value_t = DEFAULT_MAX_FILES_PER_BATCH)]
    pub max_files_per_batch: usize,

    /// Comma separated list of accepted content types
    #[arg(
        long,
        env = "FILEDROP_ALLOWED_CONTENT_TYPES",
        value_delimiter = ',',
        default_values_t = default_allowed_content_types()
    )]
    pub allowed_content_types: Vec<String>,

    /// Public prefix used to build download links, e.g. https://files.example.com
    #[arg(long, env = "FILEDROP_URL_PREFIX", default_value = "http://localhost:3000/files")]
    pub url_prefix: String,

    /// Basic auth user name
    #[arg(long, env = "FILEDROP_USERNAME", default_value = "filedrop")]
    pub username: String,

    /// Basic auth password
    #[arg(long, env = "FILEDROP_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "FILEDROP_ENVIRONMENT", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    /// File the production logger writes to and the log view tails
    #[arg(long, env = "FILEDROP_LOG_FILE", default_value = "filedrop.log")]
    pub log_file: PathBuf,

    /// What to do with already written files when a later file of a batch fails
    #[arg(long, env = "FILEDROP_PARTIAL_UPLOAD_POLICY", value_enum, default_value_t = PartialUploadPolicy::Keep)]
    pub partial_upload_policy: PartialUploadPolicy,

    /// Serve stored files under /files
    #[arg(long, env = "FILEDROP_SERVE_FILES", action = ArgAction::Set, default_value_t = true)]
    pub serve_files: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.password.is_empty() {
            return Err(anyhow::anyhow!("FILEDROP_PASSWORD must not be empty"));
        }

        if self.username.is_empty() || self.username.contains(':') {
            return Err(anyhow::anyhow!(
                "FILEDROP_USERNAME must be non-empty and must not contain ':'"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "FILEDROP_MAX_FILE_SIZE_BYTES must be greater than zero"
            ));
        }

        if self.max_files_per_batch == 0 {
            return Err(anyhow::anyhow!(
                "FILEDROP_MAX_FILES_PER_BATCH must be greater than zero"
            ));
        }

        if self.allowed_content_types.iter().all(|t| t.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "FILEDROP_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.url_prefix.trim().is_empty() {
            return Err(anyhow::anyhow!("FILEDROP_URL_PREFIX must not be empty"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Download link prefix without a trailing slash.
    pub fn url_prefix(&self) -> &str {
        self.url_prefix.trim_end_matches('/')
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_file_size_bytes: self.max_file_size_bytes,
            max_files: self.max_files_per_batch,
            allowed_content_types: self
                .allowed_content_types
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Upper bound for a whole multipart request body.
    ///
    /// Requests larger than this are cut off before any file reaches the
    /// validator, so it has to leave room for every file being at the limit.
    pub fn max_request_body_bytes(&self) -> usize {
        let payload = self
            .max_file_size_bytes
            .saturating_mul(self.max_files_per_batch as u64)
            .saturating_add(MULTIPART_OVERHEAD_BYTES);
        usize::try_from(payload).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["filedrop"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--password", "secret"]);
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.max_file_size_bytes, 2 * 1024 * 1024);
        assert_eq!(config.max_files_per_batch, 10);
        assert_eq!(config.partial_upload_policy, PartialUploadPolicy::Keep);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.serve_files);
        assert!(config
            .allowed_content_types
            .contains(&"image/png".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_content_types_are_comma_separated() {
        let config = parse(&[
            "--password",
            "secret",
            "--allowed-content-types",
            "image/png, text/plain",
        ]);
        let policy = config.upload_policy();
        assert_eq!(
            policy.allowed_content_types,
            vec!["image/png".to_string(), "text/plain".to_string()]
        );
    }

    #[test]
    fn test_default_allow_set() {
        use crate::models::CandidateFile;
        use bytes::Bytes;

        let policy = parse(&["--password", "secret"]).upload_policy();
        let check = |name: &str, content_type: &str| {
            policy.validate_batch(&[CandidateFile::new(name, content_type, Bytes::from_static(b"x"))])
        };

        for (name, content_type) in [
            ("a.jpg", "image/jpeg"),
            ("a.png", "image/png"),
            ("a.gif", "image/gif"),
            ("a.svg", "image/svg+xml"),
            ("a.js", "text/javascript"),
            ("a.css", "text/css"),
        ] {
            assert!(check(name, content_type).is_ok(), "{} should be accepted", content_type);
        }

        for (name, content_type) in [
            ("a.zip", "application/zip"),
            ("a.pdf", "application/pdf"),
            ("a.txt", "text/plain"),
        ] {
            assert!(check(name, content_type).is_err(), "{} should be rejected", content_type);
        }
    }

    #[test]
    fn test_password_is_required() {
        if std::env::var_os("FILEDROP_PASSWORD").is_none() {
            assert!(Config::try_parse_from(["filedrop"]).is_err());
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = parse(&["--password", "secret"]);
        config.max_files_per_batch = 0;
        assert!(config.validate().is_err());

        let mut config = parse(&["--password", "secret"]);
        config.username = "a:b".to_string();
        assert!(config.validate().is_err());

        let mut config = parse(&["--password", "secret"]);
        config.password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_prefix_trims_trailing_slash() {
        let config = parse(&["--password", "secret", "--url-prefix", "https://x.test/files/"]);
        assert_eq!(config.url_prefix(), "https://x.test/files");
    }

    #[test]
    fn test_request_body_limit_covers_full_batch() {
        let config = parse(&["--password", "secret"]);
        assert_eq!(
            config.max_request_body_bytes(),
            (2 * 1024 * 1024 * 10 + 1024 * 1024) as usize
        );
    }

    #[test]
    fn test_serve_files_can_be_disabled() {
        let config = parse(&["--password", "secret", "--serve-files", "false"]);
        assert!(!config.serve_files);
    }
}
