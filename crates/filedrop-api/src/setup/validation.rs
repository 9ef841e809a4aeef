//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use filedrop_core::Config;

const WEAK_PASSWORD_LEN: usize = 12;

/// Validate configuration, failing on hard errors and warning on risky values.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.password.len() < WEAK_PASSWORD_LEN {
        tracing::warn!(
            "FILEDROP_PASSWORD is shorter than {} characters - consider a longer password",
            WEAK_PASSWORD_LEN
        );
    }

    if config.is_production() && config.url_prefix().starts_with("http://localhost") {
        tracing::warn!(
            url_prefix = %config.url_prefix(),
            "FILEDROP_URL_PREFIX still points at localhost - download links will not work for other clients"
        );
    }

    tracing::info!(
        storage_root = %config.storage_root.display(),
        max_file_size_bytes = config.max_file_size_bytes,
        max_files_per_batch = config.max_files_per_batch,
        allowed_content_types = %config.allowed_content_types.join(","),
        "Configuration validation passed"
    );
    Ok(())
}
