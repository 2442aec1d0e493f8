//! Config directory resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Log file written while the terminal viewer owns the screen.
const LOG_FILE_NAME: &str = "airguide.log";

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Otherwise returns `~/.config/airguide/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("config.toml"));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("airguide")
        .join("config.toml"))
}

/// Resolves the log file path, next to the config file.
///
/// # Errors
///
/// Same as [`resolve_config_path`].
pub fn resolve_log_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let config_path = resolve_config_path(dir)?;
    Ok(config_path.with_file_name(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/airguide-test");

        // Act
        let path = resolve_config_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/airguide-test/config.toml"));
    }

    #[test]
    fn test_resolve_default() {
        // Arrange & Act
        let path = resolve_config_path(None).unwrap();

        // Assert
        assert!(path.ends_with(".config/airguide/config.toml"));
    }

    #[test]
    fn test_log_path_sits_next_to_config() {
        // Arrange
        let dir = PathBuf::from("/tmp/airguide-test");

        // Act
        let path = resolve_log_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/airguide-test/airguide.log"));
    }
}
