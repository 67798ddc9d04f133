//! Runtime settings resolved from defaults and command-line overrides.

use crate::error::{AssistantError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Directory name for persisted users and session
const DATA_DIR: &str = "smartserve";

/// Fallback directory under the home directory
const HOME_DATA_DIR: &str = ".smartserve";

/// Bounds of the simulated typing pause, in milliseconds
pub const TYPING_DELAY_MIN_MS: u64 = 800;
pub const TYPING_DELAY_MAX_MS: u64 = 1500;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Override for where the file-backed key-value store lives
    pub data_dir: Option<PathBuf>,
    /// Alternate catalog file; the built-in catalog is used when `None`
    pub catalog: Option<PathBuf>,
}

impl Settings {
    pub fn new(data_dir: Option<PathBuf>, catalog: Option<PathBuf>) -> Self {
        Self { data_dir, catalog }
    }

    /// Storage directory, resolved only by commands that persist users or session.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

/// Platform data directory, falling back to `~/.smartserve`.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(DATA_DIR));
    }
    let home = dirs::home_dir().ok_or(AssistantError::NoHomeDir)?;
    Ok(home.join(HOME_DATA_DIR))
}

/// Random pause within the typing-delay bounds.
pub fn typing_delay() -> Duration {
    use rand::Rng;
    let ms = rand::thread_rng().gen_range(TYPING_DELAY_MIN_MS..=TYPING_DELAY_MAX_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir_wins() {
        let settings = Settings::new(Some(PathBuf::from("/tmp/ss")), None);
        assert_eq!(settings.data_dir().unwrap(), PathBuf::from("/tmp/ss"));
        assert!(settings.catalog.is_none());
    }

    #[test]
    fn test_catalog_only_settings_skip_data_dir() {
        // building settings never consults the home directory
        let settings = Settings::new(None, Some(PathBuf::from("catalog.json")));
        assert!(settings.data_dir.is_none());
        assert_eq!(settings.catalog, Some(PathBuf::from("catalog.json")));
    }

    #[test]
    fn test_typing_delay_bounds() {
        for _ in 0..50 {
            let delay = typing_delay().as_millis() as u64;
            assert!((TYPING_DELAY_MIN_MS..=TYPING_DELAY_MAX_MS).contains(&delay));
        }
    }
}
