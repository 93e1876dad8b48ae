use super::types::FeedConfig;
use std::fs;
use std::path::Path;

/// Loads [`FeedConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<FeedConfig, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: FeedConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> FeedConfig {
        Self::load_from_path(path).unwrap_or_default()
    }
}
