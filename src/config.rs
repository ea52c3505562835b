use crate::viewport;
use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "config.json";
const MAX_PAGE_HEIGHT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
    #[serde(default)]
    pub installed_sort: Option<String>,
    #[serde(default)]
    pub owned_sort: Option<String>,
    #[serde(default = "default_page_height")]
    pub page_height: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_dir: None,
            installed_sort: None,
            owned_sort: None,
            page_height: default_page_height(),
        }
    }
}

impl AppConfig {
    pub fn load_or_create_in(base_dir: &Path) -> Result<Self> {
        fs::create_dir_all(base_dir).context("create app data dir")?;
        let path = base_dir.join(CONFIG_FILE);
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read app config")?;
            let mut config: AppConfig = serde_json::from_str(&raw).context("parse app config")?;
            let page_height = match config.page_height {
                0 => default_page_height(),
                height => height.min(MAX_PAGE_HEIGHT),
            };
            if page_height != config.page_height {
                config.page_height = page_height;
                config.save_in(base_dir)?;
            }
            return Ok(config);
        }

        let config = AppConfig::default();
        config.save_in(base_dir)?;
        Ok(config)
    }

    pub fn save_in(&self, base_dir: &Path) -> Result<()> {
        fs::create_dir_all(base_dir).context("create app data dir")?;
        let raw = serde_json::to_string_pretty(self).context("serialize app config")?;
        fs::write(base_dir.join(CONFIG_FILE), raw).context("write app config")?;
        Ok(())
    }

    /// Directory holding the exported catalog files.
    pub fn catalog_dir(&self, base_dir: &Path) -> PathBuf {
        self.catalog_dir
            .clone()
            .unwrap_or_else(|| base_dir.join("catalog"))
    }
}

fn default_page_height() -> usize {
    viewport::DEFAULT_HEIGHT
}

pub fn base_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("gameshelf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_config_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_create_in(dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(dir.path().join(CONFIG_FILE).is_file());
        assert_eq!(config.catalog_dir(dir.path()), dir.path().join("catalog"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "installed_sort": "engine", "page_height": 0 }"#,
        )
        .unwrap();
        let config = AppConfig::load_or_create_in(dir.path()).unwrap();
        assert_eq!(config.installed_sort.as_deref(), Some("engine"));
        assert_eq!(config.owned_sort, None);
        assert_eq!(config.page_height, viewport::DEFAULT_HEIGHT);

        let reloaded = AppConfig::load_or_create_in(dir.path()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn oversized_page_height_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            format!(r#"{{ "page_height": {} }}"#, u64::MAX),
        )
        .unwrap();
        let config = AppConfig::load_or_create_in(dir.path()).unwrap();
        assert_eq!(config.page_height, MAX_PAGE_HEIGHT);

        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(raw.contains(&format!("\"page_height\": {MAX_PAGE_HEIGHT}")));
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[").unwrap();
        let err = AppConfig::load_or_create_in(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parse app config"));
    }
}
