use crate::{
    config::{self, AppConfig},
    installed_games::{self, InstalledColumn, InstalledGamesPage},
    log::EventLog,
    owned_games::{self, OwnedColumn, OwnedGamesPage},
    source::{CatalogSource, JsonCatalog},
};
use anyhow::Result;
use std::path::PathBuf;

pub struct App {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub log: EventLog,
    pub installed: InstalledGamesPage,
    pub owned: OwnedGamesPage,
    source: Box<dyn CatalogSource>,
}

impl App {
    pub fn initialize(catalog_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = config::base_data_dir()?;
        let config = AppConfig::load_or_create_in(&data_dir)?;
        let catalog_dir = catalog_override.unwrap_or_else(|| config.catalog_dir(&data_dir));
        let source = Box::new(JsonCatalog::new(&catalog_dir));
        let log = EventLog::in_dir(&data_dir);
        Ok(Self::with_source(config, data_dir, catalog_dir, log, source))
    }

    pub fn with_source(
        config: AppConfig,
        data_dir: PathBuf,
        catalog_dir: PathBuf,
        log: EventLog,
        source: Box<dyn CatalogSource>,
    ) -> Self {
        let mut app = Self {
            installed: installed_games::new_page(),
            owned: owned_games::new_page(),
            config,
            data_dir,
            catalog_dir,
            log,
            source,
        };
        app.installed.set_height(app.config.page_height);
        app.owned.set_height(app.config.page_height);
        app.apply_default_sort();
        app
    }

    fn apply_default_sort(&mut self) {
        if let Some(value) = self.config.installed_sort.clone() {
            match InstalledColumn::parse(&value) {
                Some(column) => self.installed.set_sort(column),
                None => self
                    .log
                    .warn(format!("Unknown installed games sort column: {value}")),
            }
        }
        if let Some(value) = self.config.owned_sort.clone() {
            match OwnedColumn::parse(&value) {
                Some(column) => self.owned.set_sort(column),
                None => self
                    .log
                    .warn(format!("Unknown owned games sort column: {value}")),
            }
        }
    }

    pub fn refresh_installed(&mut self) -> bool {
        let ok = self.installed.refresh(self.source.as_ref());
        match self.installed.error() {
            None => self.log.info(format!(
                "Installed games loaded: {} game(s)",
                self.installed.list().items().len()
            )),
            Some(error) => {
                let message = format!("Installed games refresh failed: {error}");
                self.log.error(message);
            }
        }
        ok
    }

    pub fn refresh_owned(&mut self) -> bool {
        let ok = self.owned.refresh(self.source.as_ref());
        match self.owned.error() {
            None => self.log.info(format!(
                "Owned games loaded: {} game(s)",
                self.owned.list().items().len()
            )),
            Some(error) => {
                let message = format!("Owned games refresh failed: {error}");
                self.log.error(message);
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filtered_list::SortDirection,
        log::LogLevel,
        source::{INSTALLED_GAMES_FILE, OWNED_GAMES_FILE},
    };
    use std::{fs, path::Path};

    fn app_in(dir: &Path, config: AppConfig) -> App {
        let catalog_dir = dir.join("catalog");
        fs::create_dir_all(&catalog_dir).unwrap();
        App::with_source(
            config,
            dir.to_path_buf(),
            catalog_dir.clone(),
            EventLog::new(None),
            Box::new(JsonCatalog::new(&catalog_dir)),
        )
    }

    #[test]
    fn default_sort_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            installed_sort: Some("engine".to_string()),
            owned_sort: Some("bogus".to_string()),
            ..AppConfig::default()
        };
        let app = app_in(dir.path(), config);
        let sort = app.installed.sort().unwrap();
        assert_eq!(sort.column, InstalledColumn::Engine);
        assert_eq!(sort.direction, SortDirection::Asc);
        assert!(app.owned.sort().is_none());
        assert_eq!(app.log.entries()[0].level, LogLevel::Warn);
    }

    #[test]
    fn refresh_loads_catalog_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), AppConfig::default());
        fs::write(
            app.catalog_dir.join(INSTALLED_GAMES_FILE),
            r#"[{ "id": "1", "name": "Outer Wilds" }]"#,
        )
        .unwrap();
        fs::write(app.catalog_dir.join(OWNED_GAMES_FILE), "oops").unwrap();

        assert!(app.refresh_installed());
        assert_eq!(app.installed.list().len(), 1);
        assert!(!app.refresh_owned());
        assert!(app.owned.error().is_some());

        let levels: Vec<LogLevel> = app.log.entries().iter().map(|entry| entry.level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Error]);
    }
}
