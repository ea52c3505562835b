use crate::game::{Game, OwnedGame};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const INSTALLED_GAMES_FILE: &str = "installed-games.json";
pub const OWNED_GAMES_FILE: &str = "owned-games.json";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: game #{index} has no id", path.display())]
    MissingId { path: PathBuf, index: usize },
}

/// Backend that fetches whole game collections. Each call returns a complete
/// replacement for whatever the caller held before.
pub trait CatalogSource {
    fn installed_games(&self) -> Result<Vec<Game>, SourceError>;

    fn owned_games(&self) -> Result<Vec<OwnedGame>, SourceError>;
}

/// Catalog exported by the scanner as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    dir: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GameCollection {
    List(Vec<Game>),
    Map(BTreeMap<String, Game>),
}

impl JsonCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn installed_path(&self) -> PathBuf {
        self.dir.join(INSTALLED_GAMES_FILE)
    }

    pub fn owned_path(&self) -> PathBuf {
        self.dir.join(OWNED_GAMES_FILE)
    }
}

impl CatalogSource for JsonCatalog {
    fn installed_games(&self) -> Result<Vec<Game>, SourceError> {
        let path = self.installed_path();
        let collection: Option<GameCollection> = read_json(&path)?;
        Ok(match collection {
            None => Vec::new(),
            Some(GameCollection::List(games)) => {
                if let Some(index) = games.iter().position(|game| game.id.is_empty()) {
                    return Err(SourceError::MissingId { path, index });
                }
                games
            }
            // Map keys win over whatever id the record carries.
            Some(GameCollection::Map(map)) => map
                .into_iter()
                .map(|(id, mut game)| {
                    game.id = id;
                    game
                })
                .collect(),
        })
    }

    fn owned_games(&self) -> Result<Vec<OwnedGame>, SourceError> {
        let games: Option<Vec<OwnedGame>> = read_json(&self.owned_path())?;
        Ok(games.unwrap_or_default())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SourceError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SourceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
