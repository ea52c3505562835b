use crate::{
    filtered_list::{Column, ListItem, MergeFilter, SortValue},
    game::{Architecture, Game, OperatingSystem, UnityScriptingBackend},
    page::ListPage,
    source::CatalogSource,
    text_filter::includes_one_of,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstalledColumn {
    Name,
    OperatingSystem,
    Architecture,
    ScriptingBackend,
    Engine,
}

impl InstalledColumn {
    pub fn key(self) -> &'static str {
        match self {
            InstalledColumn::Name => "name",
            InstalledColumn::OperatingSystem => "os",
            InstalledColumn::Architecture => "arch",
            InstalledColumn::ScriptingBackend => "backend",
            InstalledColumn::Engine => "engine",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" | "game" => Some(InstalledColumn::Name),
            "os" | "operating-system" => Some(InstalledColumn::OperatingSystem),
            "arch" | "architecture" => Some(InstalledColumn::Architecture),
            "backend" | "scripting-backend" => Some(InstalledColumn::ScriptingBackend),
            "engine" => Some(InstalledColumn::Engine),
            _ => None,
        }
    }
}

impl ListItem for Game {
    type Column = InstalledColumn;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, column: InstalledColumn) -> SortValue<'_> {
        match column {
            InstalledColumn::Name => SortValue::Text(&self.name),
            InstalledColumn::OperatingSystem => SortValue::Text(self.operating_system.as_str()),
            InstalledColumn::Architecture => SortValue::Text(self.architecture.as_str()),
            InstalledColumn::ScriptingBackend => SortValue::Text(self.scripting_backend.as_str()),
            InstalledColumn::Engine => self
                .engine
                .as_ref()
                .map_or(SortValue::Missing, |engine| SortValue::Text(engine.brand.as_str())),
        }
    }
}

/// Games without a detected engine version sort before any versioned game.
pub fn compare_engine_version(a: &Game, b: &Game) -> Ordering {
    match (a.engine_version(), b.engine_version()) {
        (Some(a), Some(b)) => a.cmp_numeric(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn columns() -> Vec<Column<Game>> {
    vec![
        Column::new(InstalledColumn::Name, "Game"),
        Column::new(InstalledColumn::OperatingSystem, "OS")
            .width(110)
            .centered(),
        Column::new(InstalledColumn::Architecture, "Arch")
            .width(100)
            .centered(),
        Column::new(InstalledColumn::ScriptingBackend, "Backend")
            .width(100)
            .centered(),
        Column::new(InstalledColumn::Engine, "Engine")
            .width(150)
            .centered()
            .custom_sort(compare_engine_version),
    ]
}

pub fn cell_text(game: &Game, column: InstalledColumn) -> String {
    match column {
        InstalledColumn::Name => game.display_name(),
        InstalledColumn::OperatingSystem => game.operating_system.as_str().to_string(),
        InstalledColumn::Architecture => game.architecture.label().to_string(),
        InstalledColumn::ScriptingBackend => game.scripting_backend.label().to_string(),
        InstalledColumn::Engine => game
            .engine
            .as_ref()
            .map(|engine| engine.label())
            .unwrap_or_else(|| "-".to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledGameFilter {
    pub text: String,
    pub operating_system: Option<OperatingSystem>,
    pub architecture: Option<Architecture>,
    pub scripting_backend: Option<UnityScriptingBackend>,
}

/// Partial filter update. `Some(None)` clears a facet back to "any".
#[derive(Debug, Clone, Default)]
pub struct InstalledGameFilterPatch {
    pub text: Option<String>,
    pub operating_system: Option<Option<OperatingSystem>>,
    pub architecture: Option<Option<Architecture>>,
    pub scripting_backend: Option<Option<UnityScriptingBackend>>,
}

impl InstalledGameFilterPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl MergeFilter for InstalledGameFilter {
    type Patch = InstalledGameFilterPatch;

    fn merge(&mut self, patch: InstalledGameFilterPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(operating_system) = patch.operating_system {
            self.operating_system = operating_system;
        }
        if let Some(architecture) = patch.architecture {
            self.architecture = architecture;
        }
        if let Some(scripting_backend) = patch.scripting_backend {
            self.scripting_backend = scripting_backend;
        }
    }
}

pub fn filter_game(game: &Game, filter: &InstalledGameFilter) -> bool {
    includes_one_of(&filter.text, [&game.name])
        && filter
            .architecture
            .map_or(true, |architecture| game.architecture == architecture)
        && filter
            .operating_system
            .map_or(true, |operating_system| game.operating_system == operating_system)
        && filter
            .scripting_backend
            .map_or(true, |backend| game.scripting_backend == backend)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetOption<V> {
    pub label: &'static str,
    pub value: Option<V>,
}

pub const OPERATING_SYSTEM_OPTIONS: [FacetOption<OperatingSystem>; 3] = [
    FacetOption {
        label: "Any OS",
        value: None,
    },
    FacetOption {
        label: "Windows",
        value: Some(OperatingSystem::Windows),
    },
    FacetOption {
        label: "Linux",
        value: Some(OperatingSystem::Linux),
    },
];

pub const ARCHITECTURE_OPTIONS: [FacetOption<Architecture>; 3] = [
    FacetOption {
        label: "Any architecture",
        value: None,
    },
    FacetOption {
        label: "x64",
        value: Some(Architecture::X64),
    },
    FacetOption {
        label: "x86",
        value: Some(Architecture::X86),
    },
];

pub const SCRIPTING_BACKEND_OPTIONS: [FacetOption<UnityScriptingBackend>; 3] = [
    FacetOption {
        label: "Any backend",
        value: None,
    },
    FacetOption {
        label: "IL2CPP",
        value: Some(UnityScriptingBackend::Il2Cpp),
    },
    FacetOption {
        label: "Mono",
        value: Some(UnityScriptingBackend::Mono),
    },
];

/// Label of the option currently chosen for a facet. Values the option table
/// does not offer are named by `describe`.
pub fn facet_label<V: PartialEq + Copy>(
    options: &[FacetOption<V>],
    value: Option<V>,
    describe: fn(V) -> &'static str,
) -> &'static str {
    match options.iter().find(|option| option.value == value) {
        Some(option) => option.label,
        None => value.map_or("", describe),
    }
}

/// Whether `value` is one of the choices the option table offers.
pub fn is_offered<V: PartialEq + Copy>(options: &[FacetOption<V>], value: V) -> bool {
    options.iter().any(|option| option.value == Some(value))
}

pub type InstalledGamesPage = ListPage<Game, InstalledGameFilter>;

pub fn new_page() -> InstalledGamesPage {
    ListPage::new(columns(), filter_game, InstalledGameFilter::default())
}

impl ListPage<Game, InstalledGameFilter> {
    /// True when any facet narrows the list. Free text alone does not count.
    pub fn is_filter_active(&self) -> bool {
        let filter = self.filter();
        filter.architecture.is_some()
            || filter.operating_system.is_some()
            || filter.scripting_backend.is_some()
    }

    pub fn can_reset_filter(&self) -> bool {
        self.is_filter_active() || !self.filter().text.is_empty()
    }

    pub fn refresh(&mut self, source: &dyn CatalogSource) -> bool {
        self.refresh_with(|| source.installed_games())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameEngine, GameEngineBrand, GameEngineVersion, OwnedGame};
    use crate::source::SourceError;
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, io};

    fn game(id: &str, name: &str) -> Game {
        Game {
            id: id.to_string(),
            name: name.to_string(),
            discriminator: None,
            full_path: Default::default(),
            architecture: Architecture::X64,
            scripting_backend: UnityScriptingBackend::Mono,
            operating_system: OperatingSystem::Windows,
            installed_mods: Vec::new(),
            engine: None,
            thumbnail_url: None,
        }
    }

    fn unity(id: &str, name: &str, major: u32, minor: u32, patch: u32) -> Game {
        Game {
            engine: Some(GameEngine {
                brand: GameEngineBrand::Unity,
                version: Some(GameEngineVersion::new(major, minor, patch)),
            }),
            ..game(id, name)
        }
    }

    fn visible_ids(page: &InstalledGamesPage) -> Vec<String> {
        page.list().visible().map(|game| game.id.clone()).collect()
    }

    struct StubSource {
        installed: RefCell<Vec<Result<Vec<Game>, SourceError>>>,
    }

    impl StubSource {
        fn new(results: Vec<Result<Vec<Game>, SourceError>>) -> Self {
            Self {
                installed: RefCell::new(results),
            }
        }
    }

    impl CatalogSource for StubSource {
        fn installed_games(&self) -> Result<Vec<Game>, SourceError> {
            self.installed.borrow_mut().remove(0)
        }

        fn owned_games(&self) -> Result<Vec<OwnedGame>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn page_with(games: Vec<Game>) -> InstalledGamesPage {
        let mut page = new_page();
        page.set_items(games);
        page
    }

    #[test]
    fn engine_column_sorts_by_numeric_version() {
        let mut page = page_with(vec![
            unity("c", "C", 2, 0, 0),
            unity("b", "B", 1, 10, 0),
            game("none", "No engine"),
            unity("a", "A", 1, 2, 0),
        ]);
        page.set_sort(InstalledColumn::Engine);
        assert_eq!(visible_ids(&page), vec!["none", "a", "b", "c"]);

        page.set_sort(InstalledColumn::Engine);
        assert_eq!(visible_ids(&page), vec!["c", "b", "a", "none"]);
    }

    #[test]
    fn facets_and_text_combine() {
        let mut linux = game("l", "Valheim");
        linux.operating_system = OperatingSystem::Linux;
        let mut il2cpp = game("i", "Valheim Demo");
        il2cpp.scripting_backend = UnityScriptingBackend::Il2Cpp;
        let mut page = page_with(vec![linux, il2cpp, game("w", "Subnautica")]);

        page.set_filter(InstalledGameFilterPatch::text("VAL"));
        assert_eq!(visible_ids(&page), vec!["l", "i"]);

        page.set_filter(InstalledGameFilterPatch {
            scripting_backend: Some(Some(UnityScriptingBackend::Mono)),
            ..Default::default()
        });
        assert_eq!(visible_ids(&page), vec!["l"]);
        assert_eq!(page.filter().text, "VAL");
        assert!(page.is_filter_active());

        page.set_filter(InstalledGameFilterPatch {
            scripting_backend: Some(None),
            operating_system: Some(Some(OperatingSystem::Windows)),
            ..Default::default()
        });
        assert_eq!(visible_ids(&page), vec!["i"]);
    }

    #[test]
    fn text_alone_allows_reset_but_is_not_an_active_facet() {
        let mut page = page_with(vec![game("a", "Alpha")]);
        assert!(!page.can_reset_filter());
        page.set_filter(InstalledGameFilterPatch::text("x"));
        assert!(!page.is_filter_active());
        assert!(page.can_reset_filter());
        assert!(page.list().is_empty());

        page.reset_filter();
        assert_eq!(page.filter(), &InstalledGameFilter::default());
        assert_eq!(page.list().len(), 1);
    }

    #[test]
    fn selection_resolves_against_current_items() {
        let source = StubSource::new(vec![
            Ok(vec![game("a", "Alpha"), game("b", "Bravo")]),
            Ok(vec![game("b", "Bravo Remastered")]),
        ]);
        let mut page = new_page();
        assert!(page.refresh(&source));
        page.select("a");
        assert_eq!(page.selected().map(|g| g.name.as_str()), Some("Alpha"));

        page.set_filter(InstalledGameFilterPatch::text("bravo"));
        assert_eq!(page.selected().map(|g| g.id.as_str()), Some("a"));

        assert!(page.refresh(&source));
        assert_eq!(page.selected_id(), Some("a"));
        assert!(page.selected().is_none());

        page.select("b");
        assert_eq!(
            page.selected().map(|g| g.name.as_str()),
            Some("Bravo Remastered")
        );
        page.clear_selection();
        assert!(page.selected().is_none());
    }

    #[test]
    fn failed_refresh_keeps_items_and_records_error() {
        let source = StubSource::new(vec![
            Ok(vec![game("a", "Alpha")]),
            Err(SourceError::Read {
                path: "installed-games.json".into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            }),
            Ok(vec![game("b", "Bravo")]),
        ]);
        let mut page = new_page();
        page.refresh(&source);

        assert!(!page.refresh(&source));
        assert!(!page.is_loading());
        assert!(page.error().unwrap_or_default().contains("denied"));
        assert_eq!(visible_ids(&page), vec!["a"]);

        assert!(page.refresh(&source));
        assert!(page.error().is_none());
        assert_eq!(visible_ids(&page), vec!["b"]);
    }

    #[test]
    fn cursor_follows_row_across_resort() {
        let mut page = page_with(vec![
            game("1", "Charlie"),
            game("2", "Alpha"),
            game("3", "Bravo"),
        ]);
        page.move_cursor(2);
        assert_eq!(page.cursor_item().map(|g| g.id.as_str()), Some("3"));

        page.set_sort(InstalledColumn::Name);
        assert_eq!(visible_ids(&page), vec!["2", "3", "1"]);
        assert_eq!(page.cursor_item().map(|g| g.id.as_str()), Some("3"));

        assert!(page.select_cursor());
        assert_eq!(page.selected_id(), Some("3"));
    }

    #[test]
    fn viewport_window_limits_rows() {
        let games = (0..10)
            .map(|index| game(&index.to_string(), &format!("Game {index}")))
            .collect();
        let mut page = page_with(games);
        page.set_height(4);
        page.page_down();
        page.page_down();
        let rows: Vec<&str> = page.rows().map(|g| g.id.as_str()).collect();
        assert_eq!(rows, vec!["5", "6", "7", "8"]);
        assert!(page.focus("1"));
        assert_eq!(page.visible_range(), 1..5);
        assert!(!page.focus("missing"));
    }

    #[test]
    fn facet_labels_follow_current_value() {
        assert_eq!(
            facet_label(&OPERATING_SYSTEM_OPTIONS, None, OperatingSystem::as_str),
            "Any OS"
        );
        assert_eq!(
            facet_label(&ARCHITECTURE_OPTIONS, Some(Architecture::X86), Architecture::label),
            "x86"
        );
        assert_eq!(
            facet_label(
                &SCRIPTING_BACKEND_OPTIONS,
                Some(UnityScriptingBackend::Unknown),
                UnityScriptingBackend::label
            ),
            "Unknown"
        );
    }

    #[test]
    fn unknown_facet_value_is_active_and_named() {
        let mut page = page_with(vec![game("1", "Plain")]);
        page.set_filter(InstalledGameFilterPatch {
            operating_system: Some(Some(OperatingSystem::Unknown)),
            ..Default::default()
        });
        assert!(page.is_filter_active());
        assert_eq!(
            facet_label(
                &OPERATING_SYSTEM_OPTIONS,
                page.filter().operating_system,
                OperatingSystem::as_str
            ),
            "Unknown"
        );
        assert!(!is_offered(&OPERATING_SYSTEM_OPTIONS, OperatingSystem::Unknown));
        assert!(is_offered(&OPERATING_SYSTEM_OPTIONS, OperatingSystem::Linux));
    }

    #[test]
    fn column_keys_round_trip() {
        for column in columns() {
            assert_eq!(InstalledColumn::parse(column.id.key()), Some(column.id));
        }
        assert_eq!(InstalledColumn::parse("size"), None);
    }
}
