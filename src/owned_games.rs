use crate::{
    filtered_list::{Column, ListItem, MergeFilter, SortValue},
    game::OwnedGame,
    page::ListPage,
    source::CatalogSource,
    text_filter::includes_one_of,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedColumn {
    Name,
    Linux,
    Installed,
}

impl OwnedColumn {
    pub fn key(self) -> &'static str {
        match self {
            OwnedColumn::Name => "name",
            OwnedColumn::Linux => "linux",
            OwnedColumn::Installed => "installed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" | "game" => Some(OwnedColumn::Name),
            "linux" | "os" => Some(OwnedColumn::Linux),
            "installed" => Some(OwnedColumn::Installed),
            _ => None,
        }
    }
}

impl ListItem for OwnedGame {
    type Column = OwnedColumn;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, column: OwnedColumn) -> SortValue<'_> {
        match column {
            OwnedColumn::Name => SortValue::Text(&self.name),
            OwnedColumn::Linux => SortValue::Bool(self.supports_linux()),
            OwnedColumn::Installed => SortValue::Bool(self.installed),
        }
    }
}

pub fn columns() -> Vec<Column<OwnedGame>> {
    vec![
        Column::new(OwnedColumn::Name, "Game"),
        Column::new(OwnedColumn::Linux, "Linux?").width(100).centered(),
        Column::new(OwnedColumn::Installed, "Installed?")
            .width(100)
            .centered(),
    ]
}

pub fn cell_text(game: &OwnedGame, column: OwnedColumn) -> String {
    let yes_no = |value: bool| (if value { "Yes" } else { "No" }).to_string();
    match column {
        OwnedColumn::Name => game.name.clone(),
        OwnedColumn::Linux => yes_no(game.supports_linux()),
        OwnedColumn::Installed => yes_no(game.installed),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedGameFilter {
    pub text: String,
    pub hide_installed: bool,
    pub linux_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OwnedGameFilterPatch {
    pub text: Option<String>,
    pub hide_installed: Option<bool>,
    pub linux_only: Option<bool>,
}

impl MergeFilter for OwnedGameFilter {
    type Patch = OwnedGameFilterPatch;

    fn merge(&mut self, patch: OwnedGameFilterPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(hide_installed) = patch.hide_installed {
            self.hide_installed = hide_installed;
        }
        if let Some(linux_only) = patch.linux_only {
            self.linux_only = linux_only;
        }
    }
}

pub fn filter_game(game: &OwnedGame, filter: &OwnedGameFilter) -> bool {
    includes_one_of(&filter.text, [game.name.as_str(), game.id.as_str()])
        && (!filter.linux_only || game.supports_linux())
        && (!filter.hide_installed || !game.installed)
}

pub type OwnedGamesPage = ListPage<OwnedGame, OwnedGameFilter>;

pub fn new_page() -> OwnedGamesPage {
    ListPage::new(columns(), filter_game, OwnedGameFilter::default())
}

impl ListPage<OwnedGame, OwnedGameFilter> {
    pub fn summary(&self) -> String {
        let total = self.list().items().len();
        let shown = self.list().len();
        if shown == total {
            format!("{total} owned games.")
        } else {
            format!("{total} owned games, {shown} shown.")
        }
    }

    pub fn refresh(&mut self, source: &dyn CatalogSource) -> bool {
        self.refresh_with(|| source.owned_games())
    }
}
