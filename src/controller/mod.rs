//! Application state and the transitions that change it.
//!
//! All state lives in one [`ViewController`] built at startup; UI events go
//! through [`ViewController::apply`] and the current screen is produced by
//! [`ViewController::render`].

use serde::Serialize;

use crate::catalog::Catalog;
use crate::loader::LoadError;
use crate::prefs::{PreferenceStore, THEME_KEY, VIEW_KEY};
use crate::query::{self, SortKey, SortSpec};
use crate::stats::{self, StatsPolicy, StatsSource};
use crate::view::{self, stats as stats_view, table, Screen, ScreenBody};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Collection,
    Wantlist,
    Stats,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Collection, ViewMode::Wantlist, ViewMode::Stats];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "collection" => Some(Self::Collection),
            "wantlist" => Some(Self::Wantlist),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }

    // stored preferences must match exactly, as written by `set_view`
    fn parse_exact(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Collection => "collection",
            ViewMode::Wantlist => "wantlist",
            ViewMode::Stats => "stats",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Collection => "Collection",
            ViewMode::Wantlist => "Wantlist",
            ViewMode::Stats => "Stats",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    fn parse_exact(value: &str) -> Option<Self> {
        [Theme::Light, Theme::Dark]
            .into_iter()
            .find(|t| t.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Terminal background hint from `COLORFGBG` ("fg;bg"), the closest
    /// thing a terminal has to a color-scheme preference.
    pub fn from_terminal() -> Option<Self> {
        let raw = std::env::var("COLORFGBG").ok()?;
        Self::from_colorfgbg(&raw)
    }

    pub fn from_colorfgbg(raw: &str) -> Option<Self> {
        let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
        if bg < 7 || bg == 8 {
            Some(Theme::Dark)
        } else {
            Some(Theme::Light)
        }
    }
}

#[derive(Clone, Debug)]
pub enum UiEvent {
    SetView(ViewMode),
    Search(String),
    ClickSort(SortKey),
    SetStatsSource(StatsSource),
    ToggleTheme,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    pub sort: SortSpec,
    pub query: String,
    pub stats_source: StatsSource,
    pub theme: Theme,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Collection,
            sort: SortSpec::default(),
            query: String::new(),
            stats_source: StatsSource::Collection,
            theme: Theme::Light,
        }
    }
}

#[derive(Clone, Debug)]
pub enum LoadState {
    Pending,
    Loaded(Catalog),
    Failed(String),
}

pub struct ViewController {
    state: ViewState,
    load: LoadState,
    last_updated: Option<String>,
    policy: StatsPolicy,
    prefs: Box<dyn PreferenceStore>,
}

impl ViewController {
    pub fn new(prefs: Box<dyn PreferenceStore>, policy: StatsPolicy) -> Self {
        Self {
            state: ViewState::default(),
            load: LoadState::Pending,
            last_updated: None,
            policy,
            prefs,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.load {
            LoadState::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Restores theme and view. Stored values outside the known sets are
    /// ignored; `fallback_theme` applies when no theme is stored.
    pub fn restore_preferences(&mut self, fallback_theme: Theme) {
        self.state.theme = self
            .prefs
            .get(THEME_KEY)
            .and_then(|raw| Theme::parse_exact(&raw))
            .unwrap_or(fallback_theme);
        if let Some(mode) = self
            .prefs
            .get(VIEW_KEY)
            .and_then(|raw| ViewMode::parse_exact(&raw))
        {
            self.state.mode = mode;
        }
    }

    pub fn finish_load(&mut self, result: Result<Catalog, LoadError>) {
        match result {
            Ok(catalog) => {
                tracing::info!(
                    "loaded {} collection items, {} wantlist items",
                    catalog.collection.len(),
                    catalog.wantlist.len()
                );
                self.load = LoadState::Loaded(catalog);
                self.refresh_last_updated();
            }
            Err(e) => {
                tracing::error!("Error loading data: {e}");
                self.load = LoadState::Failed(e.to_string());
            }
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::SetView(mode) => self.set_view(mode),
            UiEvent::Search(query) => self.set_query(&query),
            UiEvent::ClickSort(key) => self.click_sort(key),
            UiEvent::SetStatsSource(source) => self.set_stats_source(source),
            UiEvent::ToggleTheme => self.toggle_theme(),
        }
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.state.mode = mode;
        self.prefs.set(VIEW_KEY, mode.as_str());
        self.refresh_last_updated();
    }

    pub fn set_query(&mut self, query: &str) {
        self.state.query = query.to_string();
    }

    pub fn click_sort(&mut self, key: SortKey) {
        self.state.sort.click(key);
    }

    pub fn set_stats_source(&mut self, source: StatsSource) {
        self.state.stats_source = source;
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        self.prefs.set(THEME_KEY, self.state.theme.as_str());
    }

    // stats always shows the collection's timestamp, whatever the stats source
    fn refresh_last_updated(&mut self) {
        let Some(catalog) = self.catalog() else {
            return;
        };
        let raw = match self.state.mode {
            ViewMode::Collection | ViewMode::Stats => catalog.collection_updated_at.clone(),
            ViewMode::Wantlist => catalog.wantlist_updated_at.clone(),
        };
        if let Some(text) = raw.as_deref().and_then(view::format_last_updated) {
            self.last_updated = Some(text);
        }
    }

    fn resolve_stats_source(&mut self) {
        let wantlist_empty = self
            .catalog()
            .map(|c| c.wantlist.is_empty())
            .unwrap_or(true);
        if self.state.stats_source == StatsSource::Wantlist && wantlist_empty {
            self.state.stats_source = StatsSource::Collection;
        }
    }

    fn render_table(&self) -> table::TableView {
        let catalog = match &self.load {
            LoadState::Failed(_) => return table::failed_table(self.state.sort),
            LoadState::Pending => None,
            LoadState::Loaded(catalog) => Some(catalog),
        };
        let Some(catalog) = catalog else {
            return table::build_table(
                &[],
                self.state.mode,
                &Default::default(),
                self.state.sort,
            );
        };
        let source = if self.state.mode == ViewMode::Wantlist {
            &catalog.wantlist
        } else {
            &catalog.collection
        };
        let items = query::apply(source, &self.state.query, self.state.sort);
        table::build_table(
            &items,
            self.state.mode,
            catalog.collection_ids(),
            self.state.sort,
        )
    }

    fn render_stats(&mut self) -> stats_view::StatsView {
        let has_data = self.catalog().map(|c| !c.is_empty()).unwrap_or(false);
        if !has_data {
            return stats_view::empty_stats();
        }
        self.resolve_stats_source();
        let source = self.state.stats_source;
        let Some(catalog) = self.catalog() else {
            return stats_view::empty_stats();
        };
        let data = stats::build_source_stats(catalog, source, &self.policy);
        stats_view::StatsView::Ready(stats_view::build_stats_panel(&data, source))
    }

    pub fn render(&mut self) -> Screen {
        let body = match self.state.mode {
            ViewMode::Stats => ScreenBody::Stats(self.render_stats()),
            ViewMode::Collection | ViewMode::Wantlist => ScreenBody::Table(self.render_table()),
        };
        Screen {
            theme: self.state.theme,
            view: self.state.mode,
            views: view::view_options(self.state.mode),
            last_updated: self.last_updated.clone(),
            show_controls: self.state.mode != ViewMode::Stats,
            query: self.state.query.clone(),
            body,
        }
    }
}
