//! Front-end state machine: one search box, one weather card.
//!
//! Every handler returns the views to draw; nothing here writes to the
//! terminal directly.

use weathercards_core::{AppError, InputError};
use weathercards_weather::{
    CityId, DataSource, DataStore, Debouncer, MergedCityWeather, SyncEvent, Theme, ThemeStore,
    WeatherPatch,
};

use crate::command::{Command, HELP};
use crate::error_mapping::{sync_failure, theme_failure, StoreErrorExt};
use crate::render::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Lightweight hint, e.g. bad input
    Info,
    /// Degraded but working
    Warning,
    /// Something the user asked for failed
    Alert,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Alert,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Suggestion labels under the search box
    Suggestions(Vec<String>),
    HideSuggestions,
    Card(MergedCityWeather),
    ClearCard,
    Notice(Notice),
    ThemeChanged(Theme),
    Text(String),
}

pub struct Session {
    store: DataStore,
    themes: ThemeStore,
    debouncer: Debouncer<String>,
    suggestions: Vec<MergedCityWeather>,
    current: Option<CityId>,
    /// Search box value waiting on the debouncer
    pending_query: Option<String>,
    /// City awaiting a delete confirmation
    pending_delete: Option<CityId>,
}

impl Session {
    pub fn new(store: DataStore, themes: ThemeStore, debouncer: Debouncer<String>) -> Self {
        Self {
            store,
            themes,
            debouncer,
            suggestions: Vec::new(),
            current: None,
            pending_query: None,
            pending_delete: None,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        self.themes.current()
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.theme())
    }

    /// City whose card is shown
    pub fn current(&self) -> Option<&CityId> {
        self.current.as_ref()
    }

    /// Load the dataset and apply the saved theme
    pub async fn start(&mut self) -> Vec<View> {
        let records = self.store.load().await;

        let mut views = vec![View::ThemeChanged(self.theme())];
        if let Some(DataSource::Fallback { .. }) = self.store.source() {
            views.push(View::Notice(Notice::warning(
                "Weather service unavailable, showing built-in data",
            )));
        }
        views.push(View::Text(format!(
            "{} cities loaded. Type a city name or /help.",
            records.len()
        )));
        views
    }

    /// Apply one command.
    ///
    /// While a delete awaits confirmation, `y` or `/delete` commits it. Any
    /// other text cancels it, and any other command cancels it and then runs.
    pub async fn handle(&mut self, command: Command) -> Vec<View> {
        let Some(id) = self.pending_delete.take() else {
            return self.dispatch(command).await;
        };

        let confirmed = match &command {
            Command::Delete => true,
            Command::Type(text) => is_confirmation(text),
            _ => false,
        };
        if confirmed {
            let result = self.delete_now(&id);
            return self.outcome(result);
        }

        let mut views = vec![View::Notice(Notice::info("Delete cancelled"))];
        if !matches!(command, Command::Type(_)) {
            views.extend(self.dispatch(command).await);
        }
        views
    }

    async fn dispatch(&mut self, command: Command) -> Vec<View> {
        let result = match command {
            Command::Type(text) => Ok(self.type_text(text)),
            Command::Search(name) => self.search(&name),
            Command::Pick(n) => self.pick(n),
            Command::Edit {
                temp_c,
                description,
            } => self.edit(temp_c, description),
            Command::Delete => self.request_delete(),
            Command::ToggleTheme => self.toggle_theme(),
            Command::Refresh => Ok(self.refresh().await),
            Command::List => Ok(self.list()),
            Command::Help => Ok(vec![View::Text(HELP.to_string())]),
            Command::Quit => Ok(Vec::new()),
        };

        self.outcome(result)
    }

    fn outcome(&self, result: Result<Vec<View>, AppError>) -> Vec<View> {
        result.unwrap_or_else(|e| self.error_views(e))
    }

    /// Views for a line that could not be parsed
    pub fn input_error(&mut self, error: InputError) -> Vec<View> {
        let mut views = Vec::new();
        if self.pending_delete.take().is_some() {
            views.push(View::Notice(Notice::info("Delete cancelled")));
        }
        views.extend(self.error_views(error.into()));
        views
    }

    fn type_text(&mut self, text: String) -> Vec<View> {
        self.pending_query = Some(text.clone());
        self.debouncer.schedule(text);
        Vec::new()
    }

    fn drop_pending_query(&mut self) {
        self.debouncer.cancel();
        self.pending_query = None;
    }

    /// Show suggestions for a debounced search box value.
    ///
    /// Values other than the one still awaited are stale and ignored.
    pub fn on_debounced(&mut self, query: &str) -> Vec<View> {
        if self.pending_query.as_deref() != Some(query) {
            tracing::trace!("Ignoring stale suggestion query {:?}", query);
            return Vec::new();
        }
        self.pending_query = None;

        self.suggestions = self.store.suggest(query);
        if self.suggestions.is_empty() {
            return vec![View::HideSuggestions];
        }
        vec![View::Suggestions(
            self.suggestions.iter().map(|r| r.label()).collect(),
        )]
    }

    fn search(&mut self, name: &str) -> Result<Vec<View>, AppError> {
        self.drop_pending_query();

        let name = name.trim();
        if name.is_empty() {
            return Err(InputError::EmptyQuery.into());
        }

        let record = self
            .store
            .find_exact(name)
            .ok_or_else(|| InputError::NoMatch(name.to_string()))?;
        Ok(self.show(record))
    }

    fn pick(&mut self, n: usize) -> Result<Vec<View>, AppError> {
        let picked = n
            .checked_sub(1)
            .and_then(|i| self.suggestions.get(i))
            .ok_or_else(|| InputError::InvalidArgument(format!("no suggestion {}", n)))?;

        // Suggestions can be stale after a delete
        let record = self
            .store
            .get(&picked.id)
            .ok_or_else(|| InputError::NoMatch(picked.name.clone()))?;
        Ok(self.show(record))
    }

    fn show(&mut self, record: MergedCityWeather) -> Vec<View> {
        self.drop_pending_query();
        self.current = Some(record.id.clone());
        self.suggestions.clear();
        vec![View::HideSuggestions, View::Card(record)]
    }

    fn selected(&self) -> Result<CityId, AppError> {
        self.current
            .clone()
            .ok_or_else(|| InputError::NoSelection.into())
    }

    fn edit(&mut self, temp_c: f64, description: Option<String>) -> Result<Vec<View>, AppError> {
        let id = self.selected()?;
        let patch = WeatherPatch {
            temp_c: Some(temp_c),
            description,
            ..Default::default()
        };

        let updated = self
            .store
            .update(&id, &patch)
            .map_err(StoreErrorExt::into_app_error)?;
        Ok(vec![View::Card(updated)])
    }

    fn request_delete(&mut self) -> Result<Vec<View>, AppError> {
        let id = self.selected()?;
        let name = self.city_name(&id);
        self.pending_delete = Some(id);

        Ok(vec![View::Notice(Notice::warning(format!(
            "Are you sure you want to delete {}? Type y to confirm.",
            name
        )))])
    }

    fn delete_now(&mut self, id: &CityId) -> Result<Vec<View>, AppError> {
        let name = self.city_name(id);
        self.store
            .delete(id)
            .map_err(StoreErrorExt::into_app_error)?;

        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        self.suggestions.retain(|r| &r.id != id);
        Ok(vec![
            View::ClearCard,
            View::Notice(Notice::info(format!("Deleted {}", name))),
        ])
    }

    fn city_name(&self, id: &CityId) -> String {
        self.store
            .get(id)
            .map(|r| r.name)
            .unwrap_or_else(|| id.to_string())
    }

    fn toggle_theme(&mut self) -> Result<Vec<View>, AppError> {
        let theme = self.themes.toggle().map_err(theme_failure)?;

        let mut views = vec![View::ThemeChanged(theme)];
        if let Some(record) = self.current.as_ref().and_then(|id| self.store.get(id)) {
            views.push(View::Card(record));
        }
        Ok(views)
    }

    async fn refresh(&mut self) -> Vec<View> {
        let records = self.store.refresh().await;
        self.suggestions.clear();

        let mut views = Vec::new();
        let shown = self.current.as_ref().and_then(|id| self.store.get(id));
        match shown {
            Some(record) => views.push(View::Card(record)),
            None => {
                if self.current.take().is_some() {
                    views.push(View::ClearCard);
                }
            }
        }

        let text = format!("{} cities loaded", records.len());
        match self.store.source() {
            Some(DataSource::Fallback { .. }) => views.push(View::Notice(Notice::warning(
                format!("{} (built-in data, weather service unavailable)", text),
            ))),
            _ => views.push(View::Notice(Notice::info(text))),
        }
        views
    }

    fn list(&mut self) -> Vec<View> {
        self.suggestions = self.store.records();
        if self.suggestions.is_empty() {
            return vec![View::Notice(Notice::info("No cities"))];
        }
        vec![View::Suggestions(
            self.suggestions.iter().map(|r| r.label()).collect(),
        )]
    }

    /// Report the outcome of a background sync
    pub fn on_sync_event(&mut self, event: SyncEvent) -> Vec<View> {
        match event {
            SyncEvent::Synced { id, op } => {
                tracing::debug!("{:?} of {} confirmed by remote", op, id);
                Vec::new()
            }
            SyncEvent::Failed {
                id,
                op,
                message,
                reverted,
            } => {
                let error = sync_failure(op, message.clone());
                let mut text = format!("{} ({})", error.user_message(), message);
                if reverted {
                    text.push_str(". The change was undone.");
                }

                let mut views = vec![View::Notice(Notice::alert(text))];
                if reverted && self.current.as_ref() == Some(&id) {
                    if let Some(record) = self.store.get(&id) {
                        views.push(View::Card(record));
                    }
                }
                views
            }
        }
    }

    fn error_views(&self, error: AppError) -> Vec<View> {
        if error.is_input() {
            tracing::debug!("Input rejected: {}", error);
            return vec![View::Notice(Notice::info(error.user_message()))];
        }
        tracing::warn!("{}", error);
        vec![View::Notice(Notice::alert(error.user_message()))]
    }
}

fn is_confirmation(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "y" | "yes")
}
