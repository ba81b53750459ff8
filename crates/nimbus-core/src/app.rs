use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use nimbus_state::session::FETCH_ERROR_LABEL;
use nimbus_state::{
    resolve_theme, ColorScheme, ColorSchemeSource, FavoriteToggle, Favorites, KeyValueStore,
    PreferenceEvent, PreferenceStore, SearchHistory, SqliteStore, StateError, TerminalColorScheme, ThemeMode,
    WeatherSession,
};
use nimbus_weather::{
    format_for_display, CurrentConditions, DisplayModel, IpLocator, Locator, MeasurementSystem,
    TemperatureUnit, UnitSet, WeatherError, WeatherPayload, WeatherProvider,
};

use crate::error::{AppError, ConfigError};
use crate::Config;

const LOCATION_ERROR_LABEL: &str = "Unable to get location";

/// Everything the dashboard remembers, owned by [`App`].
pub struct AppState {
    pub preferences: PreferenceStore,
    pub favorites: Favorites,
    pub history: SearchHistory,
    pub session: WeatherSession,
}

impl AppState {
    /// Initialize persisted state from `store`, defaults where absent.
    pub fn load(store: Arc<dyn KeyValueStore>, units: UnitSet) -> Self {
        Self {
            preferences: PreferenceStore::load(store.clone(), units),
            favorites: Favorites::load(store.clone()),
            history: SearchHistory::load(store),
            session: WeatherSession::new(),
        }
    }
}

/// Top-level controller: runs fetches, applies preference changes and hands
/// display models to whatever renders them.
pub struct App<L: Locator = IpLocator> {
    config: Arc<Config>,
    provider: WeatherProvider,
    locator: L,
    scheme: Box<dyn ColorSchemeSource>,
    state: AppState,
}

impl App<IpLocator> {
    /// Open the state database and wire up the production collaborators.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or the HTTP client built.
    pub fn new(config: Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.config_dir)?;
        let store = SqliteStore::open(config.database_path())?;
        let locator = IpLocator::new(config.location.lookup_url.clone());
        Self::with_parts(config, Arc::new(store), locator, Box::new(TerminalColorScheme))
    }
}

impl<L: Locator> App<L> {
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be built.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        locator: L,
        scheme: Box<dyn ColorSchemeSource>,
    ) -> Result<Self, AppError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        let provider = WeatherProvider::new(
            &config.provider.base_url,
            config.provider.api_key.clone(),
            Duration::from_secs(config.provider.request_timeout_secs),
        )?;
        let state = AppState::load(store, config.features.unit_set());

        tracing::info!(
            "Dashboard ready: {} favorites, {} recent searches",
            state.favorites.list().len(),
            state.history.list().len()
        );

        Ok(Self {
            config: Arc::new(config),
            provider,
            locator,
            scheme,
            state,
        })
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unit and theme changes, for views that redraw on their own.
    pub fn subscribe(&self) -> broadcast::Receiver<PreferenceEvent> {
        self.state.preferences.subscribe()
    }

    /// Fetch and show the weather for `city`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previous payload stays on screen.
    pub async fn search(&mut self, city: &str) -> Result<DisplayModel, AppError> {
        let system = MeasurementSystem::for_unit(self.state.preferences.unit());
        let result = self.provider.current_by_city(city, system).await;
        self.complete_fetch(result, system).await
    }

    /// Locate the device, then fetch and show its weather.
    ///
    /// # Errors
    ///
    /// Geolocation errors are returned as-is for a blocking notice; fetch
    /// errors behave as in [`App::search`].
    pub async fn locate(&mut self) -> Result<DisplayModel, AppError> {
        let coords = match self.locator.locate().await {
            Ok(coords) => coords,
            Err(e) => {
                tracing::warn!("Geolocation failed: {}", e);
                self.state.session.record_failure(LOCATION_ERROR_LABEL);
                return Err(e.into());
            }
        };

        let system = MeasurementSystem::for_unit(self.state.preferences.unit());
        let result = self.provider.current_by_coords(coords, system).await;
        self.complete_fetch(result, system).await
    }

    /// First run with nothing saved: locate automatically, once.
    pub fn should_auto_locate(&self) -> bool {
        self.config.location.auto_locate
            && !self.state.preferences.has_searched()
            && self.state.favorites.list().is_empty()
            && self.state.history.is_empty()
    }

    /// Run the one-time automatic geolocation. The flag is set whatever the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`App::locate`].
    pub async fn auto_locate(&mut self) -> Result<DisplayModel, AppError> {
        let result = self.locate().await;
        self.mark_searched();
        result
    }

    pub fn mark_searched(&self) {
        self.state.preferences.mark_searched();
    }

    async fn complete_fetch(
        &mut self,
        result: Result<CurrentConditions, WeatherError>,
        system: MeasurementSystem,
    ) -> Result<DisplayModel, AppError> {
        let current = match result {
            Ok(current) => current,
            Err(e) => {
                tracing::error!("Error fetching weather: {}", e);
                self.state.session.record_failure(FETCH_ERROR_LABEL);
                return Err(e.into());
            }
        };

        let city = current.name.clone();
        let coords = current.coord;
        let mut payload = WeatherPayload::new(system, current);

        match self.provider.forecast(&city, system).await {
            Ok(forecast) => payload.forecast = Some(forecast),
            Err(e) => tracing::error!("Error fetching forecast: {}", e),
        }

        if self.config.features.air_quality {
            match self.provider.air_quality(coords).await {
                Ok(level) => payload.air_quality = level,
                Err(e) => tracing::error!("Error fetching air quality: {}", e),
            }
        }

        let model = self.render(&payload);
        self.state.session.set_current(city.clone(), payload);
        self.state.history.record(&city);
        tracing::info!("Showing weather for {}", city);

        Ok(model)
    }

    /// Current display, re-derived from the stored payload.
    pub fn display(&self) -> Option<DisplayModel> {
        let (_, payload) = self.state.session.current()?;
        let mut model = self.render(payload);
        if let Some(label) = self.state.session.location_label() {
            model.location = label.to_string();
        }
        Some(model)
    }

    fn render(&self, payload: &WeatherPayload) -> DisplayModel {
        let mut model = format_for_display(payload, self.state.preferences.unit());
        if !self.config.features.hourly_trend {
            model.hourly = None;
        }
        if !self.config.features.air_quality {
            model.air_quality = None;
        }
        model
    }

    /// What the location line reads, including error text after a failure.
    pub fn location_label(&self) -> Option<&str> {
        self.state.session.location_label()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.preferences.unit()
    }

    /// # Errors
    ///
    /// `UnitNotEnabled` when the unit is switched off in `features`.
    pub fn set_unit(&mut self, unit: TemperatureUnit) -> Result<(), AppError> {
        Ok(self.state.preferences.set_unit(unit)?)
    }

    /// Next unit; redisplay with [`App::display`], no fetch needed.
    pub fn cycle_unit(&mut self) -> TemperatureUnit {
        self.state.preferences.cycle_unit()
    }

    pub fn theme(&self) -> ThemeMode {
        self.state.preferences.theme()
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.state.preferences.set_theme(theme);
    }

    pub fn cycle_theme(&mut self) -> ThemeMode {
        self.state.preferences.cycle_theme()
    }

    /// The theme to paint with right now.
    pub fn resolved_theme(&self) -> ColorScheme {
        resolve_theme(self.state.preferences.theme(), self.scheme.as_ref())
    }

    /// Toggle the city currently on screen.
    ///
    /// # Errors
    ///
    /// `NoCurrentCity` before the first successful fetch.
    pub fn toggle_favorite(&mut self) -> Result<FavoriteToggle, AppError> {
        let city = self
            .state
            .session
            .current_city()
            .ok_or(StateError::NoCurrentCity)?
            .to_string();
        Ok(self.state.favorites.toggle(&city)?)
    }

    pub fn is_current_favorite(&self) -> bool {
        self.state
            .session
            .current_city()
            .is_some_and(|city| self.state.favorites.is_favorite(city))
    }

    pub fn remove_favorite(&mut self, city: &str) {
        self.state.favorites.remove(city);
    }

    pub fn favorites(&self) -> &[String] {
        self.state.favorites.list()
    }

    pub fn history(&self) -> &[String] {
        self.state.history.list()
    }
}
