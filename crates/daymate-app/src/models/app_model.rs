//! Top-level state holder.
//!
//! `AppModel` composes the auth session, location store, plan cache, remote
//! data state, plan history and view router. Backend calls that change what
//! the user owns (auth, location create/delete, history) are awaited
//! inline; weather/news fetches and plan generation run as service tasks
//! whose results come back over a channel and are applied by
//! [`AppModel::poll_messages`] or [`AppModel::settle`].

use std::sync::Arc;

use daymate_api::{DayMateClient, NewLocation, NewsSnapshot, PlanEnvelope, PlanRequest, WeatherSnapshot};
use daymate_auth::AuthSession;
use daymate_core::{AppError, AuthError, LocationError, PlanError, Screen, View};
use daymate_geo::{Coords, Geolocator};
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error_mapping::ApiErrorExt;
use crate::services::{
    self, DataError, DataServiceMessage, FetchRequest, PlanServiceMessage, ServiceMessage,
};

use super::history::PlanHistory;
use super::location::{Location, LocationSource};
use super::location_store::LocationStore;
use super::plan_cache::PlanCache;
use super::remote_data::{Accept, RemoteData};

/// A line shown to the user once, then cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Error(s) => s,
        }
    }
}

/// Failure of `add_location`.
#[derive(Debug, thiserror::Error)]
pub enum LocationOpError {
    #[error(transparent)]
    Invalid(LocationError),

    #[error("location was not saved: {0}")]
    Rejected(#[source] AppError),
}

/// Failure of `delete_location`. Local state is unchanged in every case.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    /// The device location can't be deleted. Not reported to the user.
    #[error("the current location cannot be deleted")]
    CurrentLocation,

    #[error("no location with id {0}")]
    NotFound(String),

    #[error("backend refused the delete: {0}")]
    Rejected(#[source] AppError),
}

pub struct AppModel {
    client: Arc<DayMateClient>,
    session: AuthSession,
    locations: LocationStore,
    plans: PlanCache,
    data: RemoteData,
    history: PlanHistory,
    view: View,
    preferences: Map<String, Value>,
    notices: Vec<Notice>,
    tx: UnboundedSender<ServiceMessage>,
    rx: UnboundedReceiver<ServiceMessage>,
    pending: usize,
}

impl AppModel {
    /// Build the model. The guest list is read from the session's store.
    pub fn new(
        client: Arc<DayMateClient>,
        session: AuthSession,
        preferences: Map<String, Value>,
    ) -> Self {
        let locations = LocationStore::load(session.store().clone());
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            session,
            locations,
            plans: PlanCache::new(),
            data: RemoteData::new(),
            history: PlanHistory::default(),
            view: View::default(),
            preferences,
            notices: Vec::new(),
            tx,
            rx,
            pending: 0,
        }
    }

    /// Resolve the device location once, load saved locations for a
    /// restored session, then pick an active location.
    pub async fn start(&mut self, geolocator: &Geolocator) {
        match geolocator.locate().await {
            Ok(coords) => self.locations.set_current(coords),
            Err(e) => self.notify_error(e),
        }

        if self.session.is_authenticated() {
            self.load_saved().await;
        }
        self.locations_changed();
    }

    // --- Navigation ---

    fn navigate(&mut self, to: View) -> bool {
        match self.view.transition(to) {
            Ok(view) => {
                tracing::debug!("View {} -> {}", self.view, view);
                self.view = view;
                true
            }
            Err(e) => {
                tracing::debug!("Rejected navigation: {}", e);
                self.notices.push(Notice::Error(format!("Cannot {}.", e)));
                false
            }
        }
    }

    pub fn go_home(&mut self) {
        self.plans.clear();
        self.navigate(View::Home);
    }

    pub fn continue_as_guest(&mut self) -> bool {
        self.navigate(View::Main)
    }

    pub fn open_login(&mut self) -> bool {
        if !self.navigate(View::Login) {
            return false;
        }
        self.plans.clear();
        self.view = self.view.settle(self.session.is_authenticated());
        true
    }

    pub fn open_register(&mut self) -> bool {
        self.navigate(View::Register)
    }

    /// Show past plans. History needs a token; without one the dashboard
    /// keeps rendering and nothing is fetched.
    pub async fn open_history(&mut self) -> bool {
        if !self.navigate(View::History) {
            return false;
        }
        let Some(token) = self.session.token().map(str::to_owned) else {
            return true;
        };

        self.history.begin();
        match self.client.plan_history(&token).await {
            Ok(entries) => self.history.finish(entries),
            Err(e) => {
                self.history.fail();
                self.notify_error(PlanError::HistoryFailed(e.into_network_error()));
            }
        }
        true
    }

    pub fn back_to_main(&mut self) -> bool {
        self.navigate(View::Main)
    }

    // --- Auth ---

    /// Exchange credentials for a token and adopt it. On success the plan
    /// cache is dropped, the view moves on to the dashboard and saved
    /// locations are loaded fresh.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let token = match self.client.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                let err = e.into_auth_error();
                tracing::warn!("Login failed: {}", err);
                self.notices.push(Notice::Error(err.user_message()));
                return Err(err);
            }
        };

        if let Err(e) = self.session.adopt(token) {
            self.notify_error(e);
        }
        tracing::info!("Signed in");

        self.plans.clear();
        self.history.clear();
        self.view = match self.view.transition(View::Main) {
            Ok(view) => view,
            Err(_) => self.view.settle(true),
        };

        self.load_saved().await;
        self.locations_changed();
        Ok(())
    }

    /// Create an account. Does not sign in; moves to the login screen.
    pub async fn register(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        match self.client.register(full_name, email, password).await {
            Ok(()) => {
                self.notices
                    .push(Notice::Info("Registration successful. Please login.".into()));
                if self.view == View::Register {
                    self.navigate(View::Login);
                }
                Ok(())
            }
            Err(e) => {
                let err = e.into_auth_error();
                tracing::warn!("Registration failed: {}", err);
                self.notices.push(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            self.notify_error(e);
        }
        tracing::info!("Signed out");

        self.plans.clear();
        self.history.clear();
        self.locations.clear_saved();
        self.view = View::Home;
        self.locations_changed();
    }

    async fn load_saved(&mut self) {
        let Some(token) = self.session.token().map(str::to_owned) else {
            self.locations.replace_saved(Vec::new());
            return;
        };

        match self.client.list_locations(&token).await {
            Ok(records) => {
                tracing::info!("Loaded {} saved locations", records.len());
                self.locations
                    .replace_saved(records.into_iter().map(Location::saved).collect());
            }
            Err(e) => {
                self.locations.replace_saved(Vec::new());
                self.notify_error(LocationError::LoadFailed(e.into_network_error()));
            }
        }
    }

    // --- Locations ---

    /// Add a location and make it active.
    ///
    /// Signed in, the backend assigns the id and the location is saved to
    /// the account; otherwise it is kept on this device. An empty label
    /// defaults to `Location <n>`.
    pub async fn add_location(
        &mut self,
        label: &str,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Location, LocationOpError> {
        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                let err = LocationError::InvalidInput("missing coordinates".into());
                self.notices.push(Notice::Error(err.user_message().into()));
                return Err(LocationOpError::Invalid(err));
            }
        };
        let coords = Coords::new(lat, lon);
        if !coords.is_valid() {
            let err = LocationError::OutOfRange(coords.to_string());
            self.notices.push(Notice::Error(err.user_message().into()));
            return Err(LocationOpError::Invalid(err));
        }

        let authenticated = self.session.is_authenticated();
        let label = match label.trim() {
            "" => format!("Location {}", self.locations.visible(authenticated).len() + 1),
            trimmed => trimmed.to_string(),
        };

        let location = match self.session.token().map(str::to_owned) {
            Some(token) => {
                let request = NewLocation { label, lat, lon };
                match self.client.create_location(&token, &request).await {
                    Ok(record) => {
                        let location = Location::saved(record);
                        self.locations.insert_saved(location.clone());
                        location
                    }
                    Err(e) => {
                        let err = AppError::from(LocationError::SaveFailed(e.into_network_error()));
                        self.notify(&err);
                        return Err(LocationOpError::Rejected(err));
                    }
                }
            }
            None => {
                let location = Location::guest(label, lat, lon);
                if let Err(e) = self.locations.insert_guest(location.clone()) {
                    self.notify_error(e);
                }
                location
            }
        };

        tracing::info!("Added {} location {}", location.source.label(), location.id);
        self.refresh();
        Ok(location)
    }

    /// Delete a saved or guest location.
    ///
    /// Saved locations are deleted on the backend first; if that fails
    /// nothing changes locally. On success the location's plan is evicted
    /// and, if it was active, the first remaining location becomes active.
    pub async fn delete_location(&mut self, id: &str) -> Result<Location, DeleteError> {
        let authenticated = self.session.is_authenticated();
        let Some(target) = self.locations.find(id, authenticated).cloned() else {
            return Err(DeleteError::NotFound(id.to_string()));
        };

        match target.source {
            LocationSource::Current => return Err(DeleteError::CurrentLocation),
            LocationSource::Saved => {
                let Some(token) = self.session.token().map(str::to_owned) else {
                    return Err(DeleteError::Rejected(AuthError::NotAuthenticated.into()));
                };
                if let Err(e) = self.client.delete_location(&token, id).await {
                    let err = AppError::from(LocationError::DeleteFailed(e.into_network_error()));
                    self.notify(&err);
                    return Err(DeleteError::Rejected(err));
                }
            }
            LocationSource::Guest => {}
        }

        if let Err(e) = self.locations.remove(id) {
            self.notify_error(e);
        }
        self.plans.evict(id);
        tracing::info!("Deleted {} location {}", target.source.label(), id);

        self.locations_changed();
        Ok(target)
    }

    /// Make `id` active. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if self.locations.active_id() == Some(id) {
            return true;
        }
        if !self.locations.select(id, self.session.is_authenticated()) {
            return false;
        }
        self.refresh();
        true
    }

    /// Re-pick the active location after the visible list changed and
    /// fetch data if the selection moved.
    fn locations_changed(&mut self) {
        let before = self.locations.active_id().map(str::to_owned);
        self.locations.reconcile(self.session.is_authenticated());
        let after = self.locations.active_id().map(str::to_owned);

        match after {
            None => self.data.clear(),
            Some(id) if before.as_deref() != Some(&id) || self.data.requested_for() != Some(&id) => {
                self.refresh()
            }
            Some(_) => {}
        }
    }

    // --- Weather, news and plans ---

    /// Fetch weather and news for the active location.
    pub fn refresh(&mut self) {
        let Some(location) = self.locations.active(self.session.is_authenticated()).cloned() else {
            self.data.clear();
            return;
        };

        let (generation, cancel) = self.data.begin(&location.id);
        tracing::debug!("Fetching data for {} (generation {})", location.id, generation);
        services::request_fetch(
            &self.tx,
            Arc::clone(&self.client),
            FetchRequest {
                location_id: location.id,
                generation,
                lat: location.lat,
                lon: location.lon,
                token: self.session.token().map(str::to_owned),
                cancel,
            },
        );
        self.pending += 1;
    }

    /// Start generating a plan for the active location.
    pub fn generate_plan(&mut self) -> Result<(), PlanError> {
        let Some(location) = self.locations.active(self.session.is_authenticated()).cloned() else {
            let err = PlanError::NoLocation;
            self.notices.push(Notice::Error(err.user_message().into()));
            return Err(err);
        };

        let epoch = self.plans.begin();
        let request = PlanRequest {
            lat: location.lat,
            lon: location.lon,
            location_name: location.label,
            preferences: self.preferences.clone(),
        };
        services::request_generate(
            &self.tx,
            Arc::clone(&self.client),
            location.id,
            epoch,
            self.session.token().map(str::to_owned),
            request,
        );
        self.pending += 1;
        Ok(())
    }

    /// Backend health probe for the status line.
    pub async fn backend_healthy(&self) -> bool {
        match self.client.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                false
            }
        }
    }

    // --- Service results ---

    /// Apply every service result that has already arrived.
    pub fn poll_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.apply(msg);
        }
    }

    /// Wait until every outstanding service task has reported back.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(msg) => {
                    self.pending -= 1;
                    self.apply(msg);
                }
                None => break,
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    fn apply(&mut self, msg: ServiceMessage) {
        match msg {
            ServiceMessage::Data(DataServiceMessage::FetchDone {
                location_id,
                generation,
                result,
            }) => {
                let active = self.locations.active_id().map(str::to_owned);
                match self.data.accept(&location_id, generation, active.as_deref()) {
                    Accept::Stale => {
                        tracing::debug!(
                            "Discarding stale data for {} (active: {:?})",
                            location_id,
                            active
                        );
                        self.data.discard(generation);
                    }
                    Accept::Current => match result {
                        Ok((weather, news)) => self.data.apply(&location_id, weather, news),
                        Err(DataError::Cancelled) => self.data.fail(),
                        Err(e) => {
                            self.data.fail();
                            self.notify_error(e);
                        }
                    },
                }
            }
            ServiceMessage::Plan(PlanServiceMessage::GenerateDone {
                location_id,
                epoch,
                result,
            }) => match result {
                Ok(plan) => {
                    let known = self
                        .locations
                        .find(&location_id, self.session.is_authenticated())
                        .is_some();
                    if known {
                        self.plans.finish(&location_id, epoch, Some(plan));
                    } else {
                        tracing::debug!("Dropping plan for removed location {}", location_id);
                        self.plans.finish(&location_id, epoch, None);
                    }
                }
                Err(e) => {
                    self.plans.finish(&location_id, epoch, None);
                    self.notify_error(e);
                }
            },
        }
    }

    // --- Notices ---

    fn notify(&mut self, err: &AppError) {
        tracing::warn!("{}", err);
        self.notices.push(Notice::Error(err.user_message()));
    }

    fn notify_error(&mut self, err: impl Into<AppError>) {
        let err = err.into();
        self.notify(&err);
    }

    /// Drain notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    // --- History ---

    pub fn toggle_history_entry(&mut self, id: &str) -> bool {
        self.history.toggle(id)
    }

    pub fn history(&self) -> &PlanHistory {
        &self.history
    }

    // --- Read access for rendering ---

    pub fn view(&self) -> View {
        self.view
    }

    pub fn screen(&self) -> Screen {
        self.view.screen(self.session.is_authenticated())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Visible locations in tab order.
    pub fn tabs(&self) -> Vec<&Location> {
        self.locations.tabs(self.session.is_authenticated())
    }

    /// Visible locations in list order.
    pub fn locations(&self) -> Vec<&Location> {
        self.locations.visible(self.session.is_authenticated())
    }

    pub fn location_store(&self) -> &LocationStore {
        &self.locations
    }

    pub fn active_location(&self) -> Option<&Location> {
        self.locations.active(self.session.is_authenticated())
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.data.weather()
    }

    pub fn news(&self) -> Option<&NewsSnapshot> {
        self.data.news()
    }

    /// Location the displayed weather/news belong to.
    pub fn data_location(&self) -> Option<&str> {
        self.data.shown_for()
    }

    pub fn data_loading(&self) -> bool {
        self.data.is_loading()
    }

    pub fn plan_for(&self, location_id: &str) -> Option<&PlanEnvelope> {
        self.plans.get(location_id)
    }

    /// Cached plan of the active location.
    pub fn active_plan(&self) -> Option<&PlanEnvelope> {
        self.active_location()
            .and_then(|loc| self.plans.get(&loc.id))
    }

    pub fn plan_loading(&self) -> bool {
        self.plans.is_loading()
    }

    pub fn cached_plan_count(&self) -> usize {
        self.plans.len()
    }
}

impl std::fmt::Debug for AppModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppModel")
            .field("view", &self.view)
            .field("authenticated", &self.session.is_authenticated())
            .field("active", &self.locations.active_id())
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daymate_auth::{LocalStore, GUEST_LOCATIONS_KEY};
    use std::time::Duration;

    fn model() -> AppModel {
        // Port 9 is discard; nothing here reaches the network
        let client = DayMateClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        AppModel::new(
            Arc::new(client),
            AuthSession::restore(LocalStore::in_memory()),
            Map::new(),
        )
    }

    #[tokio::test]
    async fn generate_without_location_fails_fast() {
        let mut model = model();
        let err = model.generate_plan().unwrap_err();
        assert!(matches!(err, PlanError::NoLocation));
        assert!(!model.plan_loading());
        assert!(!model.has_pending());
        assert_eq!(
            model.take_notices(),
            vec![Notice::Error("Select or add a location first.".into())]
        );
    }

    #[tokio::test]
    async fn add_requires_both_coordinates() {
        let mut model = model();
        let err = model.add_location("Home", Some(1.0), None).await.unwrap_err();
        assert!(matches!(err, LocationOpError::Invalid(_)));
        assert!(model.locations().is_empty());
        assert_eq!(
            model.take_notices()[0].text(),
            "Latitude and longitude are required."
        );
    }

    #[tokio::test]
    async fn add_rejects_out_of_range() {
        let mut model = model();
        assert!(model.add_location("X", Some(91.0), Some(0.0)).await.is_err());
        assert!(model.locations().is_empty());
    }

    #[tokio::test]
    async fn guest_add_defaults_label_and_persists() {
        let mut model = model();
        let loc = model.add_location("  ", Some(23.8), Some(90.4)).await.unwrap();
        assert_eq!(loc.label, "Location 1");
        assert_eq!(loc.source, LocationSource::Guest);
        assert_eq!(model.active_location().map(|l| l.id.as_str()), Some(loc.id.as_str()));

        let stored = model.session().store().get(GUEST_LOCATIONS_KEY).unwrap().unwrap();
        assert!(stored.contains(&loc.id));
    }

    #[tokio::test]
    async fn current_location_delete_is_silent() {
        let mut model = model();
        model.start(&Geolocator::Fixed(Coords::new(1.0, 2.0))).await;
        let err = model.delete_location("current").await.unwrap_err();
        assert!(matches!(err, DeleteError::CurrentLocation));
        assert!(model.take_notices().is_empty());
        assert_eq!(model.locations().len(), 1);
    }

    #[tokio::test]
    async fn geolocation_failure_becomes_notice() {
        let mut model = model();
        model.start(&Geolocator::Disabled).await;
        assert_eq!(
            model.take_notices(),
            vec![Notice::Error(
                "Geolocation not supported. Please enter location manually.".into()
            )]
        );
        assert!(model.active_location().is_none());
    }

    #[test]
    fn router_rejects_register_from_home() {
        let mut model = model();
        assert!(!model.open_register());
        assert_eq!(model.view(), View::Home);
        assert!(!model.take_notices().is_empty());
    }

    #[test]
    fn guest_flow_navigation() {
        let mut model = model();
        assert!(model.continue_as_guest());
        assert_eq!(model.screen(), Screen::Dashboard);
        assert!(model.open_login());
        assert!(model.open_register());
        assert_eq!(model.screen(), Screen::Register);
        model.go_home();
        assert_eq!(model.view(), View::Home);
    }
}
