// src/app/controller.rs

use crate::app::state::{
    AppState, DayUpdate, FlyTo, FormInput, Level, Mode, SaleForm, Theme,
};
use crate::arcgis::{with_retry, AddressQuery, FeatureService, Geocoder, Suggestion};
use crate::config::Config;
use crate::db::drafts::{clear_draft, load_draft, save_draft};
use crate::db::preferences::{get_preference, set_preference, THEME_KEY};
use crate::db::Database;
use crate::domain::dates::{to_epoch_maybe, weekday_of};
use crate::domain::description::schedule_warnings;
use crate::domain::GarageSaleListing;
use crate::errors::{AdminError, Result};
use crate::geo::LatLng;
use chrono::Datelike;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

const FOCUS_ZOOM: u8 = 17;

/// Which input a picked address suggestion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionTarget {
    /// The sale form's address field.
    FormAddress,
    /// The map search box; only moves the map.
    Search,
}

enum EditKind {
    Add,
    Update,
}

/// A validated save, taken out of the lock for the network call.
struct PendingSave {
    kind: EditKind,
    listing: GarageSaleListing,
    /// `AppState::flow` when the save began.
    flow: u64,
}

/// Owns the application state and runs every user operation against the
/// feature service and geocoder. The state lock is never held across a
/// network call.
pub struct AdminApp<S, G> {
    config: Config,
    service: S,
    geocoder: G,
    db: Database,
    state: Mutex<AppState>,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl<S: FeatureService, G: Geocoder> AdminApp<S, G> {
    pub fn new(config: Config, service: S, geocoder: G, db: Database) -> Self {
        let default_theme = if config.dark_mode_default {
            Theme::Dark
        } else {
            Theme::Light
        };
        let theme = match db.with_conn(|conn| get_preference(conn, THEME_KEY)) {
            Ok(saved) => saved.as_deref().and_then(Theme::parse).unwrap_or(default_theme),
            Err(e) => {
                warn!("⚠️ Could not read theme preference: {e}");
                default_theme
            }
        };

        Self {
            config,
            service,
            geocoder,
            db,
            state: Mutex::new(AppState::new(theme)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A copy of the current state, for rendering.
    pub fn snapshot(&self) -> AppState {
        self.state().clone()
    }

    /// Like [`snapshot`](Self::snapshot), but hands over pending toasts and
    /// the pending map pan so each is shown once.
    pub fn drain_view(&self) -> AppState {
        let mut state = self.state();
        let view = state.clone();
        state.toasts.clear();
        state.fly_to = None;
        view
    }

    #[cfg(test)]
    pub fn take_toasts(&self) -> Vec<crate::app::state::Toast> {
        std::mem::take(&mut self.state().toasts)
    }

    /// Re-queries the layer, retrying with linear backoff. On success the
    /// cache is replaced; on failure it is left as it was.
    pub fn load_listings(&self) -> Result<usize> {
        info!("🔄 Loading garage sales...");
        let result = with_retry(
            "Loading garage sales",
            self.config.max_retries,
            self.config.retry_backoff(),
            |_| self.service.query_all(),
        );

        let mut state = self.state();
        match result {
            Ok(query) => {
                let layer = self.config.layer_spatial_reference();
                let reference = query.spatial_reference.unwrap_or(layer);
                if let Some(wkid) = query.unsupported_wkid {
                    warn!("⚠️ Unsupported spatial reference {wkid}, assuming {}", layer.wkid());
                    state.toast(
                        Level::Warning,
                        format!(
                            "Layer uses spatial reference {wkid}; positions assume {}",
                            layer.wkid()
                        ),
                    );
                }
                state.listings = query
                    .features
                    .iter()
                    .map(|f| GarageSaleListing::from_feature(f, reference))
                    .collect();

                let count = state.listings.len();
                if !state.is_placing() {
                    if count == 0 {
                        state.set_status(
                            Level::Info,
                            "No garage sales found. Click 'New Sale' to add the first one.",
                        );
                    } else {
                        state.set_status(
                            Level::Success,
                            format!("{count} garage sales loaded successfully."),
                        );
                    }
                }
                Ok(count)
            }
            Err(e) => {
                error!("❌ Failed to load garage sales: {e}");
                state.set_status(
                    Level::Warning,
                    "Could not load existing garage sales. You can still add new ones.",
                );
                state.toast(Level::Error, format!("Could not load garage sales: {e}"));
                Err(e)
            }
        }
    }

    pub fn enter_add_mode(&self) {
        let mut state = self.state();
        match state.mode {
            // A restored draft stays in the form.
            Mode::Idle => {
                state.flow += 1;
                state.mode = Mode::Adding;
                state.placement = None;
            }
            Mode::Adding => state.placement = None,
            Mode::Editing { .. } => state.begin_flow(Mode::Adding),
        }
        state.set_status(
            Level::Info,
            "Now click anywhere on the map to place your garage sale.",
        );
        state.toast(Level::Info, "✨ Click anywhere on the map to place your sale");
    }

    pub fn cancel(&self) {
        let mut state = self.state();
        state.reset_editing();
        state.set_status(Level::Info, "Ready to manage garage sales.");
        state.toast(Level::Info, "Editing cancelled");
        self.forget_draft();
    }

    /// Idle: hint only. Adding: place the pin and look up its address.
    /// Editing: move the pin.
    pub fn map_click(&self, at: LatLng) {
        {
            let mut state = self.state();
            match state.mode {
                Mode::Idle => {
                    state.toast(Level::Info, "💡 Click 'New Sale' first to add a garage sale");
                    return;
                }
                Mode::Editing { .. } => {
                    state.placement = Some(at);
                    state.set_status(Level::Info, "Location moved. Save to keep the change.");
                    return;
                }
                Mode::Adding => {
                    state.placement = Some(at);
                    state.set_status(
                        Level::Success,
                        "Location placed. Fill out the details below.",
                    );
                    state.toast(Level::Success, "📍 Location placed! Now fill out the form.");
                }
            }
        }

        if !self.config.enable_address_validation {
            return;
        }

        match self.geocoder.reverse_geocode(at) {
            Ok(Some(address)) => {
                let mut state = self.state();
                // The pin may have moved while we were asking.
                if state.mode == Mode::Adding && state.placement == Some(at) {
                    info!("🏠 Auto-filled address: {address}");
                    state.form.address = address;
                    state.toast(Level::Info, "🏠 Address found automatically!");
                    self.autosave(&state);
                }
            }
            Ok(None) => debug!("No address at {},{}", at.lat, at.lng),
            Err(e) => warn!("⚠️ Reverse geocoding failed: {e}"),
        }
    }

    /// Loads a cached listing into the form and switches to `Editing`.
    pub fn select_listing(&self, object_id: i64) -> Result<()> {
        let mut state = self.state();
        let listing = state
            .find_listing(object_id)
            .cloned()
            .ok_or(AdminError::NotFound)?;

        state.begin_flow(Mode::Editing { object_id });
        state.form.load_listing(&listing);
        state.placement = listing.map_position();
        state.fly_to = state.placement.map(|at| FlyTo {
            at,
            zoom: FOCUS_ZOOM,
        });

        if state.placement.is_none() {
            warn!("⚠️ Listing {object_id} has no usable geometry");
            state.toast(Level::Warning, "This sale has no location. Click the map to place it.");
        }
        state.set_status(
            Level::Info,
            format!(
                "Editing: {}. Make your changes and save.",
                listing.display_address()
            ),
        );
        state.toast(Level::Info, "✏️ Editing garage sale");
        Ok(())
    }

    pub fn update_form(&self, input: FormInput) {
        let mut state = self.state();
        state.form.apply(input);
        self.autosave(&state);
    }

    pub fn set_multi_day(&self, enabled: bool) {
        let mut state = self.state();
        let enabled = enabled && self.config.multi_day_sales;
        state.form.multi_day = enabled;
        if enabled && state.form.days.is_empty() {
            let weekday = weekday_of(&state.form.date_start).unwrap_or_else(today_weekday);
            state.form.add_day(weekday);
        }
        self.autosave(&state);
    }

    pub fn add_day(&self) -> u64 {
        let mut state = self.state();
        let fallback = weekday_of(&state.form.date_start).unwrap_or_else(today_weekday);
        let id = state.form.add_day(fallback);
        self.autosave(&state);
        id
    }

    pub fn update_day(&self, id: u64, update: DayUpdate) -> Result<()> {
        let mut state = self.state();
        if !state.form.update_day(id, update) {
            return Err(AdminError::NotFound);
        }
        self.autosave(&state);
        Ok(())
    }

    pub fn remove_day(&self, id: u64) -> Result<()> {
        let mut state = self.state();
        if !state.form.remove_day(id) {
            return Err(AdminError::NotFound);
        }
        state.toast(Level::Info, "Day removed");
        self.autosave(&state);
        Ok(())
    }

    /// The description a save would write, plus any time-order warnings.
    pub fn description_preview(&self) -> (String, Vec<String>) {
        let state = self.state();
        (
            self.description_for(&state),
            schedule_warnings(&state.form.schedule()),
        )
    }

    fn description_for(&self, state: &AppState) -> String {
        if self.config.auto_compose_description {
            state.form.description()
        } else {
            state.form.details.trim().to_string()
        }
    }

    /// Validates the form and writes it with one `applyEdits` call.
    /// Returns the saved ObjectID when the service reports one.
    pub fn save(&self) -> Result<Option<i64>> {
        let pending = self.begin_save()?;
        let feature = pending
            .listing
            .to_feature(self.config.layer_spatial_reference());

        let result = match pending.kind {
            EditKind::Add => self.service.apply_edits(std::slice::from_ref(&feature), &[]),
            EditKind::Update => self.service.apply_edits(&[], std::slice::from_ref(&feature)),
        };

        let mut state = self.state();
        state.save_in_flight = false;
        match result {
            Ok(outcome) => {
                let message = match pending.kind {
                    EditKind::Add => "🎉 Garage sale added!",
                    EditKind::Update => "🎉 Garage sale updated!",
                };
                state.toast(Level::Success, message);
                // A sale started while this one was saving keeps its form.
                let same_flow = state.flow == pending.flow;
                if same_flow {
                    state.reset_editing();
                    state.set_status(Level::Info, "Ready to manage garage sales.");
                }
                drop(state);

                if same_flow {
                    self.forget_draft();
                }
                // A failed refresh is already reported; the save itself stands.
                let _ = self.load_listings();
                Ok(outcome.object_id.or(pending.listing.object_id))
            }
            Err(e) => {
                error!("❌ Save failed: {e}");
                state.toast(Level::Error, format!("Save failed: {e}"));
                Err(e)
            }
        }
    }

    /// Checks run in order: in-flight guard, address, start date, item
    /// details, placed pin. Any failure stops before the network.
    fn begin_save(&self) -> Result<PendingSave> {
        let mut state = self.state();

        if state.save_in_flight {
            let err = AdminError::Validation("A save is already in progress".into());
            state.toast(Level::Warning, err.to_string());
            return Err(err);
        }

        let listing = match self.validate(&state) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("⚠️ {e}");
                state.toast(Level::Warning, format!("⚠️ {e}"));
                return Err(e);
            }
        };

        for warning in schedule_warnings(&state.form.schedule()) {
            state.toast(Level::Warning, warning);
        }

        state.save_in_flight = true;
        let kind = if listing.object_id.is_some() {
            EditKind::Update
        } else {
            EditKind::Add
        };
        Ok(PendingSave {
            kind,
            listing,
            flow: state.flow,
        })
    }

    fn validate(&self, state: &AppState) -> Result<GarageSaleListing> {
        let form = &state.form;

        let address = form.address.trim();
        if address.is_empty() {
            return Err(AdminError::Validation("Address is required".into()));
        }

        let start_date = to_epoch_maybe(&form.date_start)
            .ok_or_else(|| AdminError::Validation("Start date is required".into()))?;

        let end_date = match form.date_end.trim() {
            "" => None,
            raw => Some(to_epoch_maybe(raw).ok_or_else(|| {
                AdminError::Validation(format!("End date '{raw}' is not a valid date"))
            })?),
        };

        let details = form.details.trim();
        let min = self.config.description_min_length;
        if !details.is_empty() && details.chars().count() < min {
            return Err(AdminError::Validation(format!(
                "Item details must be at least {min} characters"
            )));
        }

        let position = state.placement.ok_or_else(|| {
            AdminError::Geometry("Please place a location on the map first".into())
        })?;

        Ok(GarageSaleListing {
            object_id: state.editing_id(),
            address: address.to_string(),
            description: self.description_for(state),
            start_date: Some(start_date),
            end_date,
            position: Some(position),
        })
    }

    /// Deletes the listing being edited.
    pub fn delete(&self) -> Result<()> {
        let (object_id, flow) = {
            let mut state = self.state();
            if state.save_in_flight {
                let err = AdminError::Validation("A save is already in progress".into());
                state.toast(Level::Warning, err.to_string());
                return Err(err);
            }
            let Mode::Editing { object_id } = state.mode else {
                let err = AdminError::Validation("Select a garage sale to delete first".into());
                state.toast(Level::Warning, err.to_string());
                return Err(err);
            };
            state.save_in_flight = true;
            (object_id, state.flow)
        };

        let result = self.service.delete_features(object_id);

        let mut state = self.state();
        state.save_in_flight = false;
        match result {
            Ok(()) => {
                state.toast(Level::Success, "🗑️ Garage sale deleted");
                let same_flow = state.flow == flow;
                if same_flow {
                    state.reset_editing();
                    state.set_status(Level::Info, "Ready to manage garage sales.");
                }
                drop(state);

                if same_flow {
                    self.forget_draft();
                }
                let _ = self.load_listings();
                Ok(())
            }
            Err(e) => {
                error!("❌ Delete failed: {e}");
                state.toast(Level::Error, format!("Delete failed: {e}"));
                Err(e)
            }
        }
    }

    /// Address suggestions for at least two characters of input. Best effort.
    /// Only the form's list is kept for later renders of the panel.
    pub fn search_address(&self, text: &str, target: SuggestionTarget) -> Vec<Suggestion> {
        let suggestions = if text.trim().chars().count() < 2 {
            Vec::new()
        } else {
            match self.geocoder.suggest(text) {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    warn!("⚠️ Address suggestions failed: {e}");
                    Vec::new()
                }
            }
        };

        if target == SuggestionTarget::FormAddress {
            self.state().form_suggestions = suggestions.clone();
        }
        suggestions
    }

    /// Resolves a picked suggestion and pans the map to it. When it fills the
    /// form while adding a sale with no pin yet, the pin goes there too.
    pub fn select_suggestion(&self, query: AddressQuery, target: SuggestionTarget) -> Option<LatLng> {
        let text = match &query {
            AddressQuery::Text(text) => text.clone(),
            AddressQuery::MagicKey { text, .. } => text.clone(),
        };
        {
            let mut state = self.state();
            state.form_suggestions.clear();
            if target == SuggestionTarget::FormAddress {
                state.form.address = text.clone();
                self.autosave(&state);
            }
        }

        let candidate = match self.geocoder.find_address_candidates(&query) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("⚠️ Geocoding failed for suggestion '{text}': {e}");
                return None;
            }
        };

        let mut state = self.state();
        let Some(candidate) = candidate else {
            state.toast(Level::Info, "No match found for that address");
            return None;
        };

        let at = candidate.lat_lng();
        state.fly_to = Some(FlyTo {
            at,
            zoom: FOCUS_ZOOM,
        });
        if target == SuggestionTarget::FormAddress {
            // The geocoder's spelling of the address beats what was typed.
            if !candidate.address.trim().is_empty() {
                state.form.address = candidate.address.clone();
                self.autosave(&state);
            }
            if state.mode == Mode::Adding && state.placement.is_none() {
                state.placement = Some(at);
            }
        }
        state.toast(Level::Success, "📍 Address located");
        Some(at)
    }

    pub fn cycle_theme(&self) -> Theme {
        let mut state = self.state();
        let next = state.theme.next();
        state.theme = next;
        if let Err(e) = self
            .db
            .with_conn(|conn| set_preference(conn, THEME_KEY, next.as_str(), now_ms()))
        {
            warn!("⚠️ Could not save theme preference: {e}");
        }
        state.toast(Level::Info, format!("🎨 Theme: {}", next.as_str()));
        next
    }

    /// Puts a recent autosaved draft back into the form.
    pub fn restore_draft(&self, now_ms: i64) -> bool {
        if !self.config.auto_save_drafts {
            return false;
        }
        let draft = match self.db.with_conn(|conn| load_draft(conn, now_ms)) {
            Ok(Some(draft)) if !draft.is_blank() => draft,
            Ok(_) => return false,
            Err(e) => {
                warn!("⚠️ Could not read draft: {e}");
                return false;
            }
        };

        // The listing may have changed since; restoring it as a new sale
        // would duplicate it.
        if let Some(object_id) = draft.object_id {
            info!("🗑️ Dropping draft of sale {object_id}");
            self.forget_draft();
            return false;
        }

        let mut state = self.state();
        state.form = SaleForm::from_draft(draft);
        state.toast(Level::Info, "📝 Unsaved draft restored");
        true
    }

    fn autosave(&self, state: &AppState) {
        if !self.config.auto_save_drafts {
            return;
        }
        let draft = state.form.to_draft(now_ms(), state.editing_id());
        let result = self.db.with_conn(|conn| {
            if draft.is_blank() {
                clear_draft(conn)
            } else {
                save_draft(conn, &draft)
            }
        });
        if let Err(e) = result {
            warn!("⚠️ Draft autosave failed: {e}");
        }
    }

    fn forget_draft(&self) {
        if let Err(e) = self.db.with_conn(|conn| clear_draft(conn)) {
            warn!("⚠️ Could not clear draft: {e}");
        }
    }
}

fn today_weekday() -> u8 {
    chrono::Local::now().weekday().num_days_from_sunday() as u8
}
