// src/app/state.rs

use crate::arcgis::Suggestion;
use crate::db::drafts::Draft;
use crate::domain::dates::{from_epoch, is_weekend};
use crate::domain::description::{compose_description, next_weekday, parse_description};
use crate::domain::{DayEntry, GarageSaleListing, Schedule, TimeOfDay};
use crate::geo::LatLng;
use tracing::info;

/// Client UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// "New Sale" pressed; the next map click places the pin.
    Adding,
    Editing { object_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Dim,
    Light,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Dim,
            Theme::Dim => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Dim => "dim",
            Theme::Light => "light",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Theme::Dark),
            "dim" => Some(Theme::Dim),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Where the map should pan to on the next render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
    pub at: LatLng,
    pub zoom: u8,
}

/// Partial form update as posted by the browser. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub address: Option<String>,
    pub details: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayUpdate {
    pub weekday: Option<u8>,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

/// The sale form, single-day and multi-day inputs side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleForm {
    pub address: String,
    pub details: String,
    pub date_start: String,
    pub date_end: String,
    pub multi_day: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub days: Vec<DayEntry>,
    next_day_id: u64,
}

impl Default for SaleForm {
    fn default() -> Self {
        Self {
            address: String::new(),
            details: String::new(),
            date_start: String::new(),
            date_end: String::new(),
            multi_day: false,
            start: TimeOfDay::default_start(),
            end: TimeOfDay::default_end(),
            days: Vec::new(),
            next_day_id: 1,
        }
    }
}

impl SaleForm {
    /// Multi-day only counts once there is at least one day.
    pub fn schedule(&self) -> Schedule {
        if self.multi_day && !self.days.is_empty() {
            Schedule::MultiDay(self.days.clone())
        } else {
            Schedule::SingleDay {
                start: self.start,
                end: self.end,
            }
        }
    }

    pub fn description(&self) -> String {
        compose_description(&self.schedule(), &self.details)
    }

    pub fn apply(&mut self, input: FormInput) {
        if let Some(address) = input.address {
            self.address = address;
        }
        if let Some(details) = input.details {
            self.details = details;
        }
        if let Some(date_start) = input.date_start {
            self.date_start = date_start;
        }
        if let Some(date_end) = input.date_end {
            self.date_end = date_end;
        }
        if let Some(start) = input.start {
            self.start = start;
        }
        if let Some(end) = input.end {
            self.end = end;
        }
    }

    /// Adds a day after the last one (or on `fallback_weekday`) and returns its id.
    pub fn add_day(&mut self, fallback_weekday: u8) -> u64 {
        let id = self.next_day_id;
        self.next_day_id += 1;
        let weekday = next_weekday(&self.days, fallback_weekday);
        self.days.push(DayEntry::new(id, weekday));
        id
    }

    pub fn update_day(&mut self, id: u64, update: DayUpdate) -> bool {
        let Some(day) = self.days.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        if let Some(weekday) = update.weekday {
            day.weekday = weekday % 7;
        }
        if let Some(start) = update.start {
            day.start = start;
        }
        if let Some(end) = update.end {
            day.end = end;
        }
        true
    }

    pub fn remove_day(&mut self, id: u64) -> bool {
        let before = self.days.len();
        self.days.retain(|d| d.id != id);
        self.days.len() != before
    }

    /// Fills the form from a stored listing, splitting a composed
    /// description back into its schedule and item list.
    pub fn load_listing(&mut self, listing: &GarageSaleListing) {
        *self = SaleForm::default();
        self.address = listing.address.clone();
        self.date_start = from_epoch(listing.start_date);
        self.date_end = from_epoch(listing.end_date);

        let (schedule, details) = parse_description(&listing.description);
        self.details = details;
        match schedule {
            Some(Schedule::SingleDay { start, end }) => {
                self.start = start;
                self.end = end;
            }
            Some(Schedule::MultiDay(days)) => {
                self.next_day_id = days.iter().map(|d| d.id).max().unwrap_or(0) + 1;
                self.multi_day = true;
                self.days = days;
            }
            None => {}
        }
    }

    /// `object_id` is the listing being edited, if any.
    pub fn to_draft(&self, saved_at_ms: i64, object_id: Option<i64>) -> Draft {
        Draft {
            object_id,
            address: self.address.clone(),
            details: self.details.clone(),
            date_start: self.date_start.clone(),
            date_end: self.date_end.clone(),
            multi_day: self.multi_day,
            days: self.days.clone(),
            start: self.start,
            end: self.end,
            saved_at_ms,
        }
    }

    pub fn from_draft(draft: Draft) -> Self {
        let next_day_id = draft.days.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        Self {
            address: draft.address,
            details: draft.details,
            date_start: draft.date_start,
            date_end: draft.date_end,
            multi_day: draft.multi_day,
            start: draft.start,
            end: draft.end,
            days: draft.days,
            next_day_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub weekend: usize,
}

/// Everything the admin UI shows, owned by the controller.
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: Mode,
    /// Read cache of the layer; replaced wholesale on every successful query.
    pub listings: Vec<GarageSaleListing>,
    pub form: SaleForm,
    /// The one transient pin while adding or editing.
    pub placement: Option<LatLng>,
    pub save_in_flight: bool,
    pub toasts: Vec<Toast>,
    pub status: Status,
    pub theme: Theme,
    pub fly_to: Option<FlyTo>,
    /// Suggestions under the form's address field. The search box gets its
    /// own list straight from the suggest route.
    pub form_suggestions: Vec<Suggestion>,
    /// Bumped whenever a new add or edit begins, so a save that finishes
    /// late can tell whether the form is still the one it saved.
    pub flow: u64,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            mode: Mode::Idle,
            listings: Vec::new(),
            form: SaleForm::default(),
            placement: None,
            save_in_flight: false,
            toasts: Vec::new(),
            status: Status {
                level: Level::Info,
                text: "Loading garage sales...".into(),
            },
            theme,
            fly_to: None,
            form_suggestions: Vec::new(),
            flow: 0,
        }
    }

    pub fn toast(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        info!("📢 [{}]: {message}", level.as_str().to_uppercase());
        self.toasts.push(Toast { level, message });
    }

    pub fn set_status(&mut self, level: Level, text: impl Into<String>) {
        self.status = Status {
            level,
            text: text.into(),
        };
    }

    pub fn find_listing(&self, object_id: i64) -> Option<&GarageSaleListing> {
        self.listings.iter().find(|l| l.object_id == Some(object_id))
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.listings.len(),
            weekend: self.listings.iter().filter(|l| is_weekend(l.start_date)).count(),
        }
    }

    /// Back to `Idle` with an empty form.
    pub fn reset_editing(&mut self) {
        self.mode = Mode::Idle;
        self.placement = None;
        self.form = SaleForm::default();
        self.form_suggestions.clear();
        self.flow += 1;
    }

    /// Like [`reset_editing`](Self::reset_editing) but into `mode`.
    pub fn begin_flow(&mut self, mode: Mode) {
        self.reset_editing();
        self.mode = mode;
    }

    /// The listing id a draft of the current form belongs to.
    pub fn editing_id(&self) -> Option<i64> {
        match self.mode {
            Mode::Editing { object_id } => Some(object_id),
            _ => None,
        }
    }

    pub fn is_placing(&self) -> bool {
        !matches!(self.mode, Mode::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Meridiem;

    fn listing(description: &str) -> GarageSaleListing {
        GarageSaleListing {
            object_id: Some(4),
            address: "9 Bay St".into(),
            description: description.into(),
            start_date: Some(1_746_230_400_000),
            end_date: None,
            position: None,
        }
    }

    #[test]
    fn empty_multi_day_falls_back_to_single_times() {
        let mut form = SaleForm::default();
        form.multi_day = true;
        form.details = "clothes".into();
        assert_eq!(form.description(), "7:00 AM - 2:00 PM: clothes");
    }

    #[test]
    fn days_follow_each_other_through_the_week() {
        let mut form = SaleForm::default();
        form.multi_day = true;
        let first = form.add_day(5);
        form.add_day(5);
        let third = form.add_day(5);
        let weekdays: Vec<u8> = form.days.iter().map(|d| d.weekday).collect();
        assert_eq!(weekdays, vec![5, 6, 0]);

        assert!(form.remove_day(first));
        assert!(!form.remove_day(first));
        assert!(form.update_day(
            third,
            DayUpdate {
                start: Some(TimeOfDay::new(9, 30, Meridiem::AM)),
                ..DayUpdate::default()
            }
        ));
        assert_eq!(
            form.description(),
            "Saturday 7:00 AM - 2:00 PM & Sunday 9:30 AM - 2:00 PM"
        );
    }

    #[test]
    fn editing_a_composed_listing_does_not_double_the_times() {
        let mut form = SaleForm::default();
        form.load_listing(&listing("8:00 AM - 1:00 PM: books"));
        assert_eq!(form.details, "books");
        assert_eq!(form.start, TimeOfDay::new(8, 0, Meridiem::AM));
        assert_eq!(form.date_start, "2025-05-03");
        assert_eq!(form.description(), "8:00 AM - 1:00 PM: books");
    }

    #[test]
    fn loading_multi_day_listing_keeps_day_ids_unique() {
        let mut form = SaleForm::default();
        form.load_listing(&listing("Friday 7:00 AM - 2:00 PM & Saturday 8:00 AM - 4:00 PM"));
        assert!(form.multi_day);
        let id = form.add_day(0);
        assert_eq!(id, 3);
        assert_eq!(form.days.last().map(|d| d.weekday), Some(0));
    }

    #[test]
    fn draft_round_trip_keeps_form() {
        let mut form = SaleForm::default();
        form.address = "1 Elm".into();
        form.multi_day = true;
        form.add_day(6);
        let draft = form.to_draft(42, Some(3));
        assert_eq!(draft.object_id, Some(3));
        let restored = SaleForm::from_draft(draft);
        assert_eq!(restored, form);
    }

    #[test]
    fn every_new_flow_gets_a_new_generation() {
        let mut state = AppState::new(Theme::Dark);
        state.begin_flow(Mode::Adding);
        let adding = state.flow;
        state.form.address = "1 Elm".into();

        state.begin_flow(Mode::Editing { object_id: 4 });
        assert!(state.flow > adding);
        assert_eq!(state.form.address, "");
        assert_eq!(state.editing_id(), Some(4));
    }

    #[test]
    fn theme_cycles_through_all_three() {
        assert_eq!(Theme::Dark.next(), Theme::Dim);
        assert_eq!(Theme::Dim.next(), Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::parse("dim"), Some(Theme::Dim));
    }
}
