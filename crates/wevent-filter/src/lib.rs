//! Event list filtering: sidebar filter state, search, date windows and facets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use wevent_core::{CategoryKey, DateParseError, Event, EventType, KeyParseError, LocationKey};

pub const CRATE_NAME: &str = "wevent-filter";

pub const NO_RESULTS_MESSAGE: &str =
    "По вашему запросу ничего не найдено. Попробуйте изменить фильтры.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    #[default]
    AllDates,
    ThisMonth,
    #[serde(rename = "next-3-months")]
    NextThreeMonths,
    ThisYear,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::AllDates,
        DateRange::ThisMonth,
        DateRange::NextThreeMonths,
        DateRange::ThisYear,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DateRange::AllDates => "all-dates",
            DateRange::ThisMonth => "this-month",
            DateRange::NextThreeMonths => "next-3-months",
            DateRange::ThisYear => "this-year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateRange::AllDates => "Все даты",
            DateRange::ThisMonth => "В этом месяце",
            DateRange::NextThreeMonths => "Следующие 3 месяца",
            DateRange::ThisYear => "В этом году",
        }
    }

    /// Inclusive window for an event's midnight. `None` for `AllDates`, or
    /// when the arithmetic leaves chrono's range.
    ///
    /// `NextThreeMonths` starts at `now` itself, so events dated earlier today
    /// are outside it. A day past the end of the target month rolls into the
    /// next one: Nov 30 plus three months ends on Mar 2.
    pub fn window(self, now: NaiveDateTime) -> Option<DateWindow> {
        let today = now.date();
        match self {
            DateRange::AllDates => None,
            DateRange::ThisMonth => {
                let first = today.with_day(1)?;
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some(DateWindow::days(first, last))
            }
            DateRange::NextThreeMonths => {
                let end = today
                    .with_day(1)?
                    .checked_add_months(Months::new(3))?
                    .checked_add_days(Days::new(u64::from(today.day0())))?;
                Some(DateWindow {
                    start: now,
                    end: midnight(end),
                })
            }
            DateRange::ThisYear => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
                let last = NaiveDate::from_ymd_opt(today.year(), 12, 31)?;
                Some(DateWindow::days(first, last))
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DateRange {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| KeyParseError {
                kind: "date range",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: midnight(first),
            end: midnight(last),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = midnight(date);
        at >= self.start && at <= self.end
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    event_types: BTreeMap<EventType, bool>,
    locations: BTreeMap<LocationKey, bool>,
    date_range: DateRange,
    #[serde(default)]
    search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            event_types: EventType::ALL.into_iter().map(|t| (t, false)).collect(),
            locations: LocationKey::ALL.into_iter().map(|l| (l, false)).collect(),
            date_range: DateRange::AllDates,
            search_query: String::new(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_event_type(&mut self, event_type: EventType) {
        let flag = self.event_types.entry(event_type).or_insert(false);
        *flag = !*flag;
    }

    pub fn toggle_location(&mut self, location: LocationKey) {
        let flag = self.locations.entry(location).or_insert(false);
        *flag = !*flag;
    }

    pub fn select_event_type(&mut self, event_type: EventType) {
        self.event_types.insert(event_type, true);
    }

    pub fn select_location(&mut self, location: LocationKey) {
        self.locations.insert(location, true);
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.date_range = range;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
    }

    /// Reset checkboxes and the date range. The search query is left alone.
    pub fn clear_all(&mut self) {
        let query = std::mem::take(&mut self.search_query);
        *self = Self {
            search_query: query,
            ..Self::default()
        };
    }

    pub fn has_active_filters(&self) -> bool {
        self.event_types.values().any(|v| *v)
            || self.locations.values().any(|v| *v)
            || self.date_range != DateRange::AllDates
    }

    pub fn is_event_type_selected(&self, event_type: EventType) -> bool {
        self.event_types.get(&event_type).copied().unwrap_or(false)
    }

    pub fn is_location_selected(&self, location: LocationKey) -> bool {
        self.locations.get(&location).copied().unwrap_or(false)
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn normalized_query(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    fn matches_text(&self, query: Option<&str>, event: &Event) -> bool {
        let Some(query) = query else { return true };
        event.title.to_lowercase().contains(query) || event.description.to_lowercase().contains(query)
    }

    fn matches_event_type(&self, event: &Event) -> bool {
        if !self.event_types.values().any(|v| *v) {
            return true;
        }
        match event.category_key() {
            CategoryKey::Known(t) => self.is_event_type_selected(t),
            CategoryKey::Unmapped => false,
        }
    }

    fn matches_location(&self, event: &Event) -> bool {
        if !self.locations.values().any(|v| *v) {
            return true;
        }
        self.is_location_selected(event.location_key())
    }
}

/// Events marked with the card heart, keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<String>);

impl FavoriteSet {
    pub fn toggle(&mut self, event: &Event) -> bool {
        if self.0.remove(&event.title) {
            debug!(title = %event.title, "favorite removed");
            false
        } else {
            debug!(title = %event.title, "favorite added");
            self.0.insert(event.title.clone())
        }
    }

    pub fn is_favorite(&self, event: &Event) -> bool {
        self.0.contains(&event.title)
    }

    pub fn button_label(&self, event: &Event) -> &'static str {
        if self.is_favorite(event) {
            "Удалить из избранного"
        } else {
            "Добавить в избранное"
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event #{index} {title:?} has an unreadable date: {source}")]
pub struct EventDateError {
    pub index: usize,
    pub title: String,
    #[source]
    pub source: DateParseError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LenientOutcome<'a> {
    pub events: Vec<&'a Event>,
    pub skipped: Vec<EventDateError>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilterEngine<C = SystemClock> {
    clock: C,
}

impl EventFilterEngine<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> EventFilterEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Ordered subsequence of `events` matching every active filter.
    ///
    /// Dates are only parsed for events that survive the text, type and
    /// location checks while a date range is active; the first unreadable
    /// one aborts the call.
    pub fn filter<'a>(
        &self,
        events: &'a [Event],
        state: &FilterState,
    ) -> Result<Vec<&'a Event>, EventDateError> {
        let mut outcome = self.run(events, state, true);
        if let Some(err) = outcome.skipped.pop() {
            return Err(err);
        }
        debug!(
            total = events.len(),
            matched = outcome.events.len(),
            range = %state.date_range(),
            "filter evaluated"
        );
        Ok(outcome.events)
    }

    pub fn filter_lenient<'a>(&self, events: &'a [Event], state: &FilterState) -> LenientOutcome<'a> {
        let outcome = self.run(events, state, false);
        for skipped in &outcome.skipped {
            warn!(index = skipped.index, title = %skipped.title, error = %skipped.source, "event skipped");
        }
        outcome
    }

    fn run<'a>(
        &self,
        events: &'a [Event],
        state: &FilterState,
        stop_on_error: bool,
    ) -> LenientOutcome<'a> {
        let query = state.normalized_query();
        let now = self.clock.now();
        let window = state.date_range().window(now);
        let mut out = LenientOutcome {
            events: Vec::new(),
            skipped: Vec::new(),
        };
        if window.is_none() && state.date_range() != DateRange::AllDates {
            warn!(range = %state.date_range(), %now, "date range has no window, nothing matches");
            return out;
        }

        for (index, event) in events.iter().enumerate() {
            if !state.matches_text(query.as_deref(), event)
                || !state.matches_event_type(event)
                || !state.matches_location(event)
            {
                continue;
            }
            let Some(window) = window else {
                out.events.push(event);
                continue;
            };
            match event.parsed_date() {
                Ok(date) if window.contains(date) => out.events.push(event),
                Ok(_) => {}
                Err(source) => {
                    let err = EventDateError {
                        index,
                        title: event.title.clone(),
                        source,
                    };
                    out.skipped.push(err);
                    if stop_on_error {
                        break;
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount<K> {
    pub key: K,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    pub categories: Vec<FacetCount<CategoryKey>>,
    pub locations: Vec<FacetCount<LocationKey>>,
}

/// Per-checkbox counts over `events`. Every known key gets a row; an
/// `Unmapped` category row is appended only when such events exist.
pub fn facet_counts(events: &[Event], state: &FilterState) -> FacetCounts {
    let mut categories = BTreeMap::<CategoryKey, usize>::new();
    let mut locations = BTreeMap::<LocationKey, usize>::new();
    for e in events {
        *categories.entry(e.category_key()).or_default() += 1;
        *locations.entry(e.location_key()).or_default() += 1;
    }

    let mut category_rows = EventType::ALL
        .into_iter()
        .map(|t| FacetCount {
            key: CategoryKey::Known(t),
            count: categories.get(&CategoryKey::Known(t)).copied().unwrap_or(0),
            selected: state.is_event_type_selected(t),
        })
        .collect::<Vec<_>>();
    if let Some(count) = categories.get(&CategoryKey::Unmapped) {
        category_rows.push(FacetCount {
            key: CategoryKey::Unmapped,
            count: *count,
            selected: false,
        });
    }

    let location_rows = LocationKey::ALL
        .into_iter()
        .map(|l| FacetCount {
            key: l,
            count: locations.get(&l).copied().unwrap_or(0),
            selected: state.is_location_selected(l),
        })
        .collect();

    FacetCounts {
        categories: category_rows,
        locations: location_rows,
    }
}

pub fn pluralize_ru<'a>(n: usize, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let tens = n % 100;
    if (11..=14).contains(&tens) {
        return many;
    }
    match n % 10 {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

pub fn results_heading(count: usize) -> String {
    format!(
        "Найдено {} {}",
        count,
        pluralize_ru(count, "событие", "события", "событий")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wevent_catalog::builtin_catalog;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn engine_at(now: NaiveDateTime) -> EventFilterEngine<FixedClock> {
        EventFilterEngine::with_clock(FixedClock(now))
    }

    fn ev(category: &str, title: &str, date: &str, location: &str) -> Event {
        Event {
            category: category.into(),
            title: title.into(),
            description: String::new(),
            date: date.into(),
            location: location.into(),
            image_url: None,
        }
    }

    fn titles<'a>(events: &[&'a Event]) -> Vec<&'a str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn cleared_filters_return_catalog_unchanged() {
        let catalog = builtin_catalog();
        let out = engine_at(at(2025, 6, 15, 12)).filter(&catalog, &FilterState::new()).unwrap();
        assert_eq!(out, catalog.iter().collect::<Vec<_>>());
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let catalog = builtin_catalog();
        let mut state = FilterState::new();
        state.set_search_query("  конференция ");
        let out = engine_at(at(2025, 6, 15, 12)).filter(&catalog, &state).unwrap();
        assert_eq!(titles(&out), vec!["Цифровая трансформация промышленности 2025"]);

        state.set_search_query("PYTHON");
        let out = engine_at(at(2025, 6, 15, 12)).filter(&catalog, &state).unwrap();
        assert_eq!(titles(&out), vec!["Интенсив по Data Science для начинающих"]);
    }

    #[test]
    fn blank_query_matches_everything() {
        let catalog = builtin_catalog();
        let mut state = FilterState::new();
        state.set_search_query("   ");
        assert_eq!(state.normalized_query(), None);
        assert_eq!(engine_at(at(2025, 6, 15, 12)).filter(&catalog, &state).unwrap().len(), 6);
    }

    #[test]
    fn type_filter_excludes_unmapped_categories() {
        let events = vec![
            ev("Конференция", "a", "1 мая 2025", "Москва"),
            ev("Мастер-класс", "b", "1 мая 2025", "Москва"),
            ev("Выставка", "c", "1 мая 2025", "Москва"),
        ];
        let mut state = FilterState::new();
        state.toggle_event_type(EventType::Conference);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["a"]);
    }

    #[test]
    fn unmapped_locations_match_other_location() {
        let catalog = builtin_catalog();
        let mut state = FilterState::new();
        state.toggle_location(LocationKey::OtherLocation);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&catalog, &state).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| e.location != "Москва" && e.location != "Тамбов"));

        state.toggle_location(LocationKey::Tambov);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&catalog, &state).unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn this_year_uses_calendar_year_of_now() {
        let events = vec![
            ev("Выставка", "next-year", "12 февраля 2026", "Москва"),
            ev("Конференция", "april", "18 апреля 2025", "Новосибирск"),
            ev("Другое", "new-years-eve", "31 декабря 2025", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisYear);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["april", "new-years-eve"]);
    }

    #[test]
    fn this_month_is_inclusive_on_both_ends() {
        let events = vec![
            ev("Другое", "first", "1 июня 2025", "Казань"),
            ev("Другое", "last", "30 июня 2025", "Казань"),
            ev("Другое", "july", "1 июля 2025", "Казань"),
            ev("Другое", "may", "31 мая 2025", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisMonth);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["first", "last"]);
    }

    #[test]
    fn next_three_months_is_rolling_from_now() {
        let events = vec![
            ev("Другое", "today", "15 июня 2025", "Казань"),
            ev("Другое", "soon", "20 июня 2025", "Казань"),
            ev("Другое", "edge", "15 сентября 2025", "Казань"),
            ev("Другое", "past-edge", "16 сентября 2025", "Казань"),
            ev("Другое", "past", "1 июня 2025", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::NextThreeMonths);
        let out = engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["soon", "edge"]);

        let out = engine_at(at(2025, 6, 15, 0)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["today", "soon", "edge"]);
    }

    #[test]
    fn next_three_months_rolls_over_short_months() {
        let window = DateRange::NextThreeMonths.window(at(2025, 11, 30, 9)).unwrap();
        assert_eq!(window.end, at(2026, 3, 2, 0));
        let window = DateRange::NextThreeMonths.window(at(2025, 3, 31, 9)).unwrap();
        assert_eq!(window.end, at(2025, 7, 1, 0));

        let events = vec![
            ev("Другое", "march-1", "1 марта 2026", "Казань"),
            ev("Другое", "march-2", "2 марта 2026", "Казань"),
            ev("Другое", "march-3", "3 марта 2026", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::NextThreeMonths);
        let out = engine_at(at(2025, 11, 30, 9)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["march-1", "march-2"]);
    }

    #[test]
    fn this_month_in_december_ends_on_new_years_eve() {
        let events = vec![
            ev("Другое", "first", "1 декабря 2025", "Казань"),
            ev("Другое", "eve", "31 декабря 2025", "Казань"),
            ev("Другое", "new-year", "1 января 2026", "Казань"),
            ev("Другое", "last-december", "15 декабря 2024", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisMonth);
        let out = engine_at(at(2025, 12, 20, 18)).filter(&events, &state).unwrap();
        assert_eq!(titles(&out), vec!["first", "eve"]);
    }

    #[test]
    fn range_without_window_excludes_everything() {
        let events = vec![ev("Другое", "old", "1 января 2000", "Казань")];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisMonth);
        let engine = engine_at(NaiveDate::MAX.and_time(NaiveTime::MIN));
        assert!(engine.filter(&events, &state).unwrap().is_empty());
        assert!(engine.filter_lenient(&events, &state).events.is_empty());

        state.set_date_range(DateRange::AllDates);
        assert_eq!(engine.filter(&events, &state).unwrap().len(), 1);
    }

    #[test]
    fn strict_filter_surfaces_bad_dates() {
        let events = vec![
            ev("Другое", "ok", "20 июня 2025", "Казань"),
            ev("Другое", "broken", "20 juin 2025", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisYear);
        let err = engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, DateParseError::UnknownMonth { .. }));

        state.set_date_range(DateRange::AllDates);
        assert_eq!(engine_at(at(2025, 6, 15, 12)).filter(&events, &state).unwrap().len(), 2);
    }

    #[test]
    fn lenient_filter_reports_skipped_events() {
        let events = vec![
            ev("Другое", "broken", "скоро", "Казань"),
            ev("Другое", "ok", "20 июня 2025", "Казань"),
        ];
        let mut state = FilterState::new();
        state.set_date_range(DateRange::ThisMonth);
        let outcome = engine_at(at(2025, 6, 15, 12)).filter_lenient(&events, &state);
        assert_eq!(titles(&outcome.events), vec!["ok"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].title, "broken");
    }

    #[test]
    fn clear_all_keeps_search_query() {
        let mut state = FilterState::new();
        assert!(!state.has_active_filters());
        state.toggle_event_type(EventType::Workshop);
        state.set_date_range(DateRange::ThisYear);
        state.set_search_query("форум");
        assert!(state.has_active_filters());

        state.clear_all();
        assert!(!state.has_active_filters());
        assert_eq!(state.search_query(), "форум");
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut state = FilterState::new();
        state.toggle_location(LocationKey::Moscow);
        state.toggle_location(LocationKey::Moscow);
        assert_eq!(state, FilterState::new());
    }

    #[test]
    fn selecting_twice_stays_selected() {
        let mut state = FilterState::new();
        state.select_event_type(EventType::Conference);
        state.select_event_type(EventType::Conference);
        state.select_location(LocationKey::Tambov);
        state.select_location(LocationKey::Tambov);
        assert!(state.is_event_type_selected(EventType::Conference));
        assert!(state.is_location_selected(LocationKey::Tambov));
    }

    #[test]
    fn favorites_toggle_per_event() {
        let catalog = builtin_catalog();
        let mut favorites = FavoriteSet::default();
        assert_eq!(favorites.button_label(&catalog[0]), "Добавить в избранное");

        assert!(favorites.toggle(&catalog[0]));
        assert!(favorites.is_favorite(&catalog[0]));
        assert!(!favorites.is_favorite(&catalog[1]));
        assert_eq!(favorites.button_label(&catalog[0]), "Удалить из избранного");
        assert_eq!(favorites.len(), 1);

        assert!(!favorites.toggle(&catalog[0]));
        assert!(favorites.is_empty());
    }

    #[test]
    fn filter_state_serializes_with_wire_keys() {
        let mut state = FilterState::new();
        state.set_date_range(DateRange::NextThreeMonths);
        state.toggle_location(LocationKey::OtherLocation);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["dateRange"], "next-3-months");
        assert_eq!(json["locations"]["otherLocation"], true);
        assert_eq!(json["eventTypes"]["conference"], false);
        assert_eq!("this-month".parse::<DateRange>().unwrap(), DateRange::ThisMonth);
    }

    #[test]
    fn facets_count_every_key() {
        let mut events = builtin_catalog();
        events.push(ev("Хакатон", "x", "1 мая 2025", "Москва"));
        let mut state = FilterState::new();
        state.toggle_location(LocationKey::Moscow);

        let facets = facet_counts(&events, &state);
        let conference = &facets.categories[0];
        assert_eq!(conference.key, CategoryKey::Known(EventType::Conference));
        assert_eq!(conference.count, 2);
        assert_eq!(facets.categories.last().unwrap().key, CategoryKey::Unmapped);
        let moscow = facets.locations.iter().find(|f| f.key == LocationKey::Moscow).unwrap();
        assert_eq!((moscow.count, moscow.selected), (3, true));
    }

    #[test]
    fn heading_uses_russian_plurals() {
        assert_eq!(results_heading(1), "Найдено 1 событие");
        assert_eq!(results_heading(3), "Найдено 3 события");
        assert_eq!(results_heading(0), "Найдено 0 событий");
        assert_eq!(results_heading(12), "Найдено 12 событий");
        assert_eq!(results_heading(21), "Найдено 21 событие");
        assert_eq!(results_heading(112), "Найдено 112 событий");
    }
}
