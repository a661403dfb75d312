use crate::calendar::{clamp_year, parse_year};
use crate::storage::PreferenceStore;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

pub const STORAGE_KEY: &str = "selectedYear";
pub const LOCATION_KEY: &str = "year";

/// The year being viewed, kept in step with the persisted store and the
/// shareable `?year=` location parameter.
///
/// Precedence at construction: location, then persisted value, then the
/// current calendar year. Later location re-evaluations that disagree with the
/// in-memory value win.
pub struct YearSelection {
    tx: watch::Sender<i32>,
    location: Mutex<Option<String>>,
    store: Arc<dyn PreferenceStore>,
    current_year: i32,
}

impl YearSelection {
    pub fn new(location: Option<&str>, store: Arc<dyn PreferenceStore>, current_year: i32) -> Self {
        let initial = location
            .and_then(parse_year)
            .or_else(|| read_persisted(store.as_ref()))
            .unwrap_or(current_year);
        let (tx, _rx) = watch::channel(initial);

        Self {
            tx,
            location: Mutex::new(location.map(str::to_string)),
            store,
            current_year,
        }
    }

    pub fn selected_year(&self) -> i32 {
        *self.tx.borrow()
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn subscribe(&self) -> watch::Receiver<i32> {
        self.tx.subscribe()
    }

    /// Updates memory, then the persisted store, then the location. A failed
    /// store write is logged and does not roll back the other two. Years
    /// outside the calendar are clamped.
    pub async fn set_selected_year(&self, year: i32) {
        let year = clamp_year(year);
        self.publish(year);
        self.persist(year).await;
        self.write_location(year);
    }

    /// Re-evaluates the location parameter, e.g. after external navigation.
    /// Absent or malformed values leave the selection alone.
    pub async fn sync_location(&self, raw: Option<&str>) {
        let Some(raw) = raw else {
            return;
        };
        self.write_location_raw(raw.to_string());

        let Some(year) = parse_year(raw) else {
            debug!("ignoring malformed year parameter {raw:?}");
            return;
        };
        if year != self.selected_year() {
            self.publish(year);
            self.persist(year).await;
        }
    }

    pub fn location_year(&self) -> Option<i32> {
        self.location
            .lock()
            .ok()
            .and_then(|location| location.as_deref().and_then(parse_year))
    }

    pub fn persisted_year(&self) -> Option<i32> {
        read_persisted(self.store.as_ref())
    }

    pub fn share_path(&self) -> String {
        format!("/?{LOCATION_KEY}={}", self.selected_year())
    }

    fn publish(&self, year: i32) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == year {
                false
            } else {
                *current = year;
                true
            }
        });
        if changed {
            debug!(year, "selected year changed");
        }
    }

    async fn persist(&self, year: i32) {
        if let Err(err) = self.store.set(STORAGE_KEY, &year.to_string()).await {
            warn!("failed to persist selected year {year}: {err}");
        }
    }

    fn write_location(&self, year: i32) {
        self.write_location_raw(year.to_string());
    }

    fn write_location_raw(&self, raw: String) {
        if let Ok(mut location) = self.location.lock() {
            *location = Some(raw);
        }
    }
}

fn read_persisted(store: &dyn PreferenceStore) -> Option<i32> {
    match store.get(STORAGE_KEY) {
        Ok(value) => value.as_deref().and_then(parse_year),
        Err(err) => {
            warn!("failed to read persisted year: {err}");
            None
        }
    }
}
