use crate::calendar::current_year;
use crate::config::Config;
use crate::gate::HydrationGate;
use crate::overview::{fetch_month_stats, MonthlyOverview, Refresher};
use crate::picker::YearPicker;
use crate::stats::build_month_stats;
use crate::storage::{FilePreferences, JsonTaskSource, PreferenceStore};
use crate::year_state::YearSelection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub user_id: String,
    pub source: Arc<JsonTaskSource>,
    pub selection: Arc<YearSelection>,
    pub picker: Arc<Mutex<YearPicker>>,
    pub overview: Arc<Mutex<MonthlyOverview>>,
    pub gate: HydrationGate,
}

impl AppState {
    /// Restores the selection and precomputes a snapshot for the running year.
    pub async fn load(config: &Config) -> Self {
        let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferences::open(&config.prefs_path).await);
        let source = JsonTaskSource::new(&config.data_path);
        let year = current_year();

        let snapshot = match fetch_month_stats(&source, &config.user_id, year).await {
            Ok(months) => months,
            Err(err) => {
                error!("failed to precompute stats for {year}: {err}");
                build_month_stats(&[], &[], year, |_, _| 0)
            }
        };

        Self::new(
            config.user_id.clone(),
            source,
            YearSelection::new(None, store, year),
            MonthlyOverview::from_snapshot(year, snapshot),
        )
    }

    pub fn new(
        user_id: String,
        source: JsonTaskSource,
        selection: YearSelection,
        overview: MonthlyOverview,
    ) -> Self {
        let picker = YearPicker::new(selection.selected_year(), selection.current_year());
        Self {
            user_id,
            source: Arc::new(source),
            selection: Arc::new(selection),
            picker: Arc::new(Mutex::new(picker)),
            overview: Arc::new(Mutex::new(overview)),
            gate: HydrationGate::new(),
        }
    }

    pub fn refresher(&self) -> Refresher<JsonTaskSource> {
        Refresher {
            source: Arc::clone(&self.source),
            user_id: self.user_id.clone(),
            selection: Arc::clone(&self.selection),
            overview: Arc::clone(&self.overview),
        }
    }
}
