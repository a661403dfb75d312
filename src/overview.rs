use crate::calendar::month_from_week;
use crate::errors::SourceError;
use crate::gate::HydrationGate;
use crate::models::{MonthStat, YearSummary};
use crate::stats::{build_month_stats, summarize};
use crate::storage::TaskSource;
use crate::year_state::YearSelection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Identifies one in-flight recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub year: i32,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
    Failed,
}

/// Monthly statistics currently on display, and the year they belong to.
#[derive(Debug, Clone)]
pub struct MonthlyOverview {
    year: i32,
    months: Vec<MonthStat>,
    summary: YearSummary,
    latest: u64,
    notice: Option<String>,
}

impl MonthlyOverview {
    /// Starts from a precomputed snapshot for `year`.
    pub fn from_snapshot(year: i32, months: Vec<MonthStat>) -> Self {
        let summary = summarize(&months);
        Self {
            year,
            months,
            summary,
            latest: 0,
            notice: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn months(&self) -> &[MonthStat] {
        &self.months
    }

    pub fn summary(&self) -> &YearSummary {
        &self.summary
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn request(&mut self, year: i32) -> Ticket {
        self.latest += 1;
        Ticket {
            year,
            generation: self.latest,
        }
    }

    /// Applies a finished recompute unless a newer request was issued or the
    /// selection moved away from the ticket's year. Failures keep the last
    /// good stats and leave a notice.
    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<MonthStat>, SourceError>,
        selected: i32,
    ) -> ApplyOutcome {
        if ticket.year != selected || ticket.generation != self.latest {
            debug!(
                year = ticket.year,
                selected, "discarding stale monthly stats"
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(months) => {
                self.summary = summarize(&months);
                self.months = months;
                self.year = ticket.year;
                self.notice = None;
                ApplyOutcome::Applied
            }
            Err(err) => {
                warn!("failed to load monthly stats for {}: {err}", ticket.year);
                self.notice = Some(format!(
                    "Could not load {} stats; showing {}.",
                    ticket.year, self.year
                ));
                ApplyOutcome::Failed
            }
        }
    }
}

/// Fetches a user's tasks and tags for `year` and aggregates them by month.
pub async fn fetch_month_stats<S: TaskSource>(
    source: &S,
    user_id: &str,
    year: i32,
) -> Result<Vec<MonthStat>, SourceError> {
    let tasks = source.fetch_tasks(user_id, year).await?;
    let tags = source.fetch_tags(user_id).await?;
    Ok(build_month_stats(&tasks, &tags, year, month_from_week))
}

pub struct Refresher<S> {
    pub source: Arc<S>,
    pub user_id: String,
    pub selection: Arc<YearSelection>,
    pub overview: Arc<Mutex<MonthlyOverview>>,
}

impl<S> Clone for Refresher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            user_id: self.user_id.clone(),
            selection: Arc::clone(&self.selection),
            overview: Arc::clone(&self.overview),
        }
    }
}

impl<S: TaskSource> Refresher<S> {
    /// Issues a ticket for `year` and recomputes in the background.
    pub async fn refresh(&self, year: i32) -> tokio::task::JoinHandle<ApplyOutcome> {
        let ticket = self.overview.lock().await.request(year);
        let this = self.clone();
        tokio::spawn(async move {
            let result = fetch_month_stats(&*this.source, &this.user_id, ticket.year).await;
            let selected = this.selection.selected_year();
            this.overview.lock().await.apply(ticket, result, selected)
        })
    }
}

/// Recomputes the overview on every selection change once the gate opens.
///
/// The snapshot is kept if it already matches the selected year at that point.
pub fn spawn_refresh_loop<S: TaskSource>(
    refresher: Refresher<S>,
    gate: HydrationGate,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut changes = refresher.selection.subscribe();
        gate.wait_open().await;

        changes.mark_unchanged();
        let selected = refresher.selection.selected_year();
        let snapshot_year = refresher.overview.lock().await.year();
        if selected != snapshot_year {
            refresher.refresh(selected).await;
        }

        while changes.changed().await.is_ok() {
            let year = *changes.borrow_and_update();
            refresher.refresh(year).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Tag, TaskRecord};
    use crate::storage::MemoryPreferences;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn records(year: i32, count: usize) -> Vec<TaskRecord> {
        (0..count)
            .map(|n| TaskRecord {
                id: format!("{year}-{n}"),
                week_number: 2,
                completed: n % 2 == 0,
                tags: Vec::new(),
                year,
                user_id: "u1".to_string(),
            })
            .collect()
    }

    fn stats(year: i32, count: usize) -> Vec<MonthStat> {
        build_month_stats(&records(year, count), &[], year, month_from_week)
    }

    /// Source whose per-year responses are released by the test.
    struct HeldSource {
        releases: std::sync::Mutex<HashMap<i32, oneshot::Receiver<()>>>,
        counts: HashMap<i32, usize>,
        failing: bool,
    }

    impl HeldSource {
        fn new(counts: &[(i32, usize)]) -> (Self, HashMap<i32, oneshot::Sender<()>>) {
            let mut releases = HashMap::new();
            let mut senders = HashMap::new();
            for (year, _) in counts {
                let (tx, rx) = oneshot::channel();
                releases.insert(*year, rx);
                senders.insert(*year, tx);
            }
            let source = Self {
                releases: std::sync::Mutex::new(releases),
                counts: counts.iter().copied().collect(),
                failing: false,
            };
            (source, senders)
        }
    }

    impl TaskSource for HeldSource {
        async fn fetch_tasks(&self, _user_id: &str, year: i32) -> Result<Vec<TaskRecord>, SourceError> {
            let release = self.releases.lock().unwrap().remove(&year);
            if let Some(release) = release {
                let _ = release.await;
            }
            if self.failing {
                return Err(SourceError::Read {
                    path: "held".into(),
                    source: std::io::Error::other("offline"),
                });
            }
            Ok(records(year, self.counts.get(&year).copied().unwrap_or(0)))
        }

        async fn fetch_tags(&self, _user_id: &str) -> Result<Vec<Tag>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn refresher<S>(source: S, selected: i32, snapshot: MonthlyOverview) -> Refresher<S> {
        Refresher {
            source: Arc::new(source),
            user_id: "u1".to_string(),
            selection: Arc::new(YearSelection::new(
                Some(&selected.to_string()),
                Arc::new(MemoryPreferences::default()),
                2024,
            )),
            overview: Arc::new(Mutex::new(snapshot)),
        }
    }

    #[test]
    fn apply_replaces_stats_for_the_selected_year() {
        let mut overview = MonthlyOverview::from_snapshot(2023, stats(2023, 1));
        let ticket = overview.request(2024);
        assert_eq!(overview.apply(ticket, Ok(stats(2024, 3)), 2024), ApplyOutcome::Applied);
        assert_eq!(overview.year(), 2024);
        assert_eq!(overview.summary().total_tasks, 3);
    }

    #[test]
    fn apply_discards_results_for_a_year_no_longer_selected() {
        let mut overview = MonthlyOverview::from_snapshot(2023, stats(2023, 1));
        let ticket = overview.request(2022);
        assert_eq!(overview.apply(ticket, Ok(stats(2022, 5)), 2024), ApplyOutcome::Stale);
        assert_eq!(overview.year(), 2023);
        assert_eq!(overview.summary().total_tasks, 1);
    }

    #[test]
    fn apply_discards_superseded_requests_for_the_same_year() {
        let mut overview = MonthlyOverview::from_snapshot(2023, stats(2023, 1));
        let older = overview.request(2024);
        let newer = overview.request(2024);
        assert_eq!(overview.apply(newer, Ok(stats(2024, 4)), 2024), ApplyOutcome::Applied);
        assert_eq!(overview.apply(older, Ok(stats(2024, 9)), 2024), ApplyOutcome::Stale);
        assert_eq!(overview.summary().total_tasks, 4);
    }

    #[test]
    fn failed_fetch_keeps_last_good_stats_with_a_notice() {
        let mut overview = MonthlyOverview::from_snapshot(2023, stats(2023, 2));
        let ticket = overview.request(2024);
        let err = SourceError::Read {
            path: "tasks.json".into(),
            source: std::io::Error::other("disk gone"),
        };
        assert_eq!(overview.apply(ticket, Err(err), 2024), ApplyOutcome::Failed);
        assert_eq!(overview.year(), 2023);
        assert_eq!(overview.summary().total_tasks, 2);
        assert!(overview.notice().is_some());

        let ticket = overview.request(2024);
        overview.apply(ticket, Ok(stats(2024, 1)), 2024);
        assert_eq!(overview.notice(), None);
    }

    #[tokio::test]
    async fn late_response_for_previous_year_does_not_overwrite_newer_stats() {
        let (source, mut releases) = HeldSource::new(&[(2022, 7), (2023, 2)]);
        let refresher = refresher(source, 2022, MonthlyOverview::from_snapshot(2024, Vec::new()));

        let slow = refresher.refresh(2022).await;
        refresher.selection.set_selected_year(2023).await;
        let fast = refresher.refresh(2023).await;

        releases.remove(&2023).unwrap().send(()).unwrap();
        assert_eq!(fast.await.unwrap(), ApplyOutcome::Applied);
        releases.remove(&2022).unwrap().send(()).unwrap();
        assert_eq!(slow.await.unwrap(), ApplyOutcome::Stale);

        let overview = refresher.overview.lock().await;
        assert_eq!(overview.year(), 2023);
        assert_eq!(overview.summary().total_tasks, 2);
    }

    #[tokio::test]
    async fn refresh_failure_preserves_display() {
        let (mut source, mut releases) = HeldSource::new(&[(2023, 2)]);
        source.failing = true;
        let refresher = refresher(source, 2023, MonthlyOverview::from_snapshot(2024, stats(2024, 5)));

        let handle = refresher.refresh(2023).await;
        releases.remove(&2023).unwrap().send(()).unwrap();
        assert_eq!(handle.await.unwrap(), ApplyOutcome::Failed);

        let overview = refresher.overview.lock().await;
        assert_eq!(overview.year(), 2024);
        assert_eq!(overview.summary().total_tasks, 5);
    }

    async fn wait_for_year(overview: &Mutex<MonthlyOverview>, year: i32) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if overview.lock().await.year() == year {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("overview never reached the expected year");
    }

    #[tokio::test]
    async fn loop_waits_for_gate_then_recomputes_on_changes() {
        let (source, mut releases) = HeldSource::new(&[(2021, 3), (2022, 4)]);
        for (_, release) in releases.drain() {
            release.send(()).unwrap();
        }
        let refresher = refresher(source, 2021, MonthlyOverview::from_snapshot(2024, stats(2024, 1)));
        let gate = HydrationGate::new();
        let handle = spawn_refresh_loop(refresher.clone(), gate.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(refresher.overview.lock().await.year(), 2024);

        gate.open();
        wait_for_year(&refresher.overview, 2021).await;
        assert_eq!(refresher.overview.lock().await.summary().total_tasks, 3);

        refresher.selection.set_selected_year(2022).await;
        wait_for_year(&refresher.overview, 2022).await;
        assert_eq!(refresher.overview.lock().await.summary().total_tasks, 4);
        handle.abort();
    }

    #[tokio::test]
    async fn loop_keeps_matching_snapshot() {
        let (source, _releases) = HeldSource::new(&[]);
        let refresher = refresher(source, 2024, MonthlyOverview::from_snapshot(2024, stats(2024, 6)));
        let gate = HydrationGate::new();
        let handle = spawn_refresh_loop(refresher.clone(), gate.clone());

        gate.open();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let overview = refresher.overview.lock().await;
        assert_eq!(overview.summary().total_tasks, 6);
        assert_eq!(overview.latest, 0);
        drop(overview);
        handle.abort();
    }
}
