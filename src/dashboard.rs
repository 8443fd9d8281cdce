//! Dashboard state: the current row store, filter controls and derived KPIs.
//!
//! Loads run on a worker thread and report back over a channel; the owner
//! applies them with [`Dashboard::poll`] or [`Dashboard::wait`]. Starting a
//! new load cancels the one in flight, and a superseded load is never
//! applied even if it finishes later. The row store is replaced as a whole,
//! never merged.
//!
//! Filtering and aggregation are recomputed whenever the rows (tracked by a
//! source epoch) or the applied criteria change, and cached otherwise.

use crate::api::{DataSource, FIRST_DATA_YEAR};
use crate::cancel::CancelToken;
use crate::error::FetchError;
use crate::filter::{FilterCriteria, apply_filter};
use crate::models::{Observation, YearRange};
use crate::stats::{KpiSnapshot, aggregate};
use crate::table::{Page, paginate};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Range fetched on every reload; filtering happens client-side.
    pub full_range: YearRange,
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            full_range: YearRange::new(FIRST_DATA_YEAR, 2024),
            page_size: 50,
        }
    }
}

/// Outcome of checking on a background load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// No load in flight.
    Idle,
    /// A load is running.
    Pending,
    /// Rows were replaced.
    Applied { rows: usize },
    /// The load failed; previous rows are kept.
    Failed(String),
    /// The result belonged to a superseded or cancelled load.
    Discarded,
}

type LoadResult = Result<Vec<Observation>, FetchError>;

struct PendingLoad {
    generation: u64,
    token: CancelToken,
    receiver: Receiver<LoadResult>,
}

struct Computed {
    epoch: u64,
    criteria: FilterCriteria,
    filtered: Vec<Observation>,
    snapshot: KpiSnapshot,
}

pub struct Dashboard<S: DataSource> {
    source: Arc<S>,
    config: DashboardConfig,
    rows: Arc<Vec<Observation>>,
    /// Bumped every time `rows` is replaced.
    epoch: u64,
    /// Bumped every time a load starts.
    generation: u64,
    pending: Option<PendingLoad>,
    /// Filter controls as edited, not yet applied.
    draft: FilterCriteria,
    applied: FilterCriteria,
    page: usize,
    error: Option<String>,
    computed: Option<Computed>,
}

impl<S: DataSource> Dashboard<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            rows: Arc::new(Vec::new()),
            epoch: 0,
            generation: 0,
            pending: None,
            draft: FilterCriteria::default(),
            applied: FilterCriteria::default(),
            page: 1,
            error: None,
            computed: None,
        }
    }

    /// Start loading the configured range, superseding any load in flight.
    pub fn reload(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let token = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let source = Arc::clone(&self.source);
        let range = self.config.full_range;
        let worker_token = token.clone();
        thread::spawn(move || {
            let result = source.load(range, &worker_token);
            if worker_token.is_cancelled() {
                log::debug!("load #{} finished after cancellation, dropping result", generation);
                return;
            }
            let _ = tx.send(result);
        });

        log::debug!("load #{} started for {}", generation, range.to_query_param());
        self.pending = Some(PendingLoad {
            generation,
            token,
            receiver: rx,
        });
        generation
    }

    /// Abort the load in flight, if any. Its result will never be applied.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            log::debug!("cancelling load #{}", p.generation);
            p.token.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking check for a finished load.
    pub fn poll(&mut self) -> LoadEvent {
        let received = match &self.pending {
            Some(p) => p.receiver.try_recv(),
            None => return LoadEvent::Idle,
        };
        match received {
            Ok(result) => match self.pending.take() {
                Some(p) => self.finish(p.generation, &p.token, result),
                None => LoadEvent::Idle,
            },
            Err(TryRecvError::Empty) => LoadEvent::Pending,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                LoadEvent::Discarded
            }
        }
    }

    /// Block until the load in flight finishes and apply it.
    pub fn wait(&mut self) -> LoadEvent {
        let Some(p) = self.pending.take() else {
            return LoadEvent::Idle;
        };
        match p.receiver.recv() {
            Ok(result) => self.finish(p.generation, &p.token, result),
            Err(_) => LoadEvent::Discarded,
        }
    }

    fn finish(&mut self, generation: u64, token: &CancelToken, result: LoadResult) -> LoadEvent {
        if generation != self.generation || token.is_cancelled() {
            log::warn!("discarding stale load #{}", generation);
            return LoadEvent::Discarded;
        }
        match result {
            Ok(rows) => {
                let n = rows.len();
                self.rows = Arc::new(rows);
                self.epoch += 1;
                self.error = None;
                self.page = 1;
                log::info!("load #{} applied: {} rows", generation, n);
                LoadEvent::Applied { rows: n }
            }
            Err(FetchError::Cancelled) => LoadEvent::Discarded,
            Err(e) => {
                log::warn!("load #{} failed: {}", generation, e);
                let msg = e.to_string();
                self.error = Some(msg.clone());
                LoadEvent::Failed(msg)
            }
        }
    }

    /// Replace the row store directly, as if a load had completed.
    pub fn set_rows(&mut self, rows: Vec<Observation>) {
        self.cancel();
        self.rows = Arc::new(rows);
        self.epoch += 1;
        self.page = 1;
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.applied
    }

    /// Apply criteria directly, bypassing the draft controls.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.draft = criteria.clone();
        self.applied = criteria.normalized();
        self.page = 1;
    }

    /// Pick a country in the controls. With no years entered it applies
    /// immediately and clears any applied year range.
    pub fn select_country(&mut self, id: Option<String>, name: Option<String>) {
        self.draft.country_id = id;
        self.draft.country_name = name;
        if self.draft.year_from.is_none() && self.draft.year_to.is_none() {
            self.applied = FilterCriteria {
                country_id: self.draft.country_id.clone(),
                country_name: self.draft.country_name.clone(),
                year_from: None,
                year_to: None,
            };
            self.page = 1;
        }
    }

    pub fn set_years(&mut self, from: Option<i32>, to: Option<i32>) {
        self.draft.year_from = from;
        self.draft.year_to = to;
    }

    /// Commit the draft controls.
    pub fn apply(&mut self) {
        self.applied = self.draft.normalized();
        self.page = 1;
    }

    /// Clear both the draft controls and the applied filter.
    pub fn reset(&mut self) {
        self.draft = FilterCriteria::default();
        self.applied = FilterCriteria::default();
        self.page = 1;
    }

    fn computed(&mut self) -> &Computed {
        let fresh = self
            .computed
            .as_ref()
            .is_some_and(|c| c.epoch == self.epoch && c.criteria == self.applied);
        if !fresh {
            self.computed = None;
        }
        let (rows, applied, epoch) = (&self.rows, &self.applied, self.epoch);
        self.computed.get_or_insert_with(|| {
            let filtered = apply_filter(rows, applied);
            let snapshot = aggregate(&filtered);
            Computed {
                epoch,
                criteria: applied.clone(),
                filtered,
                snapshot,
            }
        })
    }

    /// KPIs for the current rows and applied criteria.
    pub fn snapshot(&mut self) -> &KpiSnapshot {
        &self.computed().snapshot
    }

    pub fn filtered(&mut self) -> &[Observation] {
        &self.computed().filtered
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Current table page of the filtered rows.
    pub fn page(&mut self) -> Page<'_> {
        let (page, size) = (self.page, self.config.page_size);
        paginate(&self.computed().filtered, page, size)
    }
}

impl<S: DataSource> Drop for Dashboard<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
