//! Session-wide owner of the city/weather dataset.
//!
//! Reads go straight to the in-memory records. Mutations are applied locally
//! first and then pushed to the remote store by a per-city worker task, so
//! two changes to the same city reach the remote in the order they were made.
//! The outcome of every push is reported as a [`SyncEvent`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::fallback::fallback_dataset;
use crate::remote::RemoteStore;
use crate::search;
use crate::types::{CityId, DataSource, MergedCityWeather, StoreError, WeatherPatch};

/// What happens to local state when a remote sync fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Keep the local change (last writer wins)
    #[default]
    KeepLocal,
    /// Restore the last state the remote accepted, once the newest change fails
    RevertOnFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Update,
    Delete,
}

/// Outcome of pushing one local change to the remote store
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Synced {
        id: CityId,
        op: SyncOp,
    },
    Failed {
        id: CityId,
        op: SyncOp,
        message: String,
        /// True if the local change was rolled back
        reverted: bool,
    },
}

enum SyncJob {
    Update {
        written: MergedCityWeather,
        version: u64,
    },
    Delete {
        previous: MergedCityWeather,
        index: usize,
        version: u64,
    },
}

impl SyncJob {
    fn version(&self) -> u64 {
        match self {
            Self::Update { version, .. } | Self::Delete { version, .. } => *version,
        }
    }
}

#[derive(Default)]
struct StoreState {
    records: Vec<MergedCityWeather>,
    source: Option<DataSource>,
    /// Last state of each record the remote is known to hold
    confirmed: HashMap<CityId, MergedCityWeather>,
    /// Version of the newest local change per city
    latest: HashMap<CityId, u64>,
    next_version: u64,
}

impl StoreState {
    fn bump(&mut self, id: &CityId) -> u64 {
        self.next_version += 1;
        self.latest.insert(id.clone(), self.next_version);
        self.next_version
    }

    fn is_latest(&self, id: &CityId, version: u64) -> bool {
        self.latest.get(id) == Some(&version)
    }
}

struct Shared {
    remote: RemoteStore,
    state: Mutex<StoreState>,
    policy: SyncPolicy,
    events: mpsc::UnboundedSender<SyncEvent>,
    /// Jobs queued or in flight
    pending: AtomicUsize,
}

/// Owns the dataset for the session.
///
/// Mutations spawn Tokio tasks and must be called from within a runtime.
pub struct DataStore {
    shared: Arc<Shared>,
    workers: Mutex<HashMap<CityId, mpsc::UnboundedSender<SyncJob>>>,
}

impl DataStore {
    /// Create an empty store. Sync outcomes arrive on the returned receiver.
    pub fn new(
        remote: RemoteStore,
        policy: SyncPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let store = Self {
            shared: Arc::new(Shared {
                remote,
                state: Mutex::new(StoreState::default()),
                policy,
                events,
                pending: AtomicUsize::new(0),
            }),
            workers: Mutex::new(HashMap::new()),
        };
        (store, rx)
    }

    /// Load the dataset once per session.
    ///
    /// Falls back to the built-in dataset when the remote cannot be used;
    /// this never fails. Later calls return the loaded records without
    /// touching the network.
    pub async fn load(&self) -> Vec<MergedCityWeather> {
        {
            let state = self.shared.state.lock();
            if state.source.is_some() {
                return state.records.clone();
            }
        }
        self.refresh().await
    }

    /// Reload the dataset from the remote, with the same fallback rules as `load`.
    pub async fn refresh(&self) -> Vec<MergedCityWeather> {
        let (dataset, source) = match self.shared.remote.fetch_dataset().await {
            Ok(dataset) => (dataset, DataSource::Remote),
            Err(e) => {
                tracing::warn!("Remote dataset unavailable, using built-in data: {}", e);
                (
                    fallback_dataset(),
                    DataSource::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let records = dataset.merge();
        tracing::info!("Loaded {} cities ({:?})", records.len(), source);

        let mut state = self.shared.state.lock();
        state.confirmed = records.iter().map(|r| (r.id.clone(), r.clone())).collect();
        state.records = records.clone();
        state.source = Some(source);
        records
    }

    /// Where the current records came from; `None` before the first load
    pub fn source(&self) -> Option<DataSource> {
        self.shared.state.lock().source.clone()
    }

    /// Number of local changes not yet confirmed or rejected by the remote
    pub fn pending_syncs(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of all records in dataset order
    pub fn records(&self) -> Vec<MergedCityWeather> {
        self.shared.state.lock().records.clone()
    }

    pub fn get(&self, id: &CityId) -> Option<MergedCityWeather> {
        self.shared
            .state
            .lock()
            .records
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// Case-insensitive exact lookup by city name
    pub fn find_exact(&self, name: &str) -> Option<MergedCityWeather> {
        let state = self.shared.state.lock();
        search::find_exact(&state.records, name).cloned()
    }

    /// Case-insensitive substring lookup by city name, capped at `limit`
    pub fn find_prefix_or_substring(&self, query: &str, limit: usize) -> Vec<MergedCityWeather> {
        let state = self.shared.state.lock();
        search::find_matching(&state.records, query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Search-box suggestions (at most five)
    pub fn suggest(&self, query: &str) -> Vec<MergedCityWeather> {
        self.find_prefix_or_substring(query, search::SUGGESTION_LIMIT)
    }

    /// Apply `patch` to the weather of `id` and return the updated record.
    ///
    /// The change is visible immediately; the remote PATCH happens in the
    /// background and reports through a [`SyncEvent`]. An empty patch
    /// changes nothing and sends nothing.
    pub fn update(
        &self,
        id: &CityId,
        patch: &WeatherPatch,
    ) -> Result<MergedCityWeather, StoreError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).ok_or_else(|| StoreError::NotFound(id.clone()));
        }

        let (written, version) = {
            let mut state = self.shared.state.lock();
            let record = state
                .records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let weather = record
                .weather
                .as_mut()
                .ok_or_else(|| StoreError::MissingWeather(id.clone()))?;
            patch.apply_to(weather);
            weather.last_updated = Some(Utc::now());
            let written = record.clone();
            (written, state.bump(id))
        };

        tracing::info!("Updated {} locally", written.name);
        self.enqueue(
            id,
            SyncJob::Update {
                written: written.clone(),
                version,
            },
        );
        Ok(written)
    }

    /// Remove `id` locally and delete it from the remote in the background.
    pub fn delete(&self, id: &CityId) -> Result<(), StoreError> {
        let (previous, index, version) = {
            let mut state = self.shared.state.lock();
            let index = state
                .records
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let previous = state.records.remove(index);
            (previous, index, state.bump(id))
        };

        tracing::info!("Deleted {} locally", previous.name);
        self.enqueue(
            id,
            SyncJob::Delete {
                previous,
                index,
                version,
            },
        );
        Ok(())
    }

    fn enqueue(&self, id: &CityId, job: SyncJob) {
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        let mut workers = self.workers.lock();
        let job = match workers.get(id) {
            Some(tx) => match tx.send(job) {
                Ok(()) => return,
                Err(mpsc::error::SendError(job)) => job,
            },
            None => job,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(self.shared.clone(), id.clone(), rx));
        if tx.send(job).is_err() {
            tracing::error!("Sync worker for {} stopped before receiving work", id);
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        }
        workers.insert(id.clone(), tx);
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("policy", &self.shared.policy)
            .field("source", &self.source())
            .finish()
    }
}

/// Push jobs for one city to the remote, strictly in order
async fn run_worker(shared: Arc<Shared>, id: CityId, mut jobs: mpsc::UnboundedReceiver<SyncJob>) {
    while let Some(job) = jobs.recv().await {
        let (op, result) = match &job {
            SyncJob::Update { written, .. } => match &written.weather {
                Some(reading) => (SyncOp::Update, shared.remote.patch_weather(&id, reading).await),
                None => (SyncOp::Update, Err(StoreError::MissingWeather(id.clone()))),
            },
            SyncJob::Delete { .. } => (SyncOp::Delete, shared.remote.delete_weather(&id).await),
        };

        let event = match result {
            Ok(()) => {
                confirm(&shared, &id, job);
                SyncEvent::Synced {
                    id: id.clone(),
                    op,
                }
            }
            Err(e) => {
                tracing::error!("Failed to sync {:?} of {}: {}", op, id, e);
                let reverted =
                    shared.policy == SyncPolicy::RevertOnFailure && revert(&shared, &id, job);
                SyncEvent::Failed {
                    id: id.clone(),
                    op,
                    message: e.user_message(),
                    reverted,
                }
            }
        };

        shared.pending.fetch_sub(1, Ordering::SeqCst);
        if shared.events.send(event).is_err() {
            tracing::debug!("No listener for sync events");
        }
    }
}

/// Record what the remote now holds for `id`
fn confirm(shared: &Shared, id: &CityId, job: SyncJob) {
    let mut state = shared.state.lock();
    match job {
        SyncJob::Update { written, .. } => {
            state.confirmed.insert(id.clone(), written);
        }
        SyncJob::Delete { .. } => {
            state.confirmed.remove(id);
        }
    }
}

/// Roll `id` back to its last confirmed state.
///
/// Only the newest change of a city reverts; a failure that a later change
/// superseded is left to that change's outcome. Returns whether anything
/// was restored.
fn revert(shared: &Shared, id: &CityId, job: SyncJob) -> bool {
    let mut state = shared.state.lock();
    if !state.is_latest(id, job.version()) {
        tracing::debug!("Failed change to {} was superseded, not reverting", id);
        return false;
    }
    let baseline = state.confirmed.get(id).cloned();

    match job {
        SyncJob::Update { .. } => {
            let Some(baseline) = baseline else {
                return false;
            };
            match state.records.iter_mut().find(|r| &r.id == id) {
                Some(current) => {
                    tracing::info!("Reverting {} to its last synced state", baseline.name);
                    *current = baseline;
                    true
                }
                None => false,
            }
        }
        SyncJob::Delete {
            previous, index, ..
        } => {
            if state.records.iter().any(|r| &r.id == id) {
                return false;
            }
            let restored = baseline.unwrap_or(previous);
            tracing::info!("Restoring deleted {}", restored.name);
            let index = index.min(state.records.len());
            state.records.insert(index, restored);
            true
        }
    }
}
