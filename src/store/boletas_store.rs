use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared::{normalize_list, Boleta, BoletasFilters};
use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::{Duration, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use super::{
    api::{BoletaList, BoletasApi, StoreError},
    loop_guard::LoopGuard,
    session::SessionStorage,
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_LIMIT: usize = 1000;

const LOOP_MESSAGE: &str =
    "Se detectaron demasiadas recargas seguidas. Recarga la página para continuar.";

/// Everything a page reads from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoletasSnapshot {
    pub facturadas: Vec<Boleta>,
    pub no_facturadas: Vec<Boleta>,
    pub last_updated: Option<DateTime<Utc>>,
    pub filters: BoletasFilters,
    /// Only foreground fetches raise this.
    pub loading: bool,
    pub error: Option<String>,
    pub loop_broken: bool,
    /// Set after a 401; the shell should send the user to the login page.
    pub session_expired: bool,
}

impl BoletasSnapshot {
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Foreground,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SessionExpired,
    LoopDetected,
}

/// What happened to one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A cycle started later had already written the snapshot.
    Superseded,
    Failed,
    NoSession,
    Suppressed,
}

struct Inner {
    api: Arc<dyn BoletasApi>,
    session: Arc<dyn SessionStorage>,
    limit: usize,
    state: watch::Sender<BoletasSnapshot>,
    events: broadcast::Sender<StoreEvent>,
    guard: Mutex<LoopGuard>,
    next_generation: AtomicU64,
    /// Generation of the last cycle written to `state`.
    applied_generation: Mutex<u64>,
    foreground_in_flight: AtomicUsize,
}

/// Auto-refreshing cache of the facturadas / no-facturadas lists.
#[derive(Clone)]
pub struct BoletasStore {
    inner: Arc<Inner>,
}

impl BoletasStore {
    pub fn new(api: Arc<dyn BoletasApi>, session: Arc<dyn SessionStorage>) -> Self {
        Self::with_options(api, session, DEFAULT_LIMIT, LoopGuard::default())
    }

    pub fn with_options(
        api: Arc<dyn BoletasApi>,
        session: Arc<dyn SessionStorage>,
        limit: usize,
        guard: LoopGuard,
    ) -> Self {
        let (state, _) = watch::channel(BoletasSnapshot::default());
        let (events, _) = broadcast::channel(16);

        Self {
            inner: Arc::new(Inner {
                api,
                session,
                limit,
                state,
                events,
                guard: Mutex::new(guard),
                next_generation: AtomicU64::new(0),
                applied_generation: Mutex::new(0),
                foreground_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> BoletasSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoletasSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn update(&self, modify: impl FnOnce(&mut BoletasSnapshot)) {
        self.inner.state.send_modify(modify);
    }

    fn emit(&self, event: StoreEvent) {
        // Nobody listening is fine
        let _ = self.inner.events.send(event);
    }

    /// One fetch cycle. Background requests are upgraded to foreground when
    /// nothing has been loaded yet.
    pub async fn fetch(&self, requested: FetchMode) -> FetchOutcome {
        if !self.inner.guard.lock().register(Instant::now()) {
            warn!("🔁 Boletas fetch suppressed: more than the allowed refreshes in the last 10s");
            self.update(|s| {
                s.loop_broken = true;
                s.error = Some(LOOP_MESSAGE.to_string());
            });
            self.emit(StoreEvent::LoopDetected);
            return FetchOutcome::Suppressed;
        }

        let Some(token) = self.inner.session.token() else {
            debug!("No session token, clearing boletas");
            self.update(|s| {
                s.facturadas.clear();
                s.no_facturadas.clear();
                s.loading = false;
            });
            return FetchOutcome::NoSession;
        };

        let (filters, has_data) = {
            let current = self.inner.state.borrow();
            (current.filters.clone(), current.has_data())
        };
        let mode = if has_data { requested } else { FetchMode::Foreground };
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        if mode == FetchMode::Foreground {
            self.inner.foreground_in_flight.fetch_add(1, Ordering::SeqCst);
            self.update(|s| s.loading = true);
        }

        let api = &self.inner.api;
        let limit = self.inner.limit;
        let (facturadas, no_facturadas) = tokio::join!(
            api.fetch_list(BoletaList::Facturadas, &token, &filters, limit),
            api.fetch_list(BoletaList::NoFacturadas, &token, &filters, limit),
        );

        let still_loading = if mode == FetchMode::Foreground {
            self.inner.foreground_in_flight.fetch_sub(1, Ordering::SeqCst) > 1
        } else {
            self.inner.foreground_in_flight.load(Ordering::SeqCst) > 0
        };

        let result = match (facturadas, no_facturadas) {
            (Err(StoreError::Unauthorized), _) | (_, Err(StoreError::Unauthorized)) => {
                return self.expire_session(still_loading);
            }
            (Ok(f), Ok(nf)) => normalize_list(f)
                .and_then(|f| normalize_list(nf).map(|nf| (f, nf)))
                .map_err(StoreError::from),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        let mut applied = self.inner.applied_generation.lock();
        if generation < *applied {
            debug!("Discarding boletas cycle {} (cycle {} already applied)", generation, *applied);
            self.update(|s| s.loading = still_loading);
            return FetchOutcome::Superseded;
        }
        *applied = generation;

        match result {
            Ok((facturadas, no_facturadas)) => {
                info!(
                    "📋 Boletas refreshed: {} facturadas, {} no facturadas",
                    facturadas.len(),
                    no_facturadas.len()
                );
                self.update(|s| {
                    s.facturadas = facturadas;
                    s.no_facturadas = no_facturadas;
                    s.last_updated = Some(Utc::now());
                    s.loading = still_loading;
                    s.error = None;
                    s.loop_broken = false;
                    s.session_expired = false;
                });
                FetchOutcome::Applied
            }
            Err(e) => {
                error!("❌ Boletas refresh failed: {}", e);
                self.update(|s| {
                    s.loading = still_loading;
                    if !s.loop_broken {
                        s.error = Some(e.user_message());
                    }
                });
                FetchOutcome::Failed
            }
        }
    }

    fn expire_session(&self, still_loading: bool) -> FetchOutcome {
        warn!("🔒 Session rejected by the backend, clearing it");
        self.inner.session.clear();
        self.update(|s| {
            s.facturadas.clear();
            s.no_facturadas.clear();
            s.loading = still_loading;
            s.session_expired = true;
            s.error = Some(StoreError::Unauthorized.user_message());
        });
        self.emit(StoreEvent::SessionExpired);
        FetchOutcome::Failed
    }

    /// With filters: merge them and let the change trigger the fetch.
    /// Without: immediate foreground fetch with the current filters.
    pub async fn reload(&self, filters: Option<BoletasFilters>) -> Option<FetchOutcome> {
        match filters {
            Some(patch) => self.set_filters(patch).await,
            None => Some(self.fetch(FetchMode::Foreground).await),
        }
    }

    /// Merges `patch` into the current filters. A change triggers exactly
    /// one fetch carrying the full merged set; no change, no fetch.
    pub async fn set_filters(&self, patch: BoletasFilters) -> Option<FetchOutcome> {
        self.change_filters(|current| current.merged(&patch)).await
    }

    /// Replaces the whole filter state; a `None` field is cleared.
    pub async fn replace_filters(&self, filters: BoletasFilters) -> Option<FetchOutcome> {
        self.change_filters(|_| filters).await
    }

    pub async fn clear_filters(&self) -> Option<FetchOutcome> {
        self.replace_filters(BoletasFilters::default()).await
    }

    async fn change_filters(
        &self,
        next: impl FnOnce(&BoletasFilters) -> BoletasFilters,
    ) -> Option<FetchOutcome> {
        let mut changed = false;
        self.update(|s| {
            let filters = next(&s.filters);
            changed = filters != s.filters;
            s.filters = filters;
        });

        if !changed {
            return None;
        }
        Some(self.fetch(FetchMode::Background).await)
    }

    /// Call when the client regains the foreground.
    pub async fn notify_visibility(&self, visible: bool) -> Option<FetchOutcome> {
        if !visible {
            return None;
        }
        Some(self.fetch(FetchMode::Background).await)
    }

    /// Call when the persisted token changed outside this store.
    pub async fn notify_token_changed(&self) -> FetchOutcome {
        self.fetch(FetchMode::Background).await
    }

    /// Background refresh every `interval`, using whatever filters are
    /// current when the timer fires.
    pub fn spawn_polling(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.fetch(FetchMode::Background).await;
            }
        })
    }

    /// Initial load plus the 5-minute poller.
    pub async fn start(&self) -> JoinHandle<()> {
        self.fetch(FetchMode::Foreground).await;
        self.spawn_polling(POLL_INTERVAL)
    }
}
