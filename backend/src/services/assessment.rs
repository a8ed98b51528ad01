//! Assessment session service
//!
//! Each respondent gets an independent [`FlowState`] keyed by session id.
//! Transitions run under the store's write lock so a session never observes
//! a half-applied step; lead delivery happens after the lock is released.

use crate::error::{ApiError, ApiResult};
use crate::services::lead::{LeadSubmitter, SubmissionOutcome};
use chrono::Utc;
use metabolic_risk_shared::{
    Attribution, FlowError, FlowState, LeadForm, LeadOptions, MeasurementInput,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

/// Default idle lifetime of a session
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Default period of the background cleanup task
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

struct SessionEntry {
    state: FlowState,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(state: FlowState) -> Self {
        Self {
            state,
            last_activity: Instant::now(),
        }
    }

    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_activity.elapsed() > idle_timeout
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// In-memory session map
///
/// Sessions idle for longer than the timeout are treated as unknown and
/// evicted by [`SessionStore::cleanup_expired`].
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
    cleanup_interval: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_timeouts(DEFAULT_IDLE_TIMEOUT, DEFAULT_CLEANUP_INTERVAL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(idle_timeout: Duration, cleanup_interval: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            cleanup_interval,
        }
    }

    pub async fn create(&self) -> (Uuid, FlowState) {
        let id = Uuid::new_v4();
        let state = FlowState::new();
        self.sessions
            .write()
            .await
            .insert(id, SessionEntry::new(state.clone()));
        (id, state)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<FlowState> {
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        entry.touch();
        Ok(entry.state.clone())
    }

    /// Number of stored sessions, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Apply a transition and store the resulting state
    ///
    /// The stored state is left untouched when the transition fails.
    pub async fn update<T, F>(&self, id: Uuid, transition: F) -> ApiResult<(FlowState, T)>
    where
        F: FnOnce(&FlowState) -> Result<(FlowState, T), FlowError>,
    {
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        let (next, extra) = transition(&entry.state)?;
        entry.state = next.clone();
        entry.touch();
        Ok((next, extra))
    }

    /// Look up a session, evicting it if it has expired
    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, SessionEntry>,
        id: Uuid,
    ) -> ApiResult<&'a mut SessionEntry> {
        let expired = match sessions.get(&id) {
            Some(entry) => entry.is_expired(self.idle_timeout),
            None => return Err(not_found(id)),
        };
        if expired {
            sessions.remove(&id);
            debug!(session_id = %id, "Session expired");
            return Err(not_found(id));
        }
        sessions.get_mut(&id).ok_or_else(|| not_found(id))
    }

    /// Remove every expired session, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.idle_timeout));
        before - sessions.len()
    }

    /// Start a background task that periodically evicts expired sessions
    ///
    /// Send `true` on the returned channel to stop the task.
    pub fn start_cleanup_task(&self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = self.clone();

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(store.cleanup_interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = store.cleanup_expired().await;
                        if removed > 0 {
                            let remaining = store.len().await;
                            info!(removed, remaining, "Expired sessions removed");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            debug!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session {} not found", id))
}

/// Assessment flow operations
pub struct AssessmentService;

impl AssessmentService {
    /// Start a new session in the input step
    pub async fn start(store: &SessionStore) -> (Uuid, FlowState) {
        let (id, state) = store.create().await;
        info!(session_id = %id, "Assessment session started");
        (id, state)
    }

    /// Validate the form, compute metrics and show the teaser
    pub async fn submit_measurement(
        store: &SessionStore,
        id: Uuid,
        input: &MeasurementInput,
    ) -> ApiResult<FlowState> {
        let (state, ()) = store
            .update(id, |state| state.submit_measurement(input).map(|s| (s, ())))
            .await?;

        if let Some(assessment) = state.assessment() {
            info!(
                session_id = %id,
                has_risk = assessment.has_risk(),
                "Measurement accepted"
            );
        }
        Ok(state)
    }

    pub async fn open_lead_gate(store: &SessionStore, id: Uuid) -> ApiResult<FlowState> {
        let (state, ()) = store
            .update(id, |state| state.open_lead_gate().map(|s| (s, ())))
            .await?;
        debug!(session_id = %id, "Lead gate opened");
        Ok(state)
    }

    pub async fn close_lead_gate(store: &SessionStore, id: Uuid) -> ApiResult<FlowState> {
        let (state, ()) = store
            .update(id, |state| state.close_lead_gate().map(|s| (s, ())))
            .await?;
        debug!(session_id = %id, "Lead gate dismissed");
        Ok(state)
    }

    /// Validate the contact form, reveal the result and hand off the lead
    ///
    /// The result is revealed whether delivery succeeds or falls back.
    pub async fn submit_lead(
        store: &SessionStore,
        leads: &LeadSubmitter,
        id: Uuid,
        form: &LeadForm,
        attribution: Attribution,
    ) -> ApiResult<(FlowState, SubmissionOutcome)> {
        let options = LeadOptions {
            include_clinical_detail: leads.include_clinical_detail(),
        };
        let (state, record) = store
            .update(id, |state| {
                state.submit_lead(form, attribution, options, Utc::now())
            })
            .await?;

        info!(
            session_id = %id,
            utm_source = %record.traffic_attribution.utm_source,
            "Lead captured, result revealed"
        );

        let outcome = leads.submit(record).await;
        Ok((state, outcome))
    }

    /// Return to the input step, discarding everything held
    pub async fn reset(store: &SessionStore, id: Uuid) -> ApiResult<FlowState> {
        let (state, ()) = store.update(id, |state| Ok((state.reset(), ()))).await?;
        debug!(session_id = %id, "Assessment reset");
        Ok(state)
    }
}
