//! Session orchestration.
//!
//! [`SessionManager`] owns all application state: the report history and the
//! set of sessions. HTTP handlers and the CLI only ever go through its methods.

use crate::config::{ProgressConfig, SessionsConfig};
use crate::http::metrics::DebriefMetrics;
use crate::progress::ProgressTicker;
use debrief_core::{
    AnalysisInput, GenerationService, IntelligenceClient, IntelligenceReport, ReportHistory,
    ReportId, Result,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type SessionId = Uuid;

/// Shared handle to whichever generation backend is configured.
pub type SharedService = Arc<dyn GenerationService>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionStatus {
    #[serde(rename_all = "camelCase")]
    Running { progress: u8 },
    #[serde(rename_all = "camelCase")]
    Completed { report_id: ReportId },
    Failed { message: String },
    Cancelled,
}

impl SessionStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SessionStatus::Running { .. })
    }

    pub fn progress(&self) -> u8 {
        match self {
            SessionStatus::Running { progress } => *progress,
            SessionStatus::Completed { .. } => 100,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub status: SessionStatus,
    pub progress: u8,
    pub elapsed_ms: u64,
}

struct SessionEntry {
    status: Arc<watch::Sender<SessionStatus>>,
    task: Option<JoinHandle<()>>,
    started: Instant,
    settled_at: Option<Instant>,
}

impl SessionEntry {
    fn is_running(&self) -> bool {
        self.status.borrow().is_running()
    }
}

/// Removes a `run()` session's record once it settles or its future is dropped.
struct Deregister<'a> {
    manager: &'a SessionManager,
    id: SessionId,
}

impl Drop for Deregister<'_> {
    fn drop(&mut self) {
        lock(&self.manager.sessions).remove(&self.id);
    }
}

/// Marks the session cancelled if its future is dropped before settling,
/// e.g. when an HTTP client disconnects from `/analyze`.
struct SettleGuard {
    status: Arc<watch::Sender<SessionStatus>>,
    metrics: Arc<DebriefMetrics>,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let abandoned = self.status.send_if_modified(|s| {
            if s.is_running() {
                *s = SessionStatus::Cancelled;
                true
            } else {
                false
            }
        });
        if abandoned {
            self.metrics.sessions_cancelled.inc();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct SessionManager {
    client: IntelligenceClient<SharedService>,
    history: RwLock<ReportHistory>,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    progress: ProgressConfig,
    retention: SessionsConfig,
    metrics: Arc<DebriefMetrics>,
}

/// Drop settled records past the retention window, then the oldest settled
/// ones beyond the cap. Running sessions are never touched.
fn prune(sessions: &mut HashMap<SessionId, SessionEntry>, retention: &SessionsConfig, now: Instant) {
    for entry in sessions.values_mut() {
        if entry.settled_at.is_none() && !entry.is_running() {
            entry.settled_at = Some(now);
        }
    }
    let retain = retention.retain();
    sessions.retain(|_, e| match e.settled_at {
        Some(at) => now.duration_since(at) < retain,
        None => true,
    });

    let mut settled: Vec<(Instant, SessionId)> = sessions
        .iter()
        .filter_map(|(id, e)| e.settled_at.map(|at| (at, *id)))
        .collect();
    if settled.len() > retention.max_settled {
        settled.sort();
        let excess = settled.len() - retention.max_settled;
        for (_, id) in settled.into_iter().take(excess) {
            sessions.remove(&id);
        }
    }
}

impl SessionManager {
    pub fn new(
        client: IntelligenceClient<SharedService>,
        history: ReportHistory,
        progress: ProgressConfig,
        metrics: Arc<DebriefMetrics>,
    ) -> Self {
        Self {
            client,
            history: RwLock::new(history),
            sessions: Mutex::new(HashMap::new()),
            progress,
            retention: SessionsConfig::default(),
            metrics,
        }
    }

    pub fn with_retention(mut self, retention: SessionsConfig) -> Self {
        self.retention = retention;
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn history(&self) -> RwLockReadGuard<'_, ReportHistory> {
        self.history.read().unwrap_or_else(|e| e.into_inner())
    }

    fn history_mut(&self) -> RwLockWriteGuard<'_, ReportHistory> {
        self.history.write().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self) -> (SessionId, Arc<watch::Sender<SessionStatus>>) {
        let id = Uuid::now_v7();
        let (tx, _rx) = watch::channel(SessionStatus::Running { progress: 0 });
        let status = Arc::new(tx);
        let now = Instant::now();
        let mut sessions = lock(&self.sessions);
        prune(&mut sessions, &self.retention, now);
        sessions.insert(
            id,
            SessionEntry {
                status: status.clone(),
                task: None,
                started: now,
                settled_at: None,
            },
        );
        drop(sessions);
        self.metrics.sessions_started.inc();
        (id, status)
    }

    /// Start a session in the background and return its id immediately.
    pub fn start(self: &Arc<Self>, input: AnalysisInput) -> SessionId {
        let (id, status) = self.register();
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let _ = this.execute(id, input, status).await;
        });

        let mut sessions = lock(&self.sessions);
        match sessions.get_mut(&id) {
            // Cancelled before we got here: the task must not outlive it.
            Some(entry) if !entry.is_running() => task.abort(),
            Some(entry) => entry.task = Some(task),
            None => task.abort(),
        }
        id
    }

    /// Run a session to completion and return its report. The session record
    /// is removed as soon as it settles.
    pub async fn run(&self, input: AnalysisInput) -> Result<IntelligenceReport> {
        let (id, status) = self.register();
        let _deregister = Deregister { manager: self, id };
        self.execute(id, input, status).await
    }

    fn mark_settled(&self, id: SessionId) {
        if let Some(entry) = lock(&self.sessions).get_mut(&id) {
            entry.settled_at.get_or_insert_with(Instant::now);
        }
    }

    async fn execute(
        &self,
        id: SessionId,
        input: AnalysisInput,
        status: Arc<watch::Sender<SessionStatus>>,
    ) -> Result<IntelligenceReport> {
        info!(
            session = %id,
            files = input.files.len(),
            "Analysis session started"
        );
        let _guard = SettleGuard {
            status: status.clone(),
            metrics: self.metrics.clone(),
        };

        let ticker = {
            let status = status.clone();
            ProgressTicker::spawn(&self.progress, move |pct| {
                status.send_if_modified(|s| match s {
                    SessionStatus::Running { progress } if *progress != pct => {
                        *progress = pct;
                        true
                    }
                    _ => false,
                });
            })
        };

        let started = Instant::now();
        let result = self.client.analyze(&input).await;
        ticker.stop();
        // Collected input is discarded whatever the outcome.
        drop(input);

        let outcome = match result {
            Ok(report) => {
                let elapsed = started.elapsed();
                let recorded = {
                    let mut history = self.history_mut();
                    let won = status.send_if_modified(|s| {
                        if s.is_running() {
                            *s = SessionStatus::Completed { report_id: report.id };
                            true
                        } else {
                            false
                        }
                    });
                    if won {
                        history.push(report.clone());
                    }
                    won
                };
                if recorded {
                    self.metrics.sessions_completed.inc();
                    self.metrics.analysis_duration.observe(elapsed.as_secs_f64());
                    info!(
                        session = %id,
                        report = %report.id,
                        model = self.client.model_name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Analysis session completed"
                    );
                } else {
                    warn!(session = %id, "Session settled after cancellation; report discarded");
                }
                Ok(report)
            }
            Err(e) => {
                error!(session = %id, kind = e.kind(), "Analysis session failed: {}", e);
                let failed = status.send_if_modified(|s| {
                    if s.is_running() {
                        *s = SessionStatus::Failed {
                            message: e.user_message().to_string(),
                        };
                        true
                    } else {
                        false
                    }
                });
                if failed {
                    self.metrics.record_failure(e.kind());
                }
                Err(e)
            }
        };
        self.mark_settled(id);
        outcome
    }

    /// Cancel a running session. Returns `None` for unknown ids and
    /// `Some(false)` when the session had already settled.
    pub fn cancel(&self, id: SessionId) -> Option<bool> {
        let mut sessions = lock(&self.sessions);
        let entry = sessions.get_mut(&id)?;

        let cancelled = entry.status.send_if_modified(|s| {
            if s.is_running() {
                *s = SessionStatus::Cancelled;
                true
            } else {
                false
            }
        });
        entry.settled_at.get_or_insert_with(Instant::now);
        if let Some(task) = entry.task.take() {
            // Dropping the task's future also drops its ticker.
            task.abort();
        }
        if cancelled {
            self.metrics.sessions_cancelled.inc();
            info!(session = %id, "Analysis session cancelled");
        }
        Some(cancelled)
    }

    pub fn status(&self, id: SessionId) -> Option<SessionView> {
        let sessions = lock(&self.sessions);
        let entry = sessions.get(&id)?;
        let status = entry.status.borrow().clone();
        Some(SessionView {
            id,
            progress: status.progress(),
            status,
            elapsed_ms: entry.started.elapsed().as_millis() as u64,
        })
    }

    pub fn subscribe(&self, id: SessionId) -> Option<watch::Receiver<SessionStatus>> {
        lock(&self.sessions).get(&id).map(|e| e.status.subscribe())
    }

    pub fn history_len(&self) -> usize {
        self.history().len()
    }

    /// Live and retained session records.
    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }
}
