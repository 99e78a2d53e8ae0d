//! Storyboard sessions: the append-only item log plus the single in-flight
//! submission guard.
//!
//! CRITICAL: items are only ever pushed. Nothing in this module mutates or
//! removes an item once it is in the log.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::storyboard::models::{FileHint, StoryboardItem};

/// Upper bound on how often the idle sweep runs.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Candidate,
    Recruiter,
}

impl Role {
    pub fn welcome(&self) -> &'static str {
        match self {
            Role::Candidate => {
                "Welcome! Share your work story and I'll help build your professional narrative visually."
            }
            Role::Recruiter => {
                "Welcome to this candidate's professional portal. Ask specific questions to explore their experience."
            }
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Role::Candidate => "Tell me about your work, projects, or skills...",
            Role::Recruiter => "Ask about this candidate's experience, skills, or projects...",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("a response is already being generated for this session")]
    Busy,
}

/// An accepted submission, handed to the response pipeline.
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: Uuid,
    pub query: String,
    pub file_hint: Option<FileHint>,
    pub role: Role,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    ticket: Uuid,
    cancel: CancellationToken,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    role: Role,
    items: Vec<StoryboardItem>,
    attachment: Option<FileHint>,
    in_flight: Option<InFlight>,
    last_failure: Option<String>,
    /// Parent of every submission's token; cancelled when the session is discarded.
    lifetime: CancellationToken,
    created_at: DateTime<Utc>,
    last_touched: Instant,
}

impl Session {
    /// New session whose log starts with the role's welcome message.
    pub fn new(role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            items: vec![StoryboardItem::assistant_message(role.welcome())],
            attachment: None,
            in_flight: None,
            last_failure: None,
            lifetime: CancellationToken::new(),
            created_at: Utc::now(),
            last_touched: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[StoryboardItem] {
        &self.items
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_attachment(&mut self, hint: Option<FileHint>) {
        self.attachment = hint;
    }

    /// Accepts a submission: echoes the user's text into the log and marks the
    /// session pending. Blank text and concurrent submissions are rejected
    /// without touching the log.
    pub fn begin(&mut self, text: &str) -> Result<Submission, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }

        self.items.push(StoryboardItem::user_message(text));
        self.last_failure = None;

        let ticket = Uuid::new_v4();
        let cancel = self.lifetime.child_token();
        self.in_flight = Some(InFlight {
            ticket,
            cancel: cancel.clone(),
        });

        Ok(Submission {
            ticket,
            query: text.to_string(),
            file_hint: self.attachment.clone(),
            role: self.role,
            cancel,
        })
    }

    /// Lands the outcome of the submission identified by `ticket`. A success
    /// appends the item; a failure appends nothing and is kept as
    /// `last_failure`. Either way the session is ready again. Stale tickets
    /// are ignored and return false.
    pub fn settle(&mut self, ticket: Uuid, outcome: Result<StoryboardItem, String>) -> bool {
        match &self.in_flight {
            Some(flight) if flight.ticket == ticket => {}
            _ => return false,
        }
        self.in_flight = None;

        match outcome {
            Ok(item) => self.items.push(item),
            Err(reason) => self.last_failure = Some(reason),
        }
        true
    }

    /// Cancels any pending response. Called when the session is discarded.
    pub fn discard(&mut self) {
        self.lifetime.cancel();
        if let Some(flight) = self.in_flight.take() {
            flight.cancel.cancel();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            role: self.role,
            placeholder: self.role.placeholder().to_string(),
            pending: self.is_pending(),
            attachment: self.attachment.clone(),
            last_failure: self.last_failure.clone(),
            items: self.items.clone(),
            created_at: self.created_at,
        }
    }
}

/// Serializable view of a session for the rendering host.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub role: Role,
    pub placeholder: String,
    pub pending: bool,
    pub attachment: Option<FileHint>,
    pub last_failure: Option<String>,
    pub items: Vec<StoryboardItem>,
    pub created_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// In-memory session registry shared by all handlers.
///
/// Locks are held only for the duration of a closure; never across an await.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, role: Role) -> SessionSnapshot {
        let session = Session::new(role);
        let snapshot = session.snapshot();
        self.sessions.lock().await.insert(session.id(), session);
        snapshot
    }

    /// Runs `f` against the session, or returns None if it does not exist.
    /// Any access counts as activity for the idle sweep.
    pub async fn with<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(&id).map(|session| {
            session.last_touched = Instant::now();
            f(session)
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Discards every session untouched for at least `ttl`, cancelling any
    /// pending response. Returns how many were removed.
    pub async fn sweep_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, s)| now.duration_since(s.last_touched) >= ttl)
            .map(|(id, _)| *id)
            .collect();

        for id in &idle {
            if let Some(mut session) = sessions.remove(id) {
                session.discard();
            }
        }
        idle.len()
    }

    /// Removes the session and cancels its pending response. Returns false if
    /// no such session existed.
    pub async fn discard(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id);
        match removed {
            Some(mut session) => {
                session.discard();
                true
            }
            None => false,
        }
    }
}

/// Spawns the background task that evicts sessions idle for `ttl`.
pub fn spawn_idle_sweep(store: SessionStore, ttl: Duration) -> JoinHandle<()> {
    let period = ttl.min(MAX_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = store.sweep_idle(ttl).await;
            if evicted > 0 {
                tracing::info!(evicted, "Idle sweep discarded {evicted} session(s)");
            }
        }
    })
}
