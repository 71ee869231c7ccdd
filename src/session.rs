//! Browser session management
//!
//! Tracks per-visitor workflow progress, keyed by the id in the session
//! cookie. Sessions expire after a fixed TTL counted from the last request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::workflow::filing::CurrentDocument;
use crate::workflow::signup::SignupState;
use crate::workflow::Notice;

/// Sweep expired sessions at most this often
const CLEANUP_INTERVAL_SECS: u64 = 60;

/// Workflow data carried between requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Mobile number of the signed-in account
    pub mobile: Option<String>,
    pub signup: Option<SignupState>,
    pub current_doc: Option<CurrentDocument>,
    /// Id of the transaction signed last in this session
    pub last_doc_id: Option<u64>,
    /// Flash notices for the next rendered page
    pub notices: Vec<Notice>,
}

impl SessionData {
    pub fn flash(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// A visitor's session
#[derive(Debug, Clone)]
pub struct Session {
    pub data: SessionData,
    pub expires_at: u64,
}

impl Session {
    fn new(ttl_seconds: u64) -> Self {
        Self {
            data: SessionData::default(),
            expires_at: now() + ttl_seconds,
        }
    }

    pub fn is_expired(&self) -> bool {
        now() >= self.expires_at
    }

    fn touch(&mut self, ttl_seconds: u64) {
        self.expires_at = now() + ttl_seconds;
    }
}

/// In-memory session store with expiration
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    last_cleanup: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_secs(ttl_seconds),
            last_cleanup: AtomicU64::new(0),
        }
    }

    /// Start an empty session and return its id
    pub fn create(&self) -> String {
        let session_id = format!("sess_{}", uuid::Uuid::new_v4());
        self.sessions
            .insert(session_id.clone(), Session::new(self.ttl.as_secs()));
        debug!(session_id = %session_id, "Created session");

        self.maybe_cleanup();
        session_id
    }

    /// Whether `session_id` names a live session. Expired sessions are removed.
    pub fn validate(&self, session_id: &str) -> bool {
        let expired = match self.sessions.get(session_id) {
            Some(session) => session.is_expired(),
            None => return false,
        };
        if expired {
            self.destroy(session_id);
        }
        !expired
    }

    /// Run `f` on the session's data under its entry lock.
    ///
    /// A session that vanished in the meantime is recreated empty. `f` must
    /// not call back into the store.
    pub fn update<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let ttl = self.ttl.as_secs();
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(ttl));
        session.touch(ttl);
        f(&mut session.data)
    }

    /// Snapshot of the session's data
    pub fn get(&self, session_id: &str) -> Option<SessionData> {
        self.sessions.get(session_id).map(|s| s.data.clone())
    }

    pub fn destroy(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            debug!(session_id = %session_id, "Destroyed session");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove all expired sessions
    pub fn cleanup(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }

    fn maybe_cleanup(&self) {
        let now = now();
        let last = self.last_cleanup.load(Ordering::Relaxed);
        if now.saturating_sub(last) >= CLEANUP_INTERVAL_SECS
            && self
                .last_cleanup
                .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            self.cleanup();
        }
    }
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
