use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use trajdash::{Selection, TrajectoryTable};

use crate::models::dashboard_model::{MapLayout, SessionLimits, SpeedChartLayout};

struct SessionEntry {
    selection: Option<Selection>,
    touched: Instant,
}

/// Per-session selections with idle expiry and a size cap.
pub struct SessionStore {
    entries: HashMap<Uuid, SessionEntry>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::from_secs(limits.ttl_secs),
            max_sessions: limits.max_sessions.max(1),
        }
    }

    fn expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched) > self.ttl
    }

    /// Drops idle sessions, returns how many went.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.touched) <= ttl);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!("Expired {} idle sessions", dropped);
        }
        dropped
    }

    /// Opens a session; at capacity the least recently used one is evicted.
    pub fn open(&mut self, now: Instant) -> Uuid {
        self.sweep(now);

        while self.entries.len() >= self.max_sessions {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.touched)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    debug!("Session cap reached, evicting {}", id);
                    self.entries.remove(&id);
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        self.entries.insert(
            id,
            SessionEntry {
                selection: None,
                touched: now,
            },
        );
        id
    }

    /// Stores a selection; false when the session is unknown or expired.
    pub fn select(&mut self, id: &Uuid, selection: Selection, now: Instant) -> bool {
        self.sweep(now);
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.selection = Some(selection);
                entry.touched = now;
                true
            }
            None => false,
        }
    }

    /// The session's current selection, refreshing its idle timer.
    ///
    /// Outer `None` when the session is unknown or expired.
    pub fn selection(&mut self, id: &Uuid, now: Instant) -> Option<Option<Selection>> {
        let expired = self.entries.get(id).map(|e| self.expired(e, now))?;
        if expired {
            self.entries.remove(id);
            return None;
        }
        let entry = self.entries.get_mut(id)?;
        entry.touched = now;
        Some(entry.selection.clone())
    }

    pub fn close(&mut self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    // Loaded once at startup, never written afterwards
    pub table: Arc<TrajectoryTable>,
    pub sessions: Arc<RwLock<SessionStore>>,
    pub map_layout: MapLayout,
    pub speed_layout: SpeedChartLayout,
}

impl AppState {
    pub fn new(table: TrajectoryTable) -> Self {
        Self {
            table: Arc::new(table),
            sessions: Arc::new(RwLock::new(SessionStore::new(SessionLimits::default()))),
            map_layout: MapLayout::default(),
            speed_layout: SpeedChartLayout::default(),
        }
    }

    pub fn with_layouts(mut self, map: MapLayout, speed: SpeedChartLayout) -> Self {
        self.map_layout = map;
        self.speed_layout = speed;
        self
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.sessions = Arc::new(RwLock::new(SessionStore::new(limits)));
        self
    }
}
