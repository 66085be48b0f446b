use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clubchess_core::puzzle::{PuzzleSession, ScheduledAction};
use clubchess_core::rules::ShakmatyRules;
use tokio::sync::Mutex;

/// Registry of live puzzle-solving sessions, keyed by the opaque id handed to
/// the client.
///
/// All session mutation happens under one lock, so submissions and timer
/// callbacks never interleave mid-update. Delayed effects are spawned sleeps
/// that re-lock and hand the action back to the session; the action identity
/// check inside `fire_scheduled` makes timers that outlive a reset or a
/// replaced session fall through without touching anything.
#[derive(Clone, Default)]
pub struct PuzzleSessions {
    sessions: Arc<Mutex<HashMap<i64, PuzzleSession>>>,
    next_id: Arc<AtomicI64>,
}

impl PuzzleSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, session: PuzzleSession) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sessions.lock().await.insert(id, session);
        id
    }

    /// Run `f` against the session with `id`, or `None` if it does not exist.
    pub async fn with_session<T>(
        &self,
        id: i64,
        f: impl FnOnce(&mut PuzzleSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(&id).map(f)
    }

    /// Arrange for a scheduled action to fire after its delay.
    pub fn arm(&self, id: i64, action: ScheduledAction) {
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(action.delay_ms)).await;
            let mut sessions = registry.sessions.lock().await;
            if let Some(session) = sessions.get_mut(&id) {
                session.fire_scheduled(&ShakmatyRules, action);
            }
        });
    }
}
