//! Session store — in-memory map of independent wizard sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::state::SessionState;

struct SessionEntry {
    state: SessionState,
    last_active: DateTime<Utc>,
}

/// Holds one `SessionState` per session id. The lock is only ever held for
/// synchronous state updates, never across a generation call.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Start a new session at step 1.
    pub async fn create(&self) -> (Uuid, SessionState) {
        let id = Uuid::new_v4();
        let state = SessionState::new();
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_active: Utc::now(),
            },
        );
        info!(session_id = %id, "Session created");
        (id, state)
    }

    /// Snapshot of a session's state.
    pub async fn get(&self, id: Uuid) -> Option<SessionState> {
        self.sessions.read().await.get(&id).map(|e| e.state.clone())
    }

    /// Mutate a session in place and mark it active.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Utc::now();
        Some(f(&mut entry.state))
    }

    /// Drop sessions idle for longer than `idle`. Returns how many were removed.
    pub async fn prune_idle(&self, idle: Duration) -> usize {
        let Ok(idle) = chrono::Duration::from_std(idle) else {
            return 0;
        };
        let cutoff = Utc::now() - idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            // A session mid-generation is never idle.
            let keep = entry.last_active > cutoff || entry.state.is_generating();
            if !keep {
                debug!(session_id = %id, "Session pruned");
            }
            keep
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(count = pruned, "Pruned idle sessions");
        }
        pruned
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_prune_task(store: Arc<SessionStore>, idle: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            store.prune_idle(idle).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::state::{GenerationStatus, WizardEvent, WizardStep, transition};

    #[tokio::test]
    async fn create_and_get() {
        let store = SessionStore::new();
        assert_eq!(store.len().await, 0);

        let (id, state) = store.create().await;
        assert_eq!(state.step, WizardStep::CollectCharacter);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(id).await, Some(SessionState::new()));
    }

    #[tokio::test]
    async fn update_applies_to_one_session_only() {
        let store = SessionStore::new();
        let (a, _) = store.create().await;
        let (b, _) = store.create().await;

        let step = store
            .update(a, |s| {
                *s = transition(
                    std::mem::take(s),
                    WizardEvent::Submit {
                        value: "Luna".to_string(),
                    },
                )
                .state;
                s.step
            })
            .await;
        assert_eq!(step, Some(WizardStep::CollectLocation));
        assert_eq!(store.get(b).await.unwrap().step, WizardStep::CollectCharacter);
    }

    #[tokio::test]
    async fn unknown_session() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(store.get(id).await.is_none());
        assert!(store.update(id, |s| s.step).await.is_none());
    }

    #[tokio::test]
    async fn prune_removes_idle_but_keeps_in_flight() {
        let store = SessionStore::new();
        let (idle, _) = store.create().await;
        let (busy, _) = store.create().await;
        store
            .update(busy, |s| {
                s.step = WizardStep::Generating;
                s.generation = GenerationStatus::InFlight;
            })
            .await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        let pruned = store.prune_idle(Duration::from_millis(5)).await;

        assert_eq!(pruned, 1);
        assert!(store.get(idle).await.is_none());
        assert!(store.get(busy).await.is_some());
    }

    #[tokio::test]
    async fn prune_keeps_recent_sessions() {
        let store = SessionStore::new();
        store.create().await;
        assert_eq!(store.prune_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 1);
    }
}
