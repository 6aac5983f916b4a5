//! Per-session controller registry.
//!
//! Adapters that serve several users at once keep one controller per
//! session here. Each controller sits behind its own async mutex, so
//! operations on one session run one at a time while different sessions
//! proceed independently.

use crate::backend::GenerationBackend;
use crate::catalog::StageCatalog;
use crate::controller::StageController;
use crate::events::{EventSink, NoOpEventSink};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// A controller shared between request handlers.
pub type SharedController = Arc<Mutex<StageController>>;

/// Registry of live sessions keyed by session id.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SharedController>,
    catalog: Arc<StageCatalog>,
    backend: Arc<dyn GenerationBackend>,
    sink: Arc<dyn EventSink>,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions share a catalog and backend.
    #[must_use]
    pub fn new(catalog: Arc<StageCatalog>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            sessions: DashMap::new(),
            catalog,
            backend,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink handed to new sessions.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Starts a new session and returns its id and controller.
    pub fn create(&self) -> (Uuid, SharedController) {
        let session_id = Uuid::new_v4();
        let controller = StageController::new(Arc::clone(&self.catalog), Arc::clone(&self.backend))
            .with_event_sink(Arc::clone(&self.sink))
            .with_session_id(session_id);
        let shared = Arc::new(Mutex::new(controller));

        self.sessions.insert(session_id, Arc::clone(&shared));
        info!(%session_id, sessions = self.sessions.len(), "session created");
        (session_id, shared)
    }

    /// Looks up a session.
    #[must_use]
    pub fn get(&self, session_id: &Uuid) -> Option<SharedController> {
        self.sessions.get(session_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Ends a session, returning its controller if it existed.
    pub fn remove(&self, session_id: &Uuid) -> Option<SharedController> {
        let removed = self.sessions.remove(session_id).map(|(_, controller)| controller);
        if removed.is_some() {
            info!(%session_id, "session removed");
        }
        removed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all live sessions.
    #[must_use]
    pub fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ControllerPhase;
    use crate::testing::{three_stage_catalog, ScriptedBackend};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(three_stage_catalog()),
            Arc::new(ScriptedBackend::new()),
        )
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = registry();
        assert!(registry.is_empty());

        let (id, controller) = registry.create();
        assert_eq!(controller.lock().await.state().session_id(), id);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.session_ids(), vec![id]);

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = registry();
        let (first, _) = registry.create();
        let (second, _) = registry.create();

        {
            let shared = registry.get(&first).unwrap();
            let mut controller = shared.lock().await;
            controller.submit_input("first story").await.unwrap();
            controller.ensure_generated().await.unwrap();
        }

        let shared = registry.get(&second).unwrap();
        let controller = shared.lock().await;
        assert_eq!(controller.phase(), ControllerPhase::AwaitingInput);
        assert!(controller.state().log().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_operations_on_one_session_serialize() {
        let registry = Arc::new(registry());
        let (id, _) = registry.create();
        registry
            .get(&id)
            .unwrap()
            .lock()
            .await
            .submit_input("story")
            .await
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let shared = registry.get(&id).unwrap();
                    let mut controller = shared.lock().await;
                    controller.ensure_generated().await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let shared = registry.get(&id).unwrap();
        let controller = shared.lock().await;
        assert_eq!(controller.state().log().len(), 2);
    }
}
