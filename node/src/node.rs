//! The verdict node: one handle over storage, clock, notifications and
//! metrics, exposing every operation collaborators call.
//!
//! Operations are grouped by area in sibling modules (`admin`, `voting`,
//! `status`, `integrity`), each adding an `impl VerdictNode` block.

use std::sync::Arc;

use tracing::info;
use verdict_nullables::NullStore;
use verdict_store::{EventStore, PollStore, Store, StoreError};
use verdict_store_lmdb::LmdbStore;
use verdict_types::{Clock, Event, EventId, Notification, Notifier, Poll, PollId, SystemClock, Timestamp};

use crate::config::{NodeConfig, StorageBackend};
use crate::error::NodeError;
use crate::locks::MemberLocks;
use crate::metrics::NodeMetrics;

/// A running verdict node.
pub struct VerdictNode {
    pub(crate) config: NodeConfig,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) metrics: Arc<NodeMetrics>,
    pub(crate) locks: MemberLocks,
}

impl VerdictNode {
    /// Assemble a node from explicit collaborators.
    pub fn new(
        config: NodeConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
            notifier,
            metrics: Arc::new(NodeMetrics::new()),
            locks: MemberLocks::new(),
        }
    }

    /// Open the configured storage backend with the system clock.
    pub fn open(config: NodeConfig, notifier: Arc<dyn Notifier>) -> Result<Self, NodeError> {
        let store: Arc<dyn Store> = match config.storage {
            StorageBackend::Lmdb => {
                let store = LmdbStore::open(&config.data_dir, config.lmdb_map_size)?;
                info!(path = %config.data_dir.display(), "opened lmdb store");
                Arc::new(store)
            }
            StorageBackend::Memory => {
                info!("using in-memory store");
                Arc::new(NullStore::new())
            }
        };
        Ok(Self::new(config, store, Arc::new(SystemClock), notifier))
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<NodeMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    pub(crate) fn load_event(&self, id: &EventId) -> Result<Event, NodeError> {
        self.store
            .get_event(id)
            .map_err(|e| not_found_as(e, || NodeError::UnknownEvent(id.clone())))
    }

    pub(crate) fn load_poll(&self, id: &PollId) -> Result<Poll, NodeError> {
        self.store
            .get_poll(id)
            .map_err(|e| not_found_as(e, || NodeError::UnknownPoll(id.clone())))
    }
}

/// Map `NotFound` to a domain error, everything else to `Store`.
pub(crate) fn not_found_as(e: StoreError, missing: impl FnOnce() -> NodeError) -> NodeError {
    if e.is_not_found() {
        missing()
    } else {
        NodeError::Store(e)
    }
}
