use std::sync::Arc;

use crate::notify::{LogNotifier, Notifier};
use crate::services::{AuthService, PrivilegeService, UserService};
use crate::store::memory::MemoryStore;
use crate::store::Datastore;

/// Shared application state handed to every handler. Services are cheap
/// clones over the same store and notifier.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub privileges: PrivilegeService,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            users: UserService::new(store.clone()),
            privileges: PrivilegeService::new(store, notifier),
        }
    }

    /// Fresh state over the in-memory store and log-only notifier.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(LogNotifier))
    }
}
