//! The service / listener / connector abstraction every stage is built on.
//!
//! A pipeline stage is a *service*: a keyed in-memory cache of the latest
//! value per key plus a list of registered listeners that receive
//! add/update/remove callbacks when the cache mutates. Listeners typically
//! wrap another service and translate one stage's output into the next
//! stage's input, so stages compose without knowing their downstream
//! neighbours. Edge stages additionally own a [`Connector`] that feeds
//! records in from outside or emits them.
//!
//! The pipeline is single-threaded and cooperative: fan-out is synchronous
//! and recursive, a depth-first walk of the stage DAG. Services live behind
//! `Rc` and use interior mutability; no cache borrow is ever held while
//! listeners run, so a callback may re-enter the emitting service (the
//! inquiry quote loop does).
//!
//! Listener cycles are ruled out structurally: each stage consumes a
//! different value type than it produces, so a registration cannot close a
//! loop at the type level.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Callbacks a service invokes, in registration order, when its cache
/// mutates. Stages implement only the callbacks they care about; the rest
/// are silent no-ops by contract.
pub trait ServiceListener<V> {
    /// A value was added to the publishing service.
    fn process_add(&self, _event: &V) {}
    /// A value was updated in the publishing service.
    fn process_update(&self, _event: &V) {}
    /// A value was removed from the publishing service.
    fn process_remove(&self, _event: &V) {}
}

/// Publish-direction adapter between a service and an external sink.
///
/// Subscribe-direction connectors have no shared shape here: they read an
/// external source and call the target service's inbound method directly.
pub trait Connector<V> {
    /// Emit a value out of the system.
    fn publish(&self, event: &V) -> anyhow::Result<()>;
}

/// The uniform inbound surface of a stage: keyed lookup plus the callback a
/// subscribe connector invokes for new data.
pub trait Service<V> {
    /// Latest value stored under `key`, as a copy.
    fn get_data(&self, key: &str) -> Option<V>;

    /// Inbound callback from a subscribe connector. Intermediate stages that
    /// are fed only by listeners leave this as the default no-op.
    fn on_message(&self, _event: V) {}
}

/// Keyed cache and listener registry shared by every stage.
///
/// `get` hands out value copies, never references into the cache, so
/// listeners cannot retain aliases of service storage. Notification
/// snapshots the listener list before invoking it, which keeps fan-out
/// sound when a callback re-enters the owning service.
pub struct ServiceStore<V> {
    entries: RefCell<HashMap<String, V>>,
    listeners: RefCell<Vec<Rc<dyn ServiceListener<V>>>>,
}

impl<V: Clone> ServiceStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    /// Insert or replace the value under `key`.
    pub fn upsert(&self, key: impl Into<String>, value: V) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// All stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Register a listener. Listeners are invoked in registration order.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<V>>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Snapshot of the registered listeners, in registration order.
    pub fn listeners(&self) -> Vec<Rc<dyn ServiceListener<V>>> {
        self.listeners.borrow().clone()
    }

    /// Invoke `process_add` on every listener.
    pub fn notify_add(&self, event: &V) {
        for listener in self.listeners() {
            listener.process_add(event);
        }
    }

    /// Invoke `process_update` on every listener.
    pub fn notify_update(&self, event: &V) {
        for listener in self.listeners() {
            listener.process_update(event);
        }
    }

    /// Invoke `process_remove` on every listener.
    pub fn notify_remove(&self, event: &V) {
        for listener in self.listeners() {
            listener.process_remove(event);
        }
    }
}

impl<V: Clone> Default for ServiceStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
