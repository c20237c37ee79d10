//! Change notification.
//!
//! Writers publish a [`ChangeEvent`] naming the address they wrote. Listeners
//! receive only the address, never the data, and are expected to re-read.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use crate::schema::Address;

/// Invalidation signal for one written address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    pub address: Address,
}

/// A listener called when a matching change is published.
#[derive(Clone)]
pub enum ChangeListener {
    /// Receives the event
    Payload(Arc<dyn Fn(ChangeEvent) + Send + Sync + 'static>),
    /// Only told that something changed
    NotifyOnly(Arc<dyn Fn() + Send + Sync + 'static>),
}

impl ChangeListener {
    fn call(&self, event: ChangeEvent) {
        match self {
            ChangeListener::Payload(callback) => callback(event),
            ChangeListener::NotifyOnly(callback) => callback(),
        }
    }
}

/// Trait for types that can be converted into change listeners.
pub trait IntoChangeListener {
    fn into_change_listener(self) -> ChangeListener;
}

impl<F> IntoChangeListener for F
where F: Fn(ChangeEvent) + Send + Sync + 'static
{
    fn into_change_listener(self) -> ChangeListener { ChangeListener::Payload(Arc::new(self)) }
}

impl IntoChangeListener for ChangeListener {
    fn into_change_listener(self) -> ChangeListener { self }
}

impl IntoChangeListener for Arc<dyn Fn() + Send + Sync + 'static> {
    fn into_change_listener(self) -> ChangeListener { ChangeListener::NotifyOnly(self) }
}

impl IntoChangeListener for tokio::sync::mpsc::UnboundedSender<ChangeEvent> {
    fn into_change_listener(self) -> ChangeListener {
        ChangeListener::Payload(Arc::new(move |event| {
            let _ = self.send(event); // receiver gone
        }))
    }
}

impl IntoChangeListener for std::sync::mpsc::Sender<ChangeEvent> {
    fn into_change_listener(self) -> ChangeListener {
        ChangeListener::Payload(Arc::new(move |event| {
            let _ = self.send(event); // receiver gone
        }))
    }
}

/// Publish/subscribe hub for change events, keyed by address.
#[derive(Clone)]
pub struct ChangeNotifier(Arc<Inner>);

struct Inner {
    listeners: RwLock<HashMap<usize, (Address, ChangeListener)>>,
    next_id: AtomicUsize,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier").field("listeners", &self.listener_count()).finish()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self { Self::new() }
}

impl ChangeNotifier {
    pub fn new() -> Self { Self(Arc::new(Inner { listeners: RwLock::new(HashMap::new()), next_id: AtomicUsize::new(0) })) }

    /// Registers `listener` for writes observed by `address`. See [`Address::observes`].
    pub fn subscribe<L: IntoChangeListener>(&self, address: Address, listener: L) -> Subscription {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        self.0.listeners.write().expect("RwLock poisoned").insert(id, (address, listener.into_change_listener()));
        Subscription { inner: Arc::downgrade(&self.0), id }
    }

    /// Publishes a change of `address` to every listener that observes it.
    pub fn notify(&self, address: Address) {
        // Collect first so callbacks run without the lock held
        let targets: Vec<ChangeListener> = {
            let listeners = self.0.listeners.read().expect("RwLock poisoned");
            listeners.values().filter(|(watched, _)| watched.observes(&address)).map(|(_, l)| l.clone()).collect()
        };
        debug!("ChangeNotifier: {} changed, {} listener(s)", address, targets.len());

        let event = ChangeEvent { address };
        for listener in targets {
            listener.call(event);
        }
    }

    pub fn listener_count(&self) -> usize { self.0.listeners.read().expect("RwLock poisoned").len() }
}

/// Subscription handle. Unsubscribes on drop.
pub struct Subscription {
    inner: Weak<Inner>,
    id: usize,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().expect("RwLock poisoned").remove(&self.id);
        }
    }
}
