// Event Bus Service
// Named publish/subscribe notifications shared by independent UI regions

use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Fire-and-forget publishing seam used by producers such as the logger
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct Registration {
    id: u64,
    event: String,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
}

impl Registry {
    fn remove(&self, id: u64) -> bool {
        match self.listeners.write() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|registration| registration.id != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }
}

/// In-process event bus.
///
/// Delivery is synchronous: `emit` calls every listener registered for the
/// event, in registration order, before returning. The listener list is
/// snapshotted first, so handlers may subscribe, unsubscribe or emit again
/// without deadlocking; changes take effect from the next emission.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`. The listener stays registered until
    /// the returned handle is dropped or unsubscribed.
    pub fn subscribe<F>(&self, event: &str, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.registry.listeners.write() {
            listeners.push(Registration {
                id,
                event: event.to_string(),
                listener: Arc::new(listener),
            });
        }

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            attached: true,
        }
    }

    /// Number of listeners currently registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .listeners
            .read()
            .map(|listeners| listeners.iter().filter(|r| r.event == event).count())
            .unwrap_or(0)
    }

    /// Deliver `payload` to every listener of `event`, returning how many were called
    pub fn publish(&self, event: &str, payload: &Value) -> usize {
        let targets: Vec<Listener> = match self.registry.listeners.read() {
            Ok(listeners) => listeners
                .iter()
                .filter(|registration| registration.event == event)
                .map(|registration| Arc::clone(&registration.listener))
                .collect(),
            Err(_) => return 0,
        };

        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &str, payload: Value) {
        self.publish(event, &payload);
    }
}

/// Handle for a registered listener. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
    attached: bool,
}

impl Subscription {
    /// Unregister the listener. Safe to call after the bus is gone.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the listener registered for the lifetime of the bus
    pub fn detach(mut self) {
        self.attached = false;
    }

    pub fn is_active(&self) -> bool {
        self.attached
            && self
                .registry
                .upgrade()
                .and_then(|registry| {
                    registry
                        .listeners
                        .read()
                        .ok()
                        .map(|listeners| listeners.iter().any(|r| r.id == self.id))
                })
                .unwrap_or(false)
    }

    fn release(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
