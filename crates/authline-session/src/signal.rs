//! The process-wide "unauthorized" notification.
//!
//! When an authenticated request comes back with 401, whoever sent it
//! publishes on an [`UnauthorizedSignal`]; the session coordinator is
//! subscribed and drops the session. The signal is an explicit object
//! handed to both sides, so the request wrapper never needs to know the
//! coordinator exists.
//!
//! Delivery is synchronous: [`publish`](UnauthorizedSignal::publish)
//! calls every current subscriber before it returns, so the session is
//! already anonymous by the time the failing call reports its error.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Hub {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Publish/subscribe hub for authorization failures. Carries no payload.
///
/// Cloning is cheap and every clone refers to the same hub.
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use authline_session::UnauthorizedSignal;
///
/// let signal = UnauthorizedSignal::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&hits);
/// let _sub = signal.subscribe(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// signal.publish();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct UnauthorizedSignal {
    hub: Arc<Hub>,
}

impl UnauthorizedSignal {
    /// Creates a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.hub.next_id.fetch_add(1, Ordering::Relaxed);
        self.hub
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            hub: Arc::downgrade(&self.hub),
            id,
        }
    }

    /// Notifies every current subscriber, in subscription order.
    ///
    /// Returns how many were notified. The subscriber list is copied
    /// before any listener runs, so a listener may itself subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self) -> usize {
        let listeners: Vec<Listener> = self
            .hub
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        tracing::debug!(subscribers = listeners.len(), "publishing unauthorized");
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.hub
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for UnauthorizedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnauthorizedSignal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
///
/// Holds only a weak reference, so an outstanding subscription never
/// keeps the hub alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    hub: Weak<Hub>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
