//! Observable motion values
//!
//! A [`MotionValue`] is a mutable `f32` shared between the code that writes it
//! (pointer handlers, springs, phase accumulators) and the code that reads it
//! (derived values, the host renderer). Writes notify subscribers
//! synchronously, in the order they subscribed.
//!
//! # Example
//!
//! ```rust
//! use glint_core::MotionValue;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let x = MotionValue::new(0.0);
//! let seen = Rc::new(Cell::new(0.0));
//!
//! let seen_clone = seen.clone();
//! let subscription = x.subscribe(move |v| seen_clone.set(v));
//!
//! x.set(0.25);
//! assert_eq!(seen.get(), 0.25);
//!
//! subscription.unsubscribe();
//! subscription.unsubscribe(); // no-op
//! x.set(0.5);
//! assert_eq!(seen.get(), 0.25);
//! ```

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Subscriber callback type
pub type Subscriber = Rc<dyn Fn(f32)>;

/// Key of a subscriber within one motion value
type SubscriberKey = u64;

struct Inner {
    value: Cell<f32>,
    version: Cell<u64>,
    next_key: Cell<SubscriberKey>,
    /// Insertion-ordered; removal uses `shift_remove` to keep the order
    subscribers: RefCell<IndexMap<SubscriberKey, Subscriber>>,
}

/// An observable mutable scalar
///
/// Cloning produces another handle to the same value.
#[derive(Clone)]
pub struct MotionValue {
    inner: Rc<Inner>,
}

impl MotionValue {
    /// Create a new motion value
    pub fn new(initial: f32) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: Cell::new(initial),
                version: Cell::new(0),
                next_key: Cell::new(0),
                subscribers: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Get the current value
    pub fn get(&self) -> f32 {
        self.inner.value.get()
    }

    /// Replace the value and notify every subscriber
    ///
    /// The value is replaced unconditionally, even when it is equal to the
    /// current one.
    pub fn set(&self, value: f32) {
        self.inner.value.set(value);
        self.inner.version.set(self.inner.version.get().wrapping_add(1));

        // Snapshot so callbacks can subscribe/unsubscribe/set re-entrantly
        let snapshot: Vec<(SubscriberKey, Subscriber)> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(key, callback)| (*key, callback.clone()))
            .collect();

        for (key, callback) in snapshot {
            // Skip subscribers removed by an earlier callback in this pass
            if !self.inner.subscribers.borrow().contains_key(&key) {
                continue;
            }
            callback(value);
        }
    }

    /// Number of `set` calls so far
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Register a callback invoked with the new value on every `set`
    ///
    /// The returned [`Subscription`] removes the callback when it is
    /// unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(f32) + 'static,
    {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .insert(key, Rc::new(callback));

        Subscription {
            value: Rc::downgrade(&self.inner),
            key,
            active: Cell::new(true),
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether two handles refer to the same value
    pub fn ptr_eq(&self, other: &MotionValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for MotionValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for MotionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionValue")
            .field("value", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle to a registered subscriber
///
/// Unsubscribes on drop.
pub struct Subscription {
    value: Weak<Inner>,
    key: SubscriberKey,
    active: Cell<bool>,
}

impl Subscription {
    /// Remove the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.value.upgrade() {
            inner.subscribers.borrow_mut().shift_remove(&self.key);
        }
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.active.get() && self.value.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}
