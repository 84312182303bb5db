#![forbid(unsafe_code)]

//! Observable output channel with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in shared `Rc<RefCell<..>>` storage. A
//! `set` that changes the value (by `PartialEq`) bumps the version and calls
//! every live subscriber in registration order. The controller owns one
//! observable per sheet output; the render layer clones handles and
//! subscribes.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: a subscriber may call `set` on the same observable.
//!   No borrow is held while callbacks run, so this is allowed; the nested
//!   notification completes before the outer loop resumes.
//! - **Subscriber leak**: callbacks live as long as their [`Subscription`]
//!   guard. Dead entries are pruned on the next notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace_span;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Clones are handles to the same value and subscriber list.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing `set`.
/// 2. `set(v)` where `v == current` notifies nobody.
/// 3. Subscribers are notified in registration order.
pub struct Observable<T> {
    name: &'static str,
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("name", &self.name)
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable labelled `name` in trace output.
    #[must_use]
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value`; notifies subscribers if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Register `callback` for future changes.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<T>> = inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect();
            (callbacks, inner.value.clone(), inner.version)
        };
        if callbacks.is_empty() {
            return;
        }

        let _span = trace_span!(
            "sheet.observable.notify",
            observable = self.name,
            version,
            subscribers = callbacks.len() as u64
        )
        .entered();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_set_and_version() {
        let obs = Observable::new("y_offset", 42.0);
        assert_eq!(obs.get(), 42.0);
        assert_eq!(obs.version(), 0);

        assert!(obs.set(99.0));
        assert_eq!(obs.get(), 99.0);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn unchanged_set_is_silent() {
        let obs = Observable::new("phase", 1_u8);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let _sub = obs.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        assert!(!obs.set(1));
        assert_eq!(obs.version(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn subscribers_see_new_value_in_order() {
        let obs = Observable::new("inset", 0.0_f64);
        let log = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&log);
        let _s1 = obs.subscribe(move |v| a.borrow_mut().push(format!("a{v}")));
        let b = Rc::clone(&log);
        let _s2 = obs.subscribe(move |v| b.borrow_mut().push(format!("b{v}")));

        obs.set(22.0);
        assert_eq!(*log.borrow(), vec!["a22", "b22"]);
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let obs = Observable::new("radius", 0.0_f64);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let sub = obs.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        obs.set(1.0);
        drop(sub);
        obs.set(2.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let obs = Observable::new("enabled", false);
        let handle = obs.clone();
        obs.set(true);
        assert!(handle.get());
        assert_eq!(handle.version(), 1);
        assert_eq!(handle.name(), "enabled");
    }

    #[test]
    fn reentrant_set_from_subscriber() {
        let obs = Observable::new("y", 0_i32);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                inner.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
        assert_eq!(obs.version(), 3);
    }

    #[test]
    fn with_borrows_without_clone() {
        let obs = Observable::new("labels", vec![1, 2, 3]);
        assert_eq!(obs.with(|v| v.iter().sum::<i32>()), 6);
    }
}
