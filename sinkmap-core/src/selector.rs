//! # Key Selection
//!
//! A [`KeySelector`] derives the routing key for an event. Returning `None`
//! means "skip": the event is dropped silently, no sink is created or called.
//!
//! Selectors that should never skip (property lookups with a default key)
//! simply always return `Some`. To route events that carry no value to their
//! own sink, use an `Option<K>` key and return `Some(None)`.

use crate::message::Message;
use std::{fmt::Debug, hash::Hash, marker::PhantomData};

/// A value usable as a routing key.
///
/// Keys are compared by value: two events with equal keys are routed to the
/// same sink while that sink is resident.
pub trait RoutingKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> RoutingKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Derives a routing key from an event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot select keys from `{E}`",
    label = "missing `KeySelector` implementation",
    note = "Wrap a closure with `FnSelector::new` to select keys ad hoc."
)]
pub trait KeySelector<E>: Send + Sync + 'static {
    /// The key type produced.
    type Key: RoutingKey;

    /// Selects the key for `event`, or `None` to skip it.
    fn select(&self, event: &E) -> Option<Self::Key>;
}

impl<E, S> KeySelector<E> for Box<S>
where
    S: KeySelector<E> + ?Sized,
{
    type Key = S::Key;

    fn select(&self, event: &E) -> Option<Self::Key> {
        (**self).select(event)
    }
}

/// A key selector backed by a closure.
pub struct FnSelector<F, E> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<F, E, K> FnSelector<F, E>
where
    F: Fn(&E) -> Option<K> + Send + Sync + 'static,
{
    /// Wraps `f`; `f` returns `None` to skip an event.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }
}

impl<F, E, K> KeySelector<E> for FnSelector<F, E>
where
    E: Message,
    K: RoutingKey,
    F: Fn(&E) -> Option<K> + Send + Sync + 'static,
{
    type Key = K;

    fn select(&self, event: &E) -> Option<K> {
        (self.f)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_selector_can_skip() {
        let selector = FnSelector::new(|e: &String| {
            if e.is_empty() {
                None
            } else {
                Some(e.len())
            }
        });

        assert_eq!(selector.select(&"abc".to_string()), Some(3));
        assert_eq!(selector.select(&String::new()), None);
    }

    #[test]
    fn test_fn_selector_supports_null_keys() {
        let selector = FnSelector::new(|e: &String| Some(e.strip_prefix("user:").map(str::to_owned)));

        assert_eq!(
            selector.select(&"user:alice".to_string()),
            Some(Some("alice".to_string()))
        );
        assert_eq!(selector.select(&"anonymous".to_string()), Some(None));
    }
}
