//! Property-based key selection.
//!
//! A [`PropertySelector`] reads the scalar attached to an event under a
//! property name. It never skips: whenever no suitable value is attached, the
//! configured default key is used instead.
//!
//! Three flavors differ in what counts as "suitable":
//!
//! - [`PropertySelector::typed`] accepts only scalars convertible to the key
//!   type ([`FromScalar`]); anything else falls back to the default.
//! - [`PropertySelector::raw`] accepts any scalar, `Null` included, and uses
//!   the [`ScalarValue`] itself as the key.
//! - [`PropertySelector::rendered`] accepts any non-null scalar and keys on its
//!   textual form, so `42` and `"42"` share a sink.
//!
//! Sequences and structures are never suitable.

use crate::event::{HasProperties, LogValue, ScalarValue};
use sinkmap_core::{KeySelector, Message, RoutingKey};
use std::fmt;

/// Conversion from a property scalar to a typed key.
///
/// Returns `None` when the scalar holds a value of another type.
pub trait FromScalar: Sized {
    /// Converts `value`, or `None` if it is not of this type.
    fn from_scalar(value: &ScalarValue) -> Option<Self>;
}

impl FromScalar for ScalarValue {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromScalar for String {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromScalar for bool {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromScalar for char {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Char(c) => Some(*c),
            _ => None,
        }
    }
}

macro_rules! from_scalar_int {
    ($variant:ident => $($ty:ty),*) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(value: &ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(n) => <$ty>::try_from(*n).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_scalar_int!(Int => i8, i16, i32, i64);
from_scalar_int!(UInt => u8, u16, u32, u64, usize);

/// `Null` becomes the `None` key; other scalars must convert to `T`.
impl<T: FromScalar> FromScalar for Option<T> {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Null => Some(None),
            other => T::from_scalar(other).map(Some),
        }
    }
}

/// Selects a key from a named scalar property, falling back to a default.
pub struct PropertySelector<K> {
    name: String,
    default: K,
    convert: fn(&ScalarValue) -> Option<K>,
}

impl<K: FromScalar> PropertySelector<K> {
    /// Keys on the property when its scalar converts to `K`.
    pub fn typed(name: impl Into<String>, default: K) -> Self {
        Self {
            name: name.into(),
            default,
            convert: K::from_scalar,
        }
    }
}

impl PropertySelector<ScalarValue> {
    /// Keys on the property's raw scalar, whatever its type.
    pub fn raw(name: impl Into<String>, default: ScalarValue) -> Self {
        Self::typed(name, default)
    }
}

impl PropertySelector<String> {
    /// Keys on the default textual rendering of any non-null scalar.
    pub fn rendered(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            convert: render_scalar,
        }
    }
}

fn render_scalar(value: &ScalarValue) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}

impl<K> PropertySelector<K> {
    /// The property name this selector reads.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key used when no suitable value is attached.
    pub fn default_key(&self) -> &K {
        &self.default
    }
}

impl<K: Clone> PropertySelector<K> {
    /// Resolves the key for an event; never skips.
    pub fn key_for<E: HasProperties + ?Sized>(&self, event: &E) -> K {
        event
            .property(&self.name)
            .and_then(LogValue::as_scalar)
            .and_then(self.convert)
            .unwrap_or_else(|| self.default.clone())
    }
}

impl<K: fmt::Debug> fmt::Debug for PropertySelector<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySelector")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

impl<E, K> KeySelector<E> for PropertySelector<K>
where
    E: HasProperties + Message,
    K: RoutingKey,
{
    type Key = K;

    fn select(&self, event: &E) -> Option<K> {
        Some(self.key_for(event))
    }
}
