//! # Retention
//!
//! How long a mapped sink keeps the sinks it creates. Two configuration
//! front-ends exist (a numeric count limit and a [`SinkLifetime`]); both
//! collapse to the single [`Retention`] value the routing cache acts on.
//!
//! | Front-end                   | Retention                 |
//! |-----------------------------|---------------------------|
//! | no limit                    | [`Retention::Unbounded`]  |
//! | `count_limit(0)`            | [`Retention::PerEvent`]   |
//! | `count_limit(n)`, n ≥ 1     | [`Retention::BoundedCount`] |
//! | [`SinkLifetime::Pipeline`]  | [`Retention::Unbounded`]  |
//! | [`SinkLifetime::Event`]     | [`Retention::PerEvent`]   |

use crate::error::ConfigError;
use std::{fmt, num::NonZeroUsize};

/// The retention discipline of a mapped sink, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Retention {
    /// Every created sink is kept until the mapped sink is disposed.
    ///
    /// Resident sinks grow with key cardinality.
    #[default]
    Unbounded,
    /// At most `n` sinks are kept; each new key past the limit evicts an
    /// arbitrary other resident sink.
    BoundedCount(NonZeroUsize),
    /// Sinks are created for one event and disposed right after it.
    PerEvent,
}

impl Retention {
    /// Maps a count limit onto a retention: `None` is unbounded, `0` is
    /// per-event.
    pub fn from_count_limit(limit: Option<usize>) -> Self {
        match limit {
            None => Retention::Unbounded,
            Some(n) => match NonZeroUsize::new(n) {
                Some(n) => Retention::BoundedCount(n),
                None => Retention::PerEvent,
            },
        }
    }

    /// Like [`Retention::from_count_limit`], for signed limits coming from
    /// configuration sources.
    pub fn try_from_count_limit(limit: i64) -> Result<Self, ConfigError> {
        let n = usize::try_from(limit).map_err(|_| ConfigError::NegativeCountLimit(limit))?;
        Ok(Self::from_count_limit(Some(n)))
    }

    /// The maximum number of resident sinks, or `None` if unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Retention::Unbounded => None,
            Retention::BoundedCount(n) => Some(n.get()),
            Retention::PerEvent => Some(0),
        }
    }
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retention::Unbounded => f.write_str("unbounded"),
            Retention::BoundedCount(n) => write!(f, "bounded({n})"),
            Retention::PerEvent => f.write_str("per-event"),
        }
    }
}

/// The lifetime of sinks created by a mapped sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SinkLifetime {
    /// Sinks stay open until the owning pipeline shuts down.
    #[default]
    Pipeline,
    /// A sink is created and shut down for each event.
    Event,
}

impl From<SinkLifetime> for Retention {
    fn from(lifetime: SinkLifetime) -> Self {
        match lifetime {
            SinkLifetime::Pipeline => Retention::Unbounded,
            SinkLifetime::Event => Retention::PerEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_limit_front_end() {
        assert_eq!(Retention::from_count_limit(None), Retention::Unbounded);
        assert_eq!(Retention::from_count_limit(Some(0)), Retention::PerEvent);
        assert_eq!(
            Retention::from_count_limit(Some(3)),
            Retention::BoundedCount(NonZeroUsize::new(3).unwrap())
        );
    }

    #[test]
    fn test_negative_count_limit_rejected() {
        assert_eq!(
            Retention::try_from_count_limit(-1),
            Err(ConfigError::NegativeCountLimit(-1))
        );
        assert_eq!(Retention::try_from_count_limit(0), Ok(Retention::PerEvent));
    }

    #[test]
    fn test_lifetime_front_end() {
        assert_eq!(Retention::from(SinkLifetime::Pipeline), Retention::Unbounded);
        assert_eq!(Retention::from(SinkLifetime::Event), Retention::PerEvent);
        assert_eq!(Retention::PerEvent.limit(), Some(0));
        assert_eq!(Retention::Unbounded.limit(), None);
    }
}
