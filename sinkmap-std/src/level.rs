//! Minimum-level restriction for sinks.
//!
//! A [`LevelSwitch`] is a shared, runtime-adjustable minimum level. Wrapping
//! a sink with [`LevelSinkExt::restrict_to`] drops events below the switch's
//! current level before they reach the sink. Wrapping a whole mapped sink
//! also keeps filtered events from creating sinks at all.

use crate::event::{HasLevel, Level};
use sinkmap_core::{BoxError, Message, Sink};
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

/// A shared minimum level that can be changed while events flow.
///
/// Clones observe and control the same level.
#[derive(Debug, Clone)]
pub struct LevelSwitch {
    minimum: Arc<AtomicU8>,
}

impl LevelSwitch {
    /// Create a switch starting at `minimum`.
    pub fn new(minimum: Level) -> Self {
        Self {
            minimum: Arc::new(AtomicU8::new(minimum as u8)),
        }
    }

    /// The current minimum level.
    pub fn minimum(&self) -> Level {
        Level::from_u8(self.minimum.load(Ordering::Relaxed))
    }

    /// Change the minimum level.
    pub fn set_minimum(&self, minimum: Level) {
        self.minimum.store(minimum as u8, Ordering::Relaxed);
    }

    /// Returns `true` if events at `level` pass.
    pub fn allows(&self, level: Level) -> bool {
        level >= self.minimum()
    }
}

impl Default for LevelSwitch {
    fn default() -> Self {
        Self::new(Level::Verbose)
    }
}

impl From<Level> for LevelSwitch {
    fn from(minimum: Level) -> Self {
        Self::new(minimum)
    }
}

/// A sink that only forwards events at or above a minimum level.
pub struct Restricted<S> {
    sink: S,
    switch: LevelSwitch,
}

impl<S> Restricted<S> {
    /// The switch controlling this sink.
    pub fn switch(&self) -> &LevelSwitch {
        &self.switch
    }

    /// The wrapped sink.
    pub fn inner(&self) -> &S {
        &self.sink
    }
}

impl<E, S> Sink<E> for Restricted<S>
where
    E: Message + HasLevel,
    S: Sink<E>,
{
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        if self.switch.allows(event.level()) {
            self.sink.emit(event)
        } else {
            Ok(())
        }
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        self.sink.dispose()
    }
}

/// Level combinators for sinks of levelled events.
pub trait LevelSinkExt<E: Message + HasLevel>: Sink<E> + Sized {
    /// Drop events below the switch's (or fixed level's) minimum.
    fn restrict_to(self, switch: impl Into<LevelSwitch>) -> Restricted<Self> {
        Restricted {
            sink: self,
            switch: switch.into(),
        }
    }
}

impl<E: Message + HasLevel, S: Sink<E>> LevelSinkExt<E> for S {}
