//! Configuration for [`MappedSink`].

use super::sink::MappedSink;
use crate::{
    event::HasProperties,
    selectors::{FromScalar, PropertySelector},
};
use sinkmap_core::{
    BoxError, ConfigError, FnFactory, FnSelector, KeySelector, Message, Retention, RoutingKey,
    Sink, SinkFactory, SinkLifetime,
};

/// Builder for a [`MappedSink`].
///
/// Requires a key selector and a sink factory. Retention defaults to
/// [`Retention::Unbounded`] and may be chosen once, through any one of
/// [`retention`](Self::retention), [`count_limit`](Self::count_limit) or
/// [`lifetime`](Self::lifetime). The key selector may likewise be set only
/// once. Problems are reported by
/// [`build`](Self::build), before any event is routed.
///
/// # Example
///
/// ```rust,ignore
/// let map = MappedSink::builder()
///     .key_property("Tenant", String::from("shared"))
///     .factory_fn(|tenant: &String| Ok(open_tenant_log(tenant)?))
///     .count_limit(16)
///     .build()?;
/// ```
pub struct MappedSinkBuilder<E, K, S> {
    selector: Option<Box<dyn KeySelector<E, Key = K>>>,
    factory: Option<Box<dyn SinkFactory<K, E, Sink = S>>>,
    retention: Option<Retention>,
    error: Option<ConfigError>,
}

impl<E, K, S> Default for MappedSinkBuilder<E, K, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, K, S> MappedSinkBuilder<E, K, S> {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self {
            selector: None,
            factory: None,
            retention: None,
            error: None,
        }
    }

    /// Choose the retention directly.
    pub fn retention(mut self, retention: Retention) -> Self {
        self.set_retention(retention);
        self
    }

    /// Limit the number of sinks held open at once; `0` keeps none open.
    ///
    /// A negative limit is reported by [`build`](Self::build).
    pub fn count_limit(mut self, limit: i64) -> Self {
        match Retention::try_from_count_limit(limit) {
            Ok(retention) => self.set_retention(retention),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Choose retention by sink lifetime.
    pub fn lifetime(mut self, lifetime: SinkLifetime) -> Self {
        self.set_retention(lifetime.into());
        self
    }

    fn set_retention(&mut self, retention: Retention) {
        match self.retention {
            Some(existing) => self.fail(ConfigError::ConflictingRetention {
                existing: existing.to_string(),
                requested: retention.to_string(),
            }),
            None => self.retention = Some(retention),
        }
    }

    // Only the first problem is kept.
    fn fail(&mut self, err: ConfigError) {
        self.error.get_or_insert(err);
    }
}

impl<E, K, S> MappedSinkBuilder<E, K, S>
where
    E: Message,
    K: RoutingKey,
    S: Sink<E>,
{
    /// Select keys with a custom selector.
    ///
    /// Only one selector may be configured; a second is reported by
    /// [`build`](Self::build).
    pub fn key_selector<Sel>(mut self, selector: Sel) -> Self
    where
        Sel: KeySelector<E, Key = K>,
    {
        if self.selector.is_some() {
            self.fail(ConfigError::ConflictingKeySelector);
        } else {
            self.selector = Some(Box::new(selector));
        }
        self
    }

    /// Select keys with a closure; returning `None` drops the event.
    pub fn key_fn<F>(self, f: F) -> Self
    where
        F: Fn(&E) -> Option<K> + Send + Sync + 'static,
    {
        self.key_selector(FnSelector::new(f))
    }

    /// Key on the scalar property `name` when it converts to `K`, otherwise
    /// on `default`.
    pub fn key_property(mut self, name: impl Into<String>, default: K) -> Self
    where
        E: HasProperties,
        K: FromScalar,
    {
        let name = name.into();
        if name.is_empty() {
            self.fail(ConfigError::EmptyPropertyName);
        }
        self.key_selector(PropertySelector::typed(name, default))
    }

    /// Build sinks with a custom factory.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: SinkFactory<K, E, Sink = S>,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Build sinks with a closure.
    pub fn factory_fn<F>(self, f: F) -> Self
    where
        F: Fn(&K) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        self.factory(FnFactory::new(f))
    }

    /// Validate the configuration and create the mapped sink.
    pub fn build(self) -> Result<MappedSink<E, K, S>, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let selector = self.selector.ok_or(ConfigError::MissingKeySelector)?;
        let factory = self.factory.ok_or(ConfigError::MissingFactory)?;
        let retention = self.retention.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::debug!(retention = %retention, "configured mapped sink");

        Ok(MappedSink::from_parts(selector, factory, retention))
    }
}

impl<E, S> MappedSinkBuilder<E, String, S>
where
    E: Message + HasProperties,
    S: Sink<E>,
{
    /// Key on the textual rendering of any non-null scalar property `name`,
    /// otherwise on `default`.
    pub fn key_property_rendered(
        mut self,
        name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        let name = name.into();
        if name.is_empty() {
            self.fail(ConfigError::EmptyPropertyName);
        }
        self.key_selector(PropertySelector::rendered(name, default))
    }
}
