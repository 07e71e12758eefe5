//! A minimal structured log event.
//!
//! Only what routing needs: a level, a message template and named property
//! values. Rendering and serialization live elsewhere.

use sinkmap_core::Message;
use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    time::SystemTime,
};
use thiserror::Error;

/// Severity of a log event, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level {
    /// Tracing detail.
    Verbose = 0,
    /// Internal diagnostics.
    Debug = 1,
    /// Normal operation.
    #[default]
    Information = 2,
    /// Something unexpected but recoverable.
    Warning = 3,
    /// A failure of the current operation.
    Error = 4,
    /// The process cannot continue.
    Fatal = 5,
}

impl Level {
    /// All levels in ascending severity.
    pub const ALL: [Level; 6] = [
        Level::Verbose,
        Level::Debug,
        Level::Information,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    pub(crate) fn from_u8(value: u8) -> Level {
        Level::ALL
            .get(usize::from(value))
            .copied()
            .unwrap_or(Level::Fatal)
    }

    /// The canonical name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/// An atomic property value.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    /// An explicit "no value".
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A single character.
    Char(char),
    /// A string.
    Str(String),
}

impl ScalarValue {
    /// Returns `true` for [`ScalarValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

// Floats compare by bit pattern so scalars can serve as map keys.
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        use ScalarValue as S;
        match (self, other) {
            (S::Null, S::Null) => true,
            (S::Bool(a), S::Bool(b)) => a == b,
            (S::Int(a), S::Int(b)) => a == b,
            (S::UInt(a), S::UInt(b)) => a == b,
            (S::Float(a), S::Float(b)) => a.to_bits() == b.to_bits(),
            (S::Char(a), S::Char(b)) => a == b,
            (S::Str(a), S::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ScalarValue::Null => {}
            ScalarValue::Bool(v) => v.hash(state),
            ScalarValue::Int(v) => v.hash(state),
            ScalarValue::UInt(v) => v.hash(state),
            ScalarValue::Float(v) => v.to_bits().hash(state),
            ScalarValue::Char(v) => v.hash(state),
            ScalarValue::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("null"),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::UInt(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Char(v) => write!(f, "{v}"),
            ScalarValue::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    ScalarValue::$variant(<$conv>::from(v))
                }
            }

            impl From<$ty> for LogValue {
                fn from(v: $ty) -> Self {
                    LogValue::Scalar(ScalarValue::from(v))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    char => Char as char,
    String => Str as String,
    &str => Str as String,
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ScalarValue::Null, Into::into)
    }
}

/// A property value: a scalar or a composite of values.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    /// A single scalar.
    Scalar(ScalarValue),
    /// An ordered list of values.
    Sequence(Vec<LogValue>),
    /// Named fields, optionally tagged with a type name.
    Structure {
        /// The type tag, if any.
        type_tag: Option<String>,
        /// The fields.
        fields: BTreeMap<String, LogValue>,
    },
}

impl LogValue {
    /// The scalar held by this value, if it is one.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            LogValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ScalarValue> for LogValue {
    fn from(v: ScalarValue) -> Self {
        LogValue::Scalar(v)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for LogValue {
    fn from(v: Option<T>) -> Self {
        LogValue::Scalar(v.into())
    }
}

/// Events whose named properties can be inspected.
pub trait HasProperties {
    /// Looks up a property by name.
    fn property(&self, name: &str) -> Option<&LogValue>;
}

/// Events that carry a severity.
pub trait HasLevel {
    /// The event's level.
    fn level(&self) -> Level;
}

/// A structured log event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    timestamp: SystemTime,
    level: Level,
    template: String,
    properties: BTreeMap<String, LogValue>,
}

impl LogEvent {
    /// Creates an event stamped with the current time.
    pub fn new(level: Level, template: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            template: template.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Attaches a property, replacing any previous value with that name.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<LogValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// When the event occurred.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The unrendered message template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// All properties, ordered by name.
    pub fn properties(&self) -> &BTreeMap<String, LogValue> {
        &self.properties
    }
}

impl Message for LogEvent {}

impl HasProperties for LogEvent {
    fn property(&self, name: &str) -> Option<&LogValue> {
        self.properties.get(name)
    }
}

impl HasLevel for LogEvent {
    fn level(&self) -> Level {
        self.level
    }
}
