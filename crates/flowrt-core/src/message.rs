use std::collections::BTreeMap;
use std::sync::Arc;

/// A polymorphic payload carried between ports.
///
/// Graph documents are dynamically typed, so messages are a dynamic value
/// container rather than a Rust enum per node type (see the "Runtime type
/// checking of payloads" design note).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness used by the `Conditional` macro: mirrors Python's notion
    /// of "truthy" since the document format has no dedicated condition type.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A message in flight on a connection: either a payload or the
/// distinguished EOF marker.
///
/// `Message::Eof` is the sole sentinel; equality with it (via pattern
/// matching) is the only test a port ever performs, per the EOF protocol.
///
/// Payloads are `Arc`-wrapped so that "ref" fan-out (see
/// [`crate::port::OutputMode::Ref`]) can hand every downstream queue the
/// literal same allocation (`Arc::ptr_eq`), while "value" fan-out clones
/// out of the `Arc` to produce independent copies for all but one queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Value(Arc<Value>),
    Eof,
}

impl Message {
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    #[must_use]
    pub fn value(v: Value) -> Self {
        Self::Value(Arc::new(v))
    }

    #[must_use]
    pub fn into_value(self) -> Option<Arc<Value>> {
        match self {
            Self::Value(v) => Some(v),
            Self::Eof => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Eof => None,
        }
    }
}

impl From<Value> for Message {
    fn from(v: Value) -> Self {
        Self::value(v)
    }
}

impl From<Arc<Value>> for Message {
    fn from(v: Arc<Value>) -> Self {
        Self::Value(v)
    }
}
