//! Dynamically typed values passed to and returned from commands.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A host domain object (a flow, a filter, ...) carried through the
/// command system without the core knowing its concrete type.
#[derive(Clone)]
pub struct Opaque {
    kind: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wrap a domain object under a type kind.
    pub fn new<T: Any + Send + Sync>(kind: impl Into<String>, value: T) -> Self {
        Self {
            kind: kind.into(),
            inner: Arc::new(value),
        }
    }

    /// The type kind this object was tagged with.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Borrow the wrapped object if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque").field("kind", &self.kind).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A command argument or result.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value. The only value matching the `Unit` return type.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Seq(Vec<Value>),
    Opaque(Opaque),
}

impl Value {
    /// Wrap a host domain object.
    pub fn opaque<T: Any + Send + Sync>(kind: impl Into<String>, value: T) -> Self {
        Self::Opaque(Opaque::new(kind, value))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow a wrapped domain object of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(o) => o.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Opaque(o) => write!(f, "<{}>", o.kind),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            // Domain objects serialize through their own front-end views.
            Self::Opaque(o) => serializer.collect_str(&format_args!("<{}>", o.kind)),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Flow {
        id: u32,
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::opaque("flow", Flow { id: 1 }).to_string(), "<flow>");
        assert_eq!(Value::None.to_string(), "none");
    }

    #[test]
    fn test_opaque_downcast() {
        let v = Value::opaque("flow", Flow { id: 7 });
        assert_eq!(v.downcast_ref::<Flow>(), Some(&Flow { id: 7 }));
        assert!(v.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = Value::opaque("flow", Flow { id: 1 });
        let b = Value::opaque("flow", Flow { id: 1 });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(3i64).as_int(), Some(3));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert!(Value::from(()).is_none());
        assert_eq!(Value::from(vec!["a"]).as_seq().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_serialize_json() {
        let v = Value::Seq(vec![
            Value::Int(1),
            Value::from("two"),
            Value::None,
            Value::opaque("flow", Flow { id: 3 }),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"[1,"two",null,"<flow>"]"#);
    }
}
