mod json;


use crate::{
    error::{Error, InputKind},
    shape::StructRef,
};
use std::{collections::BTreeMap, fmt};

// re-exports
pub use json::Document;

///
/// Value
///
/// Dynamic snapshot of a field value.
///
/// Null     → an absent `Option` (or a JSON null); always empty.
/// Present  → a `Some`; never empty, regardless of what it wraps.
/// Record   → a described struct; never empty.
/// Document → a `merge_json` payload as its `Serialize` impl writes it;
///            never empty.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Present(Box<Self>),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
    Record(Record),
    Document(Document),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from a slice of convertible items.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Wrap a value as a present `Option`.
    #[must_use]
    pub fn present(inner: impl Into<Self>) -> Self {
        Self::Present(Box::new(inner.into()))
    }

    ///
    /// EMPTY
    ///

    /// Zero value of its kind: null, `""`, `0`, `0.0`, `false`, or an empty
    /// collection. A present option or a record is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !*b,
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::List(xs) => xs.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Present(_) | Self::Record(_) | Self::Document(_) => false,
        }
    }

    ///
    /// ACCESS
    ///

    /// Strip one `Present` level.
    #[must_use]
    pub fn deref_present(&self) -> &Self {
        match self {
            Self::Present(inner) => inner,
            other => other,
        }
    }

    /// Owned variant of [`deref_present`](Self::deref_present).
    #[must_use]
    pub fn into_deref_present(self) -> Self {
        match self {
            Self::Present(inner) => *inner,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        if let Self::Record(r) = self {
            Some(r)
        } else {
            None
        }
    }

    /// Short name of this value's kind, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Present(_) => "option",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "struct",
            Self::Document(_) => "document",
        }
    }
}

/// Strip one presence level and require a record.
pub fn normalize(value: &Value) -> Result<&Record, Error> {
    match value.deref_present() {
        Value::Record(record) => Ok(record),
        Value::Null => Err(Error::InvalidInputKind {
            kind: InputKind::Null,
        }),
        other => Err(Error::InvalidInputKind {
            kind: InputKind::Value(other.kind_name()),
        }),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Present(inner) => inner.fmt(f),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::List(xs) => {
                f.write_str("(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    x.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::Map(_) | Self::Record(_) | Self::Document(_) => {
                write!(f, "'{}'", self.to_json())
            }
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool   => Bool,
    i8     => Int,
    i16    => Int,
    i32    => Int,
    i64    => Int,
    u8     => Uint,
    u16    => Uint,
    u32    => Uint,
    u64    => Uint,
    f32    => Float,
    f64    => Float,
    &str   => Text,
    String => Text,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

///
/// Record
///
/// Snapshot of a described struct: its identity plus every annotated field
/// in declaration order, embedded structs included as nested records.
/// Passthrough fields are not part of the snapshot.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    ty: StructRef,
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    #[must_use]
    pub const fn new(ty: StructRef, fields: Vec<(&'static str, Value)>) -> Self {
        Self { ty, fields }
    }

    #[must_use]
    pub const fn ty(&self) -> &StructRef {
        &self.ty
    }

    #[must_use]
    pub fn fields(&self) -> &[(&'static str, Value)] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(field, value)| (*field == name).then_some(value))
    }

    /// Follow a chain of field names through embedded records.
    ///
    /// Returns `None` when any intermediate step is absent, null, or not a
    /// record; callers treat that the same as an empty field.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;

        let mut record = self;
        for name in parents {
            record = record.get(name)?.deref_present().as_record()?;
        }

        record.get(last)
    }
}
