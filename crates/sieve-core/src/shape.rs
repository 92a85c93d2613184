//! Static shape of described types.
//!
//! Rust has no runtime reflection, so every type that can appear in a filter
//! or update struct reports its shape through `FieldValue::shape`, and every
//! described struct lists its fields through `Descriptor::fields`. The
//! derive in `sieve-derive` generates both.

use crate::traits::Descriptor;
use std::{
    any::{TypeId, type_name},
    collections::BTreeMap,
    fmt,
};

///
/// Kind
/// Flat classification of a `Shape`, used in error messages.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Any,
    Option,
    List,
    Map,
    Struct,
}

impl Kind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "text",
            Self::Any => "any",
            Self::Option => "option",
            Self::List => "list",
            Self::Map => "map",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Shape
///
/// `Optional` is one level of indirection that may be absent; it is the
/// only wrapper the compiler strips when it looks for the underlying kind.
/// `Any` is a dynamically typed value (`serde_json::Value`).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Shape {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Any,
    Optional(Box<Self>),
    List(Box<Self>),
    Map(Box<Self>),
    Struct(StructRef),
}

impl Shape {
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn list(elem: Self) -> Self {
        Self::List(Box::new(elem))
    }

    #[must_use]
    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::Int => Kind::Int,
            Self::Uint => Kind::Uint,
            Self::Float => Kind::Float,
            Self::Text => Kind::Text,
            Self::Any => Kind::Any,
            Self::Optional(_) => Kind::Option,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
            Self::Struct(_) => Kind::Struct,
        }
    }

    /// Strip a single `Optional` layer, if present.
    #[must_use]
    pub fn deref_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    #[must_use]
    pub const fn as_struct(&self) -> Option<&StructRef> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

///
/// StructRef
///
/// Identity of a described struct. Field declarations are produced lazily
/// so that a struct may refer to itself (an OR-group of its own type).
///

#[derive(Clone, Copy)]
pub struct StructRef {
    id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<FieldDecl>,
}

impl StructRef {
    #[must_use]
    pub fn of<T: Descriptor>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            fields: T::fields,
        }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldDecl> {
        (self.fields)()
    }
}

impl fmt::Debug for StructRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructRef").field(&self.name).finish()
    }
}

impl PartialEq for StructRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StructRef {}

///
/// Tags
/// Raw annotation tokens exactly as declared; interpretation happens in the
/// descriptor compiler.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tags {
    pub column: Option<&'static str>,
    pub query: Option<&'static str>,
    pub update: Option<&'static str>,
}

impl Tags {
    pub const COLUMN: &'static str = "column";
    pub const QUERY: &'static str = "query";
    pub const UPDATE: &'static str = "update";

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.column.is_none() && self.query.is_none() && self.update.is_none()
    }

    /// Declared tags as a key/value map.
    #[must_use]
    pub fn raw(&self) -> BTreeMap<&'static str, &'static str> {
        [
            (Self::COLUMN, self.column),
            (Self::QUERY, self.query),
            (Self::UPDATE, self.update),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

///
/// FieldDecl
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub shape: Shape,
    pub embedded: bool,
    pub tags: Tags,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            embedded: false,
            tags: Tags {
                column: None,
                query: None,
                update: None,
            },
        }
    }

    #[must_use]
    pub fn column(mut self, column: &'static str) -> Self {
        self.tags.column = Some(column);
        self
    }

    #[must_use]
    pub fn query(mut self, token: &'static str) -> Self {
        self.tags.query = Some(token);
        self
    }

    #[must_use]
    pub fn update(mut self, token: &'static str) -> Self {
        self.tags.update = Some(token);
        self
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}
