use crate::{
    shape::{FieldDecl, Shape},
    value::Value,
};
use std::collections::{BTreeMap, HashMap};

///
/// FieldValue
///
/// Anything that can sit in a filter or update struct: reports its static
/// shape and takes a dynamic snapshot of itself.
///

pub trait FieldValue {
    fn shape() -> Shape
    where
        Self: Sized;

    fn to_value(&self) -> Value;
}

///
/// Descriptor
///
/// A struct whose fields carry filter/update annotations. Implemented by
/// `#[derive(Descriptor)]`; `to_value` must produce a `Value::Record` whose
/// fields follow `fields()` order.
///

pub trait Descriptor: FieldValue + 'static {
    fn fields() -> Vec<FieldDecl>;
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn shape() -> Shape {
        // references only reach `shape` through sized call sites
        Shape::Any
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl FieldValue for str {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FieldValue for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for char {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => Value::Present(Box::new(v.to_value())),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl<T: FieldValue, const N: usize> FieldValue for [T; N] {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl<K: ToString, V: FieldValue> FieldValue for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: ToString, V: FieldValue, S> FieldValue for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_value()))
                .collect(),
        )
    }
}

// A non-null JSON value counts as present, the same way a non-nil
// interface does; its contents are never inspected for emptiness.
impl FieldValue for serde_json::Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            other => Value::Present(Box::new(Value::from_json(other))),
        }
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn shape() -> Shape {
                    Shape::$variant
                }

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }
            }
        )*
    };
}

impl_field_value!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    bool => Bool,
);

// isize/usize have no lossless `From` into the fixed-width carriers
impl FieldValue for isize {
    fn shape() -> Shape {
        Shape::Int
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl FieldValue for usize {
    fn shape() -> Shape {
        Shape::Uint
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_value(&self) -> Value {
        Value::Uint(*self as u64)
    }
}
