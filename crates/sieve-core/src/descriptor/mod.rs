//! Type descriptors: the cached, validated field plan for a described struct.

mod cache;
mod compile;


use crate::{
    registry::{QueryOp, UpdateOp},
    shape::StructRef,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;

// re-exports
pub use cache::DescriptorCache;
pub use compile::compile_fresh;

/// Column value that suppresses a column declaration.
pub const SUPPRESSED_COLUMN: &str = "-";

///
/// TypeDescriptor
///
/// Ordered field plan for one struct type. Immutable once built; shared
/// across threads behind an `Arc`.
///

#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    ty: StructRef,
    fields: IndexMap<&'static str, FieldDescriptor>,
}

impl TypeDescriptor {
    #[must_use]
    pub(crate) const fn new(ty: StructRef, fields: IndexMap<&'static str, FieldDescriptor>) -> Self {
        Self { ty, fields }
    }

    /// Assemble a descriptor without validation. Later entries with the same
    /// source name replace earlier ones.
    #[must_use]
    pub fn from_fields(ty: StructRef, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        let fields = fields
            .into_iter()
            .map(|field| (field.source_name, field))
            .collect();

        Self { ty, fields }
    }

    #[must_use]
    pub const fn ty(&self) -> &StructRef {
        &self.ty
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.ty.name()
    }

    /// Fields in traversal order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Source names in traversal order.
    #[must_use]
    pub fn field_order(&self) -> Vec<&'static str> {
        self.fields.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

///
/// FieldDescriptor
///
/// Either a leaf (`column` set) or an OR-group container (`or_group` set),
/// never both.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub source_name: &'static str,

    /// Field names from the described struct down to this field, through any
    /// flattened structs.
    pub path: Vec<&'static str>,

    pub column: Option<&'static str>,

    /// `None` is default equality.
    pub query: Option<QueryOp>,

    /// `None` is direct assignment.
    pub update: Option<UpdateOp>,

    pub or_group: Option<StructRef>,
    pub raw_tags: BTreeMap<&'static str, &'static str>,
}

impl FieldDescriptor {
    /// Leaf field read directly from the described struct.
    #[must_use]
    pub fn leaf(source_name: &'static str, column: &'static str) -> Self {
        Self {
            source_name,
            path: vec![source_name],
            column: Some(column),
            query: None,
            update: None,
            or_group: None,
            raw_tags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_query(mut self, op: QueryOp) -> Self {
        self.query = Some(op);
        self
    }

    #[must_use]
    pub const fn with_update(mut self, op: UpdateOp) -> Self {
        self.update = Some(op);
        self
    }

    #[must_use]
    pub const fn is_or_group(&self) -> bool {
        self.or_group.is_some()
    }

    /// Effective query operator.
    #[must_use]
    pub fn query_op(&self) -> QueryOp {
        self.query.unwrap_or(QueryOp::Eq)
    }
}
