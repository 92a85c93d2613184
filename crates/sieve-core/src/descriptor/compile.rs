use crate::{
    descriptor::{FieldDescriptor, SUPPRESSED_COLUMN, TypeDescriptor},
    error::{AnnotationError, Error},
    obs::sink::{self, MetricsEvent},
    registry::{QueryOp, UpdateOp},
    shape::{FieldDecl, Shape, StructRef},
};
use indexmap::IndexMap;
use std::any::TypeId;

type FieldMap = IndexMap<&'static str, FieldDescriptor>;

/// Compile a struct's declared fields into a validated descriptor, without
/// consulting any cache.
pub fn compile_fresh(ty: &StructRef) -> Result<TypeDescriptor, Error> {
    let mut stack = vec![ty.id()];
    let fields = compile_fields(ty, &[], &mut stack)?;

    tracing::debug!(
        type_name = ty.name(),
        fields = fields.len(),
        "compiled type descriptor"
    );
    sink::record(MetricsEvent::DescriptorCompiled {
        type_name: ty.name(),
        fields: fields.len() as u64,
    });

    Ok(TypeDescriptor::new(*ty, fields))
}

// `stack` holds the types currently being flattened, outermost first.
fn compile_fields(
    ty: &StructRef,
    prefix: &[&'static str],
    stack: &mut Vec<TypeId>,
) -> Result<FieldMap, Error> {
    let mut fields = FieldMap::new();

    for decl in ty.fields() {
        let tags = DeclaredTags::read(&decl);
        if tags.is_unannotated() && !decl.embedded {
            continue;
        }

        let mut path = prefix.to_vec();
        path.push(decl.name);
        let field_name = path.join(".");

        let (query, update) = validate(&decl, &tags, &field_name)?;

        if decl.embedded {
            let inner = embedded_struct(&decl, &field_name)?;
            if stack.contains(&inner.id()) {
                return Err(Error::annotation(
                    field_name,
                    AnnotationError::RecursiveFlatten { name: inner.name() },
                ));
            }

            stack.push(inner.id());
            let embedded = compile_fields(&inner, &path, stack)?;
            stack.pop();

            // embedding only fills names the parent has not declared
            for (name, field) in embedded {
                fields.entry(name).or_insert(field);
            }
        } else {
            let or_group = if query == Some(QueryOp::Or) {
                or_target(&decl.shape)
            } else {
                None
            };

            // a redeclared name replaces the earlier entry and moves to the end
            fields.shift_remove(decl.name);
            fields.insert(
                decl.name,
                FieldDescriptor {
                    source_name: decl.name,
                    path,
                    column: tags.column,
                    query,
                    update,
                    or_group,
                    raw_tags: decl.tags.raw(),
                },
            );
        }
    }

    Ok(fields)
}

///
/// DeclaredTags
/// Tag tokens with the suppressed column and empty tokens normalized away.
///

struct DeclaredTags {
    column: Option<&'static str>,
    query: &'static str,
    update: &'static str,
}

impl DeclaredTags {
    fn read(decl: &FieldDecl) -> Self {
        Self {
            column: decl
                .tags
                .column
                .filter(|c| !c.is_empty() && *c != SUPPRESSED_COLUMN),
            query: decl.tags.query.unwrap_or_default(),
            update: decl.tags.update.unwrap_or_default(),
        }
    }

    const fn is_unannotated(&self) -> bool {
        self.column.is_none() && self.query.is_empty() && self.update.is_empty()
    }

    fn is_or(&self) -> bool {
        self.query == QueryOp::Or.token()
    }
}

fn validate(
    decl: &FieldDecl,
    tags: &DeclaredTags,
    field_name: &str,
) -> Result<(Option<QueryOp>, Option<UpdateOp>), Error> {
    let fail = |reason| Err(Error::annotation(field_name, reason));

    if decl.embedded && tags.column.is_some() {
        return fail(AnnotationError::EmbeddedWithColumn);
    }

    if tags.is_or() {
        if tags.column.is_some() {
            return fail(AnnotationError::OrWithColumn);
        }
        if or_target(&decl.shape).is_none() {
            return fail(AnnotationError::OrNotStruct {
                kind: decl.shape.deref_optional().kind(),
            });
        }
    }

    if !decl.embedded && !tags.is_or() && tags.column.is_none() {
        return fail(AnnotationError::MissingColumn);
    }

    let shape = decl.shape.deref_optional();
    let is_list = matches!(shape, Shape::List(_));
    match QueryOp::from_token(tags.query) {
        Some(op) if op.is_membership() && !is_list => {
            return fail(AnnotationError::MembershipNotList {
                op: op.token(),
                kind: shape.kind(),
            });
        }
        Some(QueryOp::Eq) if is_list && !tags.query.is_empty() => {
            return fail(AnnotationError::EqualityOnList);
        }
        Some(QueryOp::Like) if !matches!(shape, Shape::Text | Shape::Any) => {
            return fail(AnnotationError::LikeNotText { kind: shape.kind() });
        }
        _ => {}
    }

    let query = if tags.query.is_empty() {
        None
    } else {
        let op = QueryOp::from_token(tags.query).ok_or_else(|| Error::UnknownQueryOperator {
            field: field_name.to_string(),
            token: tags.query.to_string(),
        })?;
        Some(op)
    };

    let update = if tags.update.is_empty() {
        None
    } else {
        let op = UpdateOp::from_token(tags.update).ok_or_else(|| Error::UnknownUpdateOperator {
            field: field_name.to_string(),
            token: tags.update.to_string(),
        })?;
        Some(op)
    };

    Ok((query, update))
}

// Struct behind a flattened field, one `Option` layer allowed.
fn embedded_struct(decl: &FieldDecl, field_name: &str) -> Result<StructRef, Error> {
    let shape = decl.shape.deref_optional();

    shape
        .as_struct()
        .copied()
        .ok_or_else(|| Error::UnsupportedFieldKind {
            field: field_name.to_string(),
            kind: shape.kind(),
        })
}

// Struct an OR-group field expands into: the struct itself, or the element
// struct of a list.
fn or_target(shape: &Shape) -> Option<StructRef> {
    match shape.deref_optional() {
        Shape::Struct(s) => Some(*s),
        Shape::List(elem) => elem.as_struct().copied(),
        _ => None,
    }
}
