use crate::{
    descriptor::{DescriptorCache, FieldDescriptor, TypeDescriptor},
    error::Error,
    filter::Filter,
    value::{Record, Value, normalize},
};

/// Build the WHERE expression for a described value.
///
/// Top-level fields are ANDed; OR-group containers introduce OR at any
/// depth. `Ok(None)` means every field was empty.
pub fn build_filter(value: &Value, cache: &DescriptorCache) -> Result<Option<Filter>, Error> {
    let record = normalize(value)?;
    let descriptor = cache.resolve(record.ty())?;

    let filter = build_record(record, &descriptor, cache, true)?;
    tracing::trace!(
        type_name = descriptor.name(),
        leaves = filter.as_ref().map_or(0, Filter::leaf_count),
        "built filter"
    );

    Ok(filter)
}

/// Walk `descriptor` against `record`, joining the sibling expressions with
/// AND when `conjunctive`, otherwise OR.
pub(crate) fn build_record(
    record: &Record,
    descriptor: &TypeDescriptor,
    cache: &DescriptorCache,
    conjunctive: bool,
) -> Result<Option<Filter>, Error> {
    let mut exprs = Vec::new();

    for field in descriptor.fields() {
        let Some(value) = record.get_path(&field.path) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let value = value.deref_present();

        let expr = if field.is_or_group() {
            build_or_group(field, value, cache)?
        } else {
            build_leaf(field, value)?
        };
        exprs.extend(expr);
    }

    Ok(Filter::join(exprs, conjunctive))
}

fn build_or_group(
    field: &FieldDescriptor,
    value: &Value,
    cache: &DescriptorCache,
) -> Result<Option<Filter>, Error> {
    let Some(group) = &field.or_group else {
        return Ok(None);
    };
    let descriptor = cache.resolve(group)?;

    match value {
        Value::List(items) => {
            let mut branches = Vec::with_capacity(items.len());
            for item in items {
                let element = normalize(item)?;
                branches.extend(build_record(element, &descriptor, cache, false)?);
            }

            Ok(Filter::join(branches, false))
        }
        other => build_record(normalize(other)?, &descriptor, cache, false),
    }
}

fn build_leaf(field: &FieldDescriptor, value: &Value) -> Result<Option<Filter>, Error> {
    let Some(column) = field.column else {
        return Ok(None);
    };

    let op = field.query_op();
    let build = op.builder().ok_or_else(|| Error::UnknownQueryOperator {
        field: field.source_name.to_string(),
        token: op.token().to_string(),
    })?;

    build(column, value.clone())
}
