use crate::{
    config::UpdateConfig,
    descriptor::DescriptorCache,
    error::Error,
    update::{Assignment, UpdateMap},
    value::{Value, normalize},
};

/// Build the assignment set for a described value.
///
/// Every field with a column contributes unless its value is empty.
/// OR-group containers have no column and never participate. When two
/// fields share a column the later one wins.
pub fn build_update(
    value: &Value,
    cache: &DescriptorCache,
    config: &UpdateConfig,
) -> Result<UpdateMap, Error> {
    let record = normalize(value)?;
    let descriptor = cache.resolve(record.ty())?;
    let mut out = UpdateMap::new();

    for field in descriptor.fields() {
        let Some(column) = field.column else {
            continue;
        };
        let Some(value) = record.get_path(&field.path) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let value = value.deref_present().clone();

        match field.update {
            Some(op) => {
                if let Some(assignment) = op.build(column, value, config.dialect)? {
                    out.insert(column.to_string(), assignment);
                }
            }
            None => {
                out.insert(column.to_string(), Assignment::Value(value));
            }
        }
    }

    tracing::trace!(
        type_name = descriptor.name(),
        columns = out.len(),
        "built update map"
    );

    Ok(out)
}
