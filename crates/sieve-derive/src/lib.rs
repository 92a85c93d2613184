use proc_macro::TokenStream;

mod descriptor;
mod util;

/// Derive `FieldValue` and `Descriptor` for a struct with named fields.
///
/// Field attributes:
/// - `#[sieve(column = "...")]` column name, `"-"` suppresses it
/// - `#[sieve(query = "...")]` query operator token
/// - `#[sieve(update = "...")]` update operator token
/// - `#[sieve(flatten)]` merge the field's struct into this one
///
/// Fields without a `sieve` attribute are passthrough: they are neither
/// declared nor snapshotted, so their types need no sieve impls.
/// `merge_json` fields are snapshotted through their `Serialize` impl.
#[proc_macro_derive(Descriptor, attributes(sieve))]
pub fn derive_descriptor(input: TokenStream) -> TokenStream {
    descriptor::derive_descriptor(input.into()).into()
}
