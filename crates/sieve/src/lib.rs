//! ## Crate layout
//! - `descriptor`: compiled field plans and the descriptor cache.
//! - `filter`: the WHERE expression tree and its builder.
//! - `update`: assignment maps, compound expressions, and SQL dialects.
//! - `registry`: the closed query and update operator tables.
//! - `value` / `shape`: the dynamic value model and static type shapes.
//! - `obs`: in-memory metrics and the scoped sink override.
//! - `config`: TOML runtime configuration.
//!
//! `#[derive(Descriptor)]` generates the reflection the builders need; the
//! free functions below run against the process-wide descriptor cache.

pub use sieve_core::{
    boundary, config, descriptor, error, filter, obs, registry, shape, traits, update, value,
};
pub use sieve_derive::Descriptor;

#[doc(hidden)]
pub use sieve_core::__reexports;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Entry points
//

pub use sieve_core::{error::Error, session::Sieve};

use filter::Filter;
use std::sync::Arc;
use traits::FieldValue;
use update::UpdateMap;

/// WHERE expression for `input`, using the default session.
pub fn filter<T: FieldValue + ?Sized>(input: &T) -> Result<Option<Filter>, Error> {
    Sieve::default().filter(input)
}

/// Assignment set for `input`, using the default session.
pub fn update<T: FieldValue + ?Sized>(input: &T) -> Result<UpdateMap, Error> {
    Sieve::default().update(input)
}

/// Compiled descriptor for `T` from the process-wide cache.
pub fn descriptor_of<T: traits::Descriptor>() -> Result<Arc<descriptor::TypeDescriptor>, Error> {
    Sieve::default().descriptor::<T>()
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Descriptor, Error, Sieve};
    pub use sieve_core::{
        filter::{CompareOp, Filter},
        traits::{Descriptor as _, FieldValue as _},
        update::{Assignment, Dialect, UpdateExpr, UpdateMap},
        value::Value,
    };
}
