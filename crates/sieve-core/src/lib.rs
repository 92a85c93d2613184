//! Core runtime for sieve: the value model, type shapes, the descriptor
//! compiler and cache, the operator registry, and the filter and update
//! builders.
#![warn(unreachable_pub)]

extern crate self as sieve;

// public exports are one module level down
pub mod boundary;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod obs;
pub mod registry;
pub mod session;
pub mod shape;
pub mod traits;
pub mod update;
pub mod value;

/// Crates named by `#[derive(Descriptor)]` output.
#[doc(hidden)]
pub mod __reexports {
    pub use serde;
}

///
/// Prelude
///
/// Vocabulary needed to declare descriptors and read their output.
/// Builders, caches, and configuration stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        filter::{CompareOp, Filter},
        traits::{Descriptor, FieldValue},
        update::{Assignment, UpdateExpr, UpdateMap},
        value::Value,
    };
}
