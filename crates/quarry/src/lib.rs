//! ## Crate layout
//! - `core`: runtime type model, value coercion, model metadata, and
//!   query construction.
//!
//! The `prelude` module mirrors the runtime surface used by adapter and
//! orchestration code.

pub use quarry_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        adapter::Adapter,
        coerce,
        prelude::*,
        query::{apply, Deferred, OrderByFragment, Param, ParamTable, Queryable as _},
    };
}
