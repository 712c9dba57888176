//! Core runtime for Quarry: the declared-type model, value coercion,
//! model metadata, and order-by query construction, with the common
//! vocabulary exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod adapter;
pub mod coerce;
pub mod model;
pub mod query;
pub mod schema;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, adapters, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{FieldMeta, Model, ModelMeta},
        query::{Binding, Direction, OrderBy, Query, SortInput, SortKey},
        schema::{CustomType, FieldType},
        value::Value,
    };
}
