//! Declared-type model: the closed primitive set, the array composite, and
//! the custom-type extension point consumed by every coercion surface.

use crate::{
    coerce::{CastError, CoerceError},
    value::Value,
};
use std::{fmt, mem::discriminant, sync::Arc};

///
/// CustomType
///
/// Pluggable type implementation outside the closed primitive set.
///
/// A custom type owns its own coercion logic end to end; the engine
/// delegates cast/dump/load/blank to it without inspecting the value.
/// `underlying` must reduce to a primitive type and is consulted only by
/// the matching relation.
///

pub trait CustomType: fmt::Debug + Send + Sync {
    /// Name used in diagnostics and type spellings.
    fn name(&self) -> &str;

    /// Declared underlying type; must reduce to a primitive.
    fn underlying(&self) -> FieldType;

    /// Coerce arbitrary external input into this type.
    fn cast(&self, value: &Value) -> Result<Value, CastError>;

    /// Convert an in-memory value to its storage-native form.
    fn dump(&self, value: &Value) -> Result<Value, CoerceError>;

    /// Convert a storage-native value back to its in-memory form.
    fn load(&self, value: &Value) -> Result<Value, CoerceError>;

    /// Report whether a value is semantically empty for this type.
    fn is_blank(&self, value: &Value) -> bool;
}

///
/// FieldType
///
/// Declared schema type for a field: one of a closed set of basic kinds,
/// an array wrapping a type, or a custom implementation.
///
/// Primitive-ness is a closed, statically checkable property. Custom types
/// are dispatched dynamically and are never const-evaluable.
///

#[derive(Clone, Debug)]
pub enum FieldType {
    // Scalar primitives
    Any,
    Binary,
    Boolean,
    Date,
    DateTime,
    Decimal,
    Float,
    Integer,
    String,
    Time,
    Uuid,

    // Composite
    Array(Box<Self>),

    /// Custom implementation; see [`CustomType`].
    Custom(Arc<dyn CustomType>),
}

impl FieldType {
    /// Wrap a type in the array composite.
    #[must_use]
    pub fn array(inner: Self) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Wrap a custom implementation.
    #[must_use]
    pub fn custom(custom: impl CustomType + 'static) -> Self {
        Self::Custom(Arc::new(custom))
    }

    /// True iff this is one of the closed basic kinds, or an array of one.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        match self {
            Self::Array(inner) => inner.is_basic(),
            Self::Custom(_) => false,
            _ => true,
        }
    }

    fn is_basic(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Custom(_))
    }

    /// Directed compatibility check against a comparison type.
    ///
    /// `Any` absorbs in either position. Arrays match arrays with matching
    /// inner types. Custom types reduce through their underlying type and
    /// repeat the check. Basic kinds match only the same atom.
    #[must_use]
    pub fn matches(&self, comparison: &Self) -> bool {
        match (self, comparison) {
            (_, Self::Any) | (Self::Any, _) => true,
            (Self::Custom(custom), _) => custom.underlying().matches(comparison),
            (_, Self::Custom(custom)) => self.matches(&custom.underlying()),
            (Self::Array(left), Self::Array(right)) => left.matches(right),
            (left, right) => discriminant(left) == discriminant(right),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(left), Self::Array(right)) => left == right,
            // Custom types have no structural identity; handle equality.
            (Self::Custom(left), Self::Custom(right)) => Arc::ptr_eq(left, right),
            (left, right) => discriminant(left) == discriminant(right),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Binary => f.write_str("binary"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Decimal => f.write_str("decimal"),
            Self::Float => f.write_str("float"),
            Self::Integer => f.write_str("integer"),
            Self::String => f.write_str("string"),
            Self::Time => f.write_str("time"),
            Self::Uuid => f.write_str("uuid"),
            Self::Array(inner) => write!(f, "{{array, {inner}}}"),
            Self::Custom(custom) => f.write_str(custom.name()),
        }
    }
}
