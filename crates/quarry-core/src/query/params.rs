use crate::value::Value;
use std::{fmt, sync::Arc};

///
/// Deferred
///
/// Late-bound value: not known when a clause is built, produced by a
/// resolver when the clause is applied. Cloning shares the resolver.
///

#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> Value + Send + Sync>);

impl Deferred {
    pub fn new(resolve: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    /// Produce the deferred value.
    #[must_use]
    pub fn resolve(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

impl PartialEq for Deferred {
    // Resolvers have no structural identity; handle equality.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for Deferred {
    fn from(value: Value) -> Self {
        Self::new(move || value.clone())
    }
}

///
/// Param
///
/// One parameter-table entry: a literal captured at escape time, or a
/// placeholder for a value produced at apply time.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Value(Value),
    Deferred(Deferred),
}

///
/// ParamTable
///
/// Explicit, insertion-ordered parameter accumulator. Order is
/// load-bearing: positional substitution later consumes entries in
/// insertion order, so merging appends and never overwrites.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTable {
    params: Vec<Param>,
}

impl ParamTable {
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append one parameter; returns its positional index.
    pub fn push(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Param> {
        self.params.get(index)
    }

    /// Merge another table onto the end of this one, preserving both
    /// insertion orders.
    ///
    /// Returns the offset by which the merged table's indices must be
    /// rebased.
    pub fn merge(&mut self, other: Self) -> usize {
        let offset = self.params.len();
        self.params.extend(other.params);

        offset
    }

    /// Finalized positional form, insertion order preserved.
    #[must_use]
    pub fn into_positional(self) -> Vec<Param> {
        self.params
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }
}
