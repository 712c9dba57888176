//! Query construction surface: the canonical query value, the order-by
//! escaper, and the explicit parameter table.

pub mod order;
pub mod params;

#[cfg(test)]
mod tests;

pub use order::{
    apply, ApplyError, Binding, Direction, DirectionSpec, DirectionToken, EscapeError, OrderBy,
    OrderByFragment, SortField, SortInput, SortKey, SourceLocation,
};
pub use params::{Deferred, Param, ParamTable};

///
/// Query
///
/// Canonical query representation consulted by clause builders: the
/// ordered bound sources, every applied order-by clause, and the merged
/// parameter table. Clause application is append-only; order determines
/// sort priority and later positional substitution.
///

#[derive(Clone, Debug, Default)]
pub struct Query {
    pub sources: Vec<String>,
    pub order_bys: Vec<OrderByClause>,
    pub params: ParamTable,
}

impl Query {
    /// Start a query over one named source.
    #[must_use]
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            sources: vec![source.into()],
            order_bys: Vec::new(),
            params: ParamTable::new(),
        }
    }

    /// Append a built order-by extension.
    pub fn order_by(self, fragment: OrderByFragment) -> Result<Self, ApplyError> {
        order::apply(self, fragment)
    }
}

///
/// OrderByClause
///
/// One applied order-by clause: fully resolved direction/expression pairs
/// plus the call site the clause was built at.
///

#[derive(Clone, Debug)]
pub struct OrderByClause {
    pub clauses: Vec<(Direction, SortField)>,
    pub location: SourceLocation,
}

///
/// Queryable
///
/// Conversion into the canonical query representation. Implemented for
/// anything a clause can be applied to.
///

pub trait Queryable {
    fn into_query(self) -> Query;
}

impl Queryable for Query {
    fn into_query(self) -> Query {
        self
    }
}

impl Queryable for &str {
    fn into_query(self) -> Query {
        Query::from_source(self)
    }
}

impl Queryable for String {
    fn into_query(self) -> Query {
        Query::from_source(self)
    }
}
