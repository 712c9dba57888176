//! Order-by clause escaping.
//!
//! Definition time resolves directions and field references and pulls
//! every literal into the parameter table; apply time resolves deferred
//! values and appends the built clause onto the query. No raw literal
//! survives escaping, so the eventual store command only ever sees
//! parameter placeholders.

use crate::{
    model::ModelMeta,
    query::{
        params::{Deferred, Param, ParamTable},
        OrderByClause, Query, Queryable,
    },
    value::Value,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt, panic::Location};
use thiserror::Error as ThisError;

///
/// Direction
///
/// Closed sort-direction enumeration. Any other direction spelling is a
/// contract violation at escape or apply time.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

///
/// DirectionToken
///
/// Direction as written in a sort expression. `Ident` carries a dynamic
/// token that must name a literal direction at escape time; `Deferred`
/// installs a runtime check that runs when the clause is applied.
///

#[derive(Clone, Debug)]
pub enum DirectionToken {
    Asc,
    Desc,
    Ident(String),
    Deferred(Deferred),
}

///
/// SortKey
///
/// Order-by input expression before escaping.
///

#[derive(Clone, Debug)]
pub enum SortKey {
    /// Reference to a field of a bound source: `binding.field`.
    Field { binding: String, field: String },
    /// Literal sub-value; escaped into a parameter placeholder.
    Value(Value),
    /// Late-bound sub-value; escaped into a deferred placeholder.
    Deferred(Deferred),
}

impl SortKey {
    /// Convenience constructor for `binding.field` references.
    #[must_use]
    pub fn field(binding: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            binding: binding.into(),
            field: field.into(),
        }
    }
}

///
/// SortInput
///
/// One clause of an order-by expression before escaping: a bare key
/// (implicit ascending) or an explicit `(direction, key)` pair.
///

#[derive(Clone, Debug)]
pub enum SortInput {
    Key(SortKey),
    Directed(DirectionToken, SortKey),
}

///
/// SortField
///
/// Escaped order-by expression: a reference into the query's bound
/// sources, or a positional reference into the parameter table.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SortField {
    Source { source: usize, field: String },
    Param(usize),
}

///
/// DirectionSpec
///
/// Escape-time resolution state of a clause direction. Deferred specs
/// carry the installed runtime check to apply time.
///

#[derive(Clone, Debug)]
pub enum DirectionSpec {
    Static(Direction),
    Deferred(Deferred),
}

///
/// Binding
///
/// One bound query source visible to the escaper. A binding that carries
/// model metadata enables construction-time field validation.
///

#[derive(Clone, Debug)]
pub struct Binding {
    pub name: String,
    pub meta: Option<ModelMeta>,
}

impl Binding {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meta(name: impl Into<String>, meta: ModelMeta) -> Self {
        Self {
            name: name.into(),
            meta: Some(meta),
        }
    }
}

///
/// SourceLocation
///
/// Call site a clause was built at; carried for diagnostics only.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();

        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

///
/// EscapeError
///
/// Definition-time failures; query construction aborts immediately.
///

#[derive(Debug, ThisError)]
pub enum EscapeError {
    #[error("expected a direction of `asc` or `desc`, got `{token}`")]
    InvalidDirection { token: String },

    #[error("binding `{binding}` is bound twice")]
    DuplicateBinding { binding: String },

    #[error("unknown binding `{binding}` in order-by expression")]
    UnknownBinding { binding: String },

    #[error("unknown field `{field}` on `{model}` in order-by expression")]
    UnknownField { model: String, field: String },
}

///
/// ApplyError
///
/// Run-time failures raised while applying a built clause, before
/// anything reaches a store.
///

#[derive(Debug, ThisError)]
pub enum ApplyError {
    #[error("deferred order-by direction resolved to {value:?}; expected `asc` or `desc`")]
    InvalidDeferredDirection { value: Value },
}

///
/// OrderByFragment
///
/// Built, attachable order-by extension: the escaped clause pairs, the
/// finalized parameter table, and the originating call site.
///

#[derive(Clone, Debug)]
pub struct OrderByFragment {
    pub clauses: Vec<(DirectionSpec, SortField)>,
    pub params: ParamTable,
    pub location: SourceLocation,
}

///
/// OrderBy
///
/// Entry point for building order-by clauses.
///

pub struct OrderBy;

impl OrderBy {
    /// Build an attachable order-by extension from raw sort input.
    ///
    /// Normalizes the binding list, escapes every clause, and finalizes
    /// the parameter table into its positional form. The returned
    /// fragment is tagged with the call site for diagnostics.
    #[track_caller]
    pub fn build(
        bindings: &[Binding],
        clauses: &[SortInput],
    ) -> Result<OrderByFragment, EscapeError> {
        let location = SourceLocation::caller();
        normalize_bindings(bindings)?;

        let mut params = ParamTable::new();
        let clauses = escape(clauses, bindings, &mut params)?;

        Ok(OrderByFragment {
            clauses,
            params,
            location,
        })
    }
}

/// Escape a sequence of sort clauses against the bound sources.
///
/// Literal and late-bound sub-values land in `params`; the returned
/// clauses reference them positionally and never embed raw literals.
pub fn escape(
    clauses: &[SortInput],
    bindings: &[Binding],
    params: &mut ParamTable,
) -> Result<Vec<(DirectionSpec, SortField)>, EscapeError> {
    clauses
        .iter()
        .map(|clause| {
            let (direction, key) = match clause {
                SortInput::Key(key) => (DirectionSpec::Static(Direction::Asc), key),
                SortInput::Directed(token, key) => (escape_direction(token)?, key),
            };
            let field = escape_key(key, bindings, params)?;

            Ok((direction, field))
        })
        .collect()
}

/// Append a built order-by extension onto a query.
///
/// Pure: consumes the query value and returns the updated one. Deferred
/// directions are resolved and validated here; the fragment's parameters
/// merge onto the query's table with their indices rebased. The clause is
/// appended, never replacing earlier clauses, so later clauses sort with
/// lower priority.
pub fn apply(queryable: impl Queryable, fragment: OrderByFragment) -> Result<Query, ApplyError> {
    let mut query = queryable.into_query();
    let OrderByFragment {
        clauses,
        params,
        location,
    } = fragment;

    let offset = query.params.merge(params);
    let clauses = clauses
        .into_iter()
        .map(|(direction, field)| Ok((resolve_direction(direction)?, rebase_field(field, offset))))
        .collect::<Result<Vec<_>, ApplyError>>()?;

    query.order_bys.push(OrderByClause { clauses, location });

    Ok(query)
}

fn normalize_bindings(bindings: &[Binding]) -> Result<(), EscapeError> {
    for (index, binding) in bindings.iter().enumerate() {
        if bindings[..index].iter().any(|seen| seen.name == binding.name) {
            return Err(EscapeError::DuplicateBinding {
                binding: binding.name.clone(),
            });
        }
    }

    Ok(())
}

fn escape_direction(token: &DirectionToken) -> Result<DirectionSpec, EscapeError> {
    match token {
        DirectionToken::Asc => Ok(DirectionSpec::Static(Direction::Asc)),
        DirectionToken::Desc => Ok(DirectionSpec::Static(Direction::Desc)),
        DirectionToken::Ident(token) => match token.as_str() {
            "asc" => Ok(DirectionSpec::Static(Direction::Asc)),
            "desc" => Ok(DirectionSpec::Static(Direction::Desc)),
            _ => Err(EscapeError::InvalidDirection {
                token: token.clone(),
            }),
        },
        DirectionToken::Deferred(deferred) => Ok(DirectionSpec::Deferred(deferred.clone())),
    }
}

fn escape_key(
    key: &SortKey,
    bindings: &[Binding],
    params: &mut ParamTable,
) -> Result<SortField, EscapeError> {
    match key {
        SortKey::Field { binding, field } => {
            let source = bindings
                .iter()
                .position(|bound| bound.name == *binding)
                .ok_or_else(|| EscapeError::UnknownBinding {
                    binding: binding.clone(),
                })?;

            if let Some(meta) = &bindings[source].meta {
                if meta.field_type(field).is_none() {
                    return Err(EscapeError::UnknownField {
                        model: meta.model.clone(),
                        field: field.clone(),
                    });
                }
            }

            Ok(SortField::Source {
                source,
                field: field.clone(),
            })
        }
        SortKey::Value(value) => Ok(SortField::Param(params.push(Param::Value(value.clone())))),
        SortKey::Deferred(deferred) => {
            Ok(SortField::Param(params.push(Param::Deferred(deferred.clone()))))
        }
    }
}

fn resolve_direction(spec: DirectionSpec) -> Result<Direction, ApplyError> {
    match spec {
        DirectionSpec::Static(direction) => Ok(direction),
        DirectionSpec::Deferred(deferred) => {
            let value = deferred.resolve();
            match value.as_text() {
                Some("asc") => return Ok(Direction::Asc),
                Some("desc") => return Ok(Direction::Desc),
                _ => {}
            }

            Err(ApplyError::InvalidDeferredDirection { value })
        }
    }
}

fn rebase_field(field: SortField, offset: usize) -> SortField {
    match field {
        SortField::Param(index) => SortField::Param(index + offset),
        field => field,
    }
}
