//! Module: model
//! Responsibility: runtime model metadata and the per-field storage boundary.
//! Does not own: coercion semantics or the write lifecycle.
//! Boundary: metadata surface consumed by clause builders and orchestration.

use crate::{
    coerce::{self, CoerceError},
    schema::FieldType,
    value::Value,
};
use thiserror::Error as ThisError;

///
/// FieldMeta
///
/// One declared field: its name and schema type.
///

#[derive(Clone, Debug)]
pub struct FieldMeta {
    pub name: String,
    pub ty: FieldType,
}

impl FieldMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

///
/// ModelMeta
///
/// Runtime model metadata: the ordered field list, the storage source
/// name, the primary key (if any), and the fields the store computes and
/// returns after a write.
///

#[derive(Clone, Debug)]
pub struct ModelMeta {
    pub model: String,
    pub source: String,
    pub primary_key: Option<String>,
    pub read_after_writes: Vec<String>,
    pub fields: Vec<FieldMeta>,
}

impl ModelMeta {
    /// Ordered field names, as declared.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Declared type lookup for one field.
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.ty)
    }

    /// Returns true when the store computes this field on write.
    #[must_use]
    pub fn is_read_after_write(&self, name: &str) -> bool {
        self.read_after_writes.iter().any(|field| field == name)
    }
}

///
/// Model
///
/// Contract the persistence orchestration needs from a mapped struct: its
/// metadata plus a constructor that rehydrates field values into the
/// native shape after a write merges returned fields.
///

pub trait Model: Sized {
    fn meta() -> &'static ModelMeta;

    /// Rehydrate from a loaded field map.
    fn from_fields(fields: &[(String, Value)]) -> Result<Self, FieldError>;
}

///
/// FieldError
///
/// Per-field faults raised on the storage boundary, naming the model,
/// field, and declared type so the orchestration layer can aggregate a
/// user-facing report.
///

#[derive(Debug, ThisError)]
pub enum FieldError {
    #[error("value for field `{field}` of `{model}` does not match type {ty}")]
    DoesNotMatchType {
        model: String,
        field: String,
        ty: FieldType,
        #[source]
        source: CoerceError,
    },

    #[error("unknown field `{field}` on `{model}`")]
    UnknownField { model: String, field: String },

    #[error("missing field `{field}` on `{model}`")]
    MissingField { model: String, field: String },
}

/// Dump every provided field through its declared type.
///
/// The write path calls this immediately before handing values to the
/// adapter; input order is preserved.
pub fn dump_fields(
    meta: &ModelMeta,
    fields: &[(String, Value)],
) -> Result<Vec<(String, Value)>, FieldError> {
    coerce_fields(meta, fields, coerce::dump)
}

/// Load every provided field through its declared type.
///
/// The read path calls this on rows coming back from the adapter before
/// rehydrating the model struct.
pub fn load_fields(
    meta: &ModelMeta,
    fields: &[(String, Value)],
) -> Result<Vec<(String, Value)>, FieldError> {
    coerce_fields(meta, fields, coerce::load)
}

/// Merge store-returned values over dumped input fields.
///
/// Returned fields win; input order is preserved and fields only present
/// in `returned` are appended in their own order.
#[must_use]
pub fn merge_returned(
    fields: &[(String, Value)],
    returned: &[(String, Value)],
) -> Vec<(String, Value)> {
    let mut merged: Vec<(String, Value)> = fields
        .iter()
        .map(|(name, value)| {
            let value = returned
                .iter()
                .find(|(returned_name, _)| returned_name == name)
                .map_or(value, |(_, returned_value)| returned_value);
            (name.clone(), value.clone())
        })
        .collect();

    for (name, value) in returned {
        if !merged.iter().any(|(merged_name, _)| merged_name == name) {
            merged.push((name.clone(), value.clone()));
        }
    }

    merged
}

fn coerce_fields(
    meta: &ModelMeta,
    fields: &[(String, Value)],
    op: impl Fn(&FieldType, &Value) -> Result<Value, CoerceError>,
) -> Result<Vec<(String, Value)>, FieldError> {
    fields
        .iter()
        .map(|(name, value)| {
            let ty = meta
                .field_type(name)
                .ok_or_else(|| FieldError::UnknownField {
                    model: meta.model.clone(),
                    field: name.clone(),
                })?;
            let coerced = op(ty, value).map_err(|source| FieldError::DoesNotMatchType {
                model: meta.model.clone(),
                field: name.clone(),
                ty: ty.clone(),
                source,
            })?;

            Ok((name.clone(), coerced))
        })
        .collect()
}
