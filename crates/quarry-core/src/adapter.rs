use crate::value::Value;

///
/// Adapter
///
/// Contract the core expects from a storage adapter. Field maps arriving
/// here have already passed through [`crate::model::dump_fields`]; values
/// handed back flow through [`crate::model::load_fields`] before
/// rehydration. `opts` is an adapter-specific keyword list.
///

pub trait Adapter {
    type Error: std::error::Error;

    /// Insert one row; returns the values of the `returning` fields.
    fn insert(
        &mut self,
        source: &str,
        fields: &[(String, Value)],
        returning: &[&str],
        opts: &[(String, Value)],
    ) -> Result<Vec<(String, Value)>, Self::Error>;

    /// Update the rows matching `filters`; returns the values of the
    /// `returning` fields.
    fn update(
        &mut self,
        source: &str,
        fields: &[(String, Value)],
        filters: &[(String, Value)],
        returning: &[&str],
        opts: &[(String, Value)],
    ) -> Result<Vec<(String, Value)>, Self::Error>;

    /// Delete the single row identified by `filters`.
    fn delete(&mut self, source: &str, filters: &[(String, Value)]) -> Result<(), Self::Error>;

    /// Run a thunk inside a transaction; its failure rolls back and
    /// propagates unchanged.
    fn transaction<T, F>(&mut self, f: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::Adapter;
    use crate::{
        model::{
            dump_fields, load_fields, merge_returned, FieldError, FieldMeta, Model, ModelMeta,
        },
        schema::FieldType,
        value::Value,
    };
    use std::{
        collections::BTreeMap,
        sync::LazyLock,
    };
    use thiserror::Error as ThisError;

    #[derive(Debug, ThisError)]
    enum MemoryError {
        #[error("no row matches the delete filter")]
        NotFound,
    }

    ///
    /// MemoryAdapter
    ///
    /// Append-only in-memory double; enough surface to exercise the
    /// dump → insert → merge → load flow.
    ///

    #[derive(Default)]
    struct MemoryAdapter {
        rows: BTreeMap<String, Vec<Vec<(String, Value)>>>,
        next_id: i64,
    }

    impl Adapter for MemoryAdapter {
        type Error = MemoryError;

        fn insert(
            &mut self,
            source: &str,
            fields: &[(String, Value)],
            returning: &[&str],
            _opts: &[(String, Value)],
        ) -> Result<Vec<(String, Value)>, Self::Error> {
            self.next_id += 1;
            let mut row = fields.to_vec();
            row.push(("id".to_string(), Value::Int(self.next_id)));
            self.rows.entry(source.to_string()).or_default().push(row);

            Ok(returning
                .iter()
                .map(|name| ((*name).to_string(), Value::Int(self.next_id)))
                .collect())
        }

        fn update(
            &mut self,
            _source: &str,
            _fields: &[(String, Value)],
            _filters: &[(String, Value)],
            returning: &[&str],
            _opts: &[(String, Value)],
        ) -> Result<Vec<(String, Value)>, Self::Error> {
            Ok(returning
                .iter()
                .map(|name| ((*name).to_string(), Value::Null))
                .collect())
        }

        fn delete(
            &mut self,
            source: &str,
            filters: &[(String, Value)],
        ) -> Result<(), Self::Error> {
            let rows = self.rows.entry(source.to_string()).or_default();
            let before = rows.len();
            rows.retain(|row| {
                !filters
                    .iter()
                    .all(|(name, value)| row.iter().any(|(n, v)| n == name && v == value))
            });

            if rows.len() == before {
                Err(MemoryError::NotFound)
            } else {
                Ok(())
            }
        }

        fn transaction<T, F>(&mut self, f: F) -> Result<T, Self::Error>
        where
            F: FnOnce(&mut Self) -> Result<T, Self::Error>,
        {
            f(self)
        }
    }

    static USER_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
        model: "User".to_string(),
        source: "users".to_string(),
        primary_key: Some("id".to_string()),
        read_after_writes: vec!["id".to_string()],
        fields: vec![
            FieldMeta::new("id", FieldType::Integer),
            FieldMeta::new("name", FieldType::String),
        ],
    });

    fn user_meta() -> ModelMeta {
        USER_META.clone()
    }

    #[derive(Debug, Eq, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    impl Model for User {
        fn meta() -> &'static ModelMeta {
            &USER_META
        }

        fn from_fields(fields: &[(String, Value)]) -> Result<Self, FieldError> {
            let field = |name: &str| {
                fields
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, value)| value)
                    .ok_or_else(|| FieldError::MissingField {
                        model: "User".to_string(),
                        field: name.to_string(),
                    })
            };

            let id = match field("id")? {
                Value::Int(id) => *id,
                _ => 0,
            };
            let name = field("name")?.as_text().unwrap_or_default().to_string();

            Ok(Self { id, name })
        }
    }

    #[test]
    fn write_path_dumps_inserts_merges_and_rehydrates() {
        let meta = User::meta();
        let mut adapter = MemoryAdapter::default();

        let fields = vec![("name".to_string(), Value::Text("ada".to_string()))];
        let dumped = dump_fields(meta, &fields).unwrap();
        let returned = adapter
            .insert(&meta.source, &dumped, &["id"], &[])
            .unwrap();

        let merged = merge_returned(&dumped, &returned);
        let loaded = load_fields(meta, &merged).unwrap();
        let user = User::from_fields(&loaded).unwrap();

        assert_eq!(
            user,
            User {
                id: 1,
                name: "ada".to_string(),
            }
        );
    }

    #[test]
    fn rehydration_requires_every_requested_field() {
        let err = User::from_fields(&[("id".to_string(), Value::Int(1))]).unwrap_err();

        assert!(matches!(err, FieldError::MissingField { .. }));
    }

    #[test]
    fn delete_targets_one_row_by_filter() {
        let meta = user_meta();
        let mut adapter = MemoryAdapter::default();

        let dumped =
            dump_fields(&meta, &[("name".to_string(), Value::Text("ada".to_string()))]).unwrap();
        adapter.insert(&meta.source, &dumped, &["id"], &[]).unwrap();

        adapter
            .delete(&meta.source, &[("id".to_string(), Value::Int(1))])
            .unwrap();
        let err = adapter
            .delete(&meta.source, &[("id".to_string(), Value::Int(1))])
            .unwrap_err();
        assert!(matches!(err, MemoryError::NotFound));
    }

    #[test]
    fn transaction_propagates_the_thunk_result() {
        let mut adapter = MemoryAdapter::default();

        let ok: Result<i64, MemoryError> = adapter.transaction(|_| Ok(3));
        assert_eq!(ok.unwrap(), 3);

        let err = adapter.transaction::<(), _>(|inner| {
            inner.delete("users", &[("id".to_string(), Value::Int(404))])
        });
        assert!(matches!(err.unwrap_err(), MemoryError::NotFound));
    }
}
