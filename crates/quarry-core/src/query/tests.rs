use super::{
    apply, ApplyError, Binding, Deferred, Direction, EscapeError, OrderBy, Param, ParamTable,
    Query, Queryable, SortField, SortInput, SortKey,
};
use crate::{
    model::{FieldMeta, ModelMeta},
    query::order::DirectionToken,
    value::Value,
};

fn post_meta() -> ModelMeta {
    ModelMeta {
        model: "Post".to_string(),
        source: "posts".to_string(),
        primary_key: Some("id".to_string()),
        read_after_writes: vec!["id".to_string()],
        fields: vec![
            FieldMeta::new("id", crate::schema::FieldType::Integer),
            FieldMeta::new("title", crate::schema::FieldType::String),
            FieldMeta::new("rank", crate::schema::FieldType::Integer),
        ],
    }
}

fn bindings() -> Vec<Binding> {
    vec![Binding::named("p")]
}

#[test]
fn bare_keys_default_to_ascending() {
    let fragment = OrderBy::build(&bindings(), &[SortInput::Key(SortKey::field("p", "title"))])
        .unwrap();

    assert_eq!(fragment.clauses.len(), 1);
    assert!(matches!(
        &fragment.clauses[0],
        (super::DirectionSpec::Static(Direction::Asc), SortField::Source { source: 0, field })
            if field == "title"
    ));
    assert!(fragment.params.is_empty());
}

#[test]
fn literals_become_parameter_placeholders() {
    let fragment = OrderBy::build(
        &bindings(),
        &[
            SortInput::Key(SortKey::field("p", "title")),
            SortInput::Directed(DirectionToken::Desc, SortKey::Value(Value::Int(13))),
        ],
    )
    .unwrap();

    assert_eq!(fragment.clauses.len(), 2);
    assert!(matches!(
        &fragment.clauses[1],
        (super::DirectionSpec::Static(Direction::Desc), SortField::Param(0))
    ));
    assert_eq!(fragment.params.get(0), Some(&Param::Value(Value::Int(13))));
}

#[test]
fn dynamic_direction_tokens_resolve_or_abort_at_build_time() {
    let ok = OrderBy::build(
        &bindings(),
        &[SortInput::Directed(
            DirectionToken::Ident("desc".to_string()),
            SortKey::field("p", "title"),
        )],
    );
    assert!(ok.is_ok());

    let err = OrderBy::build(
        &bindings(),
        &[SortInput::Directed(
            DirectionToken::Ident("sideways".to_string()),
            SortKey::field("p", "title"),
        )],
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "expected a direction of `asc` or `desc`, got `sideways`"
    );
}

#[test]
fn unknown_bindings_are_definition_time_faults() {
    let err = OrderBy::build(&bindings(), &[SortInput::Key(SortKey::field("q", "title"))])
        .unwrap_err();

    assert!(matches!(err, EscapeError::UnknownBinding { .. }));
}

#[test]
fn duplicate_bindings_are_rejected() {
    let err = OrderBy::build(
        &[Binding::named("p"), Binding::named("p")],
        &[SortInput::Key(SortKey::field("p", "title"))],
    )
    .unwrap_err();

    assert!(matches!(err, EscapeError::DuplicateBinding { .. }));
}

#[test]
fn bindings_with_metadata_validate_fields() {
    let bound = vec![Binding::with_meta("p", post_meta())];

    let ok = OrderBy::build(&bound, &[SortInput::Key(SortKey::field("p", "rank"))]);
    assert!(ok.is_ok());

    let err = OrderBy::build(&bound, &[SortInput::Key(SortKey::field("p", "likes"))])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown field `likes` on `Post` in order-by expression"
    );
}

#[test]
fn apply_appends_to_an_already_populated_query() {
    let first = OrderBy::build(&bindings(), &[SortInput::Key(SortKey::field("p", "title"))])
        .unwrap();
    let second = OrderBy::build(
        &bindings(),
        &[SortInput::Directed(
            DirectionToken::Desc,
            SortKey::field("p", "rank"),
        )],
    )
    .unwrap();

    let query = apply("posts", first).unwrap();
    let query = query.order_by(second).unwrap();

    assert_eq!(query.sources, vec!["posts".to_string()]);
    assert_eq!(query.order_bys.len(), 2);
    assert_eq!(query.order_bys[0].clauses[0].0, Direction::Asc);
    assert_eq!(query.order_bys[1].clauses[0].0, Direction::Desc);
}

#[test]
fn apply_rebases_parameter_indices_when_merging() {
    let first = OrderBy::build(
        &bindings(),
        &[SortInput::Key(SortKey::Value(Value::Int(1)))],
    )
    .unwrap();
    let second = OrderBy::build(
        &bindings(),
        &[SortInput::Key(SortKey::Value(Value::Int(2)))],
    )
    .unwrap();

    let query = apply("posts", first).unwrap();
    let query = apply(query, second).unwrap();

    assert_eq!(query.params.len(), 2);
    assert_eq!(query.params.get(0), Some(&Param::Value(Value::Int(1))));
    assert_eq!(query.params.get(1), Some(&Param::Value(Value::Int(2))));
    assert_eq!(query.order_bys[0].clauses[0].1, SortField::Param(0));
    assert_eq!(query.order_bys[1].clauses[0].1, SortField::Param(1));
}

#[test]
fn deferred_directions_validate_at_apply_time() {
    let descending = OrderBy::build(
        &bindings(),
        &[SortInput::Directed(
            DirectionToken::Deferred(Deferred::from(Value::Text("desc".to_string()))),
            SortKey::field("p", "title"),
        )],
    )
    .unwrap();

    let query = apply("posts", descending).unwrap();
    assert_eq!(query.order_bys[0].clauses[0].0, Direction::Desc);

    let sideways = OrderBy::build(
        &bindings(),
        &[SortInput::Directed(
            DirectionToken::Deferred(Deferred::from(Value::Text("sideways".to_string()))),
            SortKey::field("p", "title"),
        )],
    )
    .unwrap();

    let err = apply("posts", sideways).unwrap_err();
    assert!(matches!(err, ApplyError::InvalidDeferredDirection { .. }));
}

#[test]
fn deferred_sort_keys_become_deferred_parameters() {
    let deferred = Deferred::new(|| Value::Int(99));
    let fragment = OrderBy::build(
        &bindings(),
        &[SortInput::Key(SortKey::Deferred(deferred.clone()))],
    )
    .unwrap();

    assert_eq!(fragment.params.len(), 1);
    let Some(Param::Deferred(stored)) = fragment.params.get(0) else {
        panic!("expected a deferred parameter");
    };
    assert_eq!(stored.resolve(), Value::Int(99));
    assert_eq!(stored, &deferred);
}

#[test]
fn fragments_carry_their_call_site() {
    let fragment = OrderBy::build(&bindings(), &[SortInput::Key(SortKey::field("p", "title"))])
        .unwrap();

    assert!(fragment.location.to_string().contains("tests.rs"));
}

#[test]
fn queryable_conversions_reach_one_canonical_shape() {
    let query = "posts".into_query();
    assert_eq!(query.sources, vec!["posts".to_string()]);

    let query = Query::from_source("posts");
    assert_eq!(query.into_query().sources, vec!["posts".to_string()]);
}

#[test]
fn directions_display_their_token_spelling() {
    assert_eq!(Direction::Asc.to_string(), "asc");
    assert_eq!(Direction::Desc.to_string(), "desc");
}

#[test]
fn param_tables_merge_in_insertion_order() {
    let mut left = ParamTable::new();
    left.push(Param::Value(Value::Int(1)));
    left.push(Param::Value(Value::Int(2)));

    let mut right = ParamTable::new();
    right.push(Param::Value(Value::Int(3)));

    let offset = left.merge(right);
    assert_eq!(offset, 2);

    let positional: Vec<_> = left.into_positional();
    assert_eq!(
        positional,
        vec![
            Param::Value(Value::Int(1)),
            Param::Value(Value::Int(2)),
            Param::Value(Value::Int(3)),
        ]
    );
}
