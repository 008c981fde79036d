use std::sync::Arc;

use sqlweave::{QueryBuilder, TableParam, TemplateDescription};

use crate::fixtures::{environment, Table1, Table2};

fn find_by_id(builder: &QueryBuilder, id: i64) -> sqlweave::Query {
    builder.query1(|t: TableParam<Table1>| {
        TemplateDescription::new("SELECT {0:*} FROM {1} WHERE {2} = {3}")
            .table(t)
            .table(t)
            .column(t.col("Id"))
            .bind(id)
    })
}

#[test]
fn test_structurally_identical_factories_share_one_plan() {
    let env = environment();
    let builder = QueryBuilder::new(env.clone());

    // Two distinct descriptions, identical shape, different bind values.
    let first = find_by_id(&builder, 1).to_command().unwrap();
    let second = find_by_id(&builder, 2).to_command().unwrap();

    assert_eq!(first.text(), second.text());
    assert_eq!(first.parameters()[0].value, 1);
    assert_eq!(second.parameters()[0].value, 2);

    let metrics = env.cache().metrics();
    assert_eq!(metrics.entries, 1);
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.hits, 1);
}

#[test]
fn test_repeated_populate_hits_by_graph_identity() {
    let env = environment();
    let builder = QueryBuilder::new(env.clone());
    let query = find_by_id(&builder, 7);

    for _ in 0..3 {
        query.to_command().unwrap();
    }

    let metrics = env.cache().metrics();
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.hits, 2);
    assert!((metrics.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_structurally_different_factories_compile_separately() {
    let env = environment();
    let builder = QueryBuilder::new(env.clone());

    find_by_id(&builder, 1).to_command().unwrap();
    builder
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0:*} FROM {1} WHERE {2} = {3}")
                .table(t)
                .table(t)
                .column(t.col("ColumnName"))
                .bind(1)
        })
        .to_command()
        .unwrap();

    let metrics = env.cache().metrics();
    assert_eq!(metrics.entries, 2);
    assert_eq!(metrics.misses, 2);
    assert_eq!(metrics.hits, 0);
}

#[test]
fn test_inline_literals_are_part_of_the_shape() {
    let env = environment();
    let builder = QueryBuilder::new(env.clone());

    for limit in [10, 20] {
        builder
            .query1(move |t: TableParam<Table2>| {
                TemplateDescription::new("SELECT {0} FROM {1} LIMIT {2}")
                    .column(t.col("Id"))
                    .table(t)
                    .lit(limit)
            })
            .to_command()
            .unwrap();
    }

    assert_eq!(env.cache().metrics().entries, 2);
}

#[test]
fn test_derived_environments_do_not_share_plans() {
    let env = environment();
    QueryBuilder::new(env.clone())
        .query0(|| TemplateDescription::new("SELECT {0}").bind(1))
        .to_command()
        .unwrap();

    let derived = Arc::new(env.with_converter(Arc::new(sqlweave::IdentityConverter)));
    QueryBuilder::new(derived.clone())
        .query0(|| TemplateDescription::new("SELECT {0}").bind(1))
        .to_command()
        .unwrap();

    assert_eq!(env.cache().metrics().entries, 1);
    assert_eq!(derived.cache().metrics().entries, 1);
    assert_eq!(derived.cache().metrics().misses, 1);
}

#[test]
fn test_cached_plan_renders_fresh_aliases_per_call() {
    let env = environment();
    let builder = QueryBuilder::new(env.clone());

    let aliased = |alias: &'static str| {
        builder.query1(move |t: TableParam<Table1>| {
            TemplateDescription::new(format!("SELECT {{0}}.x FROM {{1:AS {alias}}}"))
                .table(t)
                .table(t)
        })
    };

    // Different alias text means a different skeleton, so these are distinct
    // shapes; each call still gets its own token state.
    let a = aliased("a").to_command().unwrap();
    let b = aliased("b").to_command().unwrap();
    assert_eq!(a.text(), r#"SELECT a.x FROM "Table1" AS a"#);
    assert_eq!(b.text(), r#"SELECT b.x FROM "Table1" AS b"#);

    // Re-rendering the first shape must not see state from its earlier call.
    let again = aliased("a").to_command().unwrap();
    assert_eq!(again.text(), a.text());
    assert_eq!(env.cache().metrics().hits, 1);
}
