use serde_json::json;
use sqlweave::render::errors::RenderError;
use sqlweave::{Error, Query, TableParam, TemplateDescription};

use crate::fixtures::{builder, Table1, Table2};

fn join_query() -> Query {
    builder().query2(|t1: TableParam<Table1>, t2: TableParam<Table2>| {
        TemplateDescription::new(
            r#"SELECT {0:*} FROM {1:AS "T1"}, {2} WHERE {3} = {4} AND {5:C} = {6,2:X}"#,
        )
        .table(t1)
        .table(t1)
        .table(t2)
        .column(t1.col("Id"))
        .column(t2.col("Id"))
        .column(t1.col("ColumnName"))
        .bind(10)
    })
}

#[test]
fn test_join_with_alias_expansion_and_formatted_bind() {
    let command = join_query().to_command().unwrap();

    assert_eq!(
        command.text(),
        r#"SELECT "T1"."Id", "T1"."FooColumn", "T1"."NullableField" FROM "Table1" AS "T1", "TableTwo" WHERE "T1"."Id" = "TableTwo"."Id" AND "FooColumn" = @p0"#
    );
    assert_eq!(command.parameters().len(), 1);
    assert_eq!(command.parameters()[0].name, "@p0");
    assert_eq!(command.parameters()[0].value, json!(" A"));
}

#[test]
fn test_alias_applies_to_occurrences_before_its_declaration() {
    // {0} renders before the aliasing placeholder {1} but still uses "T1".
    let command = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new(r#"SELECT {0}.x FROM {1:AS "T1"}"#)
                .table(t)
                .table(t)
        })
        .to_command()
        .unwrap();
    assert_eq!(command.text(), r#"SELECT "T1".x FROM "Table1" AS "T1""#);
}

#[test]
fn test_unaliased_table_qualifies_with_escaped_name() {
    let command = builder()
        .query1(|t: TableParam<Table2>| {
            TemplateDescription::new("SELECT {0} FROM {1}")
                .column(t.col("Id"))
                .table(t)
        })
        .to_command()
        .unwrap();
    assert_eq!(command.text(), r#"SELECT "TableTwo"."Id" FROM "TableTwo""#);
}

#[test]
fn test_repeated_rendering_is_stable() {
    let query = join_query();
    let first = query.to_command().unwrap();
    let second = query.to_command().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_alignment_on_table_reference_fails() {
    let err = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0,3}").table(t)
        })
        .to_command()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::AlignmentNotApplicable {
            kind: "table reference",
            index: 0
        })
    ));
}

#[test]
fn test_invalid_table_and_column_formats_fail() {
    let err = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0:ASC}").table(t)
        })
        .to_command()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::InvalidTableFormat { .. })
    ));

    let err = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0:Z}").column(t.col("Id"))
        })
        .to_command()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::InvalidColumnFormat { .. })
    ));
}

#[test]
fn test_conflicting_aliases_fail_and_identical_redeclaration_passes() {
    let err = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new(r#"{0:AS "A"} {1:AS "B"}"#)
                .table(t)
                .table(t)
        })
        .to_command()
        .unwrap_err();
    let Error::Render(RenderError::AliasConflict {
        declared,
        existing,
        table,
    }) = err
    else {
        panic!("expected an alias conflict, got {err}");
    };
    assert_eq!(declared, r#""B""#);
    assert_eq!(existing, r#""A""#);
    assert_eq!(table, "Table1");

    let command = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new(r#"{0:AS "A"} {1:AS "A"}"#)
                .table(t)
                .table(t)
        })
        .to_command()
        .unwrap();
    assert_eq!(command.text(), r#""Table1" AS "A" "Table1" AS "A""#);
}

#[test]
fn test_substitution_free_template_unescapes_braces_leniently() {
    let command = builder()
        .query0(|| TemplateDescription::new("SELECT '{{foo}}{{bar'"))
        .to_command()
        .unwrap();
    assert_eq!(command.text(), "SELECT '{foo}{bar'");
    assert!(command.parameters().is_empty());
}

#[test]
fn test_index_out_of_range() {
    let err = builder()
        .query0(|| TemplateDescription::new("SELECT {1}").bind(1))
        .to_command()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::IndexOutOfRange { index: 1, count: 1 })
    ));
}

#[test]
fn test_unterminated_placeholder_and_stray_close_brace() {
    let err = builder()
        .query0(|| TemplateDescription::new("SELECT {0").bind(1))
        .to_command()
        .unwrap_err();
    assert!(matches!(err, Error::Render(RenderError::UnexpectedEnd)));

    let err = builder()
        .query0(|| TemplateDescription::new("SELECT } {0}").bind(1))
        .to_command()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::UnmatchedCloseBrace { position: 7 })
    ));
}

#[test]
fn test_raw_fragment_and_inline_literal() {
    let command = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0} FROM {1} LIMIT {2} {3}")
                .column(t.col("Id"))
                .table(t)
                .bind(25)
                .raw("FOR UPDATE")
        })
        .to_command()
        .unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "Table1"."Id" FROM "Table1" LIMIT @p0 FOR UPDATE"#
    );
    assert_eq!(command.parameters()[0].value, json!(25));
}

#[test]
fn test_plain_sql_query_keeps_braces() {
    let command = builder()
        .sql("SELECT * FROM t WHERE tag = '{literal}'")
        .to_command()
        .unwrap();
    assert_eq!(command.text(), "SELECT * FROM t WHERE tag = '{literal}'");
    assert!(command.parameters().is_empty());
}

#[test]
fn test_unresolvable_member_is_a_compile_error() {
    let err = builder()
        .query1(|t: TableParam<Table1>| {
            TemplateDescription::new("SELECT {0}").column(t.col("Excluded"))
        })
        .to_command()
        .unwrap_err();
    assert!(matches!(err, Error::Compile(_)));
    assert!(err.to_string().contains("Excluded"));
}
