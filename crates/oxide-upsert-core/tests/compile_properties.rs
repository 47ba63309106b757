//! Properties every dialect must satisfy.

mod common;

use common::{batch, counter_schema, numbered_prefix, placeholder_counts, Counter};
use oxide_upsert_core::prelude::*;
use proptest::prelude::*;

fn compile_all(
    entities: &[Counter],
    match_on: &[&str],
    on_conflict: &OnConflict,
) -> Vec<(DialectKind, CompiledCommand)> {
    DialectKind::ALL
        .iter()
        .map(|kind| {
            let command = compile(kind, &counter_schema(), entities, match_on, on_conflict)
                .unwrap_or_else(|e| panic!("{kind} failed to compile: {e}"));
            (*kind, command)
        })
        .collect()
}

#[test]
fn default_policy_overwrites_non_key_columns() {
    for (kind, command) in compile_all(&batch(1..3), &["id"], &OnConflict::UpdateAll) {
        let quote = |c: &str| kind.quote_identifier(c);
        for column in ["name", "count"] {
            let assignment = format!(
                "{} = {}{}{}",
                quote(column),
                kind.source_prefix(),
                quote(column),
                kind.source_suffix()
            );
            assert!(command.sql.contains(&assignment), "{kind}: {}", command.sql);
        }
        let (_, update_tail) = command
            .sql
            .rsplit_once("UPDATE ")
            .expect("update branch is rendered");
        assert!(
            !update_tail.contains(&format!("{} = ", quote("id"))),
            "{kind}: key column must not be updated: {}",
            command.sql
        );
        assert!(!command.sql.contains("updated_at"), "{kind}: {}", command.sql);
    }
}

#[test]
fn accumulating_counter_has_six_parameters_and_one_assignment() {
    let spec = UpdateSpec::new().set("count", target("count") + source("count"));
    for (kind, command) in compile_all(&batch(1..3), &["id"], &spec.into()) {
        assert_eq!(command.parameters.len(), 6, "{kind}");
        assert_eq!(
            command.parameters,
            vec![
                SqlValue::Int(1),
                SqlValue::Text(String::from("n1")),
                SqlValue::Int(10),
                SqlValue::Int(2),
                SqlValue::Text(String::from("n2")),
                SqlValue::Int(20),
            ]
        );
        let name = kind.quote_identifier("name");
        assert!(
            !command.sql.contains(&format!("{name} = ")),
            "{kind}: only assigned columns are updated: {}",
            command.sql
        );
    }
}

#[test]
fn every_column_in_sql_comes_from_the_schema() {
    let spec = UpdateSpec::new()
        .set("count", target("count") - value(1_i64))
        .set("name", source("name"));
    let schema = counter_schema();
    for (kind, command) in compile_all(&batch(1..2), &["id"], &spec.into()) {
        let (open, close) = kind.identifier_quotes();
        let mut rest = command.sql.as_str();
        while let Some(start) = rest.find(open) {
            let after = &rest[start + open.len_utf8()..];
            let end = after.find(close).expect("unterminated identifier");
            let ident = &after[..end];
            let known = ident == "T"
                || ident == "S"
                || ident == "counters"
                || schema.columns().any(|c| c.column() == ident);
            assert!(known, "{kind}: fabricated identifier `{ident}` in {}", command.sql);
            rest = &after[end + close.len_utf8()..];
        }
    }
}

#[test]
fn unknown_update_column_is_rejected_by_every_dialect() {
    let spec = UpdateSpec::new().set_value("colour", "red");
    let on_conflict = OnConflict::from(spec);
    for kind in DialectKind::ALL {
        let err = compile(&kind, &counter_schema(), &batch(1..2), &["id"], &on_conflict).unwrap_err();
        assert!(
            matches!(err, UpsertError::UnknownColumn { ref property, .. } if property == "colour"),
            "{kind}: {err}"
        );
    }
}

#[test]
fn unsupported_operators_are_rejected() {
    let cases = [
        target("count") % value(2_i64),
        target("count").equals(source("count")),
        target("count").less_than(value(0_i64)).or(value(true)),
        target("name").concat(source("name")),
        call("MAX", vec![target("count"), source("count")]),
    ];
    for expr in cases {
        let described = expr.describe();
        let spec = UpdateSpec::new().set("count", expr);
        let err = compile(
            &DialectKind::Postgres,
            &counter_schema(),
            &batch(1..2),
            &["id"],
            &spec.into(),
        )
        .unwrap_err();
        assert!(
            matches!(err, UpsertError::UnsupportedOperation(ref op) if *op == described),
            "{described}: {err}"
        );
    }
}

#[test]
fn unknown_match_column_is_rejected() {
    let err = compile(
        &DialectKind::Sqlite,
        &counter_schema(),
        &batch(1..2),
        &["uuid"],
        &OnConflict::UpdateAll,
    )
    .unwrap_err();
    assert!(matches!(err, UpsertError::UnknownColumn { .. }));
}

#[test]
fn disjoint_batches_compile_independently() {
    let spec = OnConflict::from(UpdateSpec::new().set("count", target("count") + value(1_i64)));
    let first = compile(&DialectKind::Postgres, &counter_schema(), &batch(1..3), &["id"], &spec).unwrap();
    let second = compile(&DialectKind::Postgres, &counter_schema(), &batch(10..12), &["id"], &spec).unwrap();

    assert_eq!(first.sql, second.sql);
    assert_eq!(first.parameters.len(), second.parameters.len());
    assert_eq!(first.parameters[0], SqlValue::Int(1));
    assert_eq!(second.parameters[0], SqlValue::Int(10));
    assert!(first.sql.contains("$7") && !first.sql.contains("$8"));
}

#[test]
fn do_nothing_per_dialect() {
    for (kind, command) in compile_all(&batch(1..2), &["id"], &OnConflict::DoNothing) {
        match kind {
            DialectKind::Postgres | DialectKind::Sqlite => {
                assert!(command.sql.ends_with("DO NOTHING"), "{}", command.sql);
            }
            DialectKind::MySql => {
                assert!(command.sql.ends_with("ON DUPLICATE KEY UPDATE `id` = `id`"));
            }
            DialectKind::SqlServer => assert!(!command.sql.contains("WHEN MATCHED")),
        }
        assert_eq!(command.parameters.len(), 3);
    }
}

proptest! {
    #[test]
    fn parameter_count_is_rows_times_columns_plus_constants(
        rows in 1_i64..12,
        constants in prop::collection::vec(0_usize..3, 0..3),
    ) {
        // One assignment per requested column, with 0, 1 or 2 constant operands.
        let columns = ["name", "count"];
        let mut spec = UpdateSpec::new();
        let mut constant_total = 0;
        for (column, n) in columns.iter().zip(&constants) {
            let expr = match n {
                0 => target(column) + source(column),
                1 => target(column) + value(1_i64),
                _ => value(2_i64) * value(3_i64),
            };
            constant_total += n;
            spec = spec.set(column, expr);
        }
        let on_conflict = if spec.is_empty() { OnConflict::UpdateAll } else { spec.into() };

        let entities = batch(0..rows);
        let expected = entities.len() * 3 + constant_total;
        for kind in DialectKind::ALL {
            let command = compile(&kind, &counter_schema(), &entities, &["id"], &on_conflict).unwrap();
            prop_assert_eq!(command.parameters.len(), expected);

            match numbered_prefix(kind) {
                Some((prefix, base)) => {
                    let counts = placeholder_counts(&command.sql, prefix, base, expected);
                    prop_assert!(counts.iter().all(|&c| c == 1), "{}: {:?}", kind, counts);
                }
                None => prop_assert_eq!(command.sql.matches('?').count(), expected),
            }
        }
    }
}
