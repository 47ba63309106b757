#![allow(dead_code)]

use oxide_upsert_core::prelude::*;

#[derive(Debug, Clone)]
pub struct Counter {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

impl Counter {
    pub fn new(id: i64, name: &str, count: i64) -> Self {
        Self {
            id,
            name: String::from(name),
            count,
        }
    }
}

/// `counters(id, name, count)` plus a generated `updated_at`.
pub fn counter_schema() -> EntitySchema<Counter> {
    EntitySchema::new("counters")
        .column("id", |c: &Counter| c.id.to_sql_value())
        .column("name", |c: &Counter| c.name.clone().to_sql_value())
        .column("count", |c: &Counter| c.count.to_sql_value())
        .generated("updated_at")
}

pub fn batch(ids: std::ops::Range<i64>) -> Vec<Counter> {
    ids.map(|id| Counter::new(id, &format!("n{id}"), id * 10))
        .collect()
}

/// Counts occurrences of each numbered placeholder `prefix{n}` in `sql`.
///
/// `base` is the number printed for index 0 (1 for `$1`/`?1`, 0 for `@p0`).
pub fn placeholder_counts(sql: &str, prefix: &str, base: usize, parameters: usize) -> Vec<usize> {
    let mut counts = vec![0; parameters];
    for (pos, _) in sql.match_indices(prefix) {
        let digits: String = sql[pos + prefix.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if let Ok(n) = digits.parse::<usize>() {
            let index = n - base;
            assert!(index < parameters, "placeholder {prefix}{n} out of range in {sql}");
            counts[index] += 1;
        }
    }
    counts
}

pub fn numbered_prefix(kind: DialectKind) -> Option<(&'static str, usize)> {
    match kind {
        DialectKind::Postgres => Some(("$", 1)),
        DialectKind::Sqlite => Some(("?", 1)),
        DialectKind::SqlServer => Some(("@p", 0)),
        DialectKind::MySql => None,
    }
}
