use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::engine::QueryEngine;
use crate::database::error::DatabaseError;
use crate::database::params::{QueryArgs, QueryParams, SortDirection};
use crate::database::schema::{self, ModelSchema};
use crate::types::Operation;

type Row = Map<String, Value>;

/// In-process engine with the same semantics as the Postgres engine.
/// Backs `STORE_BACKEND=memory` and the test suites.
#[derive(Default)]
pub struct MemoryEngine {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, params: QueryParams) -> Result<Value, DatabaseError> {
        let model = schema::model(&params.model)?;
        let args = QueryArgs::parse(&params.args)?;
        model.check_select(args.select.as_ref())?;

        match params.action {
            Operation::Create => {
                model.check_create(&args.data)?;
                let mut tables = self.tables.write().await;
                let row = insert(&mut tables, model, args.data)?;
                Ok(model.project(row, args.select.as_ref()))
            }
            Operation::FindFirst | Operation::FindUnique | Operation::FindMany => {
                if params.action == Operation::FindUnique {
                    model.check_unique_where(&args.where_clause)?;
                } else {
                    model.check_where(&args.where_clause)?;
                }
                let order = model.order(args.order_by.as_ref())?;

                let tables = self.tables.read().await;
                let mut rows: Vec<Row> = tables
                    .get(model.name)
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| matches_where(row, &args.where_clause))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();

                if let Some((field, direction)) = order {
                    rows.sort_by(|a, b| compare_field(a, b, field, direction));
                }

                if params.action == Operation::FindMany {
                    Ok(Value::Array(
                        rows.into_iter()
                            .map(|row| model.project(row, args.select.as_ref()))
                            .collect(),
                    ))
                } else {
                    Ok(rows
                        .into_iter()
                        .next()
                        .map(|row| model.project(row, args.select.as_ref()))
                        .unwrap_or(Value::Null))
                }
            }
            Operation::Update => {
                model.check_unique_where(&args.where_clause)?;
                model.check_update(&args.data)?;
                let mut tables = self.tables.write().await;
                let row = update(&mut tables, model, &args.where_clause, args.data)?;
                Ok(model.project(row, args.select.as_ref()))
            }
            Operation::Delete => {
                model.check_unique_where(&args.where_clause)?;
                let mut tables = self.tables.write().await;
                let mut removed = remove_matching(&mut tables, model, &args.where_clause);
                match removed.pop() {
                    Some(row) => Ok(model.project(row, args.select.as_ref())),
                    None => Err(DatabaseError::NotFound(format!(
                        "{} record to delete does not exist",
                        model.name
                    ))),
                }
            }
            Operation::DeleteMany => {
                model.check_where(&args.where_clause)?;
                let mut tables = self.tables.write().await;
                let removed = remove_matching(&mut tables, model, &args.where_clause);
                Ok(json!({ "count": removed.len() }))
            }
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn matches_where(row: &Row, where_clause: &Row) -> bool {
    where_clause
        .iter()
        .all(|(field, expected)| row.get(field) == Some(expected))
}

fn compare_field(a: &Row, b: &Row, field: &str, direction: SortDirection) -> Ordering {
    let left = a.get(field).and_then(Value::as_str).unwrap_or_default();
    let right = b.get(field).and_then(Value::as_str).unwrap_or_default();
    match direction {
        SortDirection::Asc => left.cmp(right),
        SortDirection::Desc => right.cmp(left),
    }
}

fn check_unique(
    rows: &[Row],
    model: &ModelSchema,
    candidate: &Row,
    skip: Option<usize>,
) -> Result<(), DatabaseError> {
    for field in model.unique {
        let Some(value) = candidate.get(*field) else {
            continue;
        };
        let taken = rows
            .iter()
            .enumerate()
            .any(|(i, row)| Some(i) != skip && row.get(*field) == Some(value));
        if taken {
            return Err(DatabaseError::unique_violation(model.name, field));
        }
    }
    Ok(())
}

fn check_relations(
    tables: &HashMap<&'static str, Vec<Row>>,
    model: &ModelSchema,
    candidate: &Row,
) -> Result<(), DatabaseError> {
    for relation in model.relations {
        let Some(value) = candidate.get(relation.field) else {
            continue;
        };
        let exists = tables
            .get(relation.model)
            .map(|rows| rows.iter().any(|row| row.get(relation.references) == Some(value)))
            .unwrap_or(false);
        if !exists {
            return Err(DatabaseError::foreign_key_violation(model.name, relation.field));
        }
    }
    Ok(())
}

fn insert(
    tables: &mut HashMap<&'static str, Vec<Row>>,
    model: &'static ModelSchema,
    data: Row,
) -> Result<Row, DatabaseError> {
    let mut row = data;
    if model.generated_id {
        row.insert(
            model.primary_key.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }
    let timestamp = now();
    row.insert("createdAt".to_string(), timestamp.clone());
    row.insert("updatedAt".to_string(), timestamp);

    check_relations(tables, model, &row)?;
    let rows = tables.entry(model.name).or_default();
    check_unique(rows, model, &row, None)?;

    rows.push(row.clone());
    Ok(row)
}

fn update(
    tables: &mut HashMap<&'static str, Vec<Row>>,
    model: &'static ModelSchema,
    where_clause: &Row,
    data: Row,
) -> Result<Row, DatabaseError> {
    let position = tables
        .get(model.name)
        .and_then(|rows| rows.iter().position(|row| matches_where(row, where_clause)))
        .ok_or_else(|| {
            DatabaseError::NotFound(format!("{} record to update does not exist", model.name))
        })?;

    let mut candidate = tables[model.name][position].clone();
    candidate.extend(data);
    candidate.insert("updatedAt".to_string(), now());

    check_relations(tables, model, &candidate)?;
    let rows = tables.entry(model.name).or_default();
    check_unique(rows, model, &candidate, Some(position))?;

    rows[position] = candidate.clone();
    Ok(candidate)
}

/// Remove matching rows and cascade to dependent models
fn remove_matching(
    tables: &mut HashMap<&'static str, Vec<Row>>,
    model: &'static ModelSchema,
    where_clause: &Row,
) -> Vec<Row> {
    let Some(rows) = tables.get_mut(model.name) else {
        return Vec::new();
    };
    let (removed, kept): (Vec<Row>, Vec<Row>) = rows
        .drain(..)
        .partition(|row| matches_where(row, where_clause));
    *rows = kept;

    for (dependent, relation) in schema::dependents_of(model.name) {
        for row in &removed {
            if let Some(key) = row.get(relation.references) {
                let mut cascade = Row::new();
                cascade.insert(relation.field.to_string(), key.clone());
                remove_matching(tables, dependent, &cascade);
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(engine: &MemoryEngine, model: &str, action: Operation, args: Value) -> Result<Value, DatabaseError> {
        engine.execute(QueryParams::new(model, action, args)).await
    }

    async fn seed_user(engine: &MemoryEngine, email: &str) -> String {
        let user = run(
            engine,
            "User",
            Operation::Create,
            json!({ "data": { "email": email, "passwordHash": "x" } }),
        )
        .await
        .unwrap();
        user["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let engine = MemoryEngine::new();
        let user_id = seed_user(&engine, "a@example.com").await;

        let note = run(
            &engine,
            "Note",
            Operation::Create,
            json!({ "data": { "title": "T", "body": "B", "userId": user_id } }),
        )
        .await
        .unwrap();

        assert!(note["id"].as_str().is_some());
        assert!(note["createdAt"].as_str().is_some());
        assert_eq!(note["createdAt"], note["updatedAt"]);
    }

    #[tokio::test]
    async fn enforces_unique_and_foreign_keys() {
        let engine = MemoryEngine::new();
        seed_user(&engine, "a@example.com").await;

        let dup = run(
            &engine,
            "User",
            Operation::Create,
            json!({ "data": { "email": "a@example.com", "passwordHash": "y" } }),
        )
        .await;
        assert!(matches!(dup, Err(DatabaseError::UniqueViolation { ref field, .. }) if field == "email"));

        let orphan = run(
            &engine,
            "Note",
            Operation::Create,
            json!({ "data": { "title": "T", "body": "B", "userId": "nobody" } }),
        )
        .await;
        assert!(matches!(orphan, Err(DatabaseError::ForeignKeyViolation { .. })));
    }

    #[tokio::test]
    async fn find_many_filters_orders_and_projects() {
        let engine = MemoryEngine::new();
        for slug in ["b-post", "a-post", "c-post"] {
            run(
                &engine,
                "Post",
                Operation::Create,
                json!({ "data": { "slug": slug, "title": slug, "markdown": "# hi" } }),
            )
            .await
            .unwrap();
        }

        let rows = run(
            &engine,
            "Post",
            Operation::FindMany,
            json!({ "select": { "slug": true }, "orderBy": { "slug": "asc" } }),
        )
        .await
        .unwrap();

        assert_eq!(
            rows,
            json!([{ "slug": "a-post" }, { "slug": "b-post" }, { "slug": "c-post" }])
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let engine = MemoryEngine::new();

        let update = run(
            &engine,
            "Post",
            Operation::Update,
            json!({ "where": { "slug": "missing" }, "data": { "title": "x" } }),
        )
        .await;
        assert!(matches!(update, Err(DatabaseError::NotFound(_))));

        let delete = run(&engine, "Post", Operation::Delete, json!({ "where": { "slug": "missing" } })).await;
        assert!(matches!(delete, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_can_rename_primary_key() {
        let engine = MemoryEngine::new();
        run(
            &engine,
            "Post",
            Operation::Create,
            json!({ "data": { "slug": "old", "title": "Old", "markdown": "m" } }),
        )
        .await
        .unwrap();

        let updated = run(
            &engine,
            "Post",
            Operation::Update,
            json!({ "where": { "slug": "old" }, "data": { "slug": "new", "title": "New" } }),
        )
        .await
        .unwrap();
        assert_eq!(updated["slug"], "new");

        let old = run(&engine, "Post", Operation::FindFirst, json!({ "where": { "slug": "old" } }))
            .await
            .unwrap();
        assert!(old.is_null());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_notes() {
        let engine = MemoryEngine::new();
        let user_id = seed_user(&engine, "a@example.com").await;
        run(
            &engine,
            "Note",
            Operation::Create,
            json!({ "data": { "title": "T", "body": "B", "userId": user_id } }),
        )
        .await
        .unwrap();

        run(&engine, "User", Operation::Delete, json!({ "where": { "id": user_id } }))
            .await
            .unwrap();

        let notes = run(&engine, "Note", Operation::FindMany, Value::Null).await.unwrap();
        assert_eq!(notes, json!([]));
    }

    #[tokio::test]
    async fn delete_many_returns_count() {
        let engine = MemoryEngine::new();
        let user_id = seed_user(&engine, "a@example.com").await;
        for title in ["one", "two"] {
            run(
                &engine,
                "Note",
                Operation::Create,
                json!({ "data": { "title": title, "body": "B", "userId": user_id } }),
            )
            .await
            .unwrap();
        }

        let result = run(&engine, "Note", Operation::DeleteMany, json!({ "where": { "userId": user_id } }))
            .await
            .unwrap();
        assert_eq!(result, json!({ "count": 2 }));
    }
}
