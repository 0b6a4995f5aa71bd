use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sqlx::postgres::PgDatabaseError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::engine::QueryEngine;
use crate::database::error::DatabaseError;
use crate::database::params::{QueryArgs, QueryParams};
use crate::database::query_builder::{QueryBuilder, SqlStatement};
use crate::database::schema::{self, ModelSchema};
use crate::types::Operation;

/// Postgres-backed engine. Rows come back through `row_to_json` so both
/// engines hand the middleware chain the same JSON shapes.
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_optional(
        &self,
        model: &ModelSchema,
        stmt: &SqlStatement,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let mut q = sqlx::query_scalar::<_, Value>(&stmt.query);
        for p in stmt.params.iter() {
            q = q.bind(p.as_str());
        }
        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(model, e))?;
        Ok(row.and_then(into_row))
    }

    async fn fetch_all(
        &self,
        model: &ModelSchema,
        stmt: &SqlStatement,
    ) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let mut q = sqlx::query_scalar::<_, Value>(&stmt.query);
        for p in stmt.params.iter() {
            q = q.bind(p.as_str());
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(model, e))?;
        Ok(rows.into_iter().filter_map(into_row).collect())
    }

    async fn execute_count(&self, model: &ModelSchema, stmt: &SqlStatement) -> Result<u64, DatabaseError> {
        let mut q = sqlx::query(&stmt.query);
        for p in stmt.params.iter() {
            q = q.bind(p.as_str());
        }
        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(model, e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl QueryEngine for PgEngine {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn execute(&self, params: QueryParams) -> Result<Value, DatabaseError> {
        let model = schema::model(&params.model)?;
        let args = QueryArgs::parse(&params.args)?;
        model.check_select(args.select.as_ref())?;
        let select = args.select.as_ref();

        match params.action {
            Operation::Create => {
                model.check_create(&args.data)?;
                let mut data = args.data.clone();
                if model.generated_id {
                    data.insert(
                        model.primary_key.to_string(),
                        Value::String(Uuid::new_v4().to_string()),
                    );
                }
                let stmt = QueryBuilder::new(model).insert(&data)?;
                let row = self.fetch_optional(model, &stmt).await?.ok_or_else(|| {
                    DatabaseError::InvalidArgs(format!("{}.create returned no row", model.name))
                })?;
                Ok(model.project(row, select))
            }
            Operation::FindFirst | Operation::FindUnique => {
                if params.action == Operation::FindUnique {
                    model.check_unique_where(&args.where_clause)?;
                } else {
                    model.check_where(&args.where_clause)?;
                }
                let order = model.order(args.order_by.as_ref())?;
                let stmt = QueryBuilder::new(model).select(&args.where_clause, order, Some(1))?;
                Ok(self
                    .fetch_optional(model, &stmt)
                    .await?
                    .map(|row| model.project(row, select))
                    .unwrap_or(Value::Null))
            }
            Operation::FindMany => {
                model.check_where(&args.where_clause)?;
                let order = model.order(args.order_by.as_ref())?;
                let stmt = QueryBuilder::new(model).select(&args.where_clause, order, None)?;
                let rows = self.fetch_all(model, &stmt).await?;
                Ok(Value::Array(
                    rows.into_iter().map(|row| model.project(row, select)).collect(),
                ))
            }
            Operation::Update => {
                model.check_unique_where(&args.where_clause)?;
                model.check_update(&args.data)?;
                let stmt = QueryBuilder::new(model).update(&args.where_clause, &args.data)?;
                match self.fetch_optional(model, &stmt).await? {
                    Some(row) => Ok(model.project(row, select)),
                    None => Err(DatabaseError::NotFound(format!(
                        "{} record to update does not exist",
                        model.name
                    ))),
                }
            }
            Operation::Delete => {
                model.check_unique_where(&args.where_clause)?;
                let stmt = QueryBuilder::new(model).delete(&args.where_clause)?;
                match self.fetch_optional(model, &stmt).await? {
                    Some(row) => Ok(model.project(row, select)),
                    None => Err(DatabaseError::NotFound(format!(
                        "{} record to delete does not exist",
                        model.name
                    ))),
                }
            }
            Operation::DeleteMany => {
                model.check_where(&args.where_clause)?;
                let stmt = QueryBuilder::new(model).delete_many(&args.where_clause)?;
                let count = self.execute_count(model, &stmt).await?;
                Ok(json!({ "count": count }))
            }
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn into_row(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Translate constraint failures into the same errors the registry checks raise
fn map_sqlx_error(model: &ModelSchema, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        let column = db_err
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| pg.column());
        if let Some(code) = db_err.code() {
            let field = || {
                constraint_field(model, &code, db_err.constraint(), column)
                    .unwrap_or_else(|| db_err.constraint().unwrap_or("unknown"))
            };
            match &*code {
                "23505" => return DatabaseError::unique_violation(model.name, field()),
                "23503" => return DatabaseError::foreign_key_violation(model.name, field()),
                "23502" => return DatabaseError::missing_field(model.name, field()),
                _ => {}
            }
        }
    }
    DatabaseError::Sqlx(err)
}

/// Registry field named by a Postgres error. The column wins when Postgres
/// reports one; otherwise the longest candidate contained in the constraint
/// name (`users_email_key` -> `email`, `notes_userId_fkey` -> `userId`).
fn constraint_field(
    model: &ModelSchema,
    code: &str,
    constraint: Option<&str>,
    column: Option<&str>,
) -> Option<&'static str> {
    if let Some(field) = column.and_then(|c| model.fields.iter().copied().find(|f| *f == c)) {
        return Some(field);
    }

    let constraint = constraint?;
    if constraint == format!("{}_pkey", model.table) {
        return Some(model.primary_key);
    }

    let lowered = constraint.to_ascii_lowercase();
    let candidates: Vec<&'static str> = match code {
        "23505" => model.unique.to_vec(),
        "23503" => model.relations.iter().map(|r| r.field).collect(),
        _ => model.fields.to_vec(),
    };
    candidates
        .into_iter()
        .filter(|f| lowered.contains(&f.to_ascii_lowercase()))
        .max_by_key(|f| f.len())
}
