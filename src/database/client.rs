use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::engine::QueryEngine;
use crate::database::error::DatabaseError;
use crate::database::params::QueryParams;
use crate::observer::{MiddlewareBox, MiddlewarePipeline};
use crate::types::Operation;

/// Entry point for every store operation: runs the middleware chain, then the engine
pub struct StoreClient {
    engine: Arc<dyn QueryEngine>,
    pipeline: MiddlewarePipeline,
}

impl StoreClient {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            pipeline: MiddlewarePipeline::new(),
        }
    }

    /// Append a middleware; the first one registered wraps all the others
    pub fn use_middleware(&mut self, middleware: MiddlewareBox) -> &mut Self {
        self.pipeline.register(middleware);
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    pub async fn execute(&self, params: QueryParams) -> Result<Value, DatabaseError> {
        self.pipeline.execute(self.engine.as_ref(), params).await
    }

    pub async fn create(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::Create, args)).await
    }

    pub async fn find_first(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::FindFirst, args)).await
    }

    pub async fn find_unique(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::FindUnique, args)).await
    }

    pub async fn find_many(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::FindMany, args)).await
    }

    pub async fn update(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::Update, args)).await
    }

    pub async fn delete(&self, model: &str, args: Value) -> Result<Value, DatabaseError> {
        self.execute(QueryParams::new(model, Operation::Delete, args)).await
    }

    /// Returns the number of deleted rows
    pub async fn delete_many(&self, model: &str, args: Value) -> Result<u64, DatabaseError> {
        let result = self
            .execute(QueryParams::new(model, Operation::DeleteMany, args))
            .await?;
        result
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| DatabaseError::InvalidArgs(format!("{}.deleteMany returned no count", model)))
    }

    /// Bypasses the middleware chain
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.engine.ping().await
    }
}

/// Decode a single row returned by the store
pub fn from_row<T: DeserializeOwned>(row: Value) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(row)?)
}

/// Decode a row that may be `null`
pub fn optional_from_row<T: DeserializeOwned>(row: Value) -> Result<Option<T>, DatabaseError> {
    match row {
        Value::Null => Ok(None),
        row => from_row(row).map(Some),
    }
}

pub fn from_rows<T: DeserializeOwned>(rows: Value) -> Result<Vec<T>, DatabaseError> {
    Ok(serde_json::from_value(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryEngine;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Listing {
        slug: String,
        title: String,
    }

    #[tokio::test]
    async fn helpers_round_trip_through_the_engine() {
        let client = StoreClient::new(Arc::new(MemoryEngine::new()));
        assert_eq!(client.engine_name(), "memory");
        assert!(client.middleware_names().is_empty());

        client
            .create("Post", json!({ "data": { "slug": "b", "title": "B", "markdown": "b" } }))
            .await
            .unwrap();
        client
            .create("Post", json!({ "data": { "slug": "a", "title": "A", "markdown": "a" } }))
            .await
            .unwrap();

        let rows = client
            .find_many(
                "Post",
                json!({ "select": { "slug": true, "title": true }, "orderBy": { "slug": "asc" } }),
            )
            .await
            .unwrap();
        let listings: Vec<Listing> = from_rows(rows).unwrap();
        assert_eq!(listings[0], Listing { slug: "a".into(), title: "A".into() });
        assert_eq!(listings.len(), 2);

        let missing = client
            .find_unique("Post", json!({ "where": { "slug": "zzz" } }))
            .await
            .unwrap();
        assert_eq!(optional_from_row::<Listing>(missing).unwrap(), None);

        assert_eq!(client.delete_many("Post", json!({})).await.unwrap(), 2);
        client.ping().await.unwrap();
    }
}
