use async_trait::async_trait;
use serde_json::Value;

use crate::database::error::DatabaseError;
use crate::database::params::QueryParams;

/// Terminal stage of the store client: executes one operation against storage
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Execute an operation, returning a row, `null`, an array of rows, or `{ "count": n }`
    async fn execute(&self, params: QueryParams) -> Result<Value, DatabaseError>;

    /// Connectivity check used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError>;
}
