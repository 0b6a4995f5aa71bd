use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::{DatabaseError, QueryParams};
use crate::observer::pipeline::Next;

/// One link in the store client's middleware chain.
///
/// A middleware receives the operation descriptor and the rest of the chain.
/// It may inspect the descriptor, must call `next.run(params)` to reach the
/// engine, and returns whatever the chain produced.
#[async_trait]
pub trait StoreMiddleware: Send + Sync {
    /// Middleware name for logging and debugging
    fn name(&self) -> &'static str;

    async fn handle(&self, params: QueryParams, next: Next<'_>) -> Result<Value, DatabaseError>;
}

pub type MiddlewareBox = Arc<dyn StoreMiddleware>;
