use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::database::{DatabaseError, QueryParams};
use crate::observer::pipeline::Next;
use crate::observer::traits::StoreMiddleware;

/// Times every store operation
pub struct QueryLogger {
    slow_query_threshold: Duration,
}

impl QueryLogger {
    pub fn new(slow_query_threshold: Duration) -> Self {
        Self { slow_query_threshold }
    }
}

#[async_trait]
impl StoreMiddleware for QueryLogger {
    fn name(&self) -> &'static str {
        "query_logger"
    }

    async fn handle(&self, params: QueryParams, next: Next<'_>) -> Result<Value, DatabaseError> {
        let key = params.key();
        let start = Instant::now();
        let result = next.run(params).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => debug!("Query {} took {}ms", key, elapsed.as_millis()),
            Err(e) => debug!("Query {} failed after {}ms: {}", key, elapsed.as_millis(), e),
        }
        if elapsed > self.slow_query_threshold {
            warn!(
                "Slow query {}: {}ms (threshold {}ms)",
                key,
                elapsed.as_millis(),
                self.slow_query_threshold.as_millis()
            );
        }

        result
    }
}
