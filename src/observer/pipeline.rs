use futures::future::BoxFuture;
use serde_json::Value;

use crate::database::{DatabaseError, QueryEngine, QueryParams};
use crate::observer::traits::MiddlewareBox;

/// The remainder of the chain from one middleware's point of view
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middleware: &'a [MiddlewareBox],
    engine: &'a dyn QueryEngine,
}

impl<'a> Next<'a> {
    /// Hand `params` to the next middleware, or to the engine once the chain is exhausted
    pub fn run(self, params: QueryParams) -> BoxFuture<'a, Result<Value, DatabaseError>> {
        match self.middleware.split_first() {
            Some((current, rest)) => current.handle(
                params,
                Next {
                    middleware: rest,
                    engine: self.engine,
                },
            ),
            None => self.engine.execute(params),
        }
    }
}

/// Ordered middleware list folded around a query engine.
/// The first registered middleware is the outermost.
#[derive(Default)]
pub struct MiddlewarePipeline {
    middleware: Vec<MiddlewareBox>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, middleware: MiddlewareBox) {
        tracing::debug!(
            "Registered store middleware '{}' at position {}",
            middleware.name(),
            self.middleware.len()
        );
        self.middleware.push(middleware);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    pub async fn execute(
        &self,
        engine: &dyn QueryEngine,
        params: QueryParams,
    ) -> Result<Value, DatabaseError> {
        Next {
            middleware: &self.middleware,
            engine,
        }
        .run(params)
        .await
    }
}
