use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::{DatabaseError, QueryParams};
use crate::events::{CreationEvent, EventChannel, NOTE_CREATED};
use crate::observer::pipeline::Next;
use crate::observer::traits::StoreMiddleware;

/// `Model.action` key paired with the event it publishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub key: String,
    pub event_name: String,
}

impl WatchRule {
    pub fn new(key: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            event_name: event_name.into(),
        }
    }
}

/// Publishes a `CreationEvent` once a watched operation has succeeded.
/// Results and errors pass through untouched.
pub struct CreationNotifier {
    channel: Arc<EventChannel>,
    watch_list: Vec<WatchRule>,
}

impl CreationNotifier {
    /// Watches `Note.create` only
    pub fn new(channel: Arc<EventChannel>) -> Self {
        Self::with_watch_list(channel, vec![WatchRule::new("Note.create", NOTE_CREATED)])
    }

    pub fn with_watch_list(channel: Arc<EventChannel>, watch_list: Vec<WatchRule>) -> Self {
        Self { channel, watch_list }
    }

    pub fn watch_list(&self) -> &[WatchRule] {
        &self.watch_list
    }

    fn rule_for(&self, key: &str) -> Option<&WatchRule> {
        self.watch_list.iter().find(|rule| rule.key == key)
    }
}

#[async_trait]
impl StoreMiddleware for CreationNotifier {
    fn name(&self) -> &'static str {
        "creation_notifier"
    }

    async fn handle(&self, params: QueryParams, next: Next<'_>) -> Result<Value, DatabaseError> {
        let descriptor = params.clone();
        let result = next.run(params).await?;

        if let Some(rule) = self.rule_for(&descriptor.key()) {
            let report = self
                .channel
                .publish(&rule.event_name, &CreationEvent::from_params(descriptor));
            tracing::debug!(
                "Published '{}': {} delivered, {} failed",
                rule.event_name,
                report.delivered,
                report.failures.len()
            );
        }

        Ok(result)
    }
}
