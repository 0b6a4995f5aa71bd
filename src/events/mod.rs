// In-process notification channel keyed by event name.
// Handlers are registered during startup through `&mut self`; afterwards the
// channel is shared as `Arc<EventChannel>` and dispatch takes no lock.

pub mod event;
pub mod logger;

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

pub use event::{CreationEvent, NOTE_CREATED};
pub use logger::NoteCreatedLogger;

/// Failure reported by a single handler
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

/// Something that reacts to a published payload. Any
/// `Fn(&P) -> Result<(), HandlerError>` closure qualifies.
pub trait Subscriber<P>: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn handle(&self, payload: &P) -> Result<(), HandlerError>;
}

impl<P, F> Subscriber<P> for F
where
    F: Fn(&P) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, payload: &P) -> Result<(), HandlerError> {
        self(payload)
    }
}

pub type SubscriberBox<P> = Arc<dyn Subscriber<P>>;

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub handler: String,
    /// Position of the handler in registration order
    pub index: usize,
    pub error: HandlerError,
}

/// Outcome of one `publish` call. Failures never abort dispatch and are
/// never returned as an error to the publisher.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EventChannel<P = CreationEvent> {
    handlers: HashMap<String, Vec<SubscriberBox<P>>>,
}

impl<P> Default for EventChannel<P> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<P> EventChannel<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `event_name`. Registering the same handler twice
    /// makes it fire twice.
    pub fn subscribe(&mut self, event_name: impl Into<String>, handler: SubscriberBox<P>) {
        let event_name = event_name.into();
        debug!("Subscribed '{}' to event '{}'", handler.name(), event_name);
        self.handlers.entry(event_name).or_default().push(handler);
    }

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.handlers.get(event_name).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for `event_name`, in registration order
    pub fn publish(&self, event_name: &str, payload: &P) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(handlers) = self.handlers.get(event_name) else {
            debug!("No subscribers for event '{}'", event_name);
            return report;
        };

        for (index, handler) in handlers.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(payload)))
                .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic.as_ref()))));

            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(
                        "Handler '{}' failed for event '{}': {}",
                        handler.name(),
                        event_name,
                        error
                    );
                    report.failures.push(HandlerFailure {
                        handler: handler.name().to_string(),
                        index,
                        error,
                    });
                }
            }
        }

        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, label: &'static str) -> SubscriberBox<String> {
        let log = log.clone();
        Arc::new(move |payload: &String| -> Result<(), HandlerError> {
            log.lock().unwrap().push(format!("{}:{}", label, payload));
            Ok(())
        })
    }

    #[test]
    fn publishes_in_subscription_order() {
        let log: Log = Arc::default();
        let mut channel: EventChannel<String> = EventChannel::new();
        channel.subscribe("note.created", recorder(&log, "first"));
        channel.subscribe("note.created", recorder(&log, "second"));
        channel.subscribe("post.created", recorder(&log, "other"));

        let report = channel.publish("note.created", &"n1".to_string());

        assert_eq!(*log.lock().unwrap(), vec!["first:n1", "second:n1"]);
        assert_eq!(report.delivered, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let channel: EventChannel<String> = EventChannel::new();
        let report = channel.publish("note.created", &"n1".to_string());
        assert_eq!(report.invoked(), 0);
    }

    #[test]
    fn failing_handlers_do_not_stop_dispatch() {
        let log: Log = Arc::default();
        let mut channel: EventChannel<String> = EventChannel::new();
        channel.subscribe(
            "note.created",
            Arc::new(|_: &String| -> Result<(), HandlerError> { Err(HandlerError::failed("disk full")) }),
        );
        channel.subscribe(
            "note.created",
            Arc::new(|_: &String| -> Result<(), HandlerError> { panic!("boom") }),
        );
        channel.subscribe("note.created", recorder(&log, "last"));

        let report = channel.publish("note.created", &"n1".to_string());

        assert_eq!(*log.lock().unwrap(), vec!["last:n1"]);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 0);
        assert_eq!(report.failures[0].error, HandlerError::failed("disk full"));
        assert_eq!(report.failures[1].error, HandlerError::Panicked("boom".to_string()));

        // the channel keeps working after a panic
        let again = channel.publish("note.created", &"n2".to_string());
        assert_eq!(again.invoked(), 3);
    }

    #[test]
    fn duplicate_subscriptions_fire_independently() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handler: SubscriberBox<String> = Arc::new(move |_: &String| -> Result<(), HandlerError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mut channel: EventChannel<String> = EventChannel::new();
        channel.subscribe("note.created", handler.clone());
        channel.subscribe("note.created", handler);
        assert_eq!(channel.subscriber_count("note.created"), 2);

        channel.publish("note.created", &"n1".to_string());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn logger_accepts_creation_events() {
        use crate::database::QueryParams;
        use crate::types::Operation;

        let mut channel: EventChannel = EventChannel::new();
        channel.subscribe(NOTE_CREATED, Arc::new(NoteCreatedLogger));

        let event = CreationEvent::from_params(QueryParams::new(
            "Note",
            Operation::Create,
            serde_json::json!({ "data": { "title": "T" } }),
        ));
        let report = channel.publish(NOTE_CREATED, &event);
        assert_eq!(report.delivered, 1);
        assert!(report.failures.is_empty());
    }
}
