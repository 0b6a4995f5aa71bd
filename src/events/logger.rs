use tracing::info;

use crate::events::{CreationEvent, HandlerError, Subscriber};

/// Startup observer for `note.created`: logs the creation and nothing else
pub struct NoteCreatedLogger;

impl Subscriber<CreationEvent> for NoteCreatedLogger {
    fn name(&self) -> &'static str {
        "note_created_logger"
    }

    fn handle(&self, event: &CreationEvent) -> Result<(), HandlerError> {
        info!(
            "a new note was created: model={} action={} args={}",
            event.payload.model, event.payload.action, event.payload.args
        );
        Ok(())
    }
}
