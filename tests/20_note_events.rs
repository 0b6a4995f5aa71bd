// Creation notifications observed through the full store client stack

use std::sync::{Arc, Mutex};

use anyhow::Result;
use quill_api::database::DatabaseError;
use quill_api::events::{CreationEvent, EventChannel, HandlerError, NOTE_CREATED};
use quill_api::testing::test_state_with_channel;
use serde_json::json;

type Seen = Arc<Mutex<Vec<CreationEvent>>>;

fn counting_channel() -> (EventChannel, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut channel = EventChannel::new();
    channel.subscribe(
        NOTE_CREATED,
        Arc::new(move |event: &CreationEvent| -> Result<(), HandlerError> {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        }),
    );
    (channel, seen)
}

#[tokio::test]
async fn successful_note_create_publishes_once() -> Result<()> {
    let (channel, seen) = counting_channel();
    let state = test_state_with_channel(channel);

    let user = state.users().create_user("writer@quill.test", "correct horse").await?;
    let note = state.notes().create_note("T", "first", &user.id).await?;
    assert_eq!(note.title, "T");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].entity_name, "Note");
    assert_eq!(seen[0].operation_name, "create");
    assert_eq!(seen[0].payload.model, "Note");
    assert_eq!(seen[0].payload.args["data"]["title"], "T");
    Ok(())
}

#[tokio::test]
async fn failed_note_create_publishes_nothing() -> Result<()> {
    let (channel, seen) = counting_channel();
    let state = test_state_with_channel(channel);

    let user = state.users().create_user("writer@quill.test", "correct horse").await?;
    let err = state
        .store
        .create("Note", json!({ "data": { "body": "no title", "userId": user.id } }))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::MissingField { ref model, ref field } if model == "Note" && field == "title"
    ));
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn dangling_owner_is_reported_and_not_published() -> Result<()> {
    let (channel, seen) = counting_channel();
    let state = test_state_with_channel(channel);

    let err = state
        .notes()
        .create_note("T", "orphan", "missing-user")
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::ForeignKeyViolation { .. }));
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn updates_and_other_models_publish_nothing() -> Result<()> {
    let (channel, seen) = counting_channel();
    let state = test_state_with_channel(channel);

    let user = state.users().create_user("writer@quill.test", "correct horse").await?;
    let note = state.notes().create_note("T", "first", &user.id).await?;
    seen.lock().unwrap().clear();

    state
        .store
        .update(
            "Note",
            json!({ "where": { "id": note.id }, "data": { "title": "T2" } }),
        )
        .await?;
    state.users().create_user("second@quill.test", "correct horse").await?;

    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn failing_subscriber_does_not_fail_the_create() -> Result<()> {
    let (mut channel, seen) = counting_channel();
    channel.subscribe(
        NOTE_CREATED,
        Arc::new(|_: &CreationEvent| -> Result<(), HandlerError> { Err(HandlerError::failed("disk full")) }),
    );
    let sink = seen.clone();
    channel.subscribe(
        NOTE_CREATED,
        Arc::new(move |event: &CreationEvent| -> Result<(), HandlerError> {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        }),
    );
    let state = test_state_with_channel(channel);

    let user = state.users().create_user("writer@quill.test", "correct horse").await?;
    state.notes().create_note("T", "still saved", &user.id).await?;

    // Handlers on both sides of the failing one ran
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(state.notes().get_note_list_items(&user.id).await?.len(), 1);
    Ok(())
}
