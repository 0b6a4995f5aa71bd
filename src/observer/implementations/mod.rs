pub mod creation_notifier;
pub mod query_logger;

pub use creation_notifier::{CreationNotifier, WatchRule};
pub use query_logger::QueryLogger;
