use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::models::User;
use crate::database::{DatabaseError, DatabaseManager, MemoryEngine, PgEngine, QueryEngine, StoreClient};
use crate::events::{EventChannel, NoteCreatedLogger, NOTE_CREATED};
use crate::observer::{CreationNotifier, QueryLogger};
use crate::services::{NoteService, PostService, UserService};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<StoreClient>,
    pub events: Arc<EventChannel>,
}

impl AppState {
    /// Connect the configured backend and wire the store middleware
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        let engine: Arc<dyn QueryEngine> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryEngine::new())
            }
            StoreBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                if config.database.run_migrations {
                    DatabaseManager::migrate(&pool).await?;
                }
                Arc::new(PgEngine::new(pool))
            }
        };

        Ok(Self::with_engine(config, engine))
    }

    pub fn with_engine(config: AppConfig, engine: Arc<dyn QueryEngine>) -> Self {
        Self::with_channel(config, engine, Self::default_channel())
    }

    /// Channel with the startup subscribers registered
    pub fn default_channel() -> EventChannel {
        let mut channel = EventChannel::new();
        channel.subscribe(NOTE_CREATED, Arc::new(NoteCreatedLogger));
        channel
    }

    /// Registration on `channel` ends here; it is shared read-only afterwards
    pub fn with_channel(config: AppConfig, engine: Arc<dyn QueryEngine>, channel: EventChannel) -> Self {
        let events = Arc::new(channel);
        let mut store = StoreClient::new(engine);

        if config.database.enable_query_logging {
            store.use_middleware(Arc::new(QueryLogger::new(Duration::from_millis(
                config.database.slow_query_threshold_ms,
            ))));
        }
        store.use_middleware(Arc::new(CreationNotifier::new(events.clone())));

        info!(
            "Store client ready: engine={} middleware={:?}",
            store.engine_name(),
            store.middleware_names()
        );

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            events,
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone())
    }

    pub fn notes(&self) -> NoteService {
        NoteService::new(self.store.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone())
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.email == self.config.security.admin_email
    }
}
