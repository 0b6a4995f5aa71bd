pub mod client;
pub mod engine;
pub mod error;
pub mod manager;
pub mod memory;
pub mod models;
pub mod params;
pub mod postgres;
pub mod query_builder;
pub mod schema;

pub use client::StoreClient;
pub use engine::QueryEngine;
pub use error::DatabaseError;
pub use manager::DatabaseManager;
pub use memory::MemoryEngine;
pub use params::{QueryArgs, QueryParams, SortDirection};
pub use postgres::PgEngine;
