pub mod auth;
pub mod note;
pub mod post;
pub mod server;
