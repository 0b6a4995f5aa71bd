// handlers/public/mod.rs - no session required
//
// Token acquisition, service info, and the public blog.

pub mod auth;
pub mod posts;
pub mod system;
