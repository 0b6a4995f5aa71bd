// handlers/elevated/mod.rs - admin only
//
// Every handler takes `AdminUser`, so the gate runs before the body is read.

pub mod posts;
