// handlers/protected/mod.rs - signed-in user required
//
// Routes here sit behind `jwt_auth_middleware`; handlers take `CurrentUser`
// to load the session user from the store.

pub mod auth;
pub mod notes;
