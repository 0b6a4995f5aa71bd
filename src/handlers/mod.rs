// handlers/mod.rs - three handler tiers by gate
//
// Public (no session) → Protected (signed-in user) → Elevated (ADMIN_EMAIL only)

pub mod public;
pub mod protected;
pub mod elevated;
