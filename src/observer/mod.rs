// Store middleware chain: every operation issued through the store client
// passes through these in registration order before reaching the engine.

pub mod traits;
pub mod pipeline;
pub mod implementations;

pub use traits::*;
pub use pipeline::*;
pub use implementations::*;
