//! Request handlers.

pub mod artifacts;
pub mod export;
pub mod health;
pub mod remote;

pub use artifacts::*;
pub use export::*;
pub use health::*;
pub use remote::*;
