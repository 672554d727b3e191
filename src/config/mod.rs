//! Configuration Module
//!
//! Application settings and persistence.

mod settings;
mod store;

pub use settings::*;
pub use store::*;
