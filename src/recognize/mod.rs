//! Recognition Module
//!
//! Speech-to-text over the remote recognition API.

mod provider;
mod remote;
mod types;

pub use provider::*;
pub use remote::*;
pub use types::*;
