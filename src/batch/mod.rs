//! Batch Module
//!
//! Concurrent dispatch of recognition work over a bounded worker set.

mod dispatcher;
mod worker;

pub use dispatcher::*;
pub use worker::*;
