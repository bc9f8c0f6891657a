//! Error handling for the cache engine
//!
//! Only construction and configuration loading can fail. Cache operations
//! themselves never return errors: an absent key is `None`, and listener
//! failures are swallowed by the listener set.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
