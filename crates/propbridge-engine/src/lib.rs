//! Randomized property checking for propbridge.
//!
//! A [`Property`] pairs a proptest strategy with a test closure. Checking
//! it against [`EngineArgs`] drives proptest's `TestRunner` (generation,
//! rejection and shrinking) and condenses the run into one of the four
//! [`EngineResult`] variants.

pub mod args;
pub mod property;
pub mod result;

pub use args::{EngineArgs, Seed};
pub use property::{Modifiers, Property};
pub use result::EngineResult;

/// Re-exported so property authors need a single dependency.
pub use proptest;
