//! Foreign Function Interface
//!
//! Runtime binding of the native Swiss Ephemeris library.

mod library;
mod swisseph;

pub use library::{Library, LoadError, SymbolError};
pub use swisseph::{SwissEph, DEFAULT_LIBRARY};
