//! Host-side bridge between a sandboxed WebAssembly guest and the native
//! Swiss Ephemeris library.
//!
//! The guest passes plain integers and doubles; pointers are offsets into
//! its own linear memory. The bridge resolves those offsets, calls the
//! native routine with host-owned scratch buffers and copies results back.

// Core modules
pub mod abi;
pub mod bridge;
pub mod config;
pub mod ephemeris;
pub mod errors;
pub mod ffi;
pub mod logging;
pub mod memory;

// Re-export commonly used items
pub use bridge::{Bridge, Request, Response};
pub use config::Config;
pub use ephemeris::{Ephemeris, EphemerisState, SiderealMode, TopoPosition};
pub use errors::{BridgeError, ConfigError, Result};
pub use ffi::{SwissEph, DEFAULT_LIBRARY};
pub use memory::{GuestMemory, GuestOffset, MemoryError};

/// Load the configured native library and apply its initial state
pub fn open(config: &Config) -> Result<Bridge<SwissEph>> {
    let ephemeris = SwissEph::load(&config.library.path)?;
    let mut bridge = Bridge::new(ephemeris);
    bridge.apply_config(&config.ephemeris)?;
    Ok(bridge)
}
