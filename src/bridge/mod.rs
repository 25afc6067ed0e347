//! Bridge - native call adapters between guest memory and the ephemeris
//!
//! Architecture:
//! - `request.rs` - typed request/response per operation
//! - `calls.rs` - one adapter per native entry point
//!
//! Every adapter follows the same order: check fixed-size destinations,
//! call the native routine with host-owned scratch buffers, then marshal
//! the results into guest memory. The native status code goes back to the
//! guest unchanged.

mod calls;
mod request;

pub use request::{Request, Response};

use std::ffi::CString;

use tracing::{debug_span, info};

use crate::config::EphemerisConfig;
use crate::ephemeris::{Ephemeris, EphemerisState};
use crate::errors::{ConfigError, Result};
use crate::memory::GuestMemory;

/// Owns the native binding and the host-side record of its state
///
/// Methods take `&mut self`: a bridge serves one guest call at a time.
pub struct Bridge<E> {
    ephemeris: E,
    state: EphemerisState,
}

impl<E: Ephemeris> Bridge<E> {
    pub fn new(ephemeris: E) -> Self {
        Self {
            ephemeris,
            state: EphemerisState::new(),
        }
    }

    /// Process-wide settings applied through this bridge
    pub fn state(&self) -> &EphemerisState {
        &self.state
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    pub fn ephemeris_mut(&mut self) -> &mut E {
        &mut self.ephemeris
    }

    pub fn into_inner(self) -> E {
        self.ephemeris
    }

    /// Run one typed request against guest memory
    pub fn handle(&mut self, memory: &mut GuestMemory<'_>, request: Request) -> Result<Response> {
        let _span = debug_span!(target: "bridge", "call", op = request.wire_name()).entered();

        let response = match request {
            Request::CalcUt {
                tjd_ut,
                body,
                flags,
                out,
            } => Response::Status(self.calc_ut(memory, tjd_ut, body, flags, out)?),
            Request::Calc {
                tjd_et,
                body,
                flags,
                out,
                serr,
                serr_max_len,
            } => Response::Status(self.calc(memory, tjd_et, body, flags, out, serr, serr_max_len)?),
            Request::Houses {
                tjd_ut,
                geolat,
                geolon,
                hsys,
                cusps,
                ascmc,
            } => Response::Status(self.houses(memory, tjd_ut, geolat, geolon, hsys, cusps, ascmc)?),
            Request::HousesEx {
                tjd_ut,
                flags,
                geolat,
                geolon,
                hsys,
                cusps,
                ascmc,
            } => Response::Status(
                self.houses_ex(memory, tjd_ut, flags, geolat, geolon, hsys, cusps, ascmc)?,
            ),
            Request::JulDay {
                year,
                month,
                day,
                hour,
                gregflag,
            } => Response::Value(self.julday(year, month, day, hour, gregflag)),
            Request::SidTime { tjd_ut } => Response::Value(self.sidtime(tjd_ut)),
            Request::Ayanamsa { tjd_et } => Response::Value(self.ayanamsa(tjd_et)),
            Request::AyanamsaName {
                sid_mode,
                out,
                max_len,
            } => Response::Length(self.ayanamsa_name(memory, sid_mode, out, max_len)?),
            Request::Obliquity { jd, flags } => Response::Value(self.obliquity(jd, flags)),
            Request::SetEphePath { path } => {
                self.set_ephe_path(memory, path)?;
                Response::Unit
            }
            Request::SetJplFile { path } => {
                self.set_jpl_file(memory, path)?;
                Response::Unit
            }
            Request::SetSidMode(mode) => {
                self.set_sid_mode(mode);
                Response::Unit
            }
            Request::SetTopo(position) => {
                self.set_topo(position);
                Response::Unit
            }
            Request::Close => {
                self.close();
                Response::Unit
            }
        };

        Ok(response)
    }

    /// Push configured initial state into the library
    ///
    /// Goes through the same setters a guest would use, so the state record
    /// stays accurate.
    pub fn apply_config(&mut self, config: &EphemerisConfig) -> Result<()> {
        if let Some(path) = &config.ephe_path {
            let path = host_c_string("ephemeris.ephe_path", path)?;
            self.apply_ephe_path(Some(path));
        }
        if let Some(fname) = &config.jpl_file {
            let fname = host_c_string("ephemeris.jpl_file", fname)?;
            self.apply_jpl_file(fname);
        }
        if let Some(mode) = config.sidereal {
            self.set_sid_mode(mode);
        }
        if let Some(topo) = config.topo {
            self.set_topo(topo);
        }

        info!(target: "bridge", state = ?self.state, "initial ephemeris state applied");
        Ok(())
    }
}

fn host_c_string(field: &'static str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| {
        ConfigError::Invalid {
            field,
            reason: "contains a NUL byte".into(),
        }
        .into()
    })
}
