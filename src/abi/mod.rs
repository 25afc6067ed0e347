//! Wire ABI - flat integer/double signatures seen by the guest
//!
//! The only place where typed requests are flattened to and from the
//! guest's calling convention: every integer is an `i32`, every pointer is
//! an `i32` offset into guest memory, every float is an `f64`.
//!
//! Scalar-only operations never touch guest memory and skip the memory
//! handle entirely. `WIRE_FUNCTIONS` lists the import names in
//! registration order.

#[cfg(feature = "wasm-host")]
pub mod wasm;

use crate::bridge::{Bridge, Request};
use crate::ephemeris::{Ephemeris, SiderealMode, TopoPosition};
use crate::errors::Result;
use crate::memory::{GuestMemory, GuestOffset};

/// Module name the guest imports from
pub const IMPORT_MODULE: &str = "env";

pub const WIRE_FUNCTIONS: [&str; 14] = [
    "swe_calc_ut_ffi",
    "swe_calc_ffi",
    "swe_houses_ffi",
    "swe_houses_ex_ffi",
    "swe_julday_ffi",
    "swe_sidtime_ffi",
    "swe_get_ayanamsa_ffi",
    "swe_get_ayanamsa_name_ffi",
    "swi_epsiln_ffi",
    "swe_set_ephe_path_ffi",
    "swe_set_jpl_file_ffi",
    "swe_set_sid_mode_ffi",
    "swe_set_topo_ffi",
    "swe_close_ffi",
];

#[inline]
fn offset(raw: i32) -> GuestOffset {
    GuestOffset::from_wire(raw)
}

fn status<E: Ephemeris>(bridge: &mut Bridge<E>, memory: &mut GuestMemory<'_>, request: Request) -> Result<i32> {
    Ok(bridge.handle(memory, request)?.into_wire_i32())
}

pub fn swe_calc_ut<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    memory: &mut GuestMemory<'_>,
    jd_ut: f64,
    ipl: i32,
    iflag: i32,
    out_ptr: i32,
) -> Result<i32> {
    status(
        bridge,
        memory,
        Request::CalcUt {
            tjd_ut: jd_ut,
            body: ipl,
            flags: iflag,
            out: offset(out_ptr),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub fn swe_calc<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    memory: &mut GuestMemory<'_>,
    jd_et: f64,
    ipl: i32,
    iflag: i32,
    out_ptr: i32,
    serr_ptr: i32,
    serr_max_len: i32,
) -> Result<i32> {
    status(
        bridge,
        memory,
        Request::Calc {
            tjd_et: jd_et,
            body: ipl,
            flags: iflag,
            out: offset(out_ptr),
            serr: offset(serr_ptr),
            serr_max_len,
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub fn swe_houses<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    memory: &mut GuestMemory<'_>,
    jd_ut: f64,
    geolat: f64,
    geolon: f64,
    hsys: i32,
    cusps_ptr: i32,
    ascmc_ptr: i32,
) -> Result<i32> {
    status(
        bridge,
        memory,
        Request::Houses {
            tjd_ut: jd_ut,
            geolat,
            geolon,
            hsys,
            cusps: offset(cusps_ptr),
            ascmc: offset(ascmc_ptr),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub fn swe_houses_ex<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    memory: &mut GuestMemory<'_>,
    jd_ut: f64,
    iflag: i32,
    geolat: f64,
    geolon: f64,
    hsys: i32,
    cusps_ptr: i32,
    ascmc_ptr: i32,
) -> Result<i32> {
    status(
        bridge,
        memory,
        Request::HousesEx {
            tjd_ut: jd_ut,
            flags: iflag,
            geolat,
            geolon,
            hsys,
            cusps: offset(cusps_ptr),
            ascmc: offset(ascmc_ptr),
        },
    )
}

pub fn swe_julday<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    year: i32,
    month: i32,
    day: i32,
    hour: f64,
    gregflag: i32,
) -> f64 {
    bridge.julday(year, month, day, hour, gregflag)
}

pub fn swe_sidtime<E: Ephemeris>(bridge: &mut Bridge<E>, jd_ut: f64) -> f64 {
    bridge.sidtime(jd_ut)
}

pub fn swe_get_ayanamsa<E: Ephemeris>(bridge: &mut Bridge<E>, jd_et: f64) -> f64 {
    bridge.ayanamsa(jd_et)
}

pub fn swe_get_ayanamsa_name<E: Ephemeris>(
    bridge: &mut Bridge<E>,
    memory: &mut GuestMemory<'_>,
    sid_mode: i32,
    out_ptr: i32,
    out_max_len: i32,
) -> Result<i32> {
    status(
        bridge,
        memory,
        Request::AyanamsaName {
            sid_mode,
            out: offset(out_ptr),
            max_len: out_max_len,
        },
    )
}

pub fn swi_epsiln<E: Ephemeris>(bridge: &mut Bridge<E>, jd: f64, iflag: i32) -> f64 {
    bridge.obliquity(jd, iflag)
}

pub fn swe_set_ephe_path<E: Ephemeris>(bridge: &mut Bridge<E>, memory: &mut GuestMemory<'_>, ptr: i32) -> Result<()> {
    bridge.handle(memory, Request::SetEphePath { path: offset(ptr) })?;
    Ok(())
}

pub fn swe_set_jpl_file<E: Ephemeris>(bridge: &mut Bridge<E>, memory: &mut GuestMemory<'_>, ptr: i32) -> Result<()> {
    bridge.handle(memory, Request::SetJplFile { path: offset(ptr) })?;
    Ok(())
}

pub fn swe_set_sid_mode<E: Ephemeris>(bridge: &mut Bridge<E>, sid_mode: i32, t0: f64, ayan_t0: f64) {
    bridge.set_sid_mode(SiderealMode {
        mode: sid_mode,
        t0,
        ayan_t0,
    });
}

pub fn swe_set_topo<E: Ephemeris>(bridge: &mut Bridge<E>, geolon: f64, geolat: f64, geoalt: f64) {
    bridge.set_topo(TopoPosition {
        longitude: geolon,
        latitude: geolat,
        altitude: geoalt,
    });
}

pub fn swe_close<E: Ephemeris>(bridge: &mut Bridge<E>) {
    bridge.close();
}
