//! Native ephemeris routines as seen by the bridge
//!
//! `Ephemeris` is the seam between the call adapters and the native
//! library. Output parameters are typed fixed-size arrays owned by the
//! caller, so an implementation can never write past what the adapter
//! provisioned.

pub mod consts;
mod state;

pub use state::{EphemerisState, SiderealMode, TopoPosition};

use std::ffi::CStr;

/// Position/velocity vector: longitude, latitude, distance and their speeds
pub const POSITION_LEN: usize = 6;
/// House cusps, index 0 unused
pub const CUSPS_LEN: usize = 13;
/// Ascendant, MC, ARMC, vertex and friends
pub const ANGLES_LEN: usize = 10;
/// Capacity of the diagnostic buffer handed to `calc`
///
/// Larger than the library's own `AS_MAXCH` limit.
pub const DIAGNOSTIC_CAPACITY: usize = 512;

pub type Position = [f64; POSITION_LEN];
pub type Cusps = [f64; CUSPS_LEN];
pub type Angles = [f64; ANGLES_LEN];
pub type Diagnostic = [u8; DIAGNOSTIC_CAPACITY];

/// One method per native entry point
///
/// Integer arguments are already narrowed to the library's `int32`.
/// Return values are the library's own status codes and are never
/// interpreted by the bridge.
pub trait Ephemeris {
    /// Planet position for a Universal Time Julian day
    fn calc_ut(&mut self, tjd_ut: f64, ipl: i32, iflag: i32, xx: &mut Position) -> i32;

    /// Planet position for an Ephemeris Time Julian day
    ///
    /// When `serr` is provided the routine may leave a NUL-terminated
    /// message in it.
    fn calc(
        &mut self,
        tjd_et: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut Position,
        serr: Option<&mut Diagnostic>,
    ) -> i32;

    fn houses(
        &mut self,
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32;

    #[allow(clippy::too_many_arguments)]
    fn houses_ex(
        &mut self,
        tjd_ut: f64,
        iflag: i32,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32;

    fn julday(&mut self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64;

    fn sidtime(&mut self, tjd_ut: f64) -> f64;

    fn get_ayanamsa(&mut self, tjd_et: f64) -> f64;

    /// Library-owned name of a sidereal mode, `None` when unknown
    fn get_ayanamsa_name(&mut self, sid_mode: i32) -> Option<&CStr>;

    /// Obliquity of the ecliptic
    fn epsiln(&mut self, jd: f64, iflag: i32) -> f64;

    /// `None` restores the library's default search path
    fn set_ephe_path(&mut self, path: Option<&CStr>);

    fn set_jpl_file(&mut self, fname: &CStr);

    fn set_sid_mode(&mut self, sid_mode: i32, t0: f64, ayan_t0: f64);

    fn set_topo(&mut self, geolon: f64, geolat: f64, geoalt: f64);

    /// Release files and caches held by the library. Must be idempotent.
    fn close(&mut self);
}

impl<E: Ephemeris + ?Sized> Ephemeris for Box<E> {
    fn calc_ut(&mut self, tjd_ut: f64, ipl: i32, iflag: i32, xx: &mut Position) -> i32 {
        (**self).calc_ut(tjd_ut, ipl, iflag, xx)
    }

    fn calc(
        &mut self,
        tjd_et: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut Position,
        serr: Option<&mut Diagnostic>,
    ) -> i32 {
        (**self).calc(tjd_et, ipl, iflag, xx, serr)
    }

    fn houses(
        &mut self,
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32 {
        (**self).houses(tjd_ut, geolat, geolon, hsys, cusps, ascmc)
    }

    fn houses_ex(
        &mut self,
        tjd_ut: f64,
        iflag: i32,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32 {
        (**self).houses_ex(tjd_ut, iflag, geolat, geolon, hsys, cusps, ascmc)
    }

    fn julday(&mut self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        (**self).julday(year, month, day, hour, gregflag)
    }

    fn sidtime(&mut self, tjd_ut: f64) -> f64 {
        (**self).sidtime(tjd_ut)
    }

    fn get_ayanamsa(&mut self, tjd_et: f64) -> f64 {
        (**self).get_ayanamsa(tjd_et)
    }

    fn get_ayanamsa_name(&mut self, sid_mode: i32) -> Option<&CStr> {
        (**self).get_ayanamsa_name(sid_mode)
    }

    fn epsiln(&mut self, jd: f64, iflag: i32) -> f64 {
        (**self).epsiln(jd, iflag)
    }

    fn set_ephe_path(&mut self, path: Option<&CStr>) {
        (**self).set_ephe_path(path)
    }

    fn set_jpl_file(&mut self, fname: &CStr) {
        (**self).set_jpl_file(fname)
    }

    fn set_sid_mode(&mut self, sid_mode: i32, t0: f64, ayan_t0: f64) {
        (**self).set_sid_mode(sid_mode, t0, ayan_t0)
    }

    fn set_topo(&mut self, geolon: f64, geolat: f64, geoalt: f64) {
        (**self).set_topo(geolon, geolat, geoalt)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
