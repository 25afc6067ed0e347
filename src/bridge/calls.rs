//! Native call adapters
//!
//! Four shapes:
//! - scalar in, scalar out (`julday`, `sidtime`, `ayanamsa`, `obliquity`)
//! - scalar in, fixed arrays out (`calc_ut`, `houses`, `houses_ex`)
//! - scalar in, string out (`ayanamsa_name`)
//! - scalar out plus optional diagnostic string (`calc`)
//!
//! Scratch arrays are zero-initialised host locals sized to the routine's
//! output contract. They are copied out whole, or not at all.

use std::ffi::CString;

use tracing::{debug, trace};

use super::Bridge;
use crate::ephemeris::{
    Angles, Cusps, Diagnostic, Ephemeris, Position, SiderealMode, TopoPosition, ANGLES_LEN,
    CUSPS_LEN, DIAGNOSTIC_CAPACITY, POSITION_LEN,
};
use crate::errors::Result;
use crate::memory::{c_text, GuestMemory, GuestOffset};

const POSITION_BYTES: usize = POSITION_LEN * 8;
const CUSPS_BYTES: usize = CUSPS_LEN * 8;
const ANGLES_BYTES: usize = ANGLES_LEN * 8;

#[inline]
fn log_status(op: &'static str, status: i32) {
    if status < 0 {
        debug!(target: "bridge", op, status, "native routine reported failure");
    } else {
        trace!(target: "bridge", op, status, "native routine returned");
    }
}

impl<E: Ephemeris> Bridge<E> {
    /// Position for a UT Julian day; 6 doubles to `out` when requested
    pub fn calc_ut(
        &mut self,
        memory: &mut GuestMemory<'_>,
        tjd_ut: f64,
        body: i32,
        flags: i32,
        out: GuestOffset,
    ) -> Result<i32> {
        memory.check(out, POSITION_BYTES)?;

        let mut xx: Position = [0.0; POSITION_LEN];
        let status = self.ephemeris.calc_ut(tjd_ut, body, flags, &mut xx);
        log_status("calc_ut", status);

        memory.write_f64s(out, &xx)?;
        Ok(status)
    }

    /// Position for an ET Julian day with optional diagnostic text
    ///
    /// A diagnostic buffer is only handed to the library when `serr` is
    /// non-null. A non-positive `serr_max_len` means `DIAGNOSTIC_CAPACITY`.
    #[allow(clippy::too_many_arguments)]
    pub fn calc(
        &mut self,
        memory: &mut GuestMemory<'_>,
        tjd_et: f64,
        body: i32,
        flags: i32,
        out: GuestOffset,
        serr: GuestOffset,
        serr_max_len: i32,
    ) -> Result<i32> {
        memory.check(out, POSITION_BYTES)?;

        let mut xx: Position = [0.0; POSITION_LEN];
        let mut diagnostic: Option<Diagnostic> = (!serr.is_null()).then(|| [0u8; DIAGNOSTIC_CAPACITY]);
        let status = self
            .ephemeris
            .calc(tjd_et, body, flags, &mut xx, diagnostic.as_mut());
        log_status("calc", status);

        let max_len = if serr_max_len > 0 {
            serr_max_len
        } else {
            DIAGNOSTIC_CAPACITY as i32
        };
        let text = diagnostic.as_ref().map(|d| c_text(d));
        if let Some(text) = text {
            if !text.is_empty() {
                debug!(target: "bridge", op = "calc", diagnostic = %String::from_utf8_lossy(text));
            }
            // Text plus terminator must fit before anything reaches the guest.
            let len = text.len().min(max_len as usize - 1) + 1;
            memory.check(serr, len)?;
        }

        memory.write_f64s(out, &xx)?;
        if let Some(text) = text {
            memory.write_bounded_string(serr, Some(text), max_len)?;
        }

        Ok(status)
    }

    /// House cusps (13 doubles, index 0 unused) and angles (10 doubles)
    #[allow(clippy::too_many_arguments)]
    pub fn houses(
        &mut self,
        memory: &mut GuestMemory<'_>,
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: GuestOffset,
        ascmc: GuestOffset,
    ) -> Result<i32> {
        memory.check(cusps, CUSPS_BYTES)?;
        memory.check(ascmc, ANGLES_BYTES)?;

        let mut cusp_buf: Cusps = [0.0; CUSPS_LEN];
        let mut angle_buf: Angles = [0.0; ANGLES_LEN];
        let status = self
            .ephemeris
            .houses(tjd_ut, geolat, geolon, hsys, &mut cusp_buf, &mut angle_buf);
        log_status("houses", status);

        memory.write_f64s(cusps, &cusp_buf)?;
        memory.write_f64s(ascmc, &angle_buf)?;
        Ok(status)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn houses_ex(
        &mut self,
        memory: &mut GuestMemory<'_>,
        tjd_ut: f64,
        flags: i32,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: GuestOffset,
        ascmc: GuestOffset,
    ) -> Result<i32> {
        memory.check(cusps, CUSPS_BYTES)?;
        memory.check(ascmc, ANGLES_BYTES)?;

        let mut cusp_buf: Cusps = [0.0; CUSPS_LEN];
        let mut angle_buf: Angles = [0.0; ANGLES_LEN];
        let status = self.ephemeris.houses_ex(
            tjd_ut,
            flags,
            geolat,
            geolon,
            hsys,
            &mut cusp_buf,
            &mut angle_buf,
        );
        log_status("houses_ex", status);

        memory.write_f64s(cusps, &cusp_buf)?;
        memory.write_f64s(ascmc, &angle_buf)?;
        Ok(status)
    }

    pub fn julday(&mut self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        self.ephemeris.julday(year, month, day, hour, gregflag)
    }

    pub fn sidtime(&mut self, tjd_ut: f64) -> f64 {
        self.ephemeris.sidtime(tjd_ut)
    }

    pub fn ayanamsa(&mut self, tjd_et: f64) -> f64 {
        self.ephemeris.get_ayanamsa(tjd_et)
    }

    /// Name of a sidereal mode, truncated to `max_len` and terminated
    ///
    /// Returns the number of data bytes written.
    pub fn ayanamsa_name(
        &mut self,
        memory: &mut GuestMemory<'_>,
        sid_mode: i32,
        out: GuestOffset,
        max_len: i32,
    ) -> Result<i32> {
        let name = self.ephemeris.get_ayanamsa_name(sid_mode);
        let written = memory.write_bounded_string(out, name.map(|n| n.to_bytes()), max_len)?;
        Ok(written)
    }

    /// Obliquity of the ecliptic (library-internal routine)
    pub fn obliquity(&mut self, jd: f64, flags: i32) -> f64 {
        self.ephemeris.epsiln(jd, flags)
    }

    /// Search path read from guest memory; the null offset restores the default
    pub fn set_ephe_path(&mut self, memory: &mut GuestMemory<'_>, path: GuestOffset) -> Result<()> {
        let path = memory.read_c_string(path)?;
        self.apply_ephe_path(path);
        Ok(())
    }

    /// JPL file name read from guest memory; the null offset is ignored
    pub fn set_jpl_file(&mut self, memory: &mut GuestMemory<'_>, path: GuestOffset) -> Result<()> {
        match memory.read_c_string(path)? {
            Some(fname) => self.apply_jpl_file(fname),
            None => debug!(target: "bridge", "set_jpl_file without a file name ignored"),
        }
        Ok(())
    }

    pub fn set_sid_mode(&mut self, mode: SiderealMode) {
        self.ephemeris.set_sid_mode(mode.mode, mode.t0, mode.ayan_t0);
        self.state.record_sidereal(mode);
        debug!(target: "bridge", mode = mode.mode, t0 = mode.t0, ayan_t0 = mode.ayan_t0, "sidereal mode set");
    }

    pub fn set_topo(&mut self, position: TopoPosition) {
        self.ephemeris
            .set_topo(position.longitude, position.latitude, position.altitude);
        self.state.record_topo(position);
        debug!(
            target: "bridge",
            longitude = position.longitude,
            latitude = position.latitude,
            altitude = position.altitude,
            "topocentric position set"
        );
    }

    /// Release everything the library holds; safe to repeat
    pub fn close(&mut self) {
        self.ephemeris.close();
        self.state.record_close();
        debug!(target: "bridge", closes = self.state.closes, "ephemeris closed");
    }

    pub(super) fn apply_ephe_path(&mut self, path: Option<CString>) {
        self.ephemeris.set_ephe_path(path.as_deref());
        let path = path.map(|p| p.to_string_lossy().into_owned());
        debug!(target: "bridge", path = ?path, "ephemeris path set");
        self.state.record_ephe_path(path);
    }

    pub(super) fn apply_jpl_file(&mut self, fname: CString) {
        self.ephemeris.set_jpl_file(&fname);
        let fname = fname.to_string_lossy().into_owned();
        debug!(target: "bridge", file = %fname, "JPL file set");
        self.state.record_jpl_file(fname);
    }
}
