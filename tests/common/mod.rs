//! Scripted stand-in for the native library
//!
//! Deterministic, records every call, and follows the library's status
//! conventions closely enough for marshaling tests.

#![allow(dead_code)]

use std::ffi::{CStr, CString};
use std::io::Write;

use sweph_bridge::ephemeris::consts::{ERR, GREG_CAL, OK, PLUTO, SUN};
use sweph_bridge::ephemeris::{Angles, Cusps, Diagnostic, Ephemeris, Position};

pub const J2000: f64 = 2451545.0;

/// Cusp value the fake leaves behind for an unknown house system
pub const FALLBACK_CUSP: f64 = -7.5;

#[derive(Debug, Default)]
pub struct FakeEphemeris {
    pub calls: Vec<&'static str>,
    /// Last path passed to `set_ephe_path`; `Some(None)` is the default path
    pub ephe_path: Option<Option<CString>>,
    pub jpl_file: Option<CString>,
    pub sid_mode: Option<(i32, f64, f64)>,
    pub topo: Option<(f64, f64, f64)>,
    pub closes: u32,
    /// Message left in the diagnostic buffer on a successful `calc`
    pub warning: Option<String>,
    /// Whether each `calc` call was handed a diagnostic buffer
    pub diagnostic_requested: Vec<bool>,
}

impl FakeEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warning(message: &str) -> Self {
        Self {
            warning: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    fn position(tjd: f64, ipl: i32, xx: &mut Position) -> bool {
        if !(SUN..=PLUTO).contains(&ipl) {
            return false;
        }
        let body = f64::from(ipl);
        xx[0] = (tjd - J2000 + 280.46 + body * 30.0).rem_euclid(360.0);
        xx[1] = body * 0.25;
        xx[2] = 1.0 + body;
        xx[3] = 0.9856;
        xx[4] = 0.0;
        xx[5] = 0.0;
        true
    }

    fn fill_houses(hsys: i32, cusps: &mut Cusps, ascmc: &mut Angles) -> i32 {
        let letter = u8::try_from(hsys).ok().filter(u8::is_ascii_uppercase);
        match letter {
            Some(_) => {
                for (house, cusp) in cusps.iter_mut().enumerate().skip(1) {
                    *cusp = (house as f64 - 1.0) * 30.0 + 15.0;
                }
                for (i, angle) in ascmc.iter_mut().enumerate() {
                    *angle = i as f64 * 10.0 + 1.0;
                }
                OK
            }
            None => {
                cusps[1..].fill(FALLBACK_CUSP);
                ascmc.fill(FALLBACK_CUSP);
                ERR
            }
        }
    }
}

fn leave_message(serr: &mut Diagnostic, message: &str) {
    serr.fill(0);
    let mut cursor = &mut serr[..];
    let _ = cursor.write_all(message.as_bytes());
}

impl Ephemeris for FakeEphemeris {
    fn calc_ut(&mut self, tjd_ut: f64, ipl: i32, iflag: i32, xx: &mut Position) -> i32 {
        self.calls.push("calc_ut");
        if Self::position(tjd_ut, ipl, xx) {
            iflag
        } else {
            ERR
        }
    }

    fn calc(
        &mut self,
        tjd_et: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut Position,
        serr: Option<&mut Diagnostic>,
    ) -> i32 {
        self.calls.push("calc");
        self.diagnostic_requested.push(serr.is_some());
        if Self::position(tjd_et, ipl, xx) {
            if let (Some(serr), Some(warning)) = (serr, &self.warning) {
                leave_message(serr, warning);
            }
            iflag
        } else {
            if let Some(serr) = serr {
                leave_message(serr, &format!("illegal planet number {ipl}."));
            }
            ERR
        }
    }

    fn houses(
        &mut self,
        _tjd_ut: f64,
        _geolat: f64,
        _geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32 {
        self.calls.push("houses");
        Self::fill_houses(hsys, cusps, ascmc)
    }

    fn houses_ex(
        &mut self,
        _tjd_ut: f64,
        _iflag: i32,
        _geolat: f64,
        _geolon: f64,
        hsys: i32,
        cusps: &mut Cusps,
        ascmc: &mut Angles,
    ) -> i32 {
        self.calls.push("houses_ex");
        Self::fill_houses(hsys, cusps, ascmc)
    }

    fn julday(&mut self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        self.calls.push("julday");
        let (year, month) = if month <= 2 {
            (year - 1, month + 12)
        } else {
            (year, month)
        };
        let correction = if gregflag == GREG_CAL {
            let century = (f64::from(year) / 100.0).floor();
            2.0 - century + (century / 4.0).floor()
        } else {
            0.0
        };
        (365.25 * (f64::from(year) + 4716.0)).floor()
            + (30.6001 * (f64::from(month) + 1.0)).floor()
            + f64::from(day)
            + correction
            - 1524.5
            + hour / 24.0
    }

    fn sidtime(&mut self, tjd_ut: f64) -> f64 {
        self.calls.push("sidtime");
        (18.697374558 + 24.06570982441908 * (tjd_ut - J2000)).rem_euclid(24.0)
    }

    fn get_ayanamsa(&mut self, tjd_et: f64) -> f64 {
        self.calls.push("get_ayanamsa");
        let base = match self.sid_mode {
            Some((1, _, _)) => 23.85,
            _ => 24.74,
        };
        base + (tjd_et - J2000) / 36525.0 * 1.397
    }

    fn get_ayanamsa_name(&mut self, sid_mode: i32) -> Option<&CStr> {
        self.calls.push("get_ayanamsa_name");
        let name: &'static [u8] = match sid_mode {
            0 => b"Fagan/Bradley\0",
            1 => b"Lahiri\0",
            3 => b"Raman\0",
            _ => return None,
        };
        CStr::from_bytes_with_nul(name).ok()
    }

    fn epsiln(&mut self, jd: f64, _iflag: i32) -> f64 {
        self.calls.push("epsiln");
        23.439_291_1 - 0.013_004_2 * (jd - J2000) / 36525.0
    }

    fn set_ephe_path(&mut self, path: Option<&CStr>) {
        self.calls.push("set_ephe_path");
        self.ephe_path = Some(path.map(CStr::to_owned));
    }

    fn set_jpl_file(&mut self, fname: &CStr) {
        self.calls.push("set_jpl_file");
        self.jpl_file = Some(fname.to_owned());
    }

    fn set_sid_mode(&mut self, sid_mode: i32, t0: f64, ayan_t0: f64) {
        self.calls.push("set_sid_mode");
        self.sid_mode = Some((sid_mode, t0, ayan_t0));
    }

    fn set_topo(&mut self, geolon: f64, geolat: f64, geoalt: f64) {
        self.calls.push("set_topo");
        self.topo = Some((geolon, geolat, geoalt));
    }

    fn close(&mut self) {
        self.calls.push("close");
        self.ephe_path = None;
        self.jpl_file = None;
        self.sid_mode = None;
        self.topo = None;
        self.closes += 1;
    }
}

/// Guest memory filled with a guard pattern so stray writes show up
pub fn guarded_memory(size: usize) -> Vec<u8> {
    vec![GUARD; size]
}

pub const GUARD: u8 = 0xAA;

/// Decode `count` doubles at `at`
pub fn read_f64s(bytes: &[u8], at: usize, count: usize) -> Vec<f64> {
    bytes[at..at + count * 8]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_ne_bytes(raw)
        })
        .collect()
}

/// Place a NUL-terminated string at `at`
pub fn put_c_string(bytes: &mut [u8], at: usize, text: &str) {
    bytes[at..at + text.len()].copy_from_slice(text.as_bytes());
    bytes[at + text.len()] = 0;
}
