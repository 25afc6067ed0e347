//! Typed requests and responses, one variant per operation

use crate::ephemeris::{SiderealMode, TopoPosition};
use crate::memory::GuestOffset;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CalcUt {
        tjd_ut: f64,
        body: i32,
        flags: i32,
        out: GuestOffset,
    },
    Calc {
        tjd_et: f64,
        body: i32,
        flags: i32,
        out: GuestOffset,
        serr: GuestOffset,
        serr_max_len: i32,
    },
    Houses {
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: GuestOffset,
        ascmc: GuestOffset,
    },
    HousesEx {
        tjd_ut: f64,
        flags: i32,
        geolat: f64,
        geolon: f64,
        hsys: i32,
        cusps: GuestOffset,
        ascmc: GuestOffset,
    },
    JulDay {
        year: i32,
        month: i32,
        day: i32,
        hour: f64,
        gregflag: i32,
    },
    SidTime {
        tjd_ut: f64,
    },
    Ayanamsa {
        tjd_et: f64,
    },
    AyanamsaName {
        sid_mode: i32,
        out: GuestOffset,
        max_len: i32,
    },
    Obliquity {
        jd: f64,
        flags: i32,
    },
    SetEphePath {
        path: GuestOffset,
    },
    SetJplFile {
        path: GuestOffset,
    },
    SetSidMode(SiderealMode),
    SetTopo(TopoPosition),
    Close,
}

impl Request {
    /// Guest-visible import name of the operation
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::CalcUt { .. } => "swe_calc_ut_ffi",
            Self::Calc { .. } => "swe_calc_ffi",
            Self::Houses { .. } => "swe_houses_ffi",
            Self::HousesEx { .. } => "swe_houses_ex_ffi",
            Self::JulDay { .. } => "swe_julday_ffi",
            Self::SidTime { .. } => "swe_sidtime_ffi",
            Self::Ayanamsa { .. } => "swe_get_ayanamsa_ffi",
            Self::AyanamsaName { .. } => "swe_get_ayanamsa_name_ffi",
            Self::Obliquity { .. } => "swi_epsiln_ffi",
            Self::SetEphePath { .. } => "swe_set_ephe_path_ffi",
            Self::SetJplFile { .. } => "swe_set_jpl_file_ffi",
            Self::SetSidMode(_) => "swe_set_sid_mode_ffi",
            Self::SetTopo(_) => "swe_set_topo_ffi",
            Self::Close => "swe_close_ffi",
        }
    }

    /// True for calls that change the library's process-wide state
    pub const fn mutates_state(&self) -> bool {
        matches!(
            self,
            Self::SetEphePath { .. }
                | Self::SetJplFile { .. }
                | Self::SetSidMode(_)
                | Self::SetTopo(_)
                | Self::Close
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Native status code, passed through untouched
    Status(i32),
    /// Scalar computed by the library
    Value(f64),
    /// Data bytes written to a string destination
    Length(i32),
    Unit,
}

impl Response {
    /// Flatten for an integer-returning wire function
    ///
    /// Scalars never travel over an integer return; they flatten to 0.
    pub fn into_wire_i32(self) -> i32 {
        match self {
            Self::Status(v) | Self::Length(v) => v,
            Self::Value(_) | Self::Unit => 0,
        }
    }

    /// Flatten for a double-returning wire function
    pub fn into_wire_f64(self) -> f64 {
        match self {
            Self::Value(v) => v,
            Self::Status(v) | Self::Length(v) => f64::from(v),
            Self::Unit => 0.0,
        }
    }
}
