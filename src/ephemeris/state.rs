//! Host-side record of the library's process-wide configuration
//!
//! The native library keeps its search path, JPL file, sidereal mode and
//! observer position in globals. The bridge mirrors every change it makes
//! so the host can inspect (and re-apply) what the guest configured.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiderealMode {
    pub mode: i32,
    #[serde(default)]
    pub t0: f64,
    #[serde(default)]
    pub ayan_t0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopoPosition {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EphemerisState {
    /// `None` means the library default
    pub ephe_path: Option<String>,
    pub jpl_file: Option<String>,
    pub sidereal: Option<SiderealMode>,
    pub topo: Option<TopoPosition>,
    /// Number of close calls since the last setter
    pub closes: u32,
}

impl EphemerisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_ephe_path(&mut self, path: Option<String>) {
        self.ephe_path = path;
        self.closes = 0;
    }

    pub(crate) fn record_jpl_file(&mut self, fname: String) {
        self.jpl_file = Some(fname);
        self.closes = 0;
    }

    pub(crate) fn record_sidereal(&mut self, mode: SiderealMode) {
        self.sidereal = Some(mode);
        self.closes = 0;
    }

    pub(crate) fn record_topo(&mut self, topo: TopoPosition) {
        self.topo = Some(topo);
        self.closes = 0;
    }

    /// Forget everything; the library starts from defaults after close
    pub(crate) fn record_close(&mut self) {
        let closes = self.closes.saturating_add(1);
        *self = Self {
            closes,
            ..Self::default()
        };
    }

    pub fn is_closed(&self) -> bool {
        self.closes > 0
    }
}
