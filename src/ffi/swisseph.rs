//! Swiss Ephemeris bound at runtime
//!
//! Every entry point is resolved once at load time into a typed
//! `extern "C"` function pointer. Calls hold the process-wide native lock:
//! the library keeps its configuration in C globals shared by every
//! handle loaded into this process.

use std::ffi::{c_char, c_int, CStr};
use std::ptr;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::library::Library;
use crate::ephemeris::{Angles, Cusps, Diagnostic, Ephemeris, Position};
use crate::errors::{BridgeError, Result};

type CalcFn = unsafe extern "C" fn(f64, i32, i32, *mut f64, *mut c_char) -> i32;
type HousesFn = unsafe extern "C" fn(f64, f64, f64, c_int, *mut f64, *mut f64) -> c_int;
type HousesExFn = unsafe extern "C" fn(f64, i32, f64, f64, c_int, *mut f64, *mut f64) -> c_int;
type JuldayFn = unsafe extern "C" fn(c_int, c_int, c_int, f64, c_int) -> f64;
type TimeFn = unsafe extern "C" fn(f64) -> f64;
type AyanamsaNameFn = unsafe extern "C" fn(i32) -> *const c_char;
type EpsilnFn = unsafe extern "C" fn(f64, i32) -> f64;
type PathFn = unsafe extern "C" fn(*const c_char);
type SidModeFn = unsafe extern "C" fn(i32, f64, f64);
type TopoFn = unsafe extern "C" fn(f64, f64, f64);
type CloseFn = unsafe extern "C" fn();

/// Serialises native calls across every `SwissEph` in the process
static NATIVE_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Platform file name of the shared library
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY: &str = "libswe.dylib";
#[cfg(windows)]
pub const DEFAULT_LIBRARY: &str = "swedll64.dll";
#[cfg(not(any(target_os = "macos", windows)))]
pub const DEFAULT_LIBRARY: &str = "libswe.so";

struct Symbols {
    calc_ut: CalcFn,
    calc: CalcFn,
    houses: HousesFn,
    houses_ex: HousesExFn,
    julday: JuldayFn,
    sidtime: TimeFn,
    get_ayanamsa: TimeFn,
    get_ayanamsa_name: AyanamsaNameFn,
    // Internal routine, not exported by every build
    epsiln: Option<EpsilnFn>,
    set_ephe_path: PathFn,
    set_jpl_file: PathFn,
    set_sid_mode: SidModeFn,
    set_topo: TopoFn,
    close: CloseFn,
}

macro_rules! resolve {
    ($lib:expr, $name:literal as $ty:ty) => {{
        let addr = $lib.symbol($name).map_err(|source| BridgeError::Symbol {
            name: $name,
            source,
        })?;
        // SAFETY: the prototype matches the library's public header.
        unsafe { std::mem::transmute::<*mut std::ffi::c_void, $ty>(addr.as_ptr()) }
    }};
}

impl Symbols {
    fn resolve(lib: &Library) -> Result<Self> {
        let epsiln = match lib.symbol("swi_epsiln") {
            // SAFETY: `double swi_epsiln(double, int32)`.
            Ok(addr) => Some(unsafe {
                std::mem::transmute::<*mut std::ffi::c_void, EpsilnFn>(addr.as_ptr())
            }),
            Err(err) => {
                warn!(target: "ffi", library = lib.name(), %err, "swi_epsiln unavailable, obliquity queries return NaN");
                None
            }
        };

        Ok(Self {
            calc_ut: resolve!(lib, "swe_calc_ut" as CalcFn),
            calc: resolve!(lib, "swe_calc" as CalcFn),
            houses: resolve!(lib, "swe_houses" as HousesFn),
            houses_ex: resolve!(lib, "swe_houses_ex" as HousesExFn),
            julday: resolve!(lib, "swe_julday" as JuldayFn),
            sidtime: resolve!(lib, "swe_sidtime" as TimeFn),
            get_ayanamsa: resolve!(lib, "swe_get_ayanamsa" as TimeFn),
            get_ayanamsa_name: resolve!(lib, "swe_get_ayanamsa_name" as AyanamsaNameFn),
            epsiln,
            set_ephe_path: resolve!(lib, "swe_set_ephe_path" as PathFn),
            set_jpl_file: resolve!(lib, "swe_set_jpl_file" as PathFn),
            set_sid_mode: resolve!(lib, "swe_set_sid_mode" as SidModeFn),
            set_topo: resolve!(lib, "swe_set_topo" as TopoFn),
            close: resolve!(lib, "swe_close" as CloseFn),
        })
    }
}

/// The Swiss Ephemeris shared library
pub struct SwissEph {
    symbols: Symbols,
    // Declared last so the symbols never outlive the mapping.
    library: Library,
}

impl SwissEph {
    /// Load the library from a path or platform search name
    pub fn load(name: &str) -> Result<Self> {
        let library = Library::load(name)?;
        let symbols = Symbols::resolve(&library)?;
        debug!(target: "ffi", library = library.name(), "swiss ephemeris bound");
        Ok(Self { symbols, library })
    }

    /// Load `DEFAULT_LIBRARY` through the platform search path
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_LIBRARY)
    }

    pub fn library_name(&self) -> &str {
        self.library.name()
    }
}

impl std::fmt::Debug for SwissEph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwissEph")
            .field("library", &self.library)
            .field("has_epsiln", &self.symbols.epsiln.is_some())
            .finish()
    }
}

impl Ephemeris for SwissEph {
    fn calc_ut(&mut self, tjd_ut: f64, ipl: i32, iflag: i32, xx: &mut Position) -> i32 {
        let _native = NATIVE_LOCK.lock();
        // SAFETY: `xx` holds the 6 doubles the routine writes; a null serr is allowed.
        unsafe { (self.symbols.calc_ut)(tjd_ut, ipl, iflag, xx.as_mut_ptr(), ptr::null_mut()) }
    }

    fn calc(
        &mut self,
        tjd_et: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut Position,
        serr: Option<&mut Diagnostic>,
    ) -> i32 {
        let serr = serr.map_or(ptr::null_mut(), |buf| buf.as_mut_ptr().cast::<c_char>());
        let _native = NATIVE_LOCK.lock();
        // SAFETY: the diagnostic buffer exceeds AS_MAXCH when present.
        unsafe { (self.symbols.calc)(tjd_et, ipl, iflag, xx.as_mut_ptr(), serr) }
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
        let _native = NATIVE_LOCK.lock();
        // SAFETY: 13 cusp slots and 10 angle slots, as the routine requires.
        unsafe {
            (self.symbols.houses)(
                tjd_ut,
                geolat,
                geolon,
                hsys,
                cusps.as_mut_ptr(),
                ascmc.as_mut_ptr(),
            )
        }
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
        let _native = NATIVE_LOCK.lock();
        // SAFETY: as in `houses`.
        unsafe {
            (self.symbols.houses_ex)(
                tjd_ut,
                iflag,
                geolat,
                geolon,
                hsys,
                cusps.as_mut_ptr(),
                ascmc.as_mut_ptr(),
            )
        }
    }

    fn julday(&mut self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.julday)(year, month, day, hour, gregflag) }
    }

    fn sidtime(&mut self, tjd_ut: f64) -> f64 {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.sidtime)(tjd_ut) }
    }

    fn get_ayanamsa(&mut self, tjd_et: f64) -> f64 {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.get_ayanamsa)(tjd_et) }
    }

    fn get_ayanamsa_name(&mut self, sid_mode: i32) -> Option<&CStr> {
        let name = {
            let _native = NATIVE_LOCK.lock();
            unsafe { (self.symbols.get_ayanamsa_name)(sid_mode) }
        };
        if name.is_null() {
            None
        } else {
            // SAFETY: static text owned by the library, which outlives `self`.
            Some(unsafe { CStr::from_ptr(name) })
        }
    }

    fn epsiln(&mut self, jd: f64, iflag: i32) -> f64 {
        match self.symbols.epsiln {
            Some(epsiln) => {
                let _native = NATIVE_LOCK.lock();
                unsafe { epsiln(jd, iflag) }
            }
            None => f64::NAN,
        }
    }

    fn set_ephe_path(&mut self, path: Option<&CStr>) {
        let path = path.map_or(ptr::null(), CStr::as_ptr);
        let _native = NATIVE_LOCK.lock();
        // SAFETY: the library copies the path; NULL selects its default.
        unsafe { (self.symbols.set_ephe_path)(path) }
    }

    fn set_jpl_file(&mut self, fname: &CStr) {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.set_jpl_file)(fname.as_ptr()) }
    }

    fn set_sid_mode(&mut self, sid_mode: i32, t0: f64, ayan_t0: f64) {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.set_sid_mode)(sid_mode, t0, ayan_t0) }
    }

    fn set_topo(&mut self, geolon: f64, geolat: f64, geoalt: f64) {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.set_topo)(geolon, geolat, geoalt) }
    }

    fn close(&mut self) {
        let _native = NATIVE_LOCK.lock();
        unsafe { (self.symbols.close)() }
    }
}
