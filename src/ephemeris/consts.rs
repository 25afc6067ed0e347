//! Well-known Swiss Ephemeris constants
//!
//! Only the values the bridge, its tests and its CLI refer to. Guests pass
//! raw integers and may use anything the library accepts.

// Status codes
pub const OK: i32 = 0;
pub const ERR: i32 = -1;

/// Longest message the library writes into a diagnostic buffer
pub const AS_MAXCH: usize = 256;

// Calendars
pub const JUL_CAL: i32 = 0;
pub const GREG_CAL: i32 = 1;

// Bodies
pub const SUN: i32 = 0;
pub const MOON: i32 = 1;
pub const MERCURY: i32 = 2;
pub const VENUS: i32 = 3;
pub const MARS: i32 = 4;
pub const JUPITER: i32 = 5;
pub const SATURN: i32 = 6;
pub const URANUS: i32 = 7;
pub const NEPTUNE: i32 = 8;
pub const PLUTO: i32 = 9;
pub const MEAN_NODE: i32 = 10;
pub const TRUE_NODE: i32 = 11;

// Computation flags
pub const FLG_JPLEPH: i32 = 1;
pub const FLG_SWIEPH: i32 = 2;
pub const FLG_MOSEPH: i32 = 4;
pub const FLG_SPEED: i32 = 256;
pub const FLG_EQUATORIAL: i32 = 2 * 1024;
pub const FLG_TOPOCTR: i32 = 32 * 1024;
pub const FLG_SIDEREAL: i32 = 64 * 1024;

// Sidereal modes
pub const SIDM_FAGAN_BRADLEY: i32 = 0;
pub const SIDM_LAHIRI: i32 = 1;
pub const SIDM_DELUCE: i32 = 2;
pub const SIDM_RAMAN: i32 = 3;
pub const SIDM_KRISHNAMURTI: i32 = 5;
pub const SIDM_USER: i32 = 255;

/// House system selectors are passed as the ASCII code of their letter
pub const fn house_system(letter: u8) -> i32 {
    letter as i32
}

pub const HSYS_PLACIDUS: i32 = house_system(b'P');
pub const HSYS_KOCH: i32 = house_system(b'K');
pub const HSYS_EQUAL: i32 = house_system(b'E');
pub const HSYS_WHOLE_SIGN: i32 = house_system(b'W');
