//! Host functions for wasmtime guests
//!
//! Registers every wire function under `env`. Memory-touching calls resolve
//! the guest's exported `memory` per call and borrow it alongside the
//! bridge held in the store. A memory fault becomes a trap.

use anyhow::{anyhow, Result};
use wasmtime::{Caller, Extern, Linker};

use super::IMPORT_MODULE;
use crate::bridge::Bridge;
use crate::ephemeris::Ephemeris;
use crate::memory::GuestMemory;

/// Guest memory and the bridge, borrowed together from one caller
fn split<'a, E: Ephemeris + 'static>(
    caller: &'a mut Caller<'_, Bridge<E>>,
) -> Result<(GuestMemory<'a>, &'a mut Bridge<E>)> {
    let memory = caller
        .get_export("memory")
        .and_then(Extern::into_memory)
        .ok_or_else(|| anyhow!("guest module does not export `memory`"))?;
    let (bytes, bridge) = memory.data_and_store_mut(caller);
    Ok((GuestMemory::new(bytes), bridge))
}

/// Register the ephemeris host functions with the linker
pub fn add_to_linker<E>(linker: &mut Linker<Bridge<E>>) -> Result<()>
where
    E: Ephemeris + Send + 'static,
{
    linker.func_wrap(
        IMPORT_MODULE,
        "swe_calc_ut_ffi",
        |mut caller: Caller<'_, Bridge<E>>, jd_ut: f64, ipl: i32, iflag: i32, out_ptr: i32| -> Result<i32> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_calc_ut(bridge, &mut memory, jd_ut, ipl, iflag, out_ptr)?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_calc_ffi",
        |mut caller: Caller<'_, Bridge<E>>,
         jd_et: f64,
         ipl: i32,
         iflag: i32,
         out_ptr: i32,
         serr_ptr: i32,
         serr_max_len: i32|
         -> Result<i32> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_calc(
                bridge,
                &mut memory,
                jd_et,
                ipl,
                iflag,
                out_ptr,
                serr_ptr,
                serr_max_len,
            )?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_houses_ffi",
        |mut caller: Caller<'_, Bridge<E>>,
         jd_ut: f64,
         geolat: f64,
         geolon: f64,
         hsys: i32,
         cusps_ptr: i32,
         ascmc_ptr: i32|
         -> Result<i32> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_houses(
                bridge,
                &mut memory,
                jd_ut,
                geolat,
                geolon,
                hsys,
                cusps_ptr,
                ascmc_ptr,
            )?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_houses_ex_ffi",
        |mut caller: Caller<'_, Bridge<E>>,
         jd_ut: f64,
         iflag: i32,
         geolat: f64,
         geolon: f64,
         hsys: i32,
         cusps_ptr: i32,
         ascmc_ptr: i32|
         -> Result<i32> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_houses_ex(
                bridge,
                &mut memory,
                jd_ut,
                iflag,
                geolat,
                geolon,
                hsys,
                cusps_ptr,
                ascmc_ptr,
            )?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_julday_ffi",
        |mut caller: Caller<'_, Bridge<E>>, year: i32, month: i32, day: i32, hour: f64, gregflag: i32| -> f64 {
            super::swe_julday(caller.data_mut(), year, month, day, hour, gregflag)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_sidtime_ffi",
        |mut caller: Caller<'_, Bridge<E>>, jd_ut: f64| -> f64 { super::swe_sidtime(caller.data_mut(), jd_ut) },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_get_ayanamsa_ffi",
        |mut caller: Caller<'_, Bridge<E>>, jd_et: f64| -> f64 { super::swe_get_ayanamsa(caller.data_mut(), jd_et) },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_get_ayanamsa_name_ffi",
        |mut caller: Caller<'_, Bridge<E>>, sid_mode: i32, out_ptr: i32, out_max_len: i32| -> Result<i32> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_get_ayanamsa_name(
                bridge,
                &mut memory,
                sid_mode,
                out_ptr,
                out_max_len,
            )?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swi_epsiln_ffi",
        |mut caller: Caller<'_, Bridge<E>>, jd: f64, iflag: i32| -> f64 {
            super::swi_epsiln(caller.data_mut(), jd, iflag)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_set_ephe_path_ffi",
        |mut caller: Caller<'_, Bridge<E>>, ptr: i32| -> Result<()> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_set_ephe_path(bridge, &mut memory, ptr)?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_set_jpl_file_ffi",
        |mut caller: Caller<'_, Bridge<E>>, ptr: i32| -> Result<()> {
            let (mut memory, bridge) = split(&mut caller)?;
            Ok(super::swe_set_jpl_file(bridge, &mut memory, ptr)?)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_set_sid_mode_ffi",
        |mut caller: Caller<'_, Bridge<E>>, sid_mode: i32, t0: f64, ayan_t0: f64| {
            super::swe_set_sid_mode(caller.data_mut(), sid_mode, t0, ayan_t0)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        "swe_set_topo_ffi",
        |mut caller: Caller<'_, Bridge<E>>, geolon: f64, geolat: f64, geoalt: f64| {
            super::swe_set_topo(caller.data_mut(), geolon, geolat, geoalt)
        },
    )?;

    linker.func_wrap(IMPORT_MODULE, "swe_close_ffi", |mut caller: Caller<'_, Bridge<E>>| {
        super::swe_close(caller.data_mut())
    })?;

    Ok(())
}
