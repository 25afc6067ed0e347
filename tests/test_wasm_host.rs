//! Host functions driven from a real wasm guest

#![cfg(feature = "wasm-host")]

mod common;

use common::{read_f64s, FakeEphemeris};
use sweph_bridge::abi::wasm::add_to_linker;
use sweph_bridge::Bridge;
use wasmtime::{Engine, Instance, Linker, Module, Store};

const GUEST: &str = r#"
(module
  (import "env" "swe_julday_ffi" (func $julday (param i32 i32 i32 f64 i32) (result f64)))
  (import "env" "swe_calc_ut_ffi" (func $calc_ut (param f64 i32 i32 i32) (result i32)))
  (import "env" "swe_get_ayanamsa_name_ffi" (func $name (param i32 i32 i32) (result i32)))
  (import "env" "swe_close_ffi" (func $close))
  (memory (export "memory") 1)
  (func (export "sun") (param $out i32) (result i32)
    (call $calc_ut
      (call $julday (i32.const 2000) (i32.const 1) (i32.const 1) (f64.const 12) (i32.const 1))
      (i32.const 0)
      (i32.const 258)
      (local.get $out)))
  (func (export "name") (param $out i32) (param $max i32) (result i32)
    (call $name (i32.const 1) (local.get $out) (local.get $max)))
  (func (export "close") (call $close)))
"#;

fn instantiate(wat: &str) -> anyhow::Result<(Store<Bridge<FakeEphemeris>>, Instance)> {
    let engine = Engine::default();
    let module = Module::new(&engine, wat)?;
    let mut linker = Linker::new(&engine);
    add_to_linker(&mut linker)?;
    let mut store = Store::new(&engine, Bridge::new(FakeEphemeris::new()));
    let instance = linker.instantiate(&mut store, &module)?;
    Ok((store, instance))
}

#[test]
fn test_guest_computes_sun_position() {
    let (mut store, instance) = instantiate(GUEST).unwrap();
    let sun = instance.get_typed_func::<i32, i32>(&mut store, "sun").unwrap();

    let status = sun.call(&mut store, 1024).unwrap();
    assert_eq!(status, 258);

    let memory = instance.get_memory(&mut store, "memory").unwrap();
    let xx = read_f64s(memory.data(&store), 1024, 6);
    assert!((0.0..360.0).contains(&xx[0]));
    assert_eq!(store.data().ephemeris().count("julday"), 1);
}

#[test]
fn test_guest_string_write() {
    let (mut store, instance) = instantiate(GUEST).unwrap();
    let name = instance
        .get_typed_func::<(i32, i32), i32>(&mut store, "name")
        .unwrap();

    assert_eq!(name.call(&mut store, (16, 4)).unwrap(), 3);

    let memory = instance.get_memory(&mut store, "memory").unwrap();
    assert_eq!(&memory.data(&store)[16..20], b"Lah\0");
}

#[test]
fn test_out_of_range_offset_traps() {
    let (mut store, instance) = instantiate(GUEST).unwrap();
    let sun = instance.get_typed_func::<i32, i32>(&mut store, "sun").unwrap();

    // One wasm page is 65536 bytes
    assert!(sun.call(&mut store, 65536 - 8).is_err());
    assert_eq!(store.data().ephemeris().count("calc_ut"), 0);
}

#[test]
fn test_close_from_guest() {
    let (mut store, instance) = instantiate(GUEST).unwrap();
    let close = instance.get_typed_func::<(), ()>(&mut store, "close").unwrap();

    close.call(&mut store, ()).unwrap();
    close.call(&mut store, ()).unwrap();
    assert_eq!(store.data().state().closes, 2);
}

#[test]
fn test_guest_without_memory_export_traps() {
    let wat = r#"
(module
  (import "env" "swe_get_ayanamsa_name_ffi" (func $name (param i32 i32 i32) (result i32)))
  (func (export "name") (result i32)
    (call $name (i32.const 1) (i32.const 8) (i32.const 8))))
"#;
    let (mut store, instance) = instantiate(wat).unwrap();
    let name = instance.get_typed_func::<(), i32>(&mut store, "name").unwrap();

    assert!(name.call(&mut store, ()).is_err());
}
