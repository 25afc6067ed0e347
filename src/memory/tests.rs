//! Guest memory primitives: null sentinel, bounds, truncation discipline

use super::*;
use proptest::prelude::*;

const GUARD: u8 = 0xAA;

fn guarded(len: usize) -> Vec<u8> {
    vec![GUARD; len]
}

#[test]
fn test_offset_from_wire() {
    assert!(GuestOffset::from_wire(0).is_null());
    assert_eq!(GuestOffset::from_wire(16).resolve(), Some(16));
    // Negative wire values are high offsets, not errors
    assert_eq!(GuestOffset::from_wire(-1).get(), u32::MAX);
    assert_eq!(GuestOffset::NULL.resolve(), None);
}

#[test]
fn test_write_bytes_null_destination() {
    let mut buf = guarded(64);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bytes(GuestOffset::NULL, &[1, 2, 3]).unwrap(), 0);
    assert!(buf.iter().all(|&b| b == GUARD));
}

#[test]
fn test_write_bytes_empty_source() {
    let mut buf = guarded(64);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bytes(GuestOffset::new(8), &[]).unwrap(), 0);
    assert!(buf.iter().all(|&b| b == GUARD));
}

#[test]
fn test_write_bytes_exact_region() {
    let mut buf = guarded(32);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bytes(GuestOffset::new(4), &[1, 2, 3]).unwrap(), 3);
    assert_eq!(&buf[..4], &[GUARD; 4]);
    assert_eq!(&buf[4..7], &[1, 2, 3]);
    assert!(buf[7..].iter().all(|&b| b == GUARD));
}

#[test]
fn test_write_bytes_out_of_bounds_leaves_memory() {
    let mut buf = guarded(16);
    let mut mem = GuestMemory::new(&mut buf);

    let err = mem.write_bytes(GuestOffset::new(14), &[0; 4]).unwrap_err();
    assert_eq!(
        err,
        MemoryError::OutOfBounds {
            offset: 14,
            len: 4,
            memory_size: 16
        }
    );
    assert!(buf.iter().all(|&b| b == GUARD));
}

#[test]
fn test_write_bytes_offset_overflow() {
    let mut buf = guarded(16);
    let mut mem = GuestMemory::new(&mut buf);

    assert!(mem.write_bytes(GuestOffset::from_wire(-1), &[0; 8]).is_err());
}

#[test]
fn test_write_f64s_native_order() {
    let mut buf = guarded(8 + 48 + 8);
    let mut mem = GuestMemory::new(&mut buf);
    let values = [1.5, -2.25, 3.0, 0.0, 359.999, 1e-9];

    assert_eq!(mem.write_f64s(GuestOffset::new(8), &values).unwrap(), 48);
    assert_eq!(&buf[..8], &[GUARD; 8]);
    assert_eq!(&buf[56..], &[GUARD; 8]);
    for (i, value) in values.iter().enumerate() {
        let start = 8 + i * 8;
        let bytes: [u8; 8] = buf[start..start + 8].try_into().unwrap();
        assert_eq!(f64::from_ne_bytes(bytes), *value);
    }
}

#[test]
fn test_bounded_string_fits() {
    let mut buf = guarded(32);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(1), Some(b"Lahiri".as_slice()), 32).unwrap(), 6);
    assert_eq!(&buf[1..8], b"Lahiri\0");
    assert_eq!(buf[0], GUARD);
    assert_eq!(buf[8], GUARD);
}

#[test]
fn test_bounded_string_truncates() {
    let mut buf = guarded(16);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(2), Some(b"Fagan/Bradley".as_slice()), 6).unwrap(), 5);
    assert_eq!(&buf[2..8], b"Fagan\0");
    assert_eq!(buf[8], GUARD);
}

#[test]
fn test_bounded_string_max_len_one() {
    let mut buf = guarded(8);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(3), Some(b"abc".as_slice()), 1).unwrap(), 0);
    assert_eq!(buf[3], 0);
    assert_eq!(buf.iter().filter(|&&b| b != GUARD).count(), 1);
}

#[test]
fn test_bounded_string_absent_source() {
    let mut buf = guarded(8);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(3), None, 8).unwrap(), 0);
    assert_eq!(buf[3], 0);
    assert_eq!(buf.iter().filter(|&&b| b != GUARD).count(), 1);
}

#[test]
fn test_bounded_string_no_capacity() {
    let mut buf = guarded(8);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(3), Some(b"abc".as_slice()), 0).unwrap(), 0);
    assert_eq!(mem.write_bounded_string(GuestOffset::new(3), Some(b"abc".as_slice()), -5).unwrap(), 0);
    assert_eq!(mem.write_bounded_string(GuestOffset::NULL, Some(b"abc".as_slice()), 8).unwrap(), 0);
    assert!(buf.iter().all(|&b| b == GUARD));
}

#[test]
fn test_bounded_string_stops_at_nul() {
    let mut buf = guarded(16);
    let mut mem = GuestMemory::new(&mut buf);

    let raw = b"ok\0garbage";
    assert_eq!(mem.write_bounded_string(GuestOffset::new(1), Some(raw.as_slice()), 16).unwrap(), 2);
    assert_eq!(&buf[1..4], b"ok\0");
    assert_eq!(buf[4], GUARD);
}

#[test]
fn test_bounded_string_checks_only_written_region() {
    // Declared capacity runs past the end of memory but the text is short
    let mut buf = guarded(8);
    let mut mem = GuestMemory::new(&mut buf);

    assert_eq!(mem.write_bounded_string(GuestOffset::new(4), Some(b"ab".as_slice()), 256).unwrap(), 2);
    assert_eq!(&buf[4..7], b"ab\0");

    let mut mem = GuestMemory::new(&mut buf);
    assert!(mem.write_bounded_string(GuestOffset::new(4), Some(b"abcdefgh".as_slice()), 256).is_err());
}

#[test]
fn test_read_c_string() {
    let mut buf = guarded(16);
    buf[4..12].copy_from_slice(b"/eph/de\0");
    let mem = GuestMemory::new(&mut buf);

    let path = mem.read_c_string(GuestOffset::new(4)).unwrap().unwrap();
    assert_eq!(path.to_bytes(), b"/eph/de");
    assert_eq!(mem.read_c_string(GuestOffset::NULL).unwrap(), None);
}

#[test]
fn test_read_c_string_unterminated() {
    let mut buf = guarded(16);
    let mem = GuestMemory::new(&mut buf);

    assert_eq!(
        mem.read_c_string(GuestOffset::new(4)).unwrap_err(),
        MemoryError::Unterminated { offset: 4 }
    );
    assert!(matches!(
        mem.read_c_string(GuestOffset::new(64)).unwrap_err(),
        MemoryError::OutOfBounds { .. }
    ));
}

#[test]
fn test_c_text() {
    assert_eq!(c_text(b"abc\0def"), b"abc");
    assert_eq!(c_text(b"abc"), b"abc");
    assert_eq!(c_text(b"\0"), b"");
}

proptest! {
    #[test]
    fn prop_bounded_string_terminates(
        text in proptest::collection::vec(1u8..=255, 0..64),
        max_len in 1i32..80,
        offset in 1u32..16,
    ) {
        let mut buf = guarded(128);
        let mut mem = GuestMemory::new(&mut buf);

        let written = mem.write_bounded_string(GuestOffset::new(offset), Some(text.as_slice()), max_len).unwrap();

        let start = offset as usize;
        let written = written as usize;
        prop_assert!(written <= (max_len - 1) as usize);
        prop_assert_eq!(written, text.len().min((max_len - 1) as usize));
        prop_assert_eq!(&buf[start..start + written], &text[..written]);
        prop_assert_eq!(buf[start + written], 0);
        prop_assert!(buf[..start].iter().all(|&b| b == GUARD));
        prop_assert!(buf[start + written + 1..].iter().all(|&b| b == GUARD));
    }

    #[test]
    fn prop_null_destination_never_writes(
        text in proptest::collection::vec(any::<u8>(), 0..32),
        max_len in -4i32..64,
    ) {
        let mut buf = guarded(64);
        let mut mem = GuestMemory::new(&mut buf);

        prop_assert_eq!(mem.write_bounded_string(GuestOffset::NULL, Some(text.as_slice()), max_len).unwrap(), 0);
        prop_assert_eq!(mem.write_bytes(GuestOffset::NULL, &text).unwrap(), 0);
        prop_assert!(buf.iter().all(|&b| b == GUARD));
    }
}

#[test]
fn test_check_region() {
    let mut buf = guarded(104);
    let mem = GuestMemory::new(&mut buf);

    assert!(mem.check(GuestOffset::NULL, 1 << 20).is_ok());
    assert!(mem.check(GuestOffset::new(0x10), 80).is_ok());
    assert!(mem.check(GuestOffset::new(0x10), 104).is_err());
}
