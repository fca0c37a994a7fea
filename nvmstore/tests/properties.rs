//! End-to-end behavioral properties exercised through `nvmstore-hostfs`, as opposed to the
//! crash-injection scenarios in `crash_safety.rs`.

use nvmstore::{Config, PageDescriptor, Status, Store};
use nvmstore_hostfs::{FileLld, MemLld};

fn four_pages_4096() -> Vec<PageDescriptor> {
    (0..4).map(|i| PageDescriptor::new(i * 4096, 4096)).collect()
}

#[test]
fn wear_leveling_distributes_writes_evenly_across_copies() {
    let device = MemLld::new(four_pages_4096());
    let mut store = Store::new(device, Config::new(4, 64));
    store.init();

    let mut counts = [0u32; 4];
    for i in 0..40u8 {
        let blob = vec![i; 64];
        assert!(store.write(&blob).is_ok());
        counts[store.active_copy_index().unwrap() as usize] += 1;
    }
    for c in counts {
        assert_eq!(c, 10);
    }
}

#[test]
fn wear_leveling_with_uneven_write_count_differs_by_at_most_one() {
    // M=22, N=3: each copy must land on floor(22/3)=7 or ceil(22/3)=8.
    let device = MemLld::new(four_pages_4096());
    let mut store = Store::new(device, Config::new(3, 32));
    store.init();

    let mut counts = [0u32; 3];
    for i in 0..22u8 {
        let blob = vec![i; 32];
        assert!(store.write(&blob).is_ok());
        counts[store.active_copy_index().unwrap() as usize] += 1;
    }
    for c in counts {
        assert!(c == 7 || c == 8, "copy count {c} outside the floor/ceil band");
    }
    assert_eq!(counts.iter().sum::<u32>(), 22);
}

#[test]
fn explicit_read_matches_the_cached_copy() {
    let device = MemLld::new(four_pages_4096());
    let mut store = Store::new(device, Config::new(2, 32));
    store.init();
    let blob: Vec<u8> = (0..32u8).collect();
    store.write(&blob);

    let mut dst = vec![0u8; 32];
    assert!(store.read(&mut dst).is_ok());
    assert_eq!(dst, blob);
    assert_eq!(store.get(), Some(blob.as_slice()));
}

#[test]
fn read_before_any_write_reports_no_valid_data() {
    let device = MemLld::new(four_pages_4096());
    let mut store = Store::new(device, Config::new(2, 32));
    store.init();
    let mut dst = vec![0u8; 32];
    assert!(matches!(store.read(&mut dst), Status::NoValidDataFound));
}

#[test]
fn active_header_reflects_the_last_committed_length_and_crc() {
    let device = MemLld::new(four_pages_4096());
    let mut store = Store::new(device, Config::new(2, 16));
    store.init();
    let blob = vec![9u8; 16];
    store.write(&blob);

    let header = store.active_header().expect("a header should be cached after a write");
    assert_eq!(header.length, 16);
    assert_eq!(header.validity, nvmstore::VALID);
}

#[test]
fn scan_on_corruption_keeps_looking_past_a_bad_copy() {
    // Two copies end up independently VALID only through direct device tampering (the store
    // itself never leaves more than one VALID); this exercises the scan past the corrupt one.
    use nvmstore::Lld;

    let pages = four_pages_4096();
    let device = MemLld::new(pages.clone());
    let mut store = Store::new(device.clone(), Config::new(2, 16));
    store.init();
    store.write(&vec![1u8; 16]);
    store.write(&vec![2u8; 16]);
    drop(store);

    // Copy 0 is independently stamped VALID again by directly patching its validity word, then
    // one of its body bytes is flipped so its CRC no longer matches its own (stale) header:
    // a VALID-but-corrupt copy sitting in front of copy 1's genuinely VALID one.
    let mut probe = device.clone();
    Lld::write(&mut probe, pages[0].base_addr, &nvmstore::VALID.to_le_bytes()).unwrap();
    let mut byte = [0u8; 1];
    let body_addr = pages[0].base_addr + nvmstore::HEADER_LEN as u32 + 3;
    Lld::read(&mut probe, body_addr, &mut byte).unwrap();
    byte[0] ^= 0xFF;
    Lld::write(&mut probe, body_addr, &byte).unwrap();

    let mut scanning = Store::new(device, Config::new(2, 16).with_scan_on_corruption(true));
    assert!(scanning.init().is_ok());
    assert_eq!(scanning.get(), Some(vec![2u8; 16].as_slice()));
}

#[test]
fn file_backed_device_survives_a_process_boundary() {
    let dir = std::env::temp_dir().join(format!("nvmstore-properties-test-{}", std::process::id()));
    let _ = std::fs::remove_file(&dir);
    let pages = four_pages_4096();

    {
        let lld = FileLld::new(pages.clone(), &dir);
        let mut store = Store::new(lld, Config::new(2, 24));
        assert!(matches!(store.init(), Status::NoValidDataFound));
        let blob: Vec<u8> = (0..24u8).collect();
        assert!(store.write(&blob).is_ok());
    }
    {
        let lld = FileLld::new(pages, &dir);
        let mut store = Store::new(lld, Config::new(2, 24));
        assert!(store.init().is_ok());
        let expected: Vec<u8> = (0..24u8).collect();
        assert_eq!(store.get(), Some(expected.as_slice()));
    }

    let _ = std::fs::remove_file(&dir);
}
