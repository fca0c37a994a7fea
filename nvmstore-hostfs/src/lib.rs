//! Host-only [`Lld`] implementations for exercising `nvmstore` off real flash hardware.
//!
//! Two flavors, mirroring the original project's `ll_flash_stub` (a RAM-backed device with an
//! on-disk snapshot so state survives process restarts) and its `file_io_lib` load/save pair:
//!
//! - [`FileLld`] persists the whole linear address space to a single file, reloading it on
//!   [`Lld::init`]. Good for manual end-to-end smoke testing across process boundaries.
//! - [`MemLld`] is purely in-memory but additionally supports fault injection: [`MemLld::crash_after`]
//!   arms a call counter so that the Nth subsequent `Lld` call fails *without taking effect*,
//!   modeling a power loss at that exact instant. This is the harness
//!   [`crate::Store::write`](nvmstore::Store::write)'s crash-safety tests drive.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use nvmstore::{Lld, PageDescriptor};

/// The error type both host LLDs report.
#[derive(Debug)]
pub enum HostFault {
    /// A fault-injection countdown reached zero during this call; it was not applied.
    SimulatedCrash,
    /// The backing file could not be read or written.
    Io(std::io::Error),
}

impl std::fmt::Display for HostFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostFault::SimulatedCrash => write!(f, "simulated crash"),
            HostFault::Io(e) => write!(f, "host i/o error: {e}"),
        }
    }
}

impl std::error::Error for HostFault {}

fn offset_of(pages: &[PageDescriptor], addr: u32) -> usize {
    (addr - pages[0].base_addr) as usize
}

/// A RAM-backed device with an on-disk snapshot, mirroring the original's file-backed flash stub.
///
/// `init` treats a missing or size-mismatched snapshot file as a fresh, fully-erased device,
/// not as an LLD fault, so a first-ever run simply yields [`nvmstore::Status::NoValidDataFound`]
/// from the core rather than propagating a spurious init error.
pub struct FileLld {
    pages: Vec<PageDescriptor>,
    path: PathBuf,
    mem: Vec<u8>,
}

impl FileLld {
    pub fn new(pages: Vec<PageDescriptor>, path: impl AsRef<Path>) -> Self {
        let total: u64 = pages.iter().map(|p| p.size_bytes as u64).sum();
        Self { pages, path: path.as_ref().to_path_buf(), mem: vec![0xFFu8; total as usize] }
    }

    fn load_state(&mut self) -> bool {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.len() == self.mem.len() => {
                self.mem.copy_from_slice(&bytes);
                true
            }
            _ => false,
        }
    }

    fn save_state(&self) -> Result<(), HostFault> {
        fs::write(&self.path, &self.mem).map_err(HostFault::Io)
    }
}

impl Lld for FileLld {
    type Error = HostFault;

    fn page_table(&self) -> &[PageDescriptor] {
        &self.pages
    }

    fn init(&mut self) -> Result<(), HostFault> {
        if !self.load_state() {
            self.mem.fill(0xFF);
            log::warn!("nvmstore-hostfs: no snapshot at {:?}, starting from erased state", self.path);
        }
        Ok(())
    }

    fn read(&mut self, addr: u32, dst: &mut [u8]) -> Result<(), HostFault> {
        let off = offset_of(&self.pages, addr);
        dst.copy_from_slice(&self.mem[off..off + dst.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u32, src: &[u8]) -> Result<(), HostFault> {
        let off = offset_of(&self.pages, addr);
        self.mem[off..off + src.len()].copy_from_slice(src);
        self.save_state()
    }

    fn erase_page(&mut self, page_idx: u8) -> Result<(), HostFault> {
        let page = self.pages[page_idx as usize];
        let off = offset_of(&self.pages, page.base_addr);
        self.mem[off..off + page.size_bytes as usize].fill(0xFF);
        self.save_state()
    }
}

/// A purely in-memory [`Lld`] with a fault-injection countdown, for driving the core's write
/// protocol into every crash window a test wants to check.
///
/// The backing memory and crash countdown live behind `Rc` so a [`MemLld`] can be cheaply
/// [`Clone`]d before being moved into a [`crate::Store`](nvmstore::Store): one clone is handed to
/// the store, the other kept by the test as a probe. The probe can arm
/// [`MemLld::crash_after`] to make the store's *next* `Lld` call fail without taking effect,
/// modeling a power loss an instant before that call would have completed, and, after the
/// "crash", can be cloned again into a fresh `Store` to see exactly what survived on the shared
/// backing.
#[derive(Clone)]
pub struct MemLld {
    pages: Vec<PageDescriptor>,
    mem: Rc<RefCell<Vec<u8>>>,
    calls_remaining: Rc<Cell<Option<usize>>>,
}

impl MemLld {
    pub fn new(pages: Vec<PageDescriptor>) -> Self {
        let total: u64 = pages.iter().map(|p| p.size_bytes as u64).sum();
        Self {
            pages,
            mem: Rc::new(RefCell::new(vec![0xFFu8; total as usize])),
            calls_remaining: Rc::new(Cell::new(None)),
        }
    }

    /// Arm the countdown: the `n`-th `Lld` call from now (1-indexed, shared across every clone
    /// of this device) fails without effect.
    pub fn crash_after(&self, n: usize) {
        self.calls_remaining.set(Some(n));
    }

    pub fn clear_crash(&self) {
        self.calls_remaining.set(None);
    }

    fn tick(&self) -> Result<(), HostFault> {
        match self.calls_remaining.get() {
            Some(0) => Err(HostFault::SimulatedCrash),
            Some(n) => {
                self.calls_remaining.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Lld for MemLld {
    type Error = HostFault;

    fn page_table(&self) -> &[PageDescriptor] {
        &self.pages
    }

    fn init(&mut self) -> Result<(), HostFault> {
        self.tick()
    }

    fn read(&mut self, addr: u32, dst: &mut [u8]) -> Result<(), HostFault> {
        self.tick()?;
        let off = offset_of(&self.pages, addr);
        dst.copy_from_slice(&self.mem.borrow()[off..off + dst.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u32, src: &[u8]) -> Result<(), HostFault> {
        self.tick()?;
        let off = offset_of(&self.pages, addr);
        self.mem.borrow_mut()[off..off + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn erase_page(&mut self, page_idx: u8) -> Result<(), HostFault> {
        self.tick()?;
        let page = self.pages[page_idx as usize];
        let off = offset_of(&self.pages, page.base_addr);
        self.mem.borrow_mut()[off..off + page.size_bytes as usize].fill(0xFF);
        Ok(())
    }
}
