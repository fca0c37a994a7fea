//! The capability interface the core demands of its low-level flash driver.
//!
//! Depends on a single narrow capability set rather than inlining a hardware implementation,
//! the same way `llio`/`spinor` do. `nvmstore` never constructs a page table or device handle
//! itself; a caller supplies a type implementing [`Lld`] and the page table it reports is taken
//! as ground truth.

use core::fmt;

/// One page of the linear address space the low-level driver exposes.
///
/// Pages need not be equal-sized. `base_addr` values must be strictly increasing across the
/// table and every `size_bytes` must be non-zero; [`crate::Config::validate`] enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub base_addr: u32,
    pub size_bytes: u32,
}

impl PageDescriptor {
    pub const fn new(base_addr: u32, size_bytes: u32) -> Self {
        Self { base_addr, size_bytes }
    }
}

/// The low-level device driver (LLD).
///
/// All operations are synchronous and block until completion; the core calls them serially
/// and never overlaps two calls. Implementors own the physical device exclusively for the
/// duration of each call.
pub trait Lld {
    /// The LLD's own fault type. Propagated verbatim inside [`crate::Status`] so a caller can
    /// inspect the underlying device error.
    type Error: fmt::Debug;

    /// The page table backing this device. Must not change after [`Lld::init`] succeeds.
    fn page_table(&self) -> &[PageDescriptor];

    /// One-time device bring-up. May be called at most once per [`crate::Store::init`].
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Read `dst.len()` bytes starting at `addr`.
    fn read(&mut self, addr: u32, dst: &mut [u8]) -> Result<(), Self::Error>;

    /// Program `src` at `addr`. The caller guarantees every targeted bit is transitioning
    /// 1->0 relative to what is currently on the device (the core never asks the LLD to set a
    /// bit back to 1 outside of an erase).
    fn write(&mut self, addr: u32, src: &[u8]) -> Result<(), Self::Error>;

    /// Erase page `page_idx`, setting every byte in it to `0xFF`.
    fn erase_page(&mut self, page_idx: u8) -> Result<(), Self::Error>;
}
