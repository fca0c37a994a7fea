//! Upper-level flash module: manages blob layout within a page-erasable NVM device.
//!
//! A configurable number of redundant copies are kept, each prefixed with a 12-byte header
//! (see [`crate::record`]) carrying a validity stamp, body length, and CRC-32. The active copy
//! is the one whose header carries the VALID stamp and whose body matches its CRC. On write we
//! advance to the next copy region in round-robin sequence, which both wear-levels the device
//! and leaves the previous copy untouched until the new one has been verified.
//!
//! PUBLIC FUNCTIONS
//!
//! [`Store::init`]:
//!     Runs the layout planner against the LLD's page table, initializes the LLD, and elects
//!     the active copy by scanning headers for the VALID stamp and verifying body CRC.
//!
//! [`Store::write`]:
//!     Computes a new header (CRC-32, length, provisional validity), erases the next unused
//!     copy region, writes body then header, verifies by readback, then atomically promotes:
//!     invalidates the previous active copy and validates the new one.
//!
//! [`Store::read`] / [`Store::get`]:
//!     Re-load the active copy's body from the device, or inspect the cached copy already
//!     captured by `init`/`write`/`read`.

use crate::config::Config;
use crate::layout::{plan_copy_regions, CopyRegion, LayoutError};
use crate::ll::Lld;
use crate::record::{crc32, Header, HEADER_LEN, INVALID, VALID, VALID_CLEAR};
use crate::status::Status;

/// Process-wide state for one blob, backed by one [`Lld`]. Only one live instance should exist
/// per device; the module is not reentrant and `write`/`init` must not be called concurrently
/// or recursively.
pub struct Store<L: Lld> {
    lld: L,
    config: Config,
    regions: Vec<CopyRegion>,
    initialized: bool,
    has_valid_data: bool,
    active_copy_idx: u8,
    active_header: Option<Header>,
    cache: Vec<u8>,
}

impl<L: Lld> Store<L> {
    /// Constructs a store over `lld` with the given `config`. Does not touch the device; call
    /// [`Store::init`] before anything else.
    pub fn new(lld: L, config: Config) -> Self {
        Self {
            lld,
            config,
            regions: Vec::new(),
            initialized: false,
            has_valid_data: false,
            active_copy_idx: 0,
            active_header: None,
            cache: Vec::new(),
        }
    }

    /// Whether a previous `init` elected an active copy.
    pub fn has_valid_data(&self) -> bool {
        self.has_valid_data
    }

    /// The copy currently holding committed data, if any.
    pub fn active_copy_index(&self) -> Option<u8> {
        self.has_valid_data.then_some(self.active_copy_idx)
    }

    /// The last-known committed blob, captured by `init`, `write`, or `read`. `None` if no
    /// copy has ever been found or written.
    pub fn get(&self) -> Option<&[u8]> {
        self.has_valid_data.then_some(self.cache.as_slice())
    }

    /// The active region's header (length, CRC), as last observed by `init` or `write`.
    pub fn active_header(&self) -> Option<Header> {
        self.active_header
    }

    /// Validates the configuration and page table, plans copy layout, brings up the LLD, and
    /// elects the active copy.
    ///
    /// Calling `init` a second time on the same `Store` is a programming error (the module
    /// caches a borrow of the LLD and can't safely re-derive its layout) and panics, mirroring
    /// the original driver's `assert(0)` on re-entry.
    pub fn init(&mut self) -> Status<L::Error> {
        assert!(!self.initialized, "nvmstore: Store::init called twice");
        self.initialized = true;

        let pages = self.lld.page_table().to_vec();
        if !self.config.validate(&pages) {
            log::error!("nvmstore: configuration or page table failed validation");
            return Status::InvalidPageTable;
        }

        let regions = match plan_copy_regions(&pages, self.config.num_copies, self.config.blob_len) {
            Ok(regions) => regions,
            Err(LayoutError::InvalidPageTable) => {
                log::error!("nvmstore: page table failed layout validation");
                return Status::InvalidPageTable;
            }
            Err(LayoutError::TotalSizeExceeded) => {
                log::error!("nvmstore: requested copy layout exceeds available flash");
                return Status::TotalSizeExceeded;
            }
        };
        self.regions = regions;
        self.cache = vec![0u8; self.config.blob_len as usize];

        if let Err(e) = self.lld.init() {
            log::error!("nvmstore: low-level driver init failed: {:?}", e);
            return Status::LlInitFault(e);
        }

        self.elect_active_copy()
    }

    /// Scans copy regions in order for the first one marked VALID whose body CRC matches its
    /// header. With [`Config::scan_on_corruption`] set, a VALID-but-corrupt region doesn't stop
    /// the search: it keeps looking at the remaining regions before giving up.
    fn elect_active_copy(&mut self) -> Status<L::Error> {
        let mut saw_corruption = false;

        for i in 0..self.config.num_copies {
            let region = self.regions[i as usize];

            let mut hdr_bytes = [0u8; HEADER_LEN];
            if let Err(e) = self.lld.read(region.base_addr, &mut hdr_bytes) {
                log::error!("nvmstore: header read failed on copy {}: {:?}", i, e);
                return Status::LlReadFault(e);
            }
            let header = Header::from_bytes(&hdr_bytes);
            if header.validity != VALID {
                continue;
            }

            if header.length != self.config.blob_len {
                log::warn!("nvmstore: copy {} is VALID but length {} != configured {}", i, header.length, self.config.blob_len);
                saw_corruption = true;
                if self.config.scan_on_corruption {
                    continue;
                }
                return Status::DataCorruptionDetected;
            }

            if let Err(e) = self.lld.read(region.base_addr + HEADER_LEN as u32, &mut self.cache) {
                log::error!("nvmstore: body read failed on copy {}: {:?}", i, e);
                return Status::LlReadFault(e);
            }

            if crc32(&self.cache) == header.crc32 {
                log::debug!("nvmstore: elected copy {} as active", i);
                self.active_copy_idx = i;
                self.has_valid_data = true;
                self.active_header = Some(header);
                return Status::Ok;
            }

            log::warn!("nvmstore: copy {} is VALID but CRC mismatch", i);
            saw_corruption = true;
            if !self.config.scan_on_corruption {
                return Status::DataCorruptionDetected;
            }
        }

        if saw_corruption {
            Status::DataCorruptionDetected
        } else {
            log::warn!("nvmstore: no valid data found");
            Status::NoValidDataFound
        }
    }

    /// Commits `blob` as the new active copy. `blob.len()` must equal the configured blob
    /// length; mismatched length is a programming error and panics.
    ///
    /// Protocol: pick the next region round-robin, erase it, write body then header with
    /// provisional (CLEAR) validity, verify by readback CRC, then atomically promote:
    /// invalidate the old region, then validate the new one. See the module docs for the
    /// crash-recovery argument behind this ordering.
    pub fn write(&mut self, blob: &[u8]) -> Status<L::Error> {
        assert!(self.initialized, "nvmstore: Store::write called before init");
        assert_eq!(
            blob.len(),
            self.config.blob_len as usize,
            "nvmstore: blob length does not match configured length"
        );

        let new_idx = if self.has_valid_data {
            (self.active_copy_idx + 1) % self.config.num_copies
        } else {
            0
        };
        let new_region = self.regions[new_idx as usize];

        if let Err(e) = self.erase_region(new_region) {
            log::error!("nvmstore: erase failed for copy {}: {:?}", new_idx, e);
            return Status::LlEraseFault(e);
        }

        let crc = crc32(blob);
        let provisional = Header { validity: VALID_CLEAR, length: self.config.blob_len, crc32: crc };

        log::debug!("nvmstore: writing body to copy {}", new_idx);
        if let Err(e) = self.lld.write(new_region.base_addr + HEADER_LEN as u32, blob) {
            log::error!("nvmstore: body write failed for copy {}: {:?}", new_idx, e);
            return Status::LlWriteFault(e);
        }

        log::debug!("nvmstore: writing provisional header to copy {}", new_idx);
        if let Err(e) = self.lld.write(new_region.base_addr, &provisional.to_bytes()) {
            log::error!("nvmstore: header write failed for copy {}: {:?}", new_idx, e);
            return Status::LlWriteFault(e);
        }

        let mut verify_buf = vec![0u8; self.config.blob_len as usize];
        if let Err(e) = self.lld.read(new_region.base_addr + HEADER_LEN as u32, &mut verify_buf) {
            log::error!("nvmstore: verify readback failed for copy {}: {:?}", new_idx, e);
            return Status::LlReadFault(e);
        }
        if crc32(&verify_buf) != crc {
            log::error!("nvmstore: verify readback CRC mismatch on copy {}", new_idx);
            return Status::CrcCheckFailure;
        }

        // Atomic promotion: invalidate the old copy before validating the new one, so at most
        // one region is ever VALID. The window between these two programs is the one hazard
        // a crash can expose; see the module docs.
        if self.has_valid_data {
            let old_region = self.regions[self.active_copy_idx as usize];
            log::debug!("nvmstore: invalidating copy {}", self.active_copy_idx);
            if let Err(e) = self.lld.write(old_region.base_addr, &INVALID.to_le_bytes()) {
                log::error!("nvmstore: failed to invalidate copy {}: {:?}", self.active_copy_idx, e);
                return Status::LlWriteFault(e);
            }
        }

        log::debug!("nvmstore: validating copy {}", new_idx);
        if let Err(e) = self.lld.write(new_region.base_addr, &VALID.to_le_bytes()) {
            log::error!("nvmstore: failed to validate copy {}: {:?}", new_idx, e);
            return Status::LlWriteFault(e);
        }

        self.active_copy_idx = new_idx;
        self.has_valid_data = true;
        self.active_header = Some(Header { validity: VALID, length: provisional.length, crc32: provisional.crc32 });
        self.cache.clear();
        self.cache.extend_from_slice(blob);

        Status::Ok
    }

    /// Erases whole pages starting at `region.page_idx` until at least `blob_len + HEADER_LEN`
    /// bytes have been covered. Iterates by page index rather than by copy index, since a blob
    /// spanning multiple pages means the two are not interchangeable.
    fn erase_region(&mut self, region: CopyRegion) -> Result<(), L::Error> {
        let pages = self.lld.page_table().to_vec();
        let mut remaining: i64 = self.config.blob_len as i64 + HEADER_LEN as i64;
        let mut page_idx = region.page_idx;

        while remaining > 0 && page_idx < pages.len() {
            self.lld.erase_page(page_idx as u8)?;
            remaining -= pages[page_idx].size_bytes as i64;
            page_idx += 1;
        }
        Ok(())
    }

    /// Re-loads the active copy's body from the device into `dst`. `dst.len()` must equal the
    /// configured blob length.
    pub fn read(&mut self, dst: &mut [u8]) -> Status<L::Error> {
        assert!(self.initialized, "nvmstore: Store::read called before init");
        assert_eq!(
            dst.len(),
            self.config.blob_len as usize,
            "nvmstore: destination buffer does not match configured length"
        );

        if !self.has_valid_data {
            return Status::NoValidDataFound;
        }

        let region = self.regions[self.active_copy_idx as usize];
        if let Err(e) = self.lld.read(region.base_addr + HEADER_LEN as u32, dst) {
            log::error!("nvmstore: read failed on active copy {}: {:?}", self.active_copy_idx, e);
            return Status::LlReadFault(e);
        }

        self.cache.clear();
        self.cache.extend_from_slice(dst);
        Status::Ok
    }
}
