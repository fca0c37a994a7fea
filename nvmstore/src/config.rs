//! Immutable-after-init configuration, generalizing the original `flash_config_t`.

use crate::ll::PageDescriptor;

/// Everything [`crate::Store::init`] needs besides the [`crate::ll::Lld`] itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of redundant regions, N >= 2.
    pub num_copies: u8,
    /// Blob length B, in bytes. B > 0.
    pub blob_len: u32,
    /// When a VALID region's CRC fails to verify, keep scanning the remaining regions for
    /// another independently-VALID-with-good-CRC region before giving up. Default `false`,
    /// matching the baseline contract of stopping at the first VALID region. This can never
    /// resurrect a region that isn't itself marked VALID by the device, so it does not reach
    /// into rollback-to-older-copy territory.
    pub scan_on_corruption: bool,
}

impl Config {
    pub fn new(num_copies: u8, blob_len: u32) -> Self {
        Self { num_copies, blob_len, scan_on_corruption: false }
    }

    pub fn with_scan_on_corruption(mut self, scan: bool) -> Self {
        self.scan_on_corruption = scan;
        self
    }

    /// Checks the invariants `init` assumes before running the layout planner: N >= 2,
    /// B > 0, and (mirroring the original's per-page assertions) a non-empty page table with
    /// strictly positive page sizes. The layout planner re-validates the page table's address
    /// ordering and feasibility independently.
    pub fn validate(&self, pages: &[PageDescriptor]) -> bool {
        self.num_copies >= 2 && self.blob_len > 0 && !pages.is_empty()
            && pages.iter().all(|p| p.size_bytes > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fewer_than_two_copies() {
        let pages = [PageDescriptor::new(0, 4096)];
        assert!(!Config::new(1, 100).validate(&pages));
    }

    #[test]
    fn rejects_zero_length_blob() {
        let pages = [PageDescriptor::new(0, 4096)];
        assert!(!Config::new(2, 0).validate(&pages));
    }

    #[test]
    fn rejects_empty_page_table() {
        assert!(!Config::new(2, 100).validate(&[]));
    }

    #[test]
    fn accepts_sane_configuration() {
        let pages = [PageDescriptor::new(0, 4096), PageDescriptor::new(4096, 4096)];
        assert!(Config::new(2, 100).validate(&pages));
    }
}
