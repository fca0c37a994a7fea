//! Computes the base address of each redundant copy region from a page table.
//!
//! Copies must start on a page boundary because the commit engine issues whole-page erases;
//! a blob larger than one page spans multiple pages, and copies must be disjoint to allow
//! independent erase. An earlier revision of the algorithm this is ported from walked the page
//! table using only the blob length as its threshold, which could place two copies on
//! overlapping pages when page sizes varied relative to the header size. This version always
//! compares against `blob_len + HEADER_LEN`, closing that gap.

use crate::ll::PageDescriptor;
use crate::record::HEADER_LEN;

/// Why [`plan_copy_base_addrs`] rejected a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The page table itself is malformed: empty, non-increasing `base_addr`s, or a
    /// zero-sized page.
    InvalidPageTable,
    /// `num_copies * (blob_len + HEADER_LEN)` exceeds the page table's total bytes, or the
    /// table was exhausted while still placing copies.
    TotalSizeExceeded,
}

fn validate_page_table(pages: &[PageDescriptor]) -> Result<(), LayoutError> {
    if pages.is_empty() {
        return Err(LayoutError::InvalidPageTable);
    }
    if pages.iter().any(|p| p.size_bytes == 0) {
        return Err(LayoutError::InvalidPageTable);
    }
    if pages.windows(2).any(|w| w[1].base_addr <= w[0].base_addr) {
        return Err(LayoutError::InvalidPageTable);
    }
    Ok(())
}

/// A single redundant copy region: its index into the page table (so the commit engine can
/// erase forward from the right place) and its physical base address.
///
/// The copy index and the starting page index are *not* the same thing in general; a blob
/// that spans multiple pages pushes every later copy's page index ahead of its copy index.
/// Callers must key erasure off `page_idx`, not off the copy's position in the returned `Vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyRegion {
    pub page_idx: usize,
    pub base_addr: u32,
}

/// Walks `pages` and returns the region descriptor of each of `num_copies` redundant regions,
/// each sized to hold `blob_len` bytes of body plus a [`crate::record::Header`].
pub fn plan_copy_regions(
    pages: &[PageDescriptor],
    num_copies: u8,
    blob_len: u32,
) -> Result<Vec<CopyRegion>, LayoutError> {
    validate_page_table(pages)?;

    let record_len = (blob_len as u64) + (HEADER_LEN as u64);
    let total_flash_bytes: u64 = pages.iter().map(|p| p.size_bytes as u64).sum();
    let total_required: u64 = record_len * (num_copies as u64);
    if total_required > total_flash_bytes {
        return Err(LayoutError::TotalSizeExceeded);
    }

    let mut regions = Vec::with_capacity(num_copies as usize);
    regions.push(CopyRegion { page_idx: 0, base_addr: pages[0].base_addr });

    let mut page_idx: usize = 0;
    let mut bytes_accum: u64 = 0;
    for _copy in 1..num_copies {
        loop {
            if page_idx >= pages.len() {
                return Err(LayoutError::TotalSizeExceeded);
            }
            if bytes_accum + (pages[page_idx].size_bytes as u64) >= record_len {
                page_idx += 1;
                if page_idx >= pages.len() {
                    return Err(LayoutError::TotalSizeExceeded);
                }
                regions.push(CopyRegion { page_idx, base_addr: pages[page_idx].base_addr });
                bytes_accum = 0;
                break;
            } else {
                bytes_accum += pages[page_idx].size_bytes as u64;
                page_idx += 1;
            }
        }
    }

    Ok(regions)
}
