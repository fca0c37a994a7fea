use core::fmt;

/// Outcome of a public [`crate::Store`] operation.
///
/// Mirrors the original C driver's `flash_status_t` enumeration field-for-field, with the
/// device-fault variants generalized to carry the low-level driver's own error type so a
/// caller can inspect what actually went wrong on the wire instead of losing it.
#[derive(Debug)]
#[non_exhaustive]
pub enum Status<E> {
    /// The operation completed normally.
    Ok,
    /// `write`/`read` called before a successful `init`, or `init` called twice. These are
    /// programming errors; see [`crate::Store::init`] and [`crate::Store::write`] for the
    /// exact conditions that panic instead of returning this variant.
    Uninitialized,
    /// `num_copies * (header + blob)` exceeds the total bytes described by the page table.
    TotalSizeExceeded,
    /// The page table failed layout validation (non-increasing addresses, a zero-sized page,
    /// or an empty table).
    InvalidPageTable,
    /// No region's header carried the VALID stamp. Normal on first boot; the caller is
    /// expected to populate its buffer and call [`crate::Store::write`].
    NoValidDataFound,
    /// A region's header was VALID but its body CRC did not match `header.crc32`.
    DataCorruptionDetected,
    /// The commit engine's own verify-readback (step 6 of the write protocol) found a CRC
    /// mismatch on the region it just wrote.
    CrcCheckFailure,
    /// The low-level driver failed to initialize.
    LlInitFault(E),
    /// The low-level driver failed a write/program call.
    LlWriteFault(E),
    /// The low-level driver failed a read call.
    LlReadFault(E),
    /// The low-level driver failed a page-erase call.
    LlEraseFault(E),
}

impl<E> Status<E> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl<E: fmt::Debug> fmt::Display for Status<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Uninitialized => write!(f, "store not initialized"),
            Status::TotalSizeExceeded => {
                write!(f, "requested copy layout exceeds available flash")
            }
            Status::InvalidPageTable => write!(f, "page table failed validation"),
            Status::NoValidDataFound => write!(f, "no valid data found"),
            Status::DataCorruptionDetected => write!(f, "data corruption detected"),
            Status::CrcCheckFailure => write!(f, "crc check failed on verify-readback"),
            Status::LlInitFault(e) => write!(f, "low-level driver init fault: {:?}", e),
            Status::LlWriteFault(e) => write!(f, "low-level driver write fault: {:?}", e),
            Status::LlReadFault(e) => write!(f, "low-level driver read fault: {:?}", e),
            Status::LlEraseFault(e) => write!(f, "low-level driver erase fault: {:?}", e),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Status<E> {}
