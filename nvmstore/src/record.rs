//! The on-device record header: a fixed 12-byte layout preserved bit-for-bit across ports.
//!
//! ```text
//! +0  validity   : 4 B, little-endian, in {0xFFFFFFFF, 0x55555555, 0x00000000}
//! +4  length     : 4 B, little-endian, = configured blob length
//! +8  crc32      : 4 B, little-endian, CRC-32 over the next `length` bytes
//! +12 body       : `length` bytes, opaque
//! ```
//!
//! The three validity values are not an arbitrary enum: each forward transition
//! (CLEAR -> VALID -> INVALID) only ever programs 1 bits to 0, so no erase is needed between
//! them. Re-encoding this must preserve that property or the crash-safety argument in
//! [`crate::store`] collapses.

/// Header has not yet been written since the last page erase (all bytes `0xFF`).
pub const VALID_CLEAR: u32 = 0xFFFF_FFFF;
/// Header is complete and its body has passed verify-readback.
pub const VALID: u32 = 0x5555_5555;
/// Header has been superseded by a newer committed copy.
pub const INVALID: u32 = 0x0000_0000;

/// Size in bytes of a serialized [`Header`].
pub const HEADER_LEN: usize = 12;

/// In-memory representation of a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub validity: u32,
    pub length: u32,
    pub crc32: u32,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.validity.to_le_bytes());
        buf[4..8].copy_from_slice(&self.length.to_le_bytes());
        buf[8..12].copy_from_slice(&self.crc32.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            validity: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            length: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            crc32: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
        }
    }
}

/// CRC-32, IEEE 802.3 polynomial (reflected), identical to zlib's `crc32`. The conventional
/// "CRC-32" most crates mean by the name.
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
