//! A fail-safe, wear-leveling persistence layer for a single contiguous blob stored in
//! page-erasable non-volatile memory.
//!
//! `nvmstore` presents a get/put surface over a raw erase-write-read device (the [`Lld`]
//! capability your platform provides) and guarantees that after a crash at any instant during a
//! write, the next [`Store::init`] either recovers the most recently committed blob or reports
//! that no valid blob exists, never a partially written or silently corrupt one.
//!
//! # Layout
//!
//! The device is a linear sequence of erasable pages (see [`PageDescriptor`]). Configuring
//! `N` redundant copies of a `B`-byte blob reserves `N` regions, each the smallest whole number
//! of pages that can hold a 12-byte header plus the blob body. `write` always advances to the
//! next region round-robin, which both wear-levels the device and leaves the previous copy
//! untouched until the new one is verified and promoted.
//!
//! ```no_run
//! use nvmstore::{Config, PageDescriptor, Store};
//! # struct MyLld;
//! # impl nvmstore::Lld for MyLld {
//! #     type Error = ();
//! #     fn page_table(&self) -> &[PageDescriptor] { &[] }
//! #     fn init(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn read(&mut self, _addr: u32, _dst: &mut [u8]) -> Result<(), ()> { Ok(()) }
//! #     fn write(&mut self, _addr: u32, _src: &[u8]) -> Result<(), ()> { Ok(()) }
//! #     fn erase_page(&mut self, _page_idx: u8) -> Result<(), ()> { Ok(()) }
//! # }
//! let lld = MyLld;
//! let mut store = Store::new(lld, Config::new(2, 100));
//! match store.init() {
//!     nvmstore::Status::Ok => { /* store.get() holds the recovered blob */ }
//!     nvmstore::Status::NoValidDataFound => {
//!         let fresh = [0u8; 100];
//!         store.write(&fresh);
//!     }
//!     _ => { /* handle the rest of the status taxonomy */ }
//! }
//! ```

mod config;
mod layout;
mod ll;
mod record;
mod status;
mod store;

pub use config::Config;
pub use layout::{CopyRegion, LayoutError};
pub use ll::{Lld, PageDescriptor};
pub use record::{Header, HEADER_LEN, INVALID, VALID, VALID_CLEAR};
pub use status::Status;
pub use store::Store;
