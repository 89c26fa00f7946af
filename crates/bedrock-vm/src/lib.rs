//! OS virtual-memory primitives for the bedrock allocator workspace.
//!
//! This is the leaf crate with no internal dependencies. It models an
//! address range as moving through three states:
//!
//! ```text
//! unreserved ──reserve──▶ reserved ──commit──▶ committed
//!      ▲                     │  ▲                  │
//!      └──────release────────┘  └────decommit──────┘
//! ```
//!
//! - **Reserved** address space is claimed but has no physical backing;
//!   touching it faults.
//! - **Committed** pages are readable, writable, and guaranteed to read
//!   as zero on first touch.
//! - Committed is always a subset of reserved.
//!
//! The OS backends are `mmap`/`mprotect`/`munmap` on Unix and
//! `VirtualAlloc`/`VirtualFree` on Windows. All fallible operations
//! surface failure as [`VmError`] — this layer never panics on an OS
//! refusal; policy belongs to the caller.
//!
//! Within this crate, `unsafe` is confined to the `sys` bindings and the
//! pointer arithmetic of [`reservation`]; everything above works with
//! `(reservation, offset)` pairs instead of raw addresses.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod align;
pub mod error;
pub mod mem;
pub mod reservation;
mod sys;

// Public re-exports for the primary API surface.
pub use error::VmError;
pub use reservation::Reservation;
pub use sys::page_size;
