//! A growable array that never reallocates.
//!
//! [`VmVec`] reserves a large range of virtual address space up front and
//! commits physical memory in chunks as elements are pushed. Because the
//! backing range never moves, element addresses are stable for the
//! container's lifetime — the trade-off is a fixed upper bound chosen at
//! creation. Address space is cheap on 64-bit targets, so the bound can
//! be generous.
//!
//! This is the classic external consumer of the raw reserve/commit
//! primitives: it uses `bedrock-vm` directly and does not involve the
//! arena allocator at all.
//!
//! This crate contains `unsafe` code: the element reads/writes at the
//! bottom of `vec.rs` are the single place offsets become memory.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod vec;

pub use vec::VmVec;
