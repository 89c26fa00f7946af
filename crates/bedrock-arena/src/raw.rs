//! The one narrow boundary where arena-relative offsets become memory.
//!
//! Everything else in this crate reasons about `(reservation, offset)`
//! pairs; only these functions perform pointer arithmetic and produce
//! references. Their soundness rests on two invariants upheld by
//! [`crate::Arena`]:
//!
//! - every offset passed here lies inside a committed part of the
//!   reservation, and
//! - distinct arena handles own disjoint offset ranges (the carve list
//!   keeps a parent away from bytes transferred to its sub-arenas), so
//!   no two live references alias.

#![allow(unsafe_code)]

use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use bedrock_vm::Reservation;

use crate::arena::Header;

/// Read the header stored at `offset`.
pub(crate) fn load_header(res: &Reservation, offset: usize) -> Header {
    let ptr = header_ptr(res, offset);
    // SAFETY: the header block at `offset` was committed and initialised
    // by the arena that owns it before the first load; headers of
    // distinct arenas never overlap.
    unsafe { ptr.as_ptr().read() }
}

/// Write `header` to the block at `offset`.
pub(crate) fn store_header(res: &Reservation, offset: usize, header: &Header) {
    let ptr = header_ptr(res, offset);
    // SAFETY: as for `load_header`; stores go through the single handle
    // that owns this header, so the write is unaliased.
    unsafe { ptr.as_ptr().write(*header) }
}

/// Borrow `[offset, offset + len)` as a byte slice.
pub(crate) fn slice(res: &Reservation, offset: usize, len: usize) -> &[u8] {
    bounds_check(res, offset, len);
    // SAFETY: in-bounds (asserted) and committed + initialised per the
    // module contract; shared reads of arena bytes may alias each other.
    unsafe { std::slice::from_raw_parts(res.base().as_ptr().add(offset), len) }
}

/// Borrow `[offset, offset + len)` as a mutable byte slice.
pub(crate) fn slice_mut(res: &Reservation, offset: usize, len: usize) -> &mut [u8] {
    bounds_check(res, offset, len);
    // SAFETY: in-bounds (asserted) and committed per the module contract.
    // Exclusivity comes from the arena discipline: mutable access flows
    // through `&mut Arena`, and the carve list keeps the ranges of
    // distinct handles disjoint.
    unsafe { std::slice::from_raw_parts_mut(res.base().as_ptr().add(offset), len) }
}

/// Zero `[offset, offset + len)`.
pub(crate) fn zero(res: &Reservation, offset: usize, len: usize) {
    bounds_check(res, offset, len);
    // SAFETY: as for `slice_mut`.
    unsafe { res.base().as_ptr().add(offset).write_bytes(0, len) }
}

fn header_ptr(res: &Reservation, offset: usize) -> NonNull<Header> {
    bounds_check(res, offset, size_of::<Header>());
    debug_assert_eq!(offset % align_of::<Header>(), 0);
    // SAFETY: in-bounds offset within the mapping; the base is non-null.
    unsafe { NonNull::new_unchecked(res.base().as_ptr().add(offset)).cast() }
}

fn bounds_check(res: &Reservation, offset: usize, len: usize) {
    let end = offset
        .checked_add(len)
        .unwrap_or_else(|| panic!("offset {offset} + len {len} overflows"));
    assert!(
        end <= res.len(),
        "range [{offset}, {end}) outside reservation of {} bytes",
        res.len()
    );
}
