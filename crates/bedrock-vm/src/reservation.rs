//! Owned address-range reservations with page-granular commit.

use std::ptr::NonNull;

use crate::align::{align_down, align_up};
use crate::error::VmError;
use crate::sys;

/// An owned range of reserved virtual address space.
///
/// Reserving claims addresses only — no physical memory is consumed until
/// a sub-range is committed with [`Reservation::commit`]. Committed pages
/// read as zero on first touch. Dropping the reservation decommits and
/// releases the entire range in one step, after which the base address is
/// invalid for any use.
///
/// Offsets are relative to [`Reservation::base`]; this type never hands
/// out references into the range itself. Turning `(reservation, offset)`
/// pairs into memory accesses is the business of exactly one module per
/// consumer crate, which keeps the unsafe surface narrow.
pub struct Reservation {
    base: NonNull<u8>,
    size: usize,
}

// SAFETY: a Reservation is an immutable description of an owned address
// range. The OS calls issued through it are thread-safe, and it hands out
// no references, so sharing the description across threads is sound.
unsafe impl Send for Reservation {}
unsafe impl Sync for Reservation {}

impl Reservation {
    /// Reserve `size` bytes of address space wherever the OS likes.
    pub fn reserve(size: usize) -> Result<Self, VmError> {
        Self::reserve_at(None, size)
    }

    /// Reserve `size` bytes of address space, preferring `hint`.
    ///
    /// The hint is advisory: the OS may place the mapping elsewhere.
    /// Callers that need the exact address must compare
    /// [`Reservation::base`] against the hint themselves.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn reserve_at(hint: Option<NonNull<u8>>, size: usize) -> Result<Self, VmError> {
        assert!(size > 0, "cannot reserve an empty address range");
        match sys::reserve(hint, size) {
            Some(base) => Ok(Self { base, size }),
            None => Err(VmError::ReserveFailed {
                size,
                code: last_os_code(),
            }),
        }
    }

    /// Reserve and immediately commit `size` bytes.
    ///
    /// Convenience for consumers that want plain zeroed memory without
    /// lazy paging.
    pub fn alloc(size: usize) -> Result<Self, VmError> {
        let reservation = Self::reserve(size)?;
        reservation.commit(0, size)?;
        Ok(reservation)
    }

    /// Base address of the reserved range.
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Size of the reserved range in bytes, as requested at creation.
    pub fn len(&self) -> usize {
        self.size
    }

    /// `true` if the reservation covers no bytes. Never true in practice —
    /// empty reservations are rejected at creation.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Commit `[offset, offset + len)` so it is readable, writable, and
    /// zero on first touch. Idempotent on already-committed pages.
    ///
    /// The underlying OS primitive works on whole pages, so the start is
    /// rounded down and the end rounded up to page boundaries, plus one
    /// extra trailing page of slack to cover boundary edge cases; the
    /// result is clamped to the mapped range. Committing never backs
    /// fewer bytes than requested.
    ///
    /// # Panics
    ///
    /// Panics if the requested range does not lie inside the reservation.
    pub fn commit(&self, offset: usize, len: usize) -> Result<(), VmError> {
        if len == 0 {
            return Ok(());
        }
        let end = self.checked_range(offset, len);

        let page = sys::page_size();
        let mapped_end = align_up(self.size, page);
        let commit_start = align_down(offset, page);
        let commit_end = align_up(end, page).saturating_add(page).min(mapped_end);

        if sys::commit(self.ptr_at(commit_start), commit_end - commit_start) {
            Ok(())
        } else {
            Err(VmError::CommitFailed {
                offset,
                len,
                code: last_os_code(),
            })
        }
    }

    /// Return the physical pages of `[offset, offset + len)` to the OS,
    /// keeping the address range reserved. Reads from the range before a
    /// re-commit are invalid and will fault.
    ///
    /// Only whole pages fully inside the requested range are decommitted
    /// (start rounded up, end rounded down), so bytes outside the request
    /// are never affected. A request spanning less than one full page is
    /// a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the requested range does not lie inside the reservation.
    pub fn decommit(&self, offset: usize, len: usize) -> Result<(), VmError> {
        let end = self.checked_range(offset, len);

        let page = sys::page_size();
        let decommit_start = align_up(offset, page);
        let decommit_end = align_down(end, page);
        if decommit_start >= decommit_end {
            return Ok(());
        }

        if sys::decommit(self.ptr_at(decommit_start), decommit_end - decommit_start) {
            Ok(())
        } else {
            Err(VmError::DecommitFailed {
                offset,
                len,
                code: last_os_code(),
            })
        }
    }

    /// Validate `[offset, offset + len)` against the reservation and
    /// return the exclusive end offset.
    fn checked_range(&self, offset: usize, len: usize) -> usize {
        let end = offset
            .checked_add(len)
            .unwrap_or_else(|| panic!("range overflow: offset {offset} + len {len}"));
        assert!(
            end <= self.size,
            "range [{offset}, {end}) outside reservation of {} bytes",
            self.size
        );
        end
    }

    fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.size);
        // SAFETY: offset was validated against the mapped range.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        // Decommit then release, mirroring the two-step teardown of the
        // underlying primitives. Decommit failure is irrelevant here —
        // release invalidates the whole range regardless.
        let mapped = align_up(self.size, sys::page_size());
        sys::decommit(self.base, mapped);
        sys::release(self.base, self.size);
    }
}

impl std::fmt::Debug for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reservation")
            .field("base", &self.base)
            .field("size", &self.size)
            .finish()
    }
}

fn last_os_code() -> Option<i32> {
    std::io::Error::last_os_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{kib, mib};

    /// View a committed sub-range as a byte slice. Test-only.
    fn committed_slice(res: &Reservation, offset: usize, len: usize) -> &mut [u8] {
        assert!(offset + len <= res.len());
        // SAFETY: tests only call this on ranges they have committed.
        unsafe { std::slice::from_raw_parts_mut(res.base().as_ptr().add(offset), len) }
    }

    #[test]
    fn reserve_commit_readback_zero() {
        let res = Reservation::reserve(mib(8)).unwrap();
        res.commit(0, kib(12)).unwrap();

        let buf = committed_slice(&res, 0, kib(12));
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn commit_is_idempotent_and_preserves_contents() {
        let res = Reservation::reserve(mib(1)).unwrap();
        res.commit(0, kib(4)).unwrap();

        committed_slice(&res, 0, kib(4)).fill(b'a');
        res.commit(0, kib(4)).unwrap();
        assert!(committed_slice(&res, 0, kib(4)).iter().all(|&b| b == b'a'));
    }

    #[test]
    fn commit_covers_unaligned_interior_ranges() {
        let res = Reservation::reserve(mib(1)).unwrap();
        // Straddles a page boundary on every page size we run on.
        res.commit(4000, 300).unwrap();

        let buf = committed_slice(&res, 4000, 300);
        buf.fill(0xFF);
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn commit_at_the_very_end_of_the_reservation() {
        // The one-page slack must clamp to the mapping instead of
        // running past it.
        let res = Reservation::reserve(kib(4)).unwrap();
        res.commit(0, kib(4)).unwrap();

        let buf = committed_slice(&res, 0, kib(4));
        buf[kib(4) - 1] = 7;
        assert_eq!(buf[kib(4) - 1], 7);
    }

    #[test]
    fn alloc_is_reserve_plus_commit() {
        let res = Reservation::alloc(kib(12)).unwrap();
        let buf = committed_slice(&res, 0, kib(12));
        assert!(buf.iter().all(|&b| b == 0));
        buf[0] = 1;
    }

    #[test]
    fn reserve_at_is_advisory() {
        // 256 GiB — far outside any mapping this test process owns.
        let hint = NonNull::new(0x40_0000_0000usize as *mut u8);
        let res = Reservation::reserve_at(hint, mib(1)).unwrap();
        // Whether or not the kernel honored the hint, the reservation
        // must be usable.
        res.commit(0, kib(4)).unwrap();
        committed_slice(&res, 0, kib(4))[0] = 1;
    }

    #[test]
    fn decommit_then_recommit_reads_zero() {
        let res = Reservation::reserve(mib(1)).unwrap();
        res.commit(0, kib(8)).unwrap();
        committed_slice(&res, 0, kib(8)).fill(b'x');

        res.decommit(0, kib(8)).unwrap();
        res.commit(0, kib(8)).unwrap();
        assert!(committed_slice(&res, 0, kib(8)).iter().all(|&b| b == 0));
    }

    #[test]
    fn sub_page_decommit_is_a_noop() {
        let res = Reservation::reserve(mib(1)).unwrap();
        res.commit(0, kib(8)).unwrap();
        committed_slice(&res, 0, 100).fill(b'y');

        // Less than a full page inside the range: nothing decommitted.
        res.decommit(64, 128).unwrap();
        assert!(committed_slice(&res, 0, 100).iter().all(|&b| b == b'y'));
    }

    #[test]
    #[should_panic(expected = "outside reservation")]
    fn commit_out_of_range_panics() {
        let res = Reservation::reserve(kib(4)).unwrap();
        let _ = res.commit(0, kib(8));
    }

    #[test]
    #[should_panic(expected = "empty address range")]
    fn reserving_zero_bytes_panics() {
        let _ = Reservation::reserve(0);
    }
}
