//! The arena allocator: reserve, push, pop, carve, free.
//!
//! An arena is self-describing: its bookkeeping lives in a fixed-size
//! header block at the base of the very range it manages, and the public
//! [`Arena`] type is an owned handle to that header. Callers only ever
//! see arena-relative offsets; the header co-location is invisible.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use bedrock_vm::align::align_up;
use bedrock_vm::{Reservation, VmError};

use crate::config::{ArenaConfig, CheckMode};
use crate::raw;

/// Size of the bookkeeping block reserved in front of an arena's usable
/// range. Carving a sub-arena consumes this much of the parent on top of
/// the requested capacity (plus alignment slack below this constant).
pub const ARENA_HEADER_SIZE: usize = 64;

const FLAG_ROOT: u32 = 1 << 0;
const FLAG_CHECKED: u32 = 1 << 1;

/// On-range bookkeeping, stored at the base of the range it describes.
///
/// All cursors are relative to the arena's data base (the first byte
/// after the header block).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct Header {
    /// Bytes allocated so far. Monotonic between pops.
    pos: u64,
    /// Commit high-water mark. Never decreases for the arena's lifetime.
    commit: u64,
    /// Usable capacity in bytes (excludes the header block).
    cap: u64,
    /// Diagnostic: total bytes committed for this arena's own pushes.
    committed_total: u64,
    /// Nesting level relative to the root arena.
    depth: u32,
    flags: u32,
}

const _: () = assert!(std::mem::size_of::<Header>() <= ARENA_HEADER_SIZE);

/// A virtual-memory-backed bump allocator.
///
/// Reserving an arena claims address space without physical backing;
/// pushes advance a position cursor and commit pages lazily as the
/// cursor first passes into new territory. The only reclaim operations
/// are rolling the cursor back ([`Arena::pop_to`], [`Arena::pop_by`])
/// and tearing the whole arena down. Nothing ever moves, so an offset
/// returned by [`Arena::push`] addresses the same bytes forever.
///
/// # Ownership and threading
///
/// An `Arena` is a single-owner handle: it is not `Clone`, and every
/// mutating operation takes `&mut self`. It may be *moved* to another
/// thread — distinct sub-arenas of one root can live on distinct
/// threads — but one arena is never shared between two owners.
///
/// # Failure policy
///
/// Running out of capacity is a contract violation, not a runtime
/// condition: the arena never resizes or relocates, so callers size the
/// reservation once and the allocator panics with a diagnostic if that
/// sizing was wrong. OS-level failure to reserve or commit is treated
/// the same way (there is no fallback allocation strategy); callers that
/// can degrade gracefully use [`Arena::try_reserve`].
pub struct Arena {
    backing: Arc<Reservation>,
    /// Offset of this arena's header block within `backing`.
    header_offset: usize,
    /// Position ranges transferred to sub-arenas, in carve order. The
    /// parent may never again touch bytes inside these ranges.
    carves: Vec<Range<usize>>,
}

impl Arena {
    /// Reserve a root arena with `capacity` usable bytes.
    ///
    /// Commits only the header block; physical memory for the usable
    /// range arrives lazily as pushes advance.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses the reservation — see the failure policy
    /// above. Use [`Arena::try_reserve`] to handle that case.
    pub fn reserve(capacity: usize) -> Self {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Reserve a root arena of [`ArenaConfig::DEFAULT_CAPACITY`] bytes.
    pub fn reserve_default() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Reserve a root arena described by `config`.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses the reservation.
    pub fn with_config(config: ArenaConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(arena) => arena,
            Err(err) => panic!("arena reservation failed: {err}"),
        }
    }

    /// Fallible variant of [`Arena::reserve`].
    pub fn try_reserve(capacity: usize) -> Result<Self, VmError> {
        Self::try_with_config(ArenaConfig::new(capacity))
    }

    /// Fallible variant of [`Arena::with_config`].
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero; an empty arena is a
    /// programming error, not an environmental one.
    pub fn try_with_config(config: ArenaConfig) -> Result<Self, VmError> {
        assert!(config.capacity > 0, "arena capacity must be non-zero");

        let backing = Reservation::reserve(ARENA_HEADER_SIZE + config.capacity)?;
        backing.commit(0, ARENA_HEADER_SIZE)?;

        let mut flags = FLAG_ROOT;
        if config.checks == CheckMode::Checked {
            flags |= FLAG_CHECKED;
        }
        raw::store_header(
            &backing,
            0,
            &Header {
                pos: 0,
                commit: 0,
                cap: config.capacity as u64,
                committed_total: 0,
                depth: 0,
                flags,
            },
        );

        Ok(Self {
            backing: Arc::new(backing),
            header_offset: 0,
            carves: Vec::new(),
        })
    }

    /// Bump-allocate `size` bytes.
    ///
    /// Returns the arena-relative offset of the allocation and the
    /// zero-filled buffer itself. The offset stays valid for the arena's
    /// lifetime and can be turned back into bytes with [`Arena::slice`]
    /// or [`Arena::slice_mut`], or used as a restore point for
    /// [`Arena::pop_to`].
    ///
    /// Physical memory is committed only when the position cursor first
    /// passes the commit high-water mark, and then by exactly the pushed
    /// size — page rounding happens one layer down.
    ///
    /// # Panics
    ///
    /// Panics if the push would exceed the arena's capacity, or if the
    /// OS refuses to commit.
    pub fn push(&mut self, size: usize) -> (usize, &mut [u8]) {
        let mut header = self.header();
        let pos = header.pos as usize;
        let new_pos = match pos.checked_add(size) {
            Some(p) if p <= header.cap as usize => p,
            _ => panic!(
                "arena capacity exhausted: position {pos} + push of {size} exceeds capacity {}",
                header.cap
            ),
        };
        header.pos = new_pos as u64;

        if (header.commit as usize) < new_pos {
            let commit_from = header.commit as usize;
            if let Err(err) = self.backing.commit(self.data_offset() + commit_from, size) {
                panic!("arena commit failed: {err}");
            }
            header.commit += size as u64;
            header.committed_total += size as u64;
        }
        self.store_header(&header);

        let buf = raw::slice_mut(&self.backing, self.data_offset() + pos, size);
        (pos, buf)
    }

    /// Advance the position cursor by `size` bytes without committing.
    ///
    /// The skipped range never becomes this arena's to touch — it is the
    /// carve path used by [`Arena::subarena`], which is why the commit
    /// cursor jumps past it without a syscall.
    fn place(&mut self, size: usize) -> usize {
        let mut header = self.header();
        let pos = header.pos as usize;
        let new_pos = match pos.checked_add(size) {
            Some(p) if p <= header.cap as usize => p,
            _ => panic!(
                "arena capacity exhausted: position {pos} + carve of {size} exceeds capacity {}",
                header.cap
            ),
        };
        header.pos = new_pos as u64;
        if header.commit < header.pos {
            header.commit = header.pos;
        }
        self.store_header(&header);
        pos
    }

    /// Carve `capacity` usable bytes out of this arena's remaining range
    /// and hand them over as an independent child arena.
    ///
    /// The carve itself commits nothing beyond the child's header block:
    /// the child manages its own commit cursor within the carved range.
    /// This arena's position advances permanently past the carve
    /// (capacity plus the child's header block plus alignment slack) and
    /// it may never again allocate or pop into those bytes.
    ///
    /// Dropping the child does not return address space to anyone; the
    /// whole reservation goes back to the OS when the root and every
    /// carved child are gone.
    ///
    /// # Panics
    ///
    /// Panics if the remaining capacity cannot hold the carve, or if the
    /// OS refuses to commit the child's header block.
    pub fn subarena(&mut self, capacity: usize) -> Arena {
        assert!(capacity > 0, "sub-arena capacity must be non-zero");

        let header = self.header();
        let pos = header.pos as usize;
        // Align the child's header block within the backing range.
        let aligned =
            align_up(self.data_offset() + pos, ARENA_HEADER_SIZE) - self.data_offset();
        let total = (aligned - pos) + ARENA_HEADER_SIZE + capacity;

        let carve_start = self.place(total);
        debug_assert_eq!(carve_start, pos);

        let child_header_offset = self.data_offset() + aligned;
        if let Err(err) = self.backing.commit(child_header_offset, ARENA_HEADER_SIZE) {
            panic!("sub-arena header commit failed: {err}");
        }
        raw::store_header(
            &self.backing,
            child_header_offset,
            &Header {
                pos: 0,
                commit: 0,
                cap: capacity as u64,
                committed_total: 0,
                depth: header.depth + 1,
                flags: header.flags & !FLAG_ROOT,
            },
        );

        self.carves.push(pos..pos + total);
        Arena {
            backing: Arc::clone(&self.backing),
            header_offset: child_header_offset,
            carves: Vec::new(),
        }
    }

    /// Roll the position cursor back to `pos` and zero the vacated range.
    ///
    /// `pos` is a restore point previously obtained from [`Arena::pos`]
    /// or [`Arena::push`]. A target at or beyond the current position is
    /// a no-op. Committed pages are *not* returned to the OS — the commit
    /// high-water mark never shrinks, trading footprint for pop/re-push
    /// speed.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies inside a range carved out for a sub-arena
    /// (always), or beyond the arena's capacity (in
    /// [`CheckMode::Checked`]).
    pub fn pop_to(&mut self, pos: usize) {
        let mut header = self.header();
        let current = header.pos as usize;

        if checks_enabled(&header) {
            assert!(
                pos <= header.cap as usize,
                "pop target {pos} beyond capacity {}",
                header.cap
            );
        }
        // Never elided: popping below a carve would reclaim bytes owned
        // by a sub-arena.
        let floor = self.carves.last().map_or(0, |carve| carve.end);
        assert!(
            pos >= floor,
            "pop target {pos} is below the sub-arena carve floor {floor}"
        );

        if pos < current {
            raw::zero(&self.backing, self.data_offset() + pos, current - pos);
            header.pos = pos as u64;
            self.store_header(&header);
        }
    }

    /// Roll the position cursor back by `bytes`, zeroing the vacated
    /// range. Equivalent to `pop_to(self.pos() - bytes)`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` exceeds the current position (in
    /// [`CheckMode::Checked`]; unchecked release builds clamp to zero).
    pub fn pop_by(&mut self, bytes: usize) {
        let header = self.header();
        let current = header.pos as usize;
        let target = if checks_enabled(&header) {
            current.checked_sub(bytes).unwrap_or_else(|| {
                panic!("pop of {bytes} bytes underflows position {current}")
            })
        } else {
            current.saturating_sub(bytes)
        };
        self.pop_to(target);
    }

    /// Tear the arena down.
    ///
    /// Equivalent to dropping it: a root arena's reservation is
    /// decommitted and released in one step once the root and every
    /// carved child are gone; freeing a child on its own returns nothing
    /// to the OS, because a child owns no separately releasable address
    /// space.
    pub fn free(self) {}

    /// Borrow `len` previously pushed bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the current position or overlaps
    /// bytes carved out for a sub-arena.
    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        self.check_access(offset, len);
        raw::slice(&self.backing, self.data_offset() + offset, len)
    }

    /// Mutably borrow `len` previously pushed bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the current position or overlaps
    /// bytes carved out for a sub-arena.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        self.check_access(offset, len);
        raw::slice_mut(&self.backing, self.data_offset() + offset, len)
    }

    /// Current position cursor: bytes allocated so far.
    ///
    /// Snapshot this before speculative work and restore with
    /// [`Arena::pop_to`].
    pub fn pos(&self) -> usize {
        self.header().pos as usize
    }

    /// Usable capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.header().cap as usize
    }

    /// Bytes still available for pushes and carves.
    pub fn remaining(&self) -> usize {
        let header = self.header();
        (header.cap - header.pos) as usize
    }

    /// Commit high-water mark, monotonic for the arena's lifetime.
    ///
    /// Everything this arena has allocated below the mark is physically
    /// backed. Ranges carved out for sub-arenas are skipped past without
    /// committing; backing those is the child's business.
    pub fn committed(&self) -> usize {
        self.header().commit as usize
    }

    /// Diagnostic: total bytes committed for this arena's own pushes.
    /// Carving a sub-arena commits nothing on the parent's account.
    pub fn committed_bytes(&self) -> usize {
        self.header().committed_total as usize
    }

    /// Nesting level: 0 for a root arena, parent depth + 1 for a carve.
    pub fn depth(&self) -> u32 {
        self.header().depth
    }

    /// `true` if this arena owns its reservation (was created by
    /// [`Arena::reserve`] rather than carved from a parent).
    pub fn is_root(&self) -> bool {
        self.header().flags & FLAG_ROOT != 0
    }

    /// The check mode this arena was created with.
    pub fn checks(&self) -> CheckMode {
        if self.header().flags & FLAG_CHECKED != 0 {
            CheckMode::Checked
        } else {
            CheckMode::Unchecked
        }
    }

    fn check_access(&self, offset: usize, len: usize) {
        let header = self.header();
        let end = offset
            .checked_add(len)
            .unwrap_or_else(|| panic!("offset {offset} + len {len} overflows"));
        assert!(
            end <= header.pos as usize,
            "range [{offset}, {end}) extends past position {}",
            header.pos
        );
        for carve in &self.carves {
            assert!(
                end <= carve.start || offset >= carve.end,
                "range [{offset}, {end}) overlaps sub-arena carve [{}, {})",
                carve.start,
                carve.end
            );
        }
    }

    fn header(&self) -> Header {
        raw::load_header(&self.backing, self.header_offset)
    }

    fn store_header(&self, header: &Header) {
        raw::store_header(&self.backing, self.header_offset, header);
    }

    /// Offset of the first usable byte within the backing reservation.
    fn data_offset(&self) -> usize {
        self.header_offset + ARENA_HEADER_SIZE
    }
}

fn checks_enabled(header: &Header) -> bool {
    header.flags & FLAG_CHECKED != 0 || cfg!(debug_assertions)
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("Arena")
            .field("pos", &header.pos)
            .field("commit", &header.commit)
            .field("capacity", &header.cap)
            .field("depth", &header.depth)
            .field("root", &self.is_root())
            .finish()
    }
}
