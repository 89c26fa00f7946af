//! Raw OS bindings, one implementation per target family.
//!
//! Unix reserves with `mmap(PROT_NONE)` and commits by flipping page
//! protection with `mprotect`; Windows uses the native
//! reserve/commit split of `VirtualAlloc`. Callers are expected to pass
//! page-aligned ranges that lie inside a live reservation —
//! [`crate::Reservation`] is the only caller and upholds that.

use std::ptr::NonNull;
use std::sync::OnceLock;

#[cfg(windows)]
use std::ffi::c_void;

/// OS page granularity in bytes, queried once and then treated as a
/// constant for the process lifetime.
pub fn page_size() -> usize {
    static PAGE: OnceLock<usize> = OnceLock::new();
    *PAGE.get_or_init(page_size_raw)
}

#[cfg(unix)]
fn page_size_raw() -> usize {
    // SAFETY: sysconf reads a system constant and touches no memory of ours.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    assert!(size > 0, "sysconf(_SC_PAGESIZE) returned {size}");
    size as usize
}

/// Claim `size` bytes of address space without physical backing.
///
/// `hint` is advisory: the kernel may place the mapping elsewhere, so
/// callers that care must compare the returned address themselves.
/// Returns `None` if the OS refuses.
#[cfg(unix)]
pub(crate) fn reserve(hint: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
    let addr = hint.map_or(std::ptr::null_mut(), |p| p.as_ptr().cast());
    // SAFETY: an anonymous private PROT_NONE mapping aliases nothing and
    // grants no access until committed. The hint address is advisory
    // (no MAP_FIXED), so existing mappings are never clobbered.
    let mem = unsafe {
        libc::mmap(
            addr,
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if mem == libc::MAP_FAILED {
        return None;
    }
    NonNull::new(mem.cast())
}

/// Back `[ptr, ptr + size)` with zero-filled physical memory.
///
/// Idempotent on already-committed pages. `ptr` must be page-aligned and
/// the range must lie inside a live reservation.
#[cfg(unix)]
pub(crate) fn commit(ptr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: mprotect only changes protections of pages the caller owns;
    // Reservation::commit validates the range before calling.
    unsafe { libc::mprotect(ptr.as_ptr().cast(), size, libc::PROT_READ | libc::PROT_WRITE) == 0 }
}

/// Return the physical pages of `[ptr, ptr + size)` to the OS, keeping
/// the address range reserved. Reads before a re-commit will fault.
#[cfg(unix)]
pub(crate) fn decommit(ptr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: same ownership contract as `commit`.
    unsafe {
        if libc::mprotect(ptr.as_ptr().cast(), size, libc::PROT_NONE) != 0 {
            return false;
        }
        // Drop the physical pages so a later commit observes fresh zeroes.
        // Best-effort: the protection flip above already enforces faulting.
        libc::madvise(ptr.as_ptr().cast(), size, libc::MADV_DONTNEED);
        true
    }
}

/// Give the address-space reservation back entirely. `ptr` is invalid
/// for any use afterwards.
#[cfg(unix)]
pub(crate) fn release(ptr: NonNull<u8>, size: usize) {
    // SAFETY: called exactly once per reservation, from Reservation::drop.
    unsafe {
        libc::munmap(ptr.as_ptr().cast(), size);
    }
}

#[cfg(windows)]
fn page_size_raw() -> usize {
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    // SAFETY: GetSystemInfo fills in the struct we hand it.
    let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };
    info.dwPageSize as usize
}

/// Claim `size` bytes of address space without physical backing.
///
/// `hint` is advisory; callers that care must compare the returned
/// address themselves. Returns `None` if the OS refuses.
#[cfg(windows)]
pub(crate) fn reserve(hint: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
    use windows_sys::Win32::System::Memory::{VirtualAlloc, MEM_RESERVE, PAGE_READWRITE};

    let addr: *const c_void = hint.map_or(std::ptr::null(), |p| p.as_ptr().cast_const().cast());
    // SAFETY: MEM_RESERVE claims address space only; VirtualAlloc fails
    // rather than clobbering when the hinted range is taken.
    let mem = unsafe { VirtualAlloc(addr, size, MEM_RESERVE, PAGE_READWRITE) };
    NonNull::new(mem.cast())
}

/// Back `[ptr, ptr + size)` with zero-filled physical memory.
///
/// Idempotent on already-committed pages. The range must lie inside a
/// live reservation.
#[cfg(windows)]
pub(crate) fn commit(ptr: NonNull<u8>, size: usize) -> bool {
    use windows_sys::Win32::System::Memory::{VirtualAlloc, MEM_COMMIT, PAGE_READWRITE};

    // SAFETY: committing inside our own reservation; validated by the caller.
    let mem = unsafe { VirtualAlloc(ptr.as_ptr().cast(), size, MEM_COMMIT, PAGE_READWRITE) };
    !mem.is_null()
}

/// Return the physical pages of `[ptr, ptr + size)` to the OS, keeping
/// the address range reserved. Reads before a re-commit will fault.
#[cfg(windows)]
pub(crate) fn decommit(ptr: NonNull<u8>, size: usize) -> bool {
    use windows_sys::Win32::System::Memory::{VirtualFree, MEM_DECOMMIT};

    // SAFETY: decommitting inside our own reservation; validated by the caller.
    unsafe { VirtualFree(ptr.as_ptr().cast(), size, MEM_DECOMMIT) != 0 }
}

/// Give the address-space reservation back entirely. `ptr` is invalid
/// for any use afterwards.
#[cfg(windows)]
pub(crate) fn release(ptr: NonNull<u8>, _size: usize) {
    use windows_sys::Win32::System::Memory::{VirtualFree, MEM_RELEASE};

    // SAFETY: called exactly once per reservation, from Reservation::drop.
    // Size must be 0 when releasing on Windows.
    unsafe {
        VirtualFree(ptr.as_ptr().cast(), 0, MEM_RELEASE);
    }
}
