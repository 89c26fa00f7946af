//! Bedrock: virtual-memory-backed arena allocation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the bedrock sub-crates. For most users, adding `bedrock` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use bedrock::prelude::*;
//!
//! // One root reservation, carved per subsystem. Address space is
//! // claimed up front; physical memory arrives only as pushes land.
//! let mut root = Arena::reserve(1 << 20);
//! let mut scratch = root.subarena(64 * 1024);
//!
//! let (offset, buf) = scratch.push(256);
//! assert!(buf.iter().all(|&b| b == 0));
//! buf[0] = 42;
//!
//! // Snapshot, speculate, roll back. The vacated bytes are re-zeroed.
//! let mark = scratch.pos();
//! scratch.push(1024);
//! scratch.pop_to(mark);
//! assert_eq!(scratch.pos(), mark);
//! assert_eq!(scratch.slice(offset, 1)[0], 42);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `bedrock-arena` | `Arena`, `MemoryPlan`, configuration |
//! | [`vm`] | `bedrock-vm` | `Reservation`, page size, alignment, byte helpers |
//! | [`array`] | `bedrock-array` | `VmVec`, the no-relocation growable array |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arena allocation and named-region budgeting (`bedrock-arena`).
///
/// Most users only need [`arena::Arena`] and [`arena::MemoryPlan`] from
/// this module — they are also available in the [`prelude`].
pub use bedrock_arena as arena;

/// The no-relocation growable array (`bedrock-array`).
pub use bedrock_array as array;

/// OS virtual-memory primitives (`bedrock-vm`).
///
/// Reserve/commit/decommit/release on raw address ranges, the process
/// page size, and alignment helpers. Most users never touch this layer
/// directly — the arena and array crates consume it on their behalf.
pub use bedrock_vm as vm;

/// Common imports for typical bedrock usage.
///
/// ```rust
/// use bedrock::prelude::*;
/// ```
pub mod prelude {
    // Arena allocation
    pub use bedrock_arena::{Arena, ArenaConfig, CheckMode, MemoryPlan, PlannedArenas};

    // Containers
    pub use bedrock_array::VmVec;

    // Memory primitives
    pub use bedrock_vm::{page_size, Reservation, VmError};
}
