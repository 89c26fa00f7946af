//! Virtual-memory-backed bump arenas with lazy commit and sub-arena carving.
//!
//! An [`Arena`] reserves a large range of address space up front and backs
//! it with physical memory only as allocations advance past the previously
//! committed boundary. Reclaim is wholesale: roll the cursor back with a
//! pop, or drop the arena. There is no per-object free and no relocation,
//! so offsets handed out by [`Arena::push`] stay valid for the arena's
//! whole lifetime.
//!
//! # Architecture
//!
//! ```text
//! Arena (owned handle, one logical owner)
//! ├── Arc<Reservation>    root address range (bedrock-vm)
//! ├── Header              #[repr(C)], stored at the base of its own range
//! │     position · commit cursor · capacity · depth · flags
//! └── carve list          position ranges transferred to sub-arenas
//! ```
//!
//! A sub-arena is carved out of its parent's reserved-but-uncommitted
//! space and manages its own commit cursor from then on, so a multi-
//! gigabyte root reservation costs nothing in physical memory until the
//! carved subsystems actually allocate.
//!
//! # Safety
//!
//! All `unsafe` code in this crate lives in the `raw` module, the single
//! place where arena-relative offsets become memory accesses. The rest
//! of the crate is `#![deny(unsafe_code)]`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod budget;
pub mod config;
mod raw;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ARENA_HEADER_SIZE};
pub use bedrock_vm::VmError;
pub use budget::{MemoryPlan, PlannedArenas};
pub use config::{ArenaConfig, CheckMode};
