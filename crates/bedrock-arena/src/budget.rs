//! Named-region memory budgeting.
//!
//! Applications that size their memory up front tend to carve one big
//! reservation into per-subsystem regions ("entities", "textures",
//! "network", …). [`MemoryPlan`] collects those named sizes, works out
//! the root reservation they need — including per-region bookkeeping
//! overhead — and carves one sub-arena per region in declaration order.

use indexmap::IndexMap;

use bedrock_vm::align::align_up;

use crate::arena::{Arena, ARENA_HEADER_SIZE};
use crate::VmError;

/// An ordered set of named region sizes to carve from one reservation.
#[derive(Clone, Debug, Default)]
pub struct MemoryPlan {
    regions: IndexMap<String, usize>,
}

impl MemoryPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named region of `size` usable bytes.
    ///
    /// Regions are carved in the order they are added.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or `name` was already planned — a
    /// duplicate would silently shadow the earlier region's budget.
    pub fn region(mut self, name: impl Into<String>, size: usize) -> Self {
        let name = name.into();
        assert!(size > 0, "region '{name}' has zero size");
        let previous = self.regions.insert(name.clone(), size);
        assert!(previous.is_none(), "duplicate region '{name}' in memory plan");
        self
    }

    /// Number of planned regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` if no regions have been planned.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Root capacity needed to carve every region: the sum of region
    /// sizes plus each region's header block and alignment slack.
    pub fn planned_capacity(&self) -> usize {
        self.regions
            .values()
            .map(|&size| ARENA_HEADER_SIZE + align_up(size, ARENA_HEADER_SIZE))
            .sum()
    }

    /// Reserve the root arena and carve every planned region.
    ///
    /// # Panics
    ///
    /// Panics if the plan is empty or the OS refuses the reservation;
    /// use [`MemoryPlan::try_reserve`] for the latter.
    pub fn reserve(&self) -> PlannedArenas {
        match self.try_reserve() {
            Ok(arenas) => arenas,
            Err(err) => panic!("memory plan reservation failed: {err}"),
        }
    }

    /// Fallible variant of [`MemoryPlan::reserve`].
    ///
    /// # Panics
    ///
    /// Panics if the plan is empty.
    pub fn try_reserve(&self) -> Result<PlannedArenas, VmError> {
        assert!(!self.regions.is_empty(), "memory plan has no regions");

        let mut root = Arena::try_reserve(self.planned_capacity())?;
        let mut regions = IndexMap::with_capacity(self.regions.len());
        for (name, &size) in &self.regions {
            regions.insert(name.clone(), root.subarena(size));
        }
        Ok(PlannedArenas { root, regions })
    }
}

/// The arenas produced by reserving a [`MemoryPlan`]: one root plus one
/// carved sub-arena per planned region.
#[derive(Debug)]
pub struct PlannedArenas {
    root: Arena,
    regions: IndexMap<String, Arena>,
}

impl PlannedArenas {
    /// Hand a region's arena over to its subsystem.
    ///
    /// Returns `None` if `name` was never planned or was already taken.
    pub fn take(&mut self, name: &str) -> Option<Arena> {
        self.regions.shift_remove(name)
    }

    /// The root arena the regions were carved from. Its remaining
    /// capacity is still usable for ad-hoc allocations.
    pub fn root(&self) -> &Arena {
        &self.root
    }

    /// Mutable access to the root arena.
    pub fn root_mut(&mut self) -> &mut Arena {
        &mut self.root
    }

    /// Names of the regions not yet taken, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Number of regions not yet taken.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` if every region has been taken.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
