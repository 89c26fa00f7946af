//! Arena configuration parameters.

/// Configuration for reserving an arena.
///
/// Immutable after the arena is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Usable capacity of the arena in bytes. The reservation itself is
    /// [`crate::ARENA_HEADER_SIZE`] bytes larger to hold the arena's own
    /// bookkeeping.
    pub capacity: usize,

    /// Whether misuse preconditions are checked in every build or only
    /// under `debug_assertions`.
    pub checks: CheckMode,
}

impl ArenaConfig {
    /// Default reservation size for the convenience constructors: 4 MiB.
    pub const DEFAULT_CAPACITY: usize = 4 * 1024 * 1024;

    /// Create a config for the given capacity with checks enabled.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            checks: CheckMode::Checked,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// How strictly an arena validates misuse preconditions.
///
/// This replaces the build-type switch of a C-style `ASSERT` macro with a
/// configuration the caller constructs explicitly. Checks that guard
/// memory safety itself — capacity exhaustion and slice bounds — are
/// never elided in either mode; `Unchecked` only demotes the misuse
/// diagnostics (pop bounds, pop underflow) to `debug_assert!`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckMode {
    /// Misuse preconditions panic with a diagnostic in every build.
    #[default]
    Checked,
    /// Misuse preconditions are checked only under `debug_assertions`;
    /// release builds clamp instead of panicking.
    Unchecked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_4_mib() {
        assert_eq!(ArenaConfig::default().capacity, 4 * 1024 * 1024);
    }

    #[test]
    fn checks_default_to_checked() {
        assert_eq!(ArenaConfig::new(1024).checks, CheckMode::Checked);
        assert_eq!(CheckMode::default(), CheckMode::Checked);
    }
}
