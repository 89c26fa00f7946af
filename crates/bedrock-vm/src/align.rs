//! Power-of-two alignment arithmetic and size constructors.

/// `true` if `x` is a power of two. Zero is not a power of two.
pub const fn is_pow2(x: usize) -> bool {
    x != 0 && x & (x - 1) == 0
}

/// Round `x` up to the next multiple of `align`.
///
/// `align` must be a power of two. `align_up(12, 16) == 16`,
/// `align_up(16, 16) == 16`.
pub const fn align_up(x: usize, align: usize) -> usize {
    debug_assert!(is_pow2(align));
    (x + align - 1) & !(align - 1)
}

/// Round `x` down to the previous multiple of `align`.
///
/// `align` must be a power of two. `align_down(18, 16) == 16`.
pub const fn align_down(x: usize, align: usize) -> usize {
    debug_assert!(is_pow2(align));
    x & !(align - 1)
}

/// `n` kibibytes in bytes.
pub const fn kib(n: usize) -> usize {
    n * 1024
}

/// `n` mebibytes in bytes.
pub const fn mib(n: usize) -> usize {
    kib(n) * 1024
}

/// `n` gibibytes in bytes.
pub const fn gib(n: usize) -> usize {
    mib(n) * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow2_detection() {
        assert!(is_pow2(1));
        assert!(is_pow2(16));
        assert!(is_pow2(4096));
        assert!(!is_pow2(0));
        assert!(!is_pow2(18));
    }

    #[test]
    fn align_up_rounds_to_next_boundary() {
        assert_eq!(align_up(12, 16), 16);
        assert_eq!(align_up(18, 16), 32);
        assert_eq!(align_up(34, 32), 64);
        assert_eq!(align_up(32, 32), 32);
        assert_eq!(align_up(0, 16), 0);
    }

    #[test]
    fn align_down_rounds_to_previous_boundary() {
        assert_eq!(align_down(34, 32), 32);
        assert_eq!(align_down(31, 32), 0);
        assert_eq!(align_down(64, 32), 64);
    }

    #[test]
    fn adjacent_page_boundaries_are_one_page_apart() {
        let page = crate::page_size();
        let addr = 49_802_293usize;
        assert_eq!(align_up(addr, page) - align_down(addr, page), page);
        assert!(align_up(addr, page) > addr);
        assert!(align_down(addr, page) < addr);
    }

    #[test]
    fn size_constructors() {
        assert_eq!(kib(4), 4096);
        assert_eq!(mib(1), 1024 * 1024);
        assert_eq!(gib(2), 2 * 1024 * 1024 * 1024);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn align_up_is_the_least_aligned_value_not_below_x(
                x in 0usize..1 << 40,
                shift in 0u32..16,
            ) {
                let align = 1usize << shift;
                let up = align_up(x, align);
                prop_assert!(up >= x);
                prop_assert_eq!(up % align, 0);
                prop_assert!(up - x < align);
            }

            #[test]
            fn align_down_is_the_greatest_aligned_value_not_above_x(
                x in 0usize..1 << 40,
                shift in 0u32..16,
            ) {
                let align = 1usize << shift;
                let down = align_down(x, align);
                prop_assert!(down <= x);
                prop_assert_eq!(down % align, 0);
                prop_assert!(x - down < align);
            }

            #[test]
            fn aligned_values_are_fixed_points(
                x in 0usize..1 << 40,
                shift in 0u32..16,
            ) {
                let align = 1usize << shift;
                let up = align_up(x, align);
                prop_assert_eq!(align_up(up, align), up);
                prop_assert_eq!(align_down(up, align), up);
            }
        }
    }
}
