//! Shared helpers for the bedrock benchmarks.

use bedrock_arena::Arena;

/// Push `count` allocations of `size` bytes and return the final
/// position, touching the first byte of each so the commit is real.
pub fn fill(arena: &mut Arena, count: usize, size: usize) -> usize {
    for _ in 0..count {
        let (_, buf) = arena.push(size);
        if let Some(first) = buf.first_mut() {
            *first = 1;
        }
    }
    arena.pos()
}
