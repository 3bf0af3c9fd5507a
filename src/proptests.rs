/*
 * proptests.rs - Property Tests for the Allocate/Release/Resize Laws
 *
 * Exercises arbitrary interleavings of allocate, release, and resize against
 * the real allocator core, checking the two Laws from spec §8:
 *
 * - Allocate/release round trip: a live allocation's payload never changes
 *   underneath it because of an unrelated operation, and the heap's
 *   invariants (checked via `Allocator::check`) hold after every step.
 * - Resize preservation: `resize(p, s)` preserves the first
 *   `min(s, old_payload_size)` bytes of `p`'s payload bit-for-bit.
 *
 * Host-only: runs against `VecArena`, never the kernel's fixed arena.
 */

use core::cmp::min;
use core::ptr::NonNull;

use proptest::prelude::*;

use crate::allocator::Allocator;
use crate::backend::VecArena;
use crate::resize;

#[derive(Debug, Clone, Copy)]
enum Op {
    Alloc(usize),
    Free(usize),
    Resize(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..=512).prop_map(Op::Alloc),
        (0usize..32).prop_map(Op::Free),
        (0usize..32, 1usize..=512).prop_map(|(i, s)| Op::Resize(i, s)),
    ]
}

struct Live {
    ptr: NonNull<u8>,
    capacity: usize,
    pattern: u8,
}

fn fill(ptr: NonNull<u8>, len: usize, pattern: u8) {
    unsafe { core::ptr::write_bytes(ptr.as_ptr(), pattern, len) };
}

fn matches(ptr: NonNull<u8>, len: usize, pattern: u8) -> bool {
    let bytes = unsafe { core::slice::from_raw_parts(ptr.as_ptr(), len) };
    bytes.iter().all(|&b| b == pattern)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn allocate_release_resize_preserve_live_content(
        ops in proptest::collection::vec(op_strategy(), 0..200)
    ) {
        let mut allocator = Allocator::new(VecArena::new(16 << 20)).unwrap();
        let mut live: std::vec::Vec<Live> = std::vec::Vec::new();
        let mut next_pattern: u8 = 1;

        for op in ops {
            match op {
                Op::Alloc(s) => {
                    if let Some(ptr) = allocator.allocate(s) {
                        let capacity = allocator.payload_size(ptr);
                        let pattern = next_pattern;
                        next_pattern = next_pattern.wrapping_add(1);
                        fill(ptr, capacity, pattern);
                        live.push(Live { ptr, capacity, pattern });
                    }
                }
                Op::Free(idx) => {
                    if !live.is_empty() {
                        let i = idx % live.len();
                        let entry = live.remove(i);
                        allocator.release(entry.ptr);
                    }
                }
                Op::Resize(idx, s) => {
                    if !live.is_empty() {
                        let i = idx % live.len();
                        let old_capacity = live[i].capacity;
                        let old_pattern = live[i].pattern;
                        let old_ptr = live[i].ptr;
                        if let Some(new_ptr) = resize::resize(&mut allocator, Some(old_ptr), s) {
                            let expect_len = min(s, old_capacity);
                            prop_assert!(matches(new_ptr, expect_len, old_pattern));

                            let capacity = allocator.payload_size(new_ptr);
                            let pattern = next_pattern;
                            next_pattern = next_pattern.wrapping_add(1);
                            fill(new_ptr, capacity, pattern);
                            live[i] = Live { ptr: new_ptr, capacity, pattern };
                        } else {
                            // `resize` only returns None here on out-of-memory,
                            // since the strategy never asks for size 0.
                            live.remove(i);
                        }
                    }
                }
            }

            for entry in &live {
                prop_assert!(matches(entry.ptr, entry.capacity, entry.pattern));
            }
            #[cfg(debug_assertions)]
            prop_assert!(allocator.check().is_ok());
        }
    }

    #[test]
    fn repeated_equal_size_allocations_yield_equally_sized_regions(
        size in 1usize..=1024,
        count in 1usize..32,
    ) {
        let mut allocator = Allocator::new(VecArena::new(16 << 20)).unwrap();
        let mut sizes = std::vec::Vec::new();
        for _ in 0..count {
            let ptr = allocator.allocate(size).unwrap();
            sizes.push(allocator.payload_size(ptr));
        }
        prop_assert!(sizes.iter().all(|&s| s == sizes[0]));
    }
}
