/*
 * allocator/mod.rs - Free-Space Manager
 *
 * Wires the seven components (C1-C7) into the one type the rest of the
 * crate talks to. `Allocator<B>` is generic over the heap backend so the
 * exact same block codec, placement engine, and coalescer run against a
 * fixed physical arena on real hardware and against a boxed-slice arena in
 * host tests.
 */

pub mod block;
mod check;
mod coalesce;
mod freelist;
mod heap;
mod placement;
mod walker;

use core::ptr::NonNull;

use crate::backend::HeapBackend;
use crate::error::{CheckError, OutOfMemory};

use heap::Heap;

pub struct Allocator<B: HeapBackend> {
    heap: Heap<B>,
}

impl<B: HeapBackend> Allocator<B> {
    pub fn new(backend: B) -> Result<Self, OutOfMemory> {
        Ok(Allocator { heap: Heap::init(backend)? })
    }

    /// `s == 0` returns `None`; otherwise a 16-byte-aligned pointer to at
    /// least `s` writable/readable bytes, or `None` on out-of-memory.
    pub fn allocate(&mut self, s: usize) -> Option<NonNull<u8>> {
        self.heap.allocate(s)
    }

    /// `ptr` must have been returned by `allocate`/`resize`/`zallocate` and
    /// not yet released. Releasing a dangling or foreign pointer is
    /// undefined behaviour; the allocator has no way to detect it.
    pub fn release(&mut self, ptr: NonNull<u8>) {
        self.heap.release(ptr);
    }

    /// Number of bytes available to read/write through `ptr`.
    pub fn payload_size(&self, ptr: NonNull<u8>) -> usize {
        self.heap.payload_size(ptr)
    }

    /// Verifies every invariant in the data model, debug builds only.
    #[cfg(debug_assertions)]
    pub fn check(&self) -> Result<(), CheckError> {
        let result = check::check(&self.heap);
        if let Err(e) = result {
            log::error!("consistency check failed: {e}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VecArena;
    use crate::config::CHUNK_SIZE;

    fn new_allocator(capacity: usize) -> Allocator<VecArena> {
        Allocator::new(VecArena::new(capacity)).unwrap()
    }

    #[test]
    fn s1_first_allocation_splits_initial_chunk() {
        let mut a = new_allocator(1 << 20);
        let p = a.allocate(24).unwrap();
        assert_eq!(p.as_ptr() as usize % 16, 0);
        assert_eq!(a.payload_size(p), 32 - 8);
        a.check().unwrap();
    }

    #[test]
    fn s2_release_coalesces_back_to_one_block() {
        let mut a = new_allocator(1 << 20);
        let p1 = a.allocate(24).unwrap();
        let p2 = a.allocate(24).unwrap();
        a.release(p1);
        a.release(p2);
        a.check().unwrap();
        // After both releases every free byte should be reachable as one
        // block from the remaining free lists (modulo whichever class the
        // merged size lands in) - check() already asserts index agreement,
        // so a clean pass here is itself the meaningful assertion.
    }

    #[test]
    fn s3_many_small_allocations_use_class_zero() {
        let mut a = new_allocator(1 << 20);
        let mut ptrs = ::alloc::vec::Vec::new();
        for _ in 0..128 {
            let p = a.allocate(8).unwrap();
            assert_eq!(a.payload_size(p), 8);
            ptrs.push(p);
        }
        a.check().unwrap();
    }

    #[test]
    fn s4_large_allocation_triggers_extend() {
        let mut a = new_allocator(4 * CHUNK_SIZE);
        let start = a.heap.heap_end();
        let _p = a.allocate(4000).unwrap();
        let _q = a.allocate(4000).unwrap();
        assert!(a.heap.heap_end() - start >= 4016);
        a.check().unwrap();
    }

    #[test]
    fn s6_resize_preserves_prefix() {
        let mut a = new_allocator(1 << 20);
        let p = a.allocate(16).unwrap();
        unsafe { p.as_ptr().write_bytes(0xAB, 16) };
        let q = crate::resize::resize(&mut a, Some(p), 64).unwrap();
        let q_bytes = unsafe { core::slice::from_raw_parts(q.as_ptr(), 16) };
        assert!(q_bytes.iter().all(|&b| b == 0xAB));
        a.check().unwrap();
    }

    #[test]
    fn double_allocation_never_aliases() {
        let mut a = new_allocator(1 << 20);
        let p = a.allocate(40).unwrap();
        let q = a.allocate(40).unwrap();
        assert_ne!(p, q);
        a.check().unwrap();
    }
}
