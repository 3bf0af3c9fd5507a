/*
 * backend.rs - Lower-Level Memory Primitive
 *
 * The free-space manager (src/allocator) never touches physical memory or a
 * global Vec directly; it only ever asks a `HeapBackend` to `extend` by a
 * number of bytes. This is what lets the exact same allocator core run
 * against a fixed-address kernel arena and against a host-test arena with
 * no conditional compilation inside the core itself.
 */

use crate::error::OutOfMemory;

/// The lower boundary of the allocator core (§6): append-only growth of a
/// contiguous byte region, returning the address the new region starts at.
pub trait HeapBackend {
    /// Grows the backing region by `n` bytes and returns the address the
    /// grown region starts at (the old top-of-heap). `n` is always a
    /// positive multiple of 16 by the time the core calls this.
    fn extend(&mut self, n: usize) -> Result<usize, OutOfMemory>;

    /// Base address of the backing region. Stable for the backend's lifetime.
    fn base(&self) -> usize;

    /// Current top-of-heap address (exclusive upper bound of committed bytes).
    fn top(&self) -> usize;
}

/// A fixed physical-address arena: the bare-metal backend used by the
/// kernel binary. Mirrors the fixed `HEAP_START`/`HEAP_SIZE` region the
/// kernel's linker script reserves - growth past `capacity` is the
/// bare-metal equivalent of "physical memory exhausted".
pub struct FixedAddrArena {
    start: usize,
    capacity: usize,
    committed: usize,
}

impl FixedAddrArena {
    /// # Safety
    /// `start..start+capacity` must be a region of memory this process
    /// owns exclusively for the lifetime of the arena, with no other
    /// writer ever touching it.
    pub const unsafe fn new(start: usize, capacity: usize) -> Self {
        FixedAddrArena {
            start,
            capacity,
            committed: 0,
        }
    }
}

impl HeapBackend for FixedAddrArena {
    fn extend(&mut self, n: usize) -> Result<usize, OutOfMemory> {
        let old_top = self.start + self.committed;
        if self.committed.checked_add(n).is_none_or(|c| c > self.capacity) {
            return Err(OutOfMemory);
        }
        self.committed += n;
        Ok(old_top)
    }

    fn base(&self) -> usize {
        self.start
    }

    fn top(&self) -> usize {
        self.start + self.committed
    }
}

/// A host-only arena backed by a single upfront heap allocation, explicitly
/// requested at 16-byte alignment (not a growable `Vec<u8>`): pointers
/// handed out by the allocator core are derived from this buffer's address
/// and must stay valid for the arena's lifetime, which a reallocating `Vec`
/// cannot guarantee across pushes. Mirrors the plain byte-buffer test pools
/// used by ecosystem allocators such as `rlsf` and `linked_list_allocator`.
#[cfg(any(test, feature = "std-test-arena"))]
pub struct VecArena {
    ptr: *mut u8,
    capacity: usize,
    committed: usize,
}

#[cfg(any(test, feature = "std-test-arena"))]
impl VecArena {
    /// `alloc::vec![0u8; capacity].into_boxed_slice()` only guarantees
    /// byte alignment - not enough, since §3 invariant 1 requires `H_lo`
    /// itself to be 16-byte aligned. Allocates through the global allocator
    /// with an explicit 16-byte-aligned `Layout` instead.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            return VecArena { ptr: core::ptr::NonNull::dangling().as_ptr(), capacity: 0, committed: 0 };
        }
        let layout = core::alloc::Layout::from_size_align(capacity, 16)
            .expect("capacity too large to align to 16 bytes");
        let ptr = unsafe { alloc::alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            alloc::alloc::handle_alloc_error(layout);
        }
        VecArena { ptr, capacity, committed: 0 }
    }
}

#[cfg(any(test, feature = "std-test-arena"))]
impl HeapBackend for VecArena {
    fn extend(&mut self, n: usize) -> Result<usize, OutOfMemory> {
        let old_top = self.base() + self.committed;
        if self.committed.checked_add(n).is_none_or(|c| c > self.capacity) {
            return Err(OutOfMemory);
        }
        self.committed += n;
        Ok(old_top)
    }

    fn base(&self) -> usize {
        self.ptr as usize
    }

    fn top(&self) -> usize {
        self.base() + self.committed
    }
}

#[cfg(any(test, feature = "std-test-arena"))]
impl Drop for VecArena {
    fn drop(&mut self) {
        if self.capacity != 0 {
            let layout = core::alloc::Layout::from_size_align(self.capacity, 16).unwrap();
            unsafe { alloc::alloc::dealloc(self.ptr, layout) };
        }
    }
}
