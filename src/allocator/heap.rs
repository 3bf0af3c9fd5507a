/*
 * allocator/heap.rs - Heap Lifecycle (C6)
 *
 * Owns the backend, the epilogue location, and the segregated index, and
 * implements the allocator's two public entry points (`allocate`/`release`)
 * on top of C1-C5. Growth happens in fixed-size chunks and always reuses
 * the coalescer so a grown region can merge with whatever free block used
 * to sit at the old heap tail.
 */

use core::ptr::NonNull;

use crate::backend::HeapBackend;
use crate::config::{self, CHUNK_SIZE, WORD};
use crate::error::OutOfMemory;

use super::block;
use super::coalesce;
use super::freelist::FreeLists;
use super::placement;

pub struct Heap<B: HeapBackend> {
    backend: B,
    epilogue: usize,
    lists: FreeLists,
}

impl<B: HeapBackend> Heap<B> {
    /// Lays down the prologue/epilogue sentinels and performs the first
    /// chunk-sized growth so `allocate` has somewhere to place blocks.
    pub fn init(mut backend: B) -> Result<Self, OutOfMemory> {
        let base = backend.extend(2 * WORD)?;
        block::write_sentinel(base, true);
        let epilogue = base + WORD;
        block::write_sentinel(epilogue, true);

        let mut heap = Heap { backend, epilogue, lists: FreeLists::new() };
        heap.extend(CHUNK_SIZE)?;
        Ok(heap)
    }

    /// Grows the heap by (at least) `n` bytes, reusing the old epilogue
    /// word as the header of a new free block that also covers the freshly
    /// committed bytes, and reinstalling the epilogue at the new tail.
    /// Coalesces with whatever free block used to precede the old epilogue.
    fn extend(&mut self, n: usize) -> Result<(), OutOfMemory> {
        let n = config::round_up_alignment(n);
        let region = self.backend.extend(n)?;
        debug_assert_eq!(region, self.epilogue + WORD);

        let old_epilogue = self.epilogue;
        let prev_alloc = block::prev_alloc(old_epilogue);
        let block_size = n + WORD;
        block::write_free(old_epilogue, block_size, prev_alloc);

        let new_epilogue = old_epilogue + block_size;
        block::write_sentinel(new_epilogue, false);
        self.epilogue = new_epilogue;

        coalesce::release(&mut self.lists, old_epilogue);
        log::debug!("heap extended by {n} bytes, new top at {new_epilogue:#x}");
        Ok(())
    }

    /// Services a client allocation request of `s` bytes. Returns `None`
    /// for `s == 0` or if the backend refuses to grow far enough.
    pub fn allocate(&mut self, s: usize) -> Option<NonNull<u8>> {
        if s == 0 {
            return None;
        }
        let asize = config::adjust_size(s);

        loop {
            if let Some(addr) = placement::find_fit(&self.lists, asize) {
                let allocated = placement::place(&mut self.lists, addr, asize);
                log::trace!("allocate({s}) -> block {allocated:#x} size {asize}");
                let payload = allocated + WORD;
                return NonNull::new(payload as *mut u8);
            }
            let growth = core::cmp::max(asize, CHUNK_SIZE);
            if self.extend(growth).is_err() {
                log::warn!("allocate({s}): out of memory");
                return None;
            }
        }
    }

    /// Releases a block previously returned by `allocate`/`resize`/`zallocate`.
    pub fn release(&mut self, ptr: NonNull<u8>) {
        let block_addr = ptr.as_ptr() as usize - WORD;
        log::trace!("release: block {block_addr:#x}");
        coalesce::release(&mut self.lists, block_addr);
    }

    /// Number of payload bytes usable through `ptr` (the block's size minus
    /// its one header word).
    pub fn payload_size(&self, ptr: NonNull<u8>) -> usize {
        let block_addr = ptr.as_ptr() as usize - WORD;
        block::size_of_block(block_addr) - WORD
    }

    pub fn heap_start(&self) -> usize {
        self.backend.base()
    }

    pub fn heap_end(&self) -> usize {
        self.backend.top()
    }

    pub(super) fn lists(&self) -> &FreeLists {
        &self.lists
    }
}
