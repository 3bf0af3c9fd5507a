/*
 * allocator/check.rs - Consistency Checker (C7)
 *
 * Two independent passes: a heap walk verifying invariants 1-4 and 6, and
 * a free-list walk verifying invariants 5 and 7, cross-checked against
 * each other's count of free blocks. Only ever compiled under
 * `debug_assertions` - elided entirely from release builds.
 */

use crate::backend::HeapBackend;
use crate::config::{self, ALIGNMENT, MIN_BLOCK, NUM_CLASSES, WORD};
use crate::error::CheckError;

use super::block;
use super::heap::Heap;
use super::walker;

/// Walks the whole heap and every size class, verifying every invariant in
/// §3. Returns the first violation found, if any.
pub fn check<B: HeapBackend>(heap: &Heap<B>) -> Result<(), CheckError> {
    let heap_start = heap.heap_start();
    let heap_end = heap.heap_end();

    let prologue = heap_start;
    if block::size_of_block(prologue) != 0 || !block::is_alloc(prologue) {
        return Err(CheckError::BadPrologue);
    }
    let epilogue = heap_end - WORD;
    if block::size_of_block(epilogue) != 0 || !block::is_alloc(epilogue) {
        return Err(CheckError::BadEpilogue);
    }

    // The prologue occupies a zero-size sentinel word; real blocks start
    // immediately after it. Starting the walk at the prologue itself would
    // never advance, since its size is 0.
    let mut addr = heap_start + WORD;
    let mut prev_was_alloc = true;
    let mut heap_free_count = 0usize;

    while addr < epilogue {
        if addr % ALIGNMENT != 0 {
            return Err(CheckError::Misaligned { addr });
        }
        let size = block::size_of_block(addr);
        if size < MIN_BLOCK {
            return Err(CheckError::TooSmall { addr, size });
        }
        if block::prev_alloc(addr) != prev_was_alloc {
            return Err(CheckError::PrevAllocMismatch { addr });
        }

        let this_alloc = block::is_alloc(addr);
        if !this_alloc {
            heap_free_count += 1;
            if !prev_was_alloc {
                return Err(CheckError::AdjacentFreeBlocks { first: walker::prev(addr), second: addr });
            }
        }

        prev_was_alloc = this_alloc;
        addr += size;
    }

    let lists = heap.lists();
    let mut list_free_count = 0usize;
    for class in 0..NUM_CLASSES {
        for block_addr in lists.iter(class) {
            if block::is_alloc(block_addr) {
                return Err(CheckError::FreeBlockNotIndexed { addr: block_addr });
            }
            let size = block::size_of_block(block_addr);
            if config::class_of(size) != class {
                return Err(CheckError::WrongClass { addr: block_addr, size, class });
            }
            list_free_count += 1;
        }
    }

    if heap_free_count != list_free_count {
        return Err(CheckError::FreeCountMismatch {
            heap_walk: heap_free_count,
            list_walk: list_free_count,
        });
    }

    Ok(())
}
