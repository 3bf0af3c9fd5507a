/*
 * allocator/coalesce.rs - Coalescer (C5)
 *
 * Merges a newly-freed block with whichever of its heap neighbours are
 * also free, restoring §3 invariant 4 (no two adjacent free blocks) before
 * `release` returns. Eager: the merge always runs to completion, never
 * deferred.
 */

use crate::config;

use super::block;
use super::freelist::FreeLists;
use super::walker;

/// Marks the block at `addr` free and coalesces it with any free
/// neighbours, inserting the (possibly merged) result into its size class.
pub fn release(lists: &mut FreeLists, addr: usize) {
    let size = block::size_of_block(addr);
    let prev_was_alloc = block::prev_alloc(addr);
    block::write_free(addr, size, prev_was_alloc);

    let succ = walker::next(addr);
    let next_is_alloc = block::is_alloc(succ);

    let (merged_addr, merged_size, merged_prev_alloc) = match (prev_was_alloc, next_is_alloc) {
        (true, true) => (addr, size, prev_was_alloc),
        (true, false) => {
            let next_size = block::size_of_block(succ);
            lists.remove(config::class_of(next_size), succ);
            (addr, size + next_size, prev_was_alloc)
        }
        (false, true) => {
            let pred = walker::prev(addr);
            let pred_size = block::size_of_block(pred);
            let pred_prev_alloc = block::prev_alloc(pred);
            lists.remove(config::class_of(pred_size), pred);
            (pred, pred_size + size, pred_prev_alloc)
        }
        (false, false) => {
            let pred = walker::prev(addr);
            let pred_size = block::size_of_block(pred);
            let pred_prev_alloc = block::prev_alloc(pred);
            let next_size = block::size_of_block(succ);
            lists.remove(config::class_of(pred_size), pred);
            lists.remove(config::class_of(next_size), succ);
            (pred, pred_size + size + next_size, pred_prev_alloc)
        }
    };

    block::write_free(merged_addr, merged_size, merged_prev_alloc);
    lists.insert(config::class_of(merged_size), merged_addr);

    let after = walker::next(merged_addr);
    block::set_prev_alloc(after, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(align(16))]
    struct Buf([u8; 256]);

    fn addr(buf: &Buf) -> usize {
        buf.0.as_ptr() as usize
    }

    /// prev allocated, next allocated: `B` just gets indexed, nothing merges.
    #[test]
    fn no_merge_when_both_neighbours_allocated() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let prev = base;
        let b = base + 32;
        let next = base + 64;
        block::write_large(prev, 32, true, true);
        block::write_large(b, 32, true, true);
        block::write_large(next, 32, true, true);

        let mut lists = FreeLists::new();
        release(&mut lists, b);

        assert!(!block::is_alloc(b));
        assert_eq!(block::size_of_block(b), 32);
        assert!(!block::prev_alloc(next));
        assert_eq!(lists.iter(config::class_of(32)).collect::<std::vec::Vec<_>>(), std::vec![b]);
    }

    /// prev allocated, next free: `B` absorbs its free successor.
    #[test]
    fn merges_with_free_next() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let b = base;
        let next = base + 32;
        let tail = base + 64;
        block::write_large(b, 32, true, true);
        block::write_large(next, 32, false, true);
        block::write_large(tail, 32, true, false);

        let mut lists = FreeLists::new();
        lists.insert(config::class_of(32), next);

        release(&mut lists, b);

        assert!(!block::is_alloc(b));
        assert_eq!(block::size_of_block(b), 64);
        assert!(!block::prev_alloc(tail));
        assert_eq!(lists.iter(config::class_of(64)).collect::<std::vec::Vec<_>>(), std::vec![b]);
    }

    /// prev free, next allocated: the free predecessor absorbs `B`.
    #[test]
    fn merges_with_free_prev() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let prev = base;
        let b = base + 32;
        let next = base + 64;
        block::write_large(prev, 32, false, true);
        block::write_large(b, 32, true, false);
        block::write_large(next, 32, true, true);

        let mut lists = FreeLists::new();
        lists.insert(config::class_of(32), prev);

        release(&mut lists, b);

        assert!(!block::is_alloc(prev));
        assert_eq!(block::size_of_block(prev), 64);
        assert!(!block::prev_alloc(next));
        assert_eq!(lists.iter(config::class_of(64)).collect::<std::vec::Vec<_>>(), std::vec![prev]);
    }

    /// prev free, next free: both neighbours absorb into one block.
    #[test]
    fn merges_with_both_free_neighbours() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let prev = base;
        let b = base + 32;
        let next = base + 64;
        let tail = base + 96;
        block::write_large(prev, 32, false, true);
        block::write_large(b, 32, true, false);
        block::write_large(next, 32, false, true);
        block::write_large(tail, 32, true, false);

        let mut lists = FreeLists::new();
        lists.insert(config::class_of(32), prev);
        lists.insert(config::class_of(32), next);

        release(&mut lists, b);

        assert!(!block::is_alloc(prev));
        assert_eq!(block::size_of_block(prev), 96);
        assert!(!block::prev_alloc(tail));
        assert_eq!(lists.iter(config::class_of(96)).collect::<std::vec::Vec<_>>(), std::vec![prev]);
    }
}
