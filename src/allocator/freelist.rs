/*
 * allocator/freelist.rs - Segregated Index (C3)
 *
 * Seven doubly-linked lists of free blocks, one per size class (§4.3).
 * Class 0's link fields live packed inside the block's own header/footer
 * (see block::write_small_free); classes 1..6 store (prev, next) in the
 * block's first two payload words. Both representations present the same
 * O(1) insert/remove interface here.
 */

use crate::config::NUM_CLASSES;

use super::block;

pub struct FreeLists {
    heads: [Option<usize>; NUM_CLASSES],
}

impl FreeLists {
    pub const fn new() -> Self {
        FreeLists { heads: [None; NUM_CLASSES] }
    }

    pub fn head(&self, class: usize) -> Option<usize> {
        self.heads[class]
    }

    fn links(&self, class: usize, block_addr: usize) -> (Option<usize>, Option<usize>) {
        if class == 0 {
            (block::small_prev_free(block_addr), block::small_next_free(block_addr))
        } else {
            block::large_links(block_addr)
        }
    }

    fn set_links(&self, class: usize, block_addr: usize, prev: Option<usize>, next: Option<usize>) {
        if class == 0 {
            let prev_alloc = block::prev_alloc(block_addr);
            block::write_small_free(block_addr, next, prev, prev_alloc);
        } else {
            block::set_large_links(block_addr, prev, next);
        }
    }

    /// Inserts `block_addr` (already written as a free block of the right
    /// size) at the head of its size class's list.
    pub fn insert(&mut self, class: usize, block_addr: usize) {
        let old_head = self.heads[class];
        self.set_links(class, block_addr, None, old_head);
        if let Some(head) = old_head {
            let (_, head_next) = self.links(class, head);
            self.set_links(class, head, Some(block_addr), head_next);
        }
        self.heads[class] = Some(block_addr);
    }

    /// Unlinks `block_addr` from its size class's list using its own
    /// prev/next links.
    pub fn remove(&mut self, class: usize, block_addr: usize) {
        let (prev, next) = self.links(class, block_addr);
        match prev {
            Some(p) => {
                let (p_prev, _) = self.links(class, p);
                self.set_links(class, p, p_prev, next);
            }
            None => self.heads[class] = next,
        }
        if let Some(n) = next {
            let (_, n_next) = self.links(class, n);
            self.set_links(class, n, prev, n_next);
        }
    }

    /// Iterates the addresses currently linked into `class`, head to tail.
    pub fn iter(&self, class: usize) -> FreeListIter<'_> {
        FreeListIter { lists: self, class, cursor: self.heads[class] }
    }
}

pub struct FreeListIter<'a> {
    lists: &'a FreeLists,
    class: usize,
    cursor: Option<usize>,
}

impl Iterator for FreeListIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.cursor?;
        let (_, next) = self.lists.links(self.class, current);
        self.cursor = next;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[repr(align(16))]
    struct Buf([u8; 256]);

    fn addr(buf: &Buf) -> usize {
        buf.0.as_ptr() as usize
    }

    #[test]
    fn insert_is_head_first_and_remove_unlinks_by_its_own_pointers() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let blocks = [base, base + 32, base + 64];
        for &b in &blocks {
            block::write_large(b, 32, false, true);
        }
        let class = config::class_of(32);
        let mut lists = FreeLists::new();
        for &b in &blocks {
            lists.insert(class, b);
        }
        // Each insert goes to the head, so the final order is reversed.
        assert_eq!(lists.iter(class).collect::<std::vec::Vec<_>>(), std::vec![blocks[2], blocks[1], blocks[0]]);

        lists.remove(class, blocks[1]);
        assert_eq!(lists.iter(class).collect::<std::vec::Vec<_>>(), std::vec![blocks[2], blocks[0]]);

        lists.remove(class, blocks[2]);
        assert_eq!(lists.iter(class).collect::<std::vec::Vec<_>>(), std::vec![blocks[0]]);

        lists.remove(class, blocks[0]);
        assert_eq!(lists.head(class), None);
    }

    #[test]
    fn class_zero_links_are_packed_into_the_block_itself() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let b0 = base;
        let b1 = base + 16;
        block::write_free(b0, 16, true);
        block::write_free(b1, 16, true);

        let mut lists = FreeLists::new();
        lists.insert(0, b0);
        lists.insert(0, b1);
        assert_eq!(lists.iter(0).collect::<std::vec::Vec<_>>(), std::vec![b1, b0]);

        lists.remove(0, b1);
        assert_eq!(lists.iter(0).collect::<std::vec::Vec<_>>(), std::vec![b0]);
        assert_eq!(block::small_next_free(b0), None);
    }

    #[test]
    fn classes_are_independent() {
        let buf = Buf([0; 256]);
        let base = addr(&buf);
        let small = base;
        let large = base + 16;
        block::write_free(small, 16, true);
        block::write_large(large, 64, false, true);

        let mut lists = FreeLists::new();
        lists.insert(0, small);
        lists.insert(config::class_of(64), large);

        assert_eq!(lists.iter(0).collect::<std::vec::Vec<_>>(), std::vec![small]);
        assert_eq!(lists.iter(config::class_of(64)).collect::<std::vec::Vec<_>>(), std::vec![large]);
    }
}
