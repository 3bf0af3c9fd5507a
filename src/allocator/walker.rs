/*
 * allocator/walker.rs - Heap Walker (C2)
 *
 * Computes a block's next/previous heap neighbour using header/footer
 * arithmetic only. No list state is consulted here.
 */

use super::block;

/// Address of the block immediately following `block_addr`. Always valid;
/// yields the epilogue sentinel when `block_addr` is the last real block.
pub fn next(block_addr: usize) -> usize {
    block_addr + block::size_of_block(block_addr)
}

/// Address of the block immediately preceding `block_addr`, recovered by
/// reading the word just before its header.
///
/// # Precondition
/// The predecessor must be free (`prev_alloc(block_addr) == false`).
/// Allocated large blocks carry no footer, so there is no way to recover
/// their size without walking from the heap start; callers (the coalescer)
/// must check `prev_alloc` first.
pub fn prev(block_addr: usize) -> usize {
    debug_assert!(!block::prev_alloc(block_addr));
    let prev_footer = block_addr - 8;
    let size = block::size_of_block(prev_footer_as_block(prev_footer));
    block_addr - size
}

// The word at `prev_footer` is a footer, not a header, but `size_of_block`
// only inspects the `small`/size bits, which are identical in header and
// footer layout for free blocks - so it can be read as if it were a block
// address for the purpose of extracting the size.
#[inline]
fn prev_footer_as_block(prev_footer: usize) -> usize {
    prev_footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::block;

    #[repr(align(16))]
    struct Buf([u8; 128]);

    fn addr(buf: &Buf) -> usize {
        buf.0.as_ptr() as usize
    }

    #[test]
    fn next_steps_by_the_blocks_own_size() {
        let buf = Buf([0; 128]);
        let base = addr(&buf);
        block::write_large(base, 32, true, true);
        let b2 = base + 32;
        block::write_large(b2, 48, true, false);
        assert_eq!(next(base), b2);
        assert_eq!(next(b2), b2 + 48);
    }

    #[test]
    fn prev_recovers_a_free_large_predecessor_via_its_footer() {
        let buf = Buf([0; 128]);
        let base = addr(&buf);
        block::write_large(base, 32, false, true); // free, has a footer
        let b2 = base + 32;
        block::write_large(b2, 32, true, false); // prev_alloc=false: base is free
        assert_eq!(prev(b2), base);
    }

    #[test]
    fn prev_recovers_a_free_small_predecessor() {
        let buf = Buf([0; 128]);
        let base = addr(&buf);
        block::write_small_free(base, None, None, true);
        let b2 = base + 16;
        block::write_large(b2, 32, true, false);
        assert_eq!(prev(b2), base);
    }

    #[test]
    fn next_and_prev_agree_across_a_chain_of_blocks() {
        let buf = Buf([0; 128]);
        let base = addr(&buf);
        block::write_large(base, 32, false, true);
        let b2 = base + 32;
        block::write_small_free(b2, None, None, false);
        let b3 = b2 + 16;
        block::write_large(b3, 48, true, false);

        assert_eq!(next(base), b2);
        assert_eq!(next(b2), b3);
        assert_eq!(prev(b3), b2);
        assert_eq!(prev(b2), base);
    }
}
