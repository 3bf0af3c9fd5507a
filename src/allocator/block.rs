/*
 * allocator/block.rs - Block Codec (C1)
 *
 * Packs and unpacks header/footer words and the free-list link fields that
 * live inside them. This is the only module that knows the bit layout;
 * everything above it (walker, free lists, placement, coalescer) goes
 * through these functions instead of touching raw words.
 *
 * Header word (64 bits):
 *   63..4  size (free/allocated large blocks) OR next-free address
 *          (small free blocks only, disambiguated by the `small` bit)
 *   3      small  - 1 iff this block is exactly 16 bytes
 *   2      prev_alloc - 1 iff the immediately preceding heap neighbour is allocated
 *   1      reserved, always 0
 *   0      alloc - 1 iff this block itself is allocated
 *
 * Footer word (present only on free large blocks and on all small blocks)
 * mirrors the header's size/pointer field and `small` bit; for small free
 * blocks the footer holds the previous-free pointer instead of the next.
 */

use crate::config::{MIN_BLOCK, WORD};

const SMALL_BIT: u64 = 1 << 3;
const PREV_ALLOC_BIT: u64 = 1 << 2;
const ALLOC_BIT: u64 = 1 << 0;
const TOP_MASK: u64 = !0xF;

#[inline]
unsafe fn read_word(addr: usize) -> u64 {
    unsafe { core::ptr::read((addr as *const u64).cast()) }
}

#[inline]
unsafe fn write_word(addr: usize, value: u64) {
    unsafe { core::ptr::write((addr as *mut u64).cast(), value) }
}

#[inline]
fn header_addr(block: usize) -> usize {
    block
}

#[inline]
fn footer_addr(block: usize, size: usize) -> usize {
    block + size - WORD
}

/// Reads the top bits of a header/footer word as a size (only valid when
/// the word does not encode a small-free next/prev pointer).
pub fn size_of_block(block: usize) -> usize {
    let word = unsafe { read_word(header_addr(block)) };
    if word & SMALL_BIT != 0 {
        MIN_BLOCK
    } else {
        (word & TOP_MASK) as usize
    }
}

pub fn is_alloc(block: usize) -> bool {
    unsafe { read_word(header_addr(block)) & ALLOC_BIT != 0 }
}

pub fn is_small(block: usize) -> bool {
    unsafe { read_word(header_addr(block)) & SMALL_BIT != 0 }
}

pub fn prev_alloc(block: usize) -> bool {
    unsafe { read_word(header_addr(block)) & PREV_ALLOC_BIT != 0 }
}

/// Updates only the `prev_alloc` bit of `block`'s header (and, if `block`
/// is a small free block, its footer too) without disturbing anything else.
pub fn set_prev_alloc(block: usize, prev_alloc: bool) {
    unsafe {
        let header = header_addr(block);
        let old = read_word(header);
        let new = if prev_alloc { old | PREV_ALLOC_BIT } else { old & !PREV_ALLOC_BIT };
        write_word(header, new);

        let alloc = old & ALLOC_BIT != 0;
        let small = old & SMALL_BIT != 0;
        if small && !alloc {
            let footer = footer_addr(block, MIN_BLOCK);
            let old_footer = read_word(footer);
            let new_footer = if prev_alloc {
                old_footer | PREV_ALLOC_BIT
            } else {
                old_footer & !PREV_ALLOC_BIT
            };
            write_word(footer, new_footer);
        }
    }
}

/// Writes a large block (size >= 32, size != 16). If `alloc` is false, a
/// footer mirroring the header is also written (large free blocks have a
/// footer); if `alloc` is true, no footer is written (footerless allocated
/// blocks, §9).
pub fn write_large(block: usize, size: usize, alloc: bool, prev_alloc: bool) {
    debug_assert!(size >= MIN_BLOCK && size % 16 == 0);
    let mut word = size as u64;
    if alloc {
        word |= ALLOC_BIT;
    }
    if prev_alloc {
        word |= PREV_ALLOC_BIT;
    }
    unsafe {
        write_word(header_addr(block), word);
        if !alloc {
            write_word(footer_addr(block, size), word);
        }
    }
}

/// Writes `addr` as a free block of `size` bytes, dispatching to the
/// compact small-block encoding when `size == MIN_BLOCK`. Link fields of a
/// freshly-freed block are left as `None`/`None`; the caller inserts it
/// into its size class afterwards, which writes the real links.
pub fn write_free(addr: usize, size: usize, prev_alloc: bool) {
    if size == MIN_BLOCK {
        write_small_free(addr, None, None, prev_alloc);
    } else {
        write_large(addr, size, false, prev_alloc);
    }
}

/// Writes `addr` as an allocated block of `size` bytes, dispatching to the
/// compact small-block encoding when `size == MIN_BLOCK`.
pub fn write_alloc(addr: usize, size: usize, prev_alloc: bool) {
    if size == MIN_BLOCK {
        write_small_alloc(addr, prev_alloc);
    } else {
        write_large(addr, size, true, prev_alloc);
    }
}

/// Writes the zero-size allocated prologue/epilogue sentinel words.
pub fn write_sentinel(addr: usize, prev_alloc: bool) {
    let mut word = ALLOC_BIT;
    if prev_alloc {
        word |= PREV_ALLOC_BIT;
    }
    unsafe { write_word(header_addr(addr), word) };
}

/// Writes a 16-byte free block, packing the doubly-linked list pointers
/// for size class 0 directly into the header (next) and footer (prev).
/// `next`/`prev` of `None` encode as address 0 (the class-0 list's nil).
pub fn write_small_free(block: usize, next: Option<usize>, prev: Option<usize>, prev_alloc: bool) {
    let mut header = SMALL_BIT | (next.unwrap_or(0) as u64 & TOP_MASK);
    if prev_alloc {
        header |= PREV_ALLOC_BIT;
    }
    let mut footer = SMALL_BIT | (prev.unwrap_or(0) as u64 & TOP_MASK);
    if prev_alloc {
        footer |= PREV_ALLOC_BIT;
    }
    unsafe {
        write_word(header_addr(block), header);
        write_word(footer_addr(block, MIN_BLOCK), footer);
    }
}

/// Writes a 16-byte allocated block (header only, 8 bytes of payload follow).
pub fn write_small_alloc(block: usize, prev_alloc: bool) {
    let mut word = SMALL_BIT | ALLOC_BIT;
    if prev_alloc {
        word |= PREV_ALLOC_BIT;
    }
    unsafe { write_word(header_addr(block), word) };
}

/// Next-free pointer packed into a small free block's header. `None` is
/// the class-0 list's nil terminator (address 0 is never a valid block).
pub fn small_next_free(block: usize) -> Option<usize> {
    let word = unsafe { read_word(header_addr(block)) };
    let addr = (word & TOP_MASK) as usize;
    if addr == 0 { None } else { Some(addr) }
}

/// Prev-free pointer packed into a small free block's footer.
pub fn small_prev_free(block: usize) -> Option<usize> {
    let word = unsafe { read_word(footer_addr(block, MIN_BLOCK)) };
    let addr = (word & TOP_MASK) as usize;
    if addr == 0 { None } else { Some(addr) }
}

/// Address of the header word, i.e. the block's own address.
pub fn header(block: usize) -> usize {
    header_addr(block)
}

/// Address of a large free block's footer word.
pub fn footer(block: usize, size: usize) -> usize {
    footer_addr(block, size)
}

/// Offset from a block's address to where its client-visible payload begins.
pub fn payload_offset() -> usize {
    WORD
}

/// Reads the large-block doubly-linked free-list pointers, stored in the
/// first two payload words of classes 1..6.
pub fn large_links(block: usize) -> (Option<usize>, Option<usize>) {
    unsafe {
        let prev = read_word(block + WORD);
        let next = read_word(block + 2 * WORD);
        (
            if prev == 0 { None } else { Some(prev as usize) },
            if next == 0 { None } else { Some(next as usize) },
        )
    }
}

pub fn set_large_links(block: usize, prev: Option<usize>, next: Option<usize>) {
    unsafe {
        write_word(block + WORD, prev.unwrap_or(0) as u64);
        write_word(block + 2 * WORD, next.unwrap_or(0) as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 16-byte aligned stack storage standing in for a block's memory; real
    // blocks always come from a 16-byte-aligned heap.
    #[repr(align(16))]
    struct Buf([u8; 128]);

    fn addr(buf: &Buf) -> usize {
        buf.0.as_ptr() as usize
    }

    #[test]
    fn large_free_block_round_trips_through_header_and_footer() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_large(a, 64, false, true);
        assert_eq!(size_of_block(a), 64);
        assert!(!is_alloc(a));
        assert!(!is_small(a));
        assert!(prev_alloc(a));
        // footer mirrors header for large free blocks
        assert_eq!(size_of_block(footer(a, 64)), 64);
        assert!(!is_alloc(footer(a, 64)));
    }

    #[test]
    fn large_allocated_block_carries_no_usable_footer() {
        let buf = Buf([0xAA; 128]);
        let a = addr(&buf);
        write_large(a, 48, true, false);
        assert!(is_alloc(a));
        assert!(!prev_alloc(a));
        assert_eq!(size_of_block(a), 48);
    }

    #[test]
    fn small_free_block_packs_next_in_header_and_prev_in_footer() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_small_free(a, Some(0x1000), Some(0x2000), true);
        assert!(is_small(a));
        assert!(!is_alloc(a));
        assert!(prev_alloc(a));
        assert_eq!(size_of_block(a), MIN_BLOCK);
        assert_eq!(small_next_free(a), Some(0x1000));
        assert_eq!(small_prev_free(a), Some(0x2000));
    }

    #[test]
    fn small_free_block_nil_links_encode_as_none() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_small_free(a, None, None, false);
        assert_eq!(small_next_free(a), None);
        assert_eq!(small_prev_free(a), None);
        assert!(!prev_alloc(a));
    }

    #[test]
    fn small_allocated_block_sets_alloc_and_small_bits() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_small_alloc(a, true);
        assert!(is_alloc(a));
        assert!(is_small(a));
        assert!(prev_alloc(a));
        assert_eq!(size_of_block(a), MIN_BLOCK);
    }

    #[test]
    fn set_prev_alloc_updates_small_free_footer_without_disturbing_links() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_small_free(a, Some(0x3000), Some(0x4000), false);
        set_prev_alloc(a, true);
        assert!(prev_alloc(a));
        assert_eq!(small_next_free(a), Some(0x3000));
        assert_eq!(small_prev_free(a), Some(0x4000));
    }

    #[test]
    fn set_prev_alloc_on_large_block_leaves_size_and_alloc_untouched() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_large(a, 64, true, false);
        set_prev_alloc(a, true);
        assert!(prev_alloc(a));
        assert!(is_alloc(a));
        assert_eq!(size_of_block(a), 64);
    }

    #[test]
    fn large_free_list_links_round_trip() {
        let buf = Buf([0; 128]);
        let a = addr(&buf);
        write_large(a, 64, false, true);
        set_large_links(a, Some(0x5000), Some(0x6000));
        assert_eq!(large_links(a), (Some(0x5000), Some(0x6000)));
        set_large_links(a, None, None);
        assert_eq!(large_links(a), (None, None));
    }
}
