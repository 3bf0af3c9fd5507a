/*
 * config.rs - Allocator Tuning Constants
 *
 * Collects the magic numbers the free-space manager is built around, so
 * `class_of`/`adjust_size` and the checker's cross-check all read from one
 * source of truth instead of scattering literals across allocator/*.rs.
 */

/// Size in bytes of one heap word (also the header/footer unit).
pub const WORD: usize = 8;

/// Payload alignment guaranteed to every pointer returned by `allocate`.
pub const ALIGNMENT: usize = 16;

/// Smallest legal block size.
pub const MIN_BLOCK: usize = 16;

/// Heap growth granularity used by `Heap::init`/`Heap::extend`.
pub const CHUNK_SIZE: usize = 4096;

/// Upper bound on the number of candidates `find_fit` examines across all
/// size classes before settling for its current best. A fragmentation /
/// throughput knob, not a correctness requirement - see the design notes.
pub const FIND_FIT_WINDOW: usize = 70;

/// Number of segregated free-list size classes.
pub const NUM_CLASSES: usize = 7;

/// Upper bound (inclusive) of each size class, `usize::MAX` for the last.
///
/// | Index | Size range (bytes) |
/// |-------|---------------------|
/// | 0 | exactly 16 |
/// | 1 | (16, 32] |
/// | 2 | (32, 64] |
/// | 3 | (64, 128] |
/// | 4 | (128, 256] |
/// | 5 | (256, 512] |
/// | 6 | > 512 |
const CLASS_UPPER_BOUND: [usize; NUM_CLASSES] = [16, 32, 64, 128, 256, 512, usize::MAX];

/// Maps a block size to its segregated-list index.
pub fn class_of(size: usize) -> usize {
    CLASS_UPPER_BOUND
        .iter()
        .position(|&upper| size <= upper)
        .unwrap_or(NUM_CLASSES - 1)
}

/// Adjusts a client-requested payload size into a legal block size: room
/// for one header word, padded up to `ALIGNMENT`, clamped to `MIN_BLOCK`.
pub fn adjust_size(requested: usize) -> usize {
    let with_header = requested + WORD;
    let padded = (with_header + ALIGNMENT - 1) & !(ALIGNMENT - 1);
    padded.max(MIN_BLOCK)
}

/// Rounds a heap-growth request up to a multiple of `ALIGNMENT`.
pub fn round_up_alignment(n: usize) -> usize {
    (n + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

// Bare-metal arena placement for the kernel binary. Mirrors the RPi4 memory
// map `memory::config` already used: stack, then heap, in a 0x80000-based
// address space reserved past the firmware/bootloader region.
pub const KERNEL_START: usize = 0x80000;
pub const KERNEL_STACK_START: usize = 0x80000;
pub const HEAP_START: usize = KERNEL_STACK_START + 0x200000;
pub const HEAP_SIZE: usize = 0x200000;
