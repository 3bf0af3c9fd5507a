/*
 * error.rs - Typed Error Kinds for the Heap Allocator
 *
 * The allocator core has exactly two ways to fail a public call (both
 * covered below), plus a third error type produced only by the consistency
 * checker and only in debug builds. Client misuse (double release, a
 * foreign pointer, an out-of-bounds write corrupting a header or footer) is
 * undefined behaviour and is never represented here - the core has no way
 * to detect it.
 */

use core::fmt;

/// The heap backend refused to grow (`extend` failed).
///
/// Surfaces as `allocate`/`zallocate` returning `None`; the heap's
/// invariants are left exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("heap backend refused to extend")
    }
}

/// `zallocate`'s `n * s` overflowed `usize` before it ever reached the
/// allocator core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZallocOverflow;

impl fmt::Display for ZallocOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("zallocate: n * s overflowed usize")
    }
}

/// A single invariant violation detected by the consistency checker (§3, §7).
///
/// Only ever constructed under `debug_assertions` - in release builds the
/// checker is elided entirely, exactly as the spec requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    /// A block's address is not a multiple of 16 (invariant 1).
    Misaligned { addr: usize },
    /// A block is smaller than the 16-byte minimum (invariant 1).
    TooSmall { addr: usize, size: usize },
    /// The prologue word at `H_lo` is not a zero-size allocated sentinel (invariant 2).
    BadPrologue,
    /// The epilogue word is not a zero-size allocated sentinel at `H_hi - 8` (invariant 2).
    BadEpilogue,
    /// Two adjacent blocks are both free (invariant 4).
    AdjacentFreeBlocks { first: usize, second: usize },
    /// `B'.prev_alloc != B.alloc` for some adjacent pair (invariant 3).
    PrevAllocMismatch { addr: usize },
    /// A block is free on the heap walk but absent from every free list (invariant 5).
    FreeBlockNotIndexed { addr: usize },
    /// A free block sits in a list whose class does not match its size (invariant 5).
    WrongClass { addr: usize, size: usize, class: usize },
    /// The heap walk and the list walk disagree on the number of free blocks (invariant 5, 7).
    FreeCountMismatch { heap_walk: usize, list_walk: usize },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Misaligned { addr } => write!(f, "block at {addr:#x} is not 16-byte aligned"),
            CheckError::TooSmall { addr, size } => {
                write!(f, "block at {addr:#x} has size {size}, below the 16-byte minimum")
            }
            CheckError::BadPrologue => f.write_str("prologue sentinel is corrupt"),
            CheckError::BadEpilogue => f.write_str("epilogue sentinel is corrupt"),
            CheckError::AdjacentFreeBlocks { first, second } => {
                write!(f, "blocks at {first:#x} and {second:#x} are both free")
            }
            CheckError::PrevAllocMismatch { addr } => {
                write!(f, "prev_alloc bit of block at {addr:#x} disagrees with its neighbour")
            }
            CheckError::FreeBlockNotIndexed { addr } => {
                write!(f, "free block at {addr:#x} is not indexed in any size class")
            }
            CheckError::WrongClass { addr, size, class } => {
                write!(f, "block at {addr:#x} (size {size}) is indexed in class {class}, which does not match its size")
            }
            CheckError::FreeCountMismatch { heap_walk, list_walk } => write!(
                f,
                "heap walk found {heap_walk} free blocks but the size-class lists hold {list_walk}"
            ),
        }
    }
}
