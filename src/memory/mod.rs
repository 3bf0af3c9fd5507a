/*
 * memory/mod.rs - Memory Management System for DDOS
 *
 * Coordinates the heap memory management system for the kernel binary. It:
 * 1. Defines the global allocator instance
 * 2. Initializes the free-space manager with real heap memory
 * 3. Handles allocation errors with panic
 *
 * The free-space manager itself (size classes, coalescing, the compact
 * 16-byte block encoding) lives in the library crate's `allocator` module;
 * this module only wires it to the fixed physical arena and to
 * `#[global_allocator]`.
 */

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{null_mut, NonNull};

use ddos::allocator::Allocator;
use ddos::backend::FixedAddrArena;
use ddos::config::{HEAP_SIZE, HEAP_START};

use crate::utils::locked::Locked;

#[global_allocator]
static ALLOCATOR: Locked<Option<Allocator<FixedAddrArena>>> = Locked::new(None);

/// Must be called exactly once, early in kernel startup, before any
/// allocation (`Box::new`, `Vec::new`, ...) can succeed.
///
/// # Safety
/// `HEAP_START..HEAP_START+HEAP_SIZE` must not overlap the kernel image,
/// stack, or any other memory this process uses; this holds by construction
/// of the RPi memory map in `config`.
pub fn init() {
    let arena = unsafe { FixedAddrArena::new(HEAP_START, HEAP_SIZE) };
    let allocator = Allocator::new(arena).expect("initial heap chunk did not fit in HEAP_SIZE");
    *ALLOCATOR.lock() = Some(allocator);
}

unsafe impl GlobalAlloc for Locked<Option<Allocator<FixedAddrArena>>> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        match self.lock() {
            Some(allocator) => allocator.allocate(layout.size()).map_or(null_mut(), |p| p.as_ptr()),
            None => null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if let Some(allocator) = self.lock() {
            if let Some(ptr) = NonNull::new(ptr) {
                allocator.release(ptr);
            }
        }
    }
}

/// Called when `Box::new`/`Vec::new`/... fail. A kernel has nowhere to
/// recover to, so this panics with the layout that could not be satisfied.
#[alloc_error_handler]
fn alloc_error_handler(layout: Layout) -> ! {
    panic!("allocation error: {:?}", layout)
}
