/*
 * resize.rs - External Collaborators: `resize` and `zallocate`
 *
 * Neither of these is part of the free-space manager core - both are thin
 * wrappers built entirely on top of `Allocator`'s public `allocate`/
 * `release`/`payload_size`, specified only by their contracts with it (§1).
 */

use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::backend::HeapBackend;
use crate::error::ZallocOverflow;

/// `s == 0` releases `ptr` and returns `None`. `ptr == None` behaves as
/// `allocate(s)`. Otherwise allocates a new block, copies
/// `min(s, old_payload_size)` bytes from the old block, releases the old
/// block, and returns the new one.
pub fn resize<B: HeapBackend>(
    allocator: &mut Allocator<B>,
    ptr: Option<NonNull<u8>>,
    s: usize,
) -> Option<NonNull<u8>> {
    let Some(old) = ptr else {
        return allocator.allocate(s);
    };
    if s == 0 {
        allocator.release(old);
        return None;
    }

    let old_size = allocator.payload_size(old);
    let new = allocator.allocate(s)?;

    let copy_len = core::cmp::min(s, old_size);
    unsafe {
        core::ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), copy_len);
    }
    allocator.release(old);
    Some(new)
}

/// Overflow-checked `allocate(n * s)` followed by a bulk zero of the
/// returned payload.
pub fn zallocate<B: HeapBackend>(
    allocator: &mut Allocator<B>,
    n: usize,
    s: usize,
) -> Result<Option<NonNull<u8>>, ZallocOverflow> {
    let total = n.checked_mul(s).ok_or(ZallocOverflow)?;
    let Some(ptr) = allocator.allocate(total) else {
        log::warn!("zallocate({n}, {s}): out of memory");
        return Ok(None);
    };
    let payload_len = allocator.payload_size(ptr);
    unsafe {
        core::ptr::write_bytes(ptr.as_ptr(), 0, payload_len);
    }
    Ok(Some(ptr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VecArena;

    #[test]
    fn zallocate_zeroes_payload() {
        let mut a = Allocator::new(VecArena::new(1 << 16)).unwrap();
        let p = zallocate(&mut a, 10, 10).unwrap().unwrap();
        let bytes = unsafe { core::slice::from_raw_parts(p.as_ptr(), 100) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn zallocate_overflow_is_rejected() {
        let mut a = Allocator::new(VecArena::new(1 << 16)).unwrap();
        let result = zallocate(&mut a, usize::MAX, 2);
        assert_eq!(result, Err(ZallocOverflow));
    }

    #[test]
    fn resize_none_ptr_behaves_as_allocate() {
        let mut a = Allocator::new(VecArena::new(1 << 16)).unwrap();
        let p = resize(&mut a, None, 32);
        assert!(p.is_some());
    }

    #[test]
    fn resize_zero_size_releases() {
        let mut a = Allocator::new(VecArena::new(1 << 16)).unwrap();
        let p = a.allocate(32).unwrap();
        assert!(resize(&mut a, Some(p), 0).is_none());
    }
}
