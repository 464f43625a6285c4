//!zlib allocation callbacks backed by Rust's allocator

use core::ffi::{c_uint, c_void};
use core::{mem, ptr};
use std::alloc::Layout;

//Linux & win 32 bit are 8
#[cfg(not(any(target_os = "macos", all(windows, target_pointer_width = "64"))))]
const MIN_ALIGN: usize = 8;
//Mac and win 64 bit are 16
#[cfg(any(target_os = "macos", all(windows, target_pointer_width = "64")))]
const MIN_ALIGN: usize = 16;

const LAYOUT_OFFSET: usize = mem::size_of::<usize>();

#[cold]
#[inline(never)]
fn unlikely_null() -> *mut c_void {
    ptr::null_mut()
}

pub(crate) unsafe extern "C" fn reflate_alloc(_: *mut c_void, items: c_uint, size: c_uint) -> *mut c_void {
    let size = match (items as usize).checked_mul(size as usize) {
        Some(0) | None => return unlikely_null(),
        Some(size) => size,
    };

    let layout = match Layout::from_size_align(size + LAYOUT_OFFSET, MIN_ALIGN) {
        Ok(layout) => layout,
        _ => return unlikely_null(),
    };

    let mem = std::alloc::alloc(layout);
    if mem.is_null() {
        return unlikely_null();
    }

    //stash full layout size ahead of the returned pointer for dealloc
    ptr::write(mem as *mut usize, layout.size());
    mem.add(LAYOUT_OFFSET) as _
}

pub(crate) unsafe extern "C" fn reflate_free(_: *mut c_void, mem: *mut c_void) {
    if !mem.is_null() {
        let mem = (mem as *mut u8).offset(-(LAYOUT_OFFSET as isize));
        let size = ptr::read(mem as *const usize);
        let layout = Layout::from_size_align_unchecked(size, MIN_ALIGN);
        std::alloc::dealloc(mem, layout);
    }
}
