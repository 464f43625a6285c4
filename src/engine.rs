//!Handle over the zlib inflate engine.
//!
//!All FFI lives here; the session layer only ever sees safe slices and the
//!crate's own error taxonomy.

use libz_sys as sys;

use core::ffi::c_int;
use core::{mem, ptr};
use std::ffi::CStr;

use crate::error::Error;
use crate::mem::{reflate_alloc, reflate_free};

//Status bits reported through z_stream.data_type after inflate(.., Z_BLOCK):
//low 3 bits hold the leftover bit count, bit 6 marks the final block,
//bit 7 marks a block boundary.
const STATUS_BITS: c_int = 7;
const STATUS_FINAL: c_int = 64;
const STATUS_BOUNDARY: c_int = 128;

#[derive(Copy, Clone)]
#[repr(i8)]
///Container framing expected by the engine.
pub enum Mode {
    ///Assumes raw deflate
    Deflate = -15,
    ///Assumes zlib header
    Zlib = 15,
    ///Assumes gzip header
    Gzip = 15 + 16,
    ///Automatically detect header.
    ///
    ///Default value.
    Auto = 15 + 32,
}

impl Mode {
    #[inline(always)]
    pub(crate) const fn window_bits(self) -> c_int {
        self as i8 as c_int
    }
}

impl Default for Mode {
    #[inline(always)]
    fn default() -> Self {
        Self::Auto
    }
}

///Outcome of a single block-bounded decode call.
pub(crate) struct Inflate {
    ///Number of bytes left unprocessed in `input`
    pub input_remain: usize,
    ///Number of bytes left unfilled in `output`
    pub output_remain: usize,
    ///Engine signalled the final block trailer
    pub finished: bool,
}

///Owner of the raw inflate state.
///
///The stream is boxed once and never moves: zlib keeps a back-pointer to it
///inside its allocated state.
pub(crate) struct Engine {
    stream: Box<sys::z_stream>,
}

impl Engine {
    pub(crate) fn new(mode: Mode) -> Result<Self, Error> {
        let mut stream = Box::new(sys::z_stream {
            next_in: ptr::null_mut(),
            avail_in: 0,
            total_in: 0,
            next_out: ptr::null_mut(),
            avail_out: 0,
            total_out: 0,
            msg: ptr::null_mut(),
            state: ptr::null_mut(),
            zalloc: reflate_alloc,
            zfree: reflate_free,
            opaque: ptr::null_mut(),
            data_type: 0,
            adler: 0,
            reserved: 0,
        });

        let result = unsafe {
            sys::inflateInit2_(&mut *stream, mode.window_bits(), sys::zlibVersion(), mem::size_of::<sys::z_stream>() as _)
        };

        match result {
            sys::Z_OK => Ok(Self { stream }),
            sys::Z_STREAM_ERROR => Err(Error::InvalidConfig),
            sys::Z_MEM_ERROR => Err(Error::OutOfMemory),
            _ => Err(Error::EngineFault),
        }
    }

    ///Decodes `input` into `output`, stopping at the next deflate block
    ///boundary at the latest.
    pub(crate) fn inflate_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<Inflate, Error> {
        self.stream.avail_in = input.len() as _;
        self.stream.next_in = input.as_ptr() as *mut _;
        self.stream.avail_out = output.len() as _;
        self.stream.next_out = output.as_mut_ptr();

        let result = unsafe {
            sys::inflate(&mut *self.stream, sys::Z_BLOCK)
        };

        match result {
            sys::Z_OK | sys::Z_STREAM_END => Ok(Inflate {
                input_remain: self.stream.avail_in as usize,
                output_remain: self.stream.avail_out as usize,
                finished: result == sys::Z_STREAM_END,
            }),
            sys::Z_BUF_ERROR => Err(Error::Underrun),
            sys::Z_NEED_DICT => Err(Error::NeedsDictionary),
            sys::Z_DATA_ERROR => Err(Error::Corruption(self.message())),
            sys::Z_MEM_ERROR => Err(Error::OutOfMemory),
            _ => Err(Error::EngineFault),
        }
    }

    #[inline]
    ///True when the bit cursor sits exactly between two deflate blocks.
    pub(crate) fn at_block_boundary(&self) -> bool {
        self.stream.data_type & STATUS_BOUNDARY != 0
    }

    #[inline]
    ///True once the block being decoded carries the final-block marker.
    pub(crate) fn in_final_block(&self) -> bool {
        self.stream.data_type & STATUS_FINAL != 0
    }

    #[inline]
    ///Count of leftover not-yet-consumed bits at the last input byte, in `0..=7`.
    pub(crate) fn pending_bits(&self) -> u8 {
        (self.stream.data_type & STATUS_BITS) as u8
    }

    ///Injects `bits` bits of `value` ahead of the next input byte.
    pub(crate) fn prime(&mut self, bits: u8, value: u8) -> Result<(), Error> {
        let result = unsafe {
            sys::inflatePrime(&mut *self.stream, bits as c_int, value as c_int)
        };

        match result {
            sys::Z_OK => Ok(()),
            _ => Err(Error::EngineFault),
        }
    }

    ///Seeds the sliding window with previously decoded history.
    pub(crate) fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<(), Error> {
        let result = unsafe {
            sys::inflateSetDictionary(&mut *self.stream, dictionary.as_ptr(), dictionary.len() as _)
        };

        match result {
            sys::Z_OK => Ok(()),
            sys::Z_DATA_ERROR => Err(Error::Corruption(self.message())),
            _ => Err(Error::EngineFault),
        }
    }

    #[inline]
    pub(crate) fn total_in(&self) -> u64 {
        self.stream.total_in as u64
    }

    fn message(&self) -> String {
        if self.stream.msg.is_null() {
            return "data error".to_owned();
        }

        unsafe {
            CStr::from_ptr(self.stream.msg).to_string_lossy().into_owned()
        }
    }
}

impl Drop for Engine {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            sys::inflateEnd(&mut *self.stream);
        }
    }
}
