//!Resumable zlib/deflate/gzip decompression with exportable decode state.
//!
//!A [Session] decodes at deflate block granularity over two fixed 32 KiB
//!buffers: compressed input arrives in bounded chunks, decoded output flows
//!through a circular window that doubles as the dictionary source. At any
//!block boundary with all fed input consumed, [Session::get_state] exports
//!the `(dictionary, bits, last_byte)` triple; a fresh session primed with
//![Session::set_state] continues decoding from that position without
//!replaying the stream prefix. Pair the triple with the compressed offset
//!of the boundary to get random access into large compressed archives.
//!
//![reader::StateReader] layers a buffered `Read`/`BufRead` with automatic
//!checkpoint capture on top of the session.
//!
//!## Features
//!
//!- `static` - Builds the bundled zlib and links it statically.

#![warn(missing_docs)]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::style))]

pub(crate) mod mem;
mod error;
pub use error::Error;
mod engine;
pub use engine::Mode;
mod session;
pub use session::{ResumeState, Session, BUFFER_SIZE};
pub mod reader;
