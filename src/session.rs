//!Decoding session: buffer management, block-boundary detection and the
//!state export/import protocol behind mid-stream resumption.

use crate::engine::{Engine, Mode};
use crate::error::Error;

///Capacity of the input buffer and of the circular output window.
pub const BUFFER_SIZE: usize = 32 * 1024;

///State triple exported at a deflate block boundary.
///
///Together with the compressed-stream offset of the boundary this is
///everything a fresh [Session] needs to continue decoding without replaying
///the stream from the start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeState {
    ///Most recently decoded bytes in oldest-to-newest order, at most 32 KiB.
    pub dictionary: Vec<u8>,
    ///Count of leftover not-yet-consumed bits at the last input byte, in `0..=7`.
    pub bits: u8,
    ///Last input byte consumed by the engine; its top `bits` bits hold the
    ///leftover bit values.
    pub last_byte: u8,
}

///Resumable decoding session over a deflate-family stream.
///
///Input is accepted in bounded chunks through [feed_input](Session::feed_input)
///and decoded at deflate block granularity by [read](Session::read) into a
///fixed circular window, so recently produced bytes stay available as
///dictionary material. Whenever the bit cursor rests exactly on a block
///boundary and all fed input has been consumed, [get_state](Session::get_state)
///exports the `(dictionary, bits, last_byte)` triple; a fresh session primed
///through [set_state](Session::set_state) continues from that position.
///
///## Example
///
///```rust
///use std::io::Write;
///
///use reflate::{Mode, Session, BUFFER_SIZE};
///
///let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
///encoder.write_all(b"hello hello hello").unwrap();
///let compressed = encoder.finish().unwrap();
///
///let mut session = Session::new(Mode::Deflate).expect("create session");
///let mut plain = Vec::new();
///let mut remaining: &[u8] = &compressed;
///while !session.eof() {
///    let need = session.needs_input();
///    if need > 0 {
///        let take = need.min(remaining.len());
///        session.feed_input(&remaining[..take]).unwrap();
///        remaining = &remaining[take..];
///    }
///    plain.extend(session.read(BUFFER_SIZE).unwrap());
///}
///
///assert_eq!(plain, b"hello hello hello");
///```
pub struct Session {
    engine: Engine,
    inbuf: Box<[u8; BUFFER_SIZE]>,
    //bytes of inbuf holding the current chunk
    in_len: usize,
    //bytes of the current chunk already consumed by the engine
    in_pos: usize,
    outbuf: Box<[u8; BUFFER_SIZE]>,
    //read/write boundary in outbuf, wraps to 0 exactly at BUFFER_SIZE
    pivot: usize,
    total_out: u64,
    eof: bool,
    //true until the first feed/read or state restore
    pristine: bool,
}

impl Session {
    ///Creates a session expecting `mode` framing.
    pub fn new(mode: Mode) -> Result<Self, Error> {
        Ok(Self {
            engine: Engine::new(mode)?,
            inbuf: Box::new([0; BUFFER_SIZE]),
            in_len: 0,
            in_pos: 0,
            outbuf: Box::new([0; BUFFER_SIZE]),
            pivot: 0,
            total_out: 0,
            eof: false,
            pristine: true,
        })
    }

    #[inline]
    ///Maximum chunk length currently accepted by [feed_input](Session::feed_input).
    ///
    ///Returns 0 while unconsumed input remains or once the stream has ended.
    pub fn needs_input(&self) -> usize {
        if self.eof || self.in_pos < self.in_len {
            0
        } else {
            BUFFER_SIZE
        }
    }

    ///Stores `chunk` as the next run of compressed input.
    ///
    ///Returns the number of bytes accepted, always `chunk.len()`.
    pub fn feed_input(&mut self, chunk: &[u8]) -> Result<usize, Error> {
        let max = self.needs_input();
        if max == 0 {
            return Err(Error::Sequence("cannot accept input now; stream ended or unconsumed input remains"));
        }
        if chunk.len() > max {
            return Err(Error::Overflow);
        }

        self.inbuf[..chunk.len()].copy_from_slice(chunk);
        self.in_len = chunk.len();
        self.in_pos = 0;
        self.pristine = false;
        log::trace!("fed {} byte(s) of compressed input", chunk.len());
        Ok(chunk.len())
    }

    ///Decodes up to `max` bytes and returns them.
    ///
    ///The engine stops early at the next deflate block boundary, and a
    ///single call never produces more than the distance from the window
    ///pivot to the end of the window; call again to continue. An empty
    ///result past [eof](Session::eof) is not an error.
    pub fn read(&mut self, max: usize) -> Result<Vec<u8>, Error> {
        let (start, count) = self.advance(max)?;
        Ok(self.outbuf[start..start + count].to_vec())
    }

    ///Same as [read](Session::read), bounded additionally by `dst.len()`,
    ///writing into `dst` and returning the produced count.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<usize, Error> {
        let (start, count) = self.advance(dst.len())?;
        dst[..count].copy_from_slice(&self.outbuf[start..start + count]);
        Ok(count)
    }

    #[inline]
    ///True iff the engine's bit cursor sits exactly at a deflate block boundary.
    pub fn block_boundary(&self) -> bool {
        self.engine.at_block_boundary()
    }

    #[inline]
    ///True once the engine has entered the final block of the stream.
    ///
    ///Boundaries reached past that point make poor resumption targets:
    ///nothing but the container trailer follows them.
    pub fn in_final_block(&self) -> bool {
        self.engine.in_final_block()
    }

    ///Captures the state triple at a deflate block boundary.
    ///
    ///Valid only while [block_boundary](Session::block_boundary) holds and
    ///every fed input byte has been consumed.
    pub fn get_state(&self) -> Result<ResumeState, Error> {
        if !self.block_boundary() || self.in_pos < self.in_len {
            return Err(Error::Sequence("state is only exportable at a block boundary with all fed input consumed"));
        }
        if self.in_pos == 0 {
            return Err(Error::Sequence("no input byte has been consumed yet"));
        }

        let dictionary = if self.total_out < BUFFER_SIZE as u64 {
            //window not filled yet, the produced prefix is the whole history
            self.outbuf[..self.pivot].to_vec()
        } else {
            let mut dictionary = Vec::with_capacity(BUFFER_SIZE);
            dictionary.extend_from_slice(&self.outbuf[self.pivot..]);
            dictionary.extend_from_slice(&self.outbuf[..self.pivot]);
            dictionary
        };

        let state = ResumeState {
            dictionary,
            bits: self.engine.pending_bits(),
            last_byte: self.inbuf[self.in_pos - 1],
        };
        log::debug!("state captured: {} dictionary byte(s), {} leftover bit(s)", state.dictionary.len(), state.bits);
        Ok(state)
    }

    ///Primes a freshly constructed session to the bit-level position a
    ///[ResumeState] was captured at.
    ///
    ///Callable at most once, and only before any feed or read. The session
    ///must use [Mode::Deflate]: past any container header the stream
    ///continues as raw deflate.
    pub fn set_state(&mut self, state: &ResumeState) -> Result<(), Error> {
        if !self.pristine {
            return Err(Error::Sequence("state can only be restored on a fresh session"));
        }
        if state.bits > 7 {
            return Err(Error::InvalidConfig);
        }
        if state.dictionary.len() > BUFFER_SIZE {
            return Err(Error::Overflow);
        }
        self.pristine = false;

        if state.bits > 0 {
            let leftover = (state.last_byte as u32 >> (8 - state.bits as u32)) as u8;
            self.engine.prime(state.bits, leftover)?;
        }
        self.engine.set_dictionary(&state.dictionary)?;
        log::debug!("state restored: {} dictionary byte(s), {} leftover bit(s)", state.dictionary.len(), state.bits);
        Ok(())
    }

    #[inline]
    ///Total count of compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.engine.total_in()
    }

    #[inline]
    ///True once the final compressed block has been fully decoded.
    pub fn eof(&self) -> bool {
        self.eof
    }

    //Runs one engine call writing at the pivot, then advances and wraps it.
    //Returns the window offset the produced bytes start at, and their count.
    fn advance(&mut self, limit: usize) -> Result<(usize, usize), Error> {
        self.pristine = false;
        if self.eof || limit == 0 {
            return Ok((self.pivot, 0));
        }

        let start = self.pivot;
        let budget = limit.min(BUFFER_SIZE - start);
        let pending = self.in_len - self.in_pos;

        let result = self.engine.inflate_block(
            &self.inbuf[self.in_pos..self.in_len],
            &mut self.outbuf[start..start + budget],
        )?;

        self.in_pos += pending - result.input_remain;
        let produced = budget - result.output_remain;
        self.pivot += produced;
        debug_assert!(self.pivot <= BUFFER_SIZE);
        if self.pivot >= BUFFER_SIZE {
            self.pivot = 0;
        }
        self.total_out += produced as u64;

        if result.finished {
            self.eof = true;
            log::debug!("final block trailer reached after {} input byte(s)", self.total_in());
        }

        Ok((start, produced))
    }
}
