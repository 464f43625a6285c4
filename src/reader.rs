//!Buffered reading over a compressed stream with checkpoint capture.

use std::io::{self, Read, Seek, SeekFrom};

use crate::engine::Mode;
use crate::error::Error;
use crate::session::{ResumeState, Session, BUFFER_SIZE};

///Resumption point: the state triple plus the positions it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    ///Exported decode state at the boundary.
    pub state: ResumeState,
    ///Compressed-stream byte offset decoding continues from.
    pub offset: u64,
    ///Count of decoded bytes preceding the boundary.
    pub output_position: u64,
}

///Reader over the decoded byte stream that can capture and resume decode
///checkpoints.
///
///Wraps a [Session] around any `Read + Seek` source and implements
///`io::Read`/`io::BufRead` over the decoded bytes. While checkpoint capture
///is enabled the reader records the most recent block boundary it crossed;
///[resume](StateReader::resume) later continues from such a checkpoint
///without replaying the stream prefix.
///
///# Note:
///
///Capture requires stepping the engine one compressed byte at a time, so
///boundaries always fall on a consumed-input edge. Keep it disabled unless
///checkpoints are wanted, and hand in a buffered source when it is on.
pub struct StateReader<R> {
    inner: R,
    session: Session,
    //decoded bytes not yet handed out
    pending: Vec<u8>,
    pending_pos: usize,
    keep_last_state: bool,
    last_state: Option<Checkpoint>,
    output_pos: u64,
}

impl<R: Read + Seek> StateReader<R> {
    ///Creates a reader over `inner` expecting `mode` framing.
    pub fn new(inner: R, mode: Mode) -> Result<Self, Error> {
        Ok(Self {
            inner,
            session: Session::new(mode)?,
            pending: Vec::new(),
            pending_pos: 0,
            keep_last_state: false,
            last_state: None,
            output_pos: 0,
        })
    }

    ///Enables or disables checkpoint capture at block boundaries.
    pub fn keep_last_state(mut self, keep: bool) -> Self {
        self.keep_last_state = keep;
        self
    }

    #[inline]
    ///Latest captured checkpoint, if any.
    pub fn last_state(&self) -> Option<&Checkpoint> {
        self.last_state.as_ref()
    }

    #[inline]
    ///Count of decoded bytes handed out so far.
    pub fn output_position(&self) -> u64 {
        self.output_pos
    }

    #[inline]
    ///Returns reference to underlying reader.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    ///Continues decoding from a previously captured checkpoint.
    ///
    ///Replaces the current decoding session with a fresh raw-deflate one
    ///primed from `checkpoint` and repositions the underlying reader, so
    ///the next read produces the byte at `checkpoint.output_position`.
    pub fn resume(&mut self, checkpoint: &Checkpoint) -> io::Result<()> {
        let mut session = Session::new(Mode::Deflate).map_err(io::Error::from)?;
        session.set_state(&checkpoint.state).map_err(io::Error::from)?;
        self.inner.seek(SeekFrom::Start(checkpoint.offset))?;

        self.session = session;
        self.pending.clear();
        self.pending_pos = 0;
        self.output_pos = checkpoint.output_position;
        log::debug!("resumed decoding at compressed offset {}", checkpoint.offset);
        Ok(())
    }

    //Decodes the next run of bytes into `pending`; left empty on clean EOF.
    fn refill(&mut self) -> io::Result<()> {
        self.pending.clear();
        self.pending_pos = 0;

        let mut chunk = [0u8; 8 * 1024];
        while self.pending.is_empty() && !self.session.eof() {
            let need = self.session.needs_input();
            if need > 0 {
                let take = if self.keep_last_state { 1 } else { need.min(chunk.len()) };
                let got = self.inner.read(&mut chunk[..take])?;
                if got == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "compressed stream ended before its final block",
                    ));
                }
                self.session.feed_input(&chunk[..got]).map_err(io::Error::from)?;
            }

            let produced = self.session.read(BUFFER_SIZE).map_err(io::Error::from)?;
            self.pending.extend_from_slice(&produced);

            if self.keep_last_state
                && self.session.block_boundary()
                && !self.session.in_final_block()
                && self.session.needs_input() > 0
            {
                if let Ok(state) = self.session.get_state() {
                    self.last_state = Some(Checkpoint {
                        state,
                        offset: self.session.total_in(),
                        output_position: self.output_pos + self.pending.len() as u64,
                    });
                }
            }
        }

        Ok(())
    }
}

impl<R: Read + Seek> Read for StateReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending_pos >= self.pending.len() {
            self.refill()?;
        }

        let available = &self.pending[self.pending_pos..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.pending_pos += count;
        self.output_pos += count as u64;
        Ok(count)
    }
}

impl<R: Read + Seek> io::BufRead for StateReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pending_pos >= self.pending.len() {
            self.refill()?;
        }

        Ok(&self.pending[self.pending_pos..])
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.pending.len() - self.pending_pos);
        self.pending_pos += amt;
        self.output_pos += amt as u64;
    }
}
