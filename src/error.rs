//!Error taxonomy shared by the session and reader layers

use std::io;

use thiserror::Error;

///Decompression error.
///
///[Corruption](Error::Corruption) and [EngineFault](Error::EngineFault)
///leave the session permanently unusable; discard it and, if a prior
///state triple was kept, reconstruct from that. The remaining variants are
///caller-correctable and the session stays usable once the call pattern is
///adjusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ///Unsupported windowing configuration.
    #[error("invalid windowing configuration")]
    InvalidConfig,
    ///Engine could not allocate its working set.
    #[error("cannot allocate memory for decompression state")]
    OutOfMemory,
    ///Operation called out of allowed order.
    #[error("operation out of sequence: {0}")]
    Sequence(&'static str),
    ///Chunk or dictionary exceeds the fixed buffer capacity.
    #[error("input exceeds advertised capacity")]
    Overflow,
    ///Malformed compressed data, or a rejected dictionary.
    #[error("corrupt deflate stream: {0}")]
    Corruption(String),
    ///Stream requires an external preset dictionary.
    #[error("stream requires a preset dictionary")]
    NeedsDictionary,
    ///No progress is possible without further input.
    #[error("no progress possible without further input")]
    Underrun,
    ///Unexpected internal engine condition.
    #[error("internal engine inconsistency")]
    EngineFault,
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match error {
            Error::Underrun => io::ErrorKind::UnexpectedEof,
            Error::Corruption(_) | Error::NeedsDictionary => io::ErrorKind::InvalidData,
            Error::Sequence(_) | Error::Overflow | Error::InvalidConfig => io::ErrorKind::InvalidInput,
            Error::OutOfMemory | Error::EngineFault => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}
