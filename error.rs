//! error.rs - Init-time failures
//! The per-frame path never produces these; it resolves to safe defaults.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("failed to allocate {bytes} bytes for {what}")]
    OutOfMemory { what: &'static str, bytes: usize },

    #[error("invalid framebuffer dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },

    #[error("image buffer holds {actual} bytes, expected at least {expected}")]
    ImageTooSmall { expected: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

/// Allocates exactly `len` copies of `fill`, reporting
/// allocation failure instead of aborting.
pub(crate) fn try_alloc<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<alloc::vec::Vec<T>> {
    let mut buffer = alloc::vec::Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { what, bytes: len.saturating_mul(core::mem::size_of::<T>()) })?;
    buffer.resize(len, fill);
    Ok(buffer)
}
