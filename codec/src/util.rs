//! Helpers shared by the readers.

use crate::Error;
use bytes::Buf;

/// Checks that at least `len` bytes remain in `buf` before anything is read or split off.
#[inline]
pub fn at_least<B: Buf>(buf: &mut B, len: usize) -> Result<(), Error> {
    let remaining = buf.remaining();
    if remaining < len {
        return Err(Error::MalformedBuffer(len, remaining));
    }
    Ok(())
}
