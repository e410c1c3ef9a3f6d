//! Array-like framing.
//!
//! Every composite (arrays, sets, maps, objects, regular expressions, and registered types)
//! shares one payload layout:
//!
//! ```text
//! +-------------+------------+-----------+------------+-----------+-----+
//! | Count (u32) | Len1 (u16) | Element 1 | Len2 (u16) | Element 2 | ... |
//! +-------------+------------+-----------+------------+-----------+-----+
//! ```
//!
//! Each element is a complete encoded value (tag and payload), so its length prefix caps any
//! single nested value at [MAX_ELEMENT_SIZE] bytes.

use crate::{util::at_least, Error, RangeCfg, ReadExt, Write};
use bytes::{Buf, BufMut, Bytes};

/// Largest encoded size of a single framed element.
pub const MAX_ELEMENT_SIZE: usize = u16::MAX as usize;

/// Writes the element count of a composite.
pub fn write_count(buf: &mut impl BufMut, count: usize) -> Result<(), Error> {
    let count =
        u32::try_from(count).map_err(|_| Error::LengthExceeded(count, u32::MAX as usize))?;
    count.write(buf);
    Ok(())
}

/// Writes one length-prefixed element.
pub fn write_element(buf: &mut impl BufMut, element: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(element.len()).map_err(|_| Error::FieldTooLarge(element.len()))?;
    len.write(buf);
    buf.put_slice(element);
    Ok(())
}

/// Reads the element count of a composite, rejecting counts outside `range`.
pub fn read_count(buf: &mut impl Buf, range: &RangeCfg) -> Result<usize, Error> {
    let count = u32::read(buf)? as usize;
    if !range.contains(count) {
        return Err(Error::InvalidLength(count));
    }
    Ok(count)
}

/// Takes the next length-prefixed element off `buf`, without copying when `buf` is [Bytes].
pub fn read_element(buf: &mut impl Buf) -> Result<Bytes, Error> {
    let len = u16::read(buf)? as usize;
    at_least(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}
