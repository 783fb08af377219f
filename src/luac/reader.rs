//! Fixed-width integer reads parameterized by word size and byte order.
//!
//! The chunk format declares its own word widths in the header, so every
//! multi-byte read takes the width and endianness explicitly instead of
//! assuming a native layout.

use crate::error::{Error, Result};
use scroll::{Endian, Pread};

/// Verify that `wanted` bytes starting at `offset` fit inside `data`.
pub fn ensure(data: &[u8], offset: u64, wanted: u64) -> Result<()> {
    let oob = Error::BufferBoundsExceeded { offset, wanted };
    let end = offset.checked_add(wanted).ok_or_else(|| oob.clone())?;
    if end > data.len() as u64 {
        return Err(oob);
    }
    Ok(())
}

/// Verify that `count` entries of `entry_width` bytes fit inside `data`
/// starting at `offset`, with overflow-checked arithmetic. Returns the
/// total byte length of the entries.
pub fn ensure_counted(data: &[u8], offset: u64, count: u64, entry_width: u8) -> Result<u64> {
    let bytes = count
        .checked_mul(entry_width as u64)
        .ok_or(Error::BufferBoundsExceeded {
            offset,
            wanted: u64::MAX,
        })?;
    ensure(data, offset, bytes)?;
    Ok(bytes)
}

/// Read a single byte at `offset`.
pub fn read_u8(data: &[u8], offset: u64) -> Result<u8> {
    ensure(data, offset, 1)?;
    Ok(data[offset as usize])
}

/// Read an unsigned integer of `width` bytes (2, 4 or 8) at `offset`,
/// zero-extended to 64 bits.
pub fn read_uint(data: &[u8], offset: u64, width: u8, endian: Endian) -> Result<u64> {
    ensure(data, offset, width as u64)?;
    let oob = Error::BufferBoundsExceeded {
        offset,
        wanted: width as u64,
    };
    let mut off = offset as usize;
    let value = match width {
        2 => data
            .gread_with::<u16>(&mut off, endian)
            .map_err(|_| oob)? as u64,
        4 => data
            .gread_with::<u32>(&mut off, endian)
            .map_err(|_| oob)? as u64,
        8 => data.gread_with::<u64>(&mut off, endian).map_err(|_| oob)?,
        _ => {
            return Err(Error::InvalidWordSize {
                field: "integer read",
                size: width,
            })
        }
    };
    Ok(value)
}

/// Read a floating-point test value of `width` bytes: the raw integer is
/// assembled in the given byte order, zero-extended into a 64-bit slot and
/// reinterpreted as an IEEE-754 double.
pub fn read_double(data: &[u8], offset: u64, width: u8, endian: Endian) -> Result<f64> {
    let raw = read_uint(data, offset, width, endian)?;
    Ok(f64::from_bits(raw))
}
