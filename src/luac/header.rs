use crate::error::{Error, Result};
use crate::luac::reader;
use log::{debug, warn};
use scroll::Endian;
use serde::{Deserialize, Serialize};

/// Magic signature at the start of every chunk ("\x1bLua", read big-endian)
pub const LUAC_MAGIC: u32 = 0x1b4c7561;

/// The one supported bytecode version (Lua 5.3)
pub const LUAC_VERSION: u8 = 0x53;

/// Conversion-check signature following the format byte
pub const LUAC_DATA: [u8; 6] = *b"\x19\x93\r\n\x1a\n";

/// Integer test value used to detect byte order
pub const LUAC_INT_TEST: u64 = 0x5678;

/// Floating-point test value used to validate the number format
pub const LUAC_NUM_TEST: f64 = 370.5;

/// Decoded chunk header: version, byte order and the five word-size fields
/// that govern every variable-width read in the rest of the chunk.
///
/// Immutable once parsed; a parse session keeps exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LuacHeader {
    /// Bytecode version byte (always [`LUAC_VERSION`] for now)
    pub version: u8,

    /// Format byte; 0 is the official format, anything else is accepted
    /// with a warning
    pub format: u8,

    /// True if multi-byte fields are little-endian
    pub is_le: bool,

    /// Width in bytes of plain integer fields (counts, line numbers)
    pub int_size: u8,

    /// Width in bytes of size_t fields (extended string lengths)
    pub size_t_size: u8,

    /// Width in bytes of a single VM instruction
    pub instruction_size: u8,

    /// Width in bytes of a Lua integer constant
    pub lua_int_size: u8,

    /// Width in bytes of a Lua number (float) constant
    pub lua_number_size: u8,
}

fn validate_word_size(field: &'static str, size: u8) -> Result<u8> {
    match size {
        2 | 4 | 8 => Ok(size),
        _ => Err(Error::InvalidWordSize { field, size }),
    }
}

impl LuacHeader {
    /// Parse and validate a chunk header from the start of `data`.
    ///
    /// Returns the decoded header and the exact number of bytes consumed,
    /// which is where the root function begins.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        let mut offset: u64 = 0;

        let magic = reader::read_uint(data, offset, 4, Endian::Big)? as u32;
        if magic != LUAC_MAGIC {
            return Err(Error::BadMagic {
                expected: LUAC_MAGIC,
                got: magic,
            });
        }
        offset += 4;

        let version = reader::read_u8(data, offset)?;
        if version != LUAC_VERSION {
            debug!(
                "reported lua version {}.{} (0x{:x}) not supported",
                version >> 4,
                version & 0xf,
                version
            );
            return Err(Error::UnsupportedVersion { version });
        }
        offset += 1;

        let format = reader::read_u8(data, offset)?;
        if format != 0 {
            warn!("unexpected lua format 0x{:x} at offset {}", format, offset);
        }
        offset += 1;

        reader::ensure(data, offset, LUAC_DATA.len() as u64)?;
        let sig = &data[offset as usize..offset as usize + LUAC_DATA.len()];
        if sig != LUAC_DATA {
            return Err(Error::BadSignature { offset });
        }
        offset += LUAC_DATA.len() as u64;

        let int_size = validate_word_size("int_size", reader::read_u8(data, offset)?)?;
        let size_t_size = validate_word_size("size_t_size", reader::read_u8(data, offset + 1)?)?;
        let instruction_size =
            validate_word_size("instruction_size", reader::read_u8(data, offset + 2)?)?;
        let lua_int_size = validate_word_size("lua_int_size", reader::read_u8(data, offset + 3)?)?;
        let lua_number_size =
            validate_word_size("lua_number_size", reader::read_u8(data, offset + 4)?)?;
        offset += 5;

        // The chunk carries a known integer so the byte order can be
        // detected rather than declared: try little-endian first, then
        // re-read the same bytes big-endian.
        let le_try = reader::read_uint(data, offset, lua_int_size, Endian::Little)?;
        let is_le = if le_try == LUAC_INT_TEST {
            true
        } else {
            let be_try = reader::read_uint(data, offset, lua_int_size, Endian::Big)?;
            if be_try != LUAC_INT_TEST {
                return Err(Error::EndiannessDetectionFailed {
                    le: le_try,
                    be: be_try,
                });
            }
            false
        };
        offset += lua_int_size as u64;

        let endian = if is_le { Endian::Little } else { Endian::Big };
        let num = reader::read_double(data, offset, lua_number_size, endian)?;
        if num != LUAC_NUM_TEST {
            debug!(
                "lua test number at offset {} failed ({} != {})",
                offset, num, LUAC_NUM_TEST
            );
            return Err(Error::NumberFormatMismatch { got: num });
        }
        offset += lua_number_size as u64;

        let header = LuacHeader {
            version,
            format,
            is_le,
            int_size,
            size_t_size,
            instruction_size,
            lua_int_size,
            lua_number_size,
        };
        debug!("header parsed: {} bytes consumed, {:?}", offset, header);
        Ok((header, offset as usize))
    }

    /// Detected byte order for multi-byte reads.
    pub fn endian(&self) -> Endian {
        if self.is_le {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    /// Read a plain integer field (count, line number) at `offset`.
    pub fn read_int(&self, data: &[u8], offset: u64) -> Result<u64> {
        reader::read_uint(data, offset, self.int_size, self.endian())
    }

    /// Read a size_t field (extended string length) at `offset`.
    pub fn read_size_t(&self, data: &[u8], offset: u64) -> Result<u64> {
        reader::read_uint(data, offset, self.size_t_size, self.endian())
    }

    /// Read a Lua integer constant at `offset`.
    pub fn read_lua_int(&self, data: &[u8], offset: u64) -> Result<u64> {
        reader::read_uint(data, offset, self.lua_int_size, self.endian())
    }

    /// Read a Lua number constant at `offset`, exposed as a double.
    pub fn read_lua_number(&self, data: &[u8], offset: u64) -> Result<f64> {
        reader::read_double(data, offset, self.lua_number_size, self.endian())
    }
}
