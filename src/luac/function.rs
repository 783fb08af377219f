//! Recursive function-prototype decoding.
//!
//! A chunk is a tree of function prototypes. Each function is decoded in a
//! fixed field order; nested prototypes re-enter the same decoder with the
//! enclosing function as parent. All state lives in a per-session
//! [`ParseContext`], never in globals.

use crate::error::{Error, Result};
use crate::luac::header::LuacHeader;
use crate::luac::reader;
use crate::luac::registry::FunctionRegistry;
use crate::luac::visitor::ChunkVisitor;
use log::debug;
use serde::{Deserialize, Serialize};

/// Constant-pool type tags (Lua 5.3 `LUA_T*` values, variant bit in the
/// high nibble)
const TAG_NIL: u8 = 0x00;
const TAG_BOOLEAN: u8 = 0x01;
const TAG_NUMBER_FLT: u8 = 0x03;
const TAG_NUMBER_INT: u8 = 0x13;
const TAG_SHORT_STR: u8 = 0x04;
const TAG_LONG_STR: u8 = 0x14;

/// Maximum prototype nesting depth accepted before a chunk is rejected.
/// The same order of magnitude as the reference VM's C-call limit.
pub const MAX_PROTO_DEPTH: usize = 200;

/// One fully decoded function prototype.
///
/// Created only when every field of the function validated; never mutated
/// afterwards. `parent` is the start offset of the enclosing function, a
/// pure observation link for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuaFunction {
    /// Start offset of this function inside the chunk
    pub offset: u64,

    /// Debug name, when the chunk carries one
    pub name: Option<String>,

    pub line_defined: u64,
    pub last_line_defined: u64,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,

    /// Start offset of the enclosing function; `None` for the root
    pub parent: Option<u64>,

    /// Offset of the code block (its count prefix) and instruction count
    pub code_offset: u64,
    pub code_size: u64,

    /// Offset of the constants block and constant count
    pub const_offset: u64,
    pub const_size: u64,

    /// Offset of the upvalues block and upvalue count
    pub upvalue_offset: u64,
    pub upvalue_size: u64,

    /// Offset of the nested-prototype block and child count
    pub protos_offset: u64,
    pub protos_size: u64,

    /// Offset of the debug-info block
    pub debug_offset: u64,

    /// Total encoded size in bytes
    pub size: u64,
}

/// Per-session decode state: the chunk header, the function cache and the
/// active visitor.
///
/// Exactly one `ParseContext` exists per chunk being decoded. It is passed
/// explicitly through the whole call tree and must not be shared between
/// concurrent decode sessions; parallel decoding of several chunks takes
/// one context each.
#[derive(Debug)]
pub struct ParseContext<'v> {
    pub header: LuacHeader,
    registry: FunctionRegistry,
    visitor: ChunkVisitor<'v>,
}

impl<'v> ParseContext<'v> {
    pub fn new(header: LuacHeader, visitor: ChunkVisitor<'v>) -> Self {
        Self {
            header,
            registry: FunctionRegistry::new(),
            visitor,
        }
    }

    /// Decode the function at `offset`, returning the offset one past its
    /// end. `parent` is the start offset of the enclosing function, `None`
    /// for the root.
    ///
    /// If the offset was decoded before, the cached structure is reused:
    /// the constants and debug blocks are re-walked purely for visitor
    /// callbacks, children are revisited the same way, and the cached size
    /// is returned without re-validation.
    pub fn parse_function(&mut self, data: &[u8], offset: u64, parent: Option<u64>) -> Result<u64> {
        self.parse_function_at(data, offset, parent, 0)
    }

    /// Resolve the function whose code window contains `addr`.
    pub fn function_by_code_address(&self, addr: u64) -> Option<&LuaFunction> {
        self.registry.by_code_address(addr, self.header.int_size)
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> FunctionRegistry {
        self.registry
    }

    fn parse_function_at(
        &mut self,
        data: &[u8],
        offset: u64,
        parent: Option<u64>,
        depth: usize,
    ) -> Result<u64> {
        debug!("function at 0x{:x} (depth {})", offset, depth);
        if depth > MAX_PROTO_DEPTH {
            return Err(Error::NestingTooDeep {
                offset,
                max: MAX_PROTO_DEPTH,
            });
        }

        if let Some(function) = self.registry.get(offset).cloned() {
            debug!("cached function at 0x{:x}", function.offset);
            // Structure is already proven valid; re-walk only for the
            // visitor's benefit. Hooks must tolerate the duplicates.
            if self.visitor.wants_values() {
                self.parse_constants(data, function.const_offset)?;
                self.parse_debug(data, function.debug_offset)?;
            }
            self.parse_protos(data, function.protos_offset, Some(function.offset), depth)?;
            self.visitor.notify_function(&function);
            return Ok(offset + function.size);
        }

        let start = offset;
        let (mut offset, name_payload) = self.parse_string(data, offset)?;
        let name = name_payload.map(|(payload, len)| {
            String::from_utf8_lossy(&data[payload as usize..(payload + len) as usize]).into_owned()
        });

        let int_size = self.header.int_size as u64;
        let line_defined = self.header.read_int(data, offset)?;
        let last_line_defined = self.header.read_int(data, offset + int_size)?;
        offset += int_size * 2;
        debug!("lines {}..{}", line_defined, last_line_defined);

        reader::ensure(data, offset, 3)?;
        let num_params = data[offset as usize];
        let is_vararg = data[offset as usize + 1];
        let max_stack_size = data[offset as usize + 2];
        offset += 3;

        let code_offset = offset;
        let (next, code_size) = self.parse_code(data, offset)?;
        offset = next;

        let const_offset = offset;
        let (next, const_size) = self.parse_constants(data, offset)?;
        offset = next;

        let upvalue_offset = offset;
        let (next, upvalue_size) = self.parse_upvalues(data, offset)?;
        offset = next;

        let protos_offset = offset;
        let (next, protos_size) = self.parse_protos(data, offset, Some(start), depth)?;
        offset = next;

        let debug_offset = offset;
        offset = self.parse_debug(data, offset)?;

        let function = LuaFunction {
            offset: start,
            name,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            parent,
            code_offset,
            code_size,
            const_offset,
            const_size,
            upvalue_offset,
            upvalue_size,
            protos_offset,
            protos_size,
            debug_offset,
            size: offset - start,
        };
        self.visitor.notify_function(&function);
        self.registry.insert(function);
        Ok(offset)
    }

    /// Decode a length-prefixed string. Returns the offset past the string
    /// and, for a nonempty one, the payload's `(offset, length)`.
    ///
    /// A one-byte raw length of `0xFF` means the real raw length follows
    /// as a size_t field. The raw value encodes `actual + 1`; raw 0 is
    /// "no string" (no payload, no visitor call).
    fn parse_string(&mut self, data: &[u8], offset: u64) -> Result<(u64, Option<(u64, u64)>)> {
        let mut raw = reader::read_u8(data, offset)? as u64;
        let mut offset = offset + 1;
        if raw == 0xFF {
            raw = self.header.read_size_t(data, offset)?;
            offset += self.header.size_t_size as u64;
        }
        if raw == 0 {
            return Ok((offset, None));
        }
        let length = raw - 1;
        reader::ensure(data, offset, length)?;
        let payload = &data[offset as usize..(offset + length) as usize];
        self.visitor.notify_string(payload, offset);
        Ok((offset + length, Some((offset, length))))
    }

    fn parse_code(&mut self, data: &[u8], offset: u64) -> Result<(u64, u64)> {
        let count = self.header.read_int(data, offset)?;
        let offset = offset + self.header.int_size as u64;
        let bytes = reader::ensure_counted(data, offset, count, self.header.instruction_size)?;
        debug!("{} instructions", count);
        Ok((offset + bytes, count))
    }

    fn parse_constants(&mut self, data: &[u8], offset: u64) -> Result<(u64, u64)> {
        let count = self.header.read_int(data, offset)?;
        let mut offset = offset + self.header.int_size as u64;
        debug!("{} constants", count);

        for _ in 0..count {
            let tag_offset = offset;
            let tag = reader::read_u8(data, offset)?;
            offset += 1;
            match tag {
                TAG_NIL => {}
                TAG_BOOLEAN => {
                    reader::ensure(data, offset, 1)?;
                    self.notify_const(data, offset, 1);
                    offset += 1;
                }
                TAG_NUMBER_FLT => {
                    let width = self.header.lua_number_size as u64;
                    let value = self.header.read_lua_number(data, offset)?;
                    debug!("number {}", value);
                    self.notify_const(data, offset, width);
                    offset += width;
                }
                TAG_NUMBER_INT => {
                    let width = self.header.lua_int_size as u64;
                    let value = self.header.read_lua_int(data, offset)?;
                    debug!("integer 0x{:x}", value);
                    self.notify_const(data, offset, width);
                    offset += width;
                }
                TAG_SHORT_STR | TAG_LONG_STR => {
                    offset = self.parse_string(data, offset)?.0;
                }
                _ => {
                    return Err(Error::InvalidConstantTag {
                        tag,
                        offset: tag_offset,
                    })
                }
            }
        }
        Ok((offset, count))
    }

    fn parse_upvalues(&mut self, data: &[u8], offset: u64) -> Result<(u64, u64)> {
        let count = self.header.read_int(data, offset)?;
        let offset = offset + self.header.int_size as u64;
        // 2 fixed bytes per entry: in-stack flag, index
        let bytes = reader::ensure_counted(data, offset, count, 2)?;
        debug!("{} upvalues", count);
        Ok((offset + bytes, count))
    }

    fn parse_protos(
        &mut self,
        data: &[u8],
        offset: u64,
        parent: Option<u64>,
        depth: usize,
    ) -> Result<(u64, u64)> {
        let count = self.header.read_int(data, offset)?;
        let mut offset = offset + self.header.int_size as u64;
        debug!("{} prototypes", count);

        for _ in 0..count {
            offset = self.parse_function_at(data, offset, parent, depth + 1)?;
        }
        Ok((offset, count))
    }

    /// Three ordered debug subsections, each with its own count prefix:
    /// line mapping, local-variable live ranges, upvalue names.
    fn parse_debug(&mut self, data: &[u8], offset: u64) -> Result<u64> {
        let int_size = self.header.int_size as u64;

        let count = self.header.read_int(data, offset)?;
        let mut offset = offset + int_size;
        let bytes = reader::ensure_counted(data, offset, count, self.header.int_size)?;
        debug!("{} line mappings", count);
        offset += bytes;

        let count = self.header.read_int(data, offset)?;
        offset += int_size;
        debug!("{} live ranges", count);
        for _ in 0..count {
            offset = self.parse_string(data, offset)?.0;
            // start pc, end pc
            reader::ensure(data, offset, int_size * 2)?;
            offset += int_size * 2;
        }

        let count = self.header.read_int(data, offset)?;
        offset += int_size;
        debug!("{} upvalue names", count);
        for _ in 0..count {
            offset = self.parse_string(data, offset)?.0;
        }
        Ok(offset)
    }

    fn notify_const(&mut self, data: &[u8], offset: u64, width: u64) {
        let payload = &data[offset as usize..(offset + width) as usize];
        self.visitor.notify_const(payload, offset);
    }
}
