#![allow(dead_code)]
//! Byte-level fixture builders shared by the integration tests.
//!
//! Fixtures are assembled in code rather than checked in as binaries so
//! each test controls word sizes, byte order and corruption precisely.

/// Word sizes used by every fixture unless a test patches the header:
/// the stock Lua 5.3 layout.
pub const INT_SIZE: u8 = 4;
pub const SIZE_T_SIZE: u8 = 8;
pub const INSTR_SIZE: u8 = 4;
pub const LUA_INT_SIZE: u8 = 8;
pub const LUA_NUM_SIZE: u8 = 8;

/// Total byte length of the fixture header.
pub const HEADER_LEN: usize = 17 + LUA_INT_SIZE as usize + LUA_NUM_SIZE as usize;

/// Append `value` as a `width`-byte integer in the given byte order.
pub fn push_uint(out: &mut Vec<u8>, value: u64, width: u8, le: bool) {
    let bytes = value.to_le_bytes();
    if le {
        out.extend_from_slice(&bytes[..width as usize]);
    } else {
        out.extend(bytes[..width as usize].iter().rev());
    }
}

/// A structurally valid header with the fixture word sizes.
pub fn header(le: bool) -> Vec<u8> {
    let mut out = vec![0x1b, b'L', b'u', b'a'];
    out.push(0x53);
    out.push(0);
    out.extend_from_slice(b"\x19\x93\r\n\x1a\n");
    out.extend_from_slice(&[INT_SIZE, SIZE_T_SIZE, INSTR_SIZE, LUA_INT_SIZE, LUA_NUM_SIZE]);
    push_uint(&mut out, 0x5678, LUA_INT_SIZE, le);
    push_uint(&mut out, 370.5f64.to_bits(), LUA_NUM_SIZE, le);
    out
}

/// Short-form string: one raw length byte encoding `len + 1`.
pub fn string_bytes(s: &[u8]) -> Vec<u8> {
    assert!(s.len() < 0xFE, "short-form fixture string too long");
    let mut out = vec![s.len() as u8 + 1];
    out.extend_from_slice(s);
    out
}

/// Extended-form string: 0xFF sentinel, then the raw length as a size_t.
pub fn long_string_bytes(s: &[u8], le: bool) -> Vec<u8> {
    let mut out = vec![0xFF];
    push_uint(&mut out, s.len() as u64 + 1, SIZE_T_SIZE, le);
    out.extend_from_slice(s);
    out
}

pub fn const_nil() -> Vec<u8> {
    vec![0x00]
}

pub fn const_bool(v: bool) -> Vec<u8> {
    vec![0x01, v as u8]
}

pub fn const_float(v: f64, le: bool) -> Vec<u8> {
    let mut out = vec![0x03];
    push_uint(&mut out, v.to_bits(), LUA_NUM_SIZE, le);
    out
}

pub fn const_int(v: u64, le: bool) -> Vec<u8> {
    let mut out = vec![0x13];
    push_uint(&mut out, v, LUA_INT_SIZE, le);
    out
}

pub fn const_short_str(s: &[u8]) -> Vec<u8> {
    let mut out = vec![0x04];
    out.extend(string_bytes(s));
    out
}

pub fn const_long_str(s: &[u8], le: bool) -> Vec<u8> {
    let mut out = vec![0x14];
    out.extend(long_string_bytes(s, le));
    out
}

/// One function prototype, encodable to chunk bytes.
pub struct FnFixture {
    /// Debug name; empty means "no name" (a single 0 byte)
    pub name: Vec<u8>,
    pub line_defined: u64,
    pub last_line_defined: u64,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,
    /// Number of (zero-filled) instructions in the code block
    pub code_count: u32,
    /// Pre-encoded constant entries
    pub constants: Vec<Vec<u8>>,
    /// Number of (in-stack, index) upvalue entries
    pub upvalue_count: u8,
    pub protos: Vec<FnFixture>,
    /// Debug: per-instruction line numbers
    pub line_info: Vec<u32>,
    /// Debug: (name, start pc, end pc) live ranges
    pub locals: Vec<(Vec<u8>, u32, u32)>,
    /// Debug: upvalue names
    pub upvalue_names: Vec<Vec<u8>>,
}

impl Default for FnFixture {
    fn default() -> Self {
        FnFixture {
            name: Vec::new(),
            line_defined: 1,
            last_line_defined: 5,
            num_params: 0,
            is_vararg: 1,
            max_stack_size: 2,
            code_count: 1,
            constants: Vec::new(),
            upvalue_count: 0,
            protos: Vec::new(),
            line_info: Vec::new(),
            locals: Vec::new(),
            upvalue_names: Vec::new(),
        }
    }
}

impl FnFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &[u8]) -> Self {
        FnFixture {
            name: name.to_vec(),
            ..Self::default()
        }
    }

    pub fn encode(&self, le: bool) -> Vec<u8> {
        let mut out = Vec::new();

        if self.name.is_empty() {
            out.push(0);
        } else {
            out.extend(string_bytes(&self.name));
        }
        push_uint(&mut out, self.line_defined, INT_SIZE, le);
        push_uint(&mut out, self.last_line_defined, INT_SIZE, le);
        out.push(self.num_params);
        out.push(self.is_vararg);
        out.push(self.max_stack_size);

        push_uint(&mut out, self.code_count as u64, INT_SIZE, le);
        out.extend(std::iter::repeat(0).take(self.code_count as usize * INSTR_SIZE as usize));

        push_uint(&mut out, self.constants.len() as u64, INT_SIZE, le);
        for entry in &self.constants {
            out.extend_from_slice(entry);
        }

        push_uint(&mut out, self.upvalue_count as u64, INT_SIZE, le);
        for i in 0..self.upvalue_count {
            out.push(0); // in-stack flag
            out.push(i); // index
        }

        push_uint(&mut out, self.protos.len() as u64, INT_SIZE, le);
        for child in &self.protos {
            out.extend(child.encode(le));
        }

        push_uint(&mut out, self.line_info.len() as u64, INT_SIZE, le);
        for line in &self.line_info {
            push_uint(&mut out, *line as u64, INT_SIZE, le);
        }
        push_uint(&mut out, self.locals.len() as u64, INT_SIZE, le);
        for (name, start_pc, end_pc) in &self.locals {
            out.extend(string_bytes(name));
            push_uint(&mut out, *start_pc as u64, INT_SIZE, le);
            push_uint(&mut out, *end_pc as u64, INT_SIZE, le);
        }
        push_uint(&mut out, self.upvalue_names.len() as u64, INT_SIZE, le);
        for name in &self.upvalue_names {
            out.extend(string_bytes(name));
        }

        out
    }
}

/// A complete chunk: header followed by the encoded root function.
pub fn chunk(root: &FnFixture, le: bool) -> Vec<u8> {
    let mut out = header(le);
    out.extend(root.encode(le));
    out
}
