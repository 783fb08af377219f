//! Lua 5.3 precompiled chunk (`luac` output) decoding.
//!
//! A chunk is a self-describing header followed by one root function
//! prototype; [`LuacChunk::parse`] decodes the whole container, while the
//! pieces ([`LuacHeader`], [`ParseContext`]) are exposed for hosts that
//! drive decoding themselves.

pub mod function;
pub mod header;
pub mod reader;
pub mod registry;
pub mod visitor;

pub use function::{LuaFunction, ParseContext, MAX_PROTO_DEPTH};
pub use header::{LuacHeader, LUAC_DATA, LUAC_INT_TEST, LUAC_MAGIC, LUAC_NUM_TEST, LUAC_VERSION};
pub use registry::FunctionRegistry;
pub use visitor::ChunkVisitor;

use crate::error::Result;
use serde::Serialize;

/// A fully decoded chunk: header plus the registry of every function in
/// the prototype tree.
#[derive(Debug, Serialize)]
pub struct LuacChunk {
    pub header: LuacHeader,
    pub functions: FunctionRegistry,
    /// Byte length of the header
    pub header_size: usize,
    /// Offset one past the root function
    pub total_size: u64,
}

impl LuacChunk {
    /// Decode a whole chunk without visitor hooks.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_visitor(data, ChunkVisitor::new())
    }

    /// Decode a whole chunk, firing the visitor's hooks along the way.
    pub fn parse_with_visitor(data: &[u8], visitor: ChunkVisitor<'_>) -> Result<Self> {
        let (header, header_size) = LuacHeader::parse(data)?;
        let mut ctx = ParseContext::new(header, visitor);
        let total_size = ctx.parse_function(data, header_size as u64, None)?;
        Ok(LuacChunk {
            header,
            functions: ctx.into_registry(),
            header_size,
            total_size,
        })
    }

    /// Resolve the function whose code window contains `addr`.
    pub fn function_by_code_address(&self, addr: u64) -> Option<&LuaFunction> {
        self.functions.by_code_address(addr, self.header.int_size)
    }
}
