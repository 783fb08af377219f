//! luac-dec-rs: strict decoder for Lua 5.3 precompiled bytecode chunks
//!
//! This library validates a chunk's self-describing header (word sizes and
//! byte order are detected from test values), then recursively decodes the
//! function-prototype tree with strict bounds checking, exposing strings,
//! constants and completed functions to optional visitor hooks.

pub mod cli;
pub mod error;
pub mod luac;

pub use error::{Error as DecodeError, Result as DecodeResult};

// Re-export commonly used types
pub use luac::{ChunkVisitor, FunctionRegistry, LuaFunction, LuacChunk, LuacHeader, ParseContext};
