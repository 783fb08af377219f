use crate::luac::function::LuaFunction;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Insertion-ordered cache of fully decoded functions.
///
/// Keyed by exact start offset for decode-time reuse, and queryable by
/// code address for "which function owns this byte" lookups. Functions
/// are only inserted after they decode completely.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<LuaFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-offset lookup for the decode cache.
    pub fn get(&self, offset: u64) -> Option<&LuaFunction> {
        self.functions.iter().find(|f| f.offset == offset)
    }

    pub fn insert(&mut self, function: LuaFunction) {
        self.functions.push(function);
    }

    /// Find the function whose code window contains `addr`.
    ///
    /// The window starts one length prefix past `code_offset` (the first
    /// actual instruction byte) and ends at the constants table:
    /// `code_offset + int_size <= addr < const_offset`.
    pub fn by_code_address(&self, addr: u64, int_size: u8) -> Option<&LuaFunction> {
        self.functions
            .iter()
            .find(|f| f.code_offset + int_size as u64 <= addr && addr < f.const_offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LuaFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Serialize for FunctionRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.functions.len()))?;
        for function in &self.functions {
            seq.serialize_element(function)?;
        }
        seq.end()
    }
}
