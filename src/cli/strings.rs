use crate::error::{Error, Result};
use crate::luac::{ChunkVisitor, LuacChunk};
use std::fs;
use std::path::Path;

/// Run the strings subcommand: dump every string the decoder observes
/// (function names, string constants, debug names) with its chunk offset.
pub fn strings(input_path: &Path) -> Result<()> {
    let data = fs::read(input_path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", input_path.display(), e)))?;

    let mut visitor = ChunkVisitor::new();
    visitor.on_string = Some(Box::new(|bytes: &[u8], offset: u64| {
        println!("0x{:08x}: {}", offset, String::from_utf8_lossy(bytes));
    }));

    LuacChunk::parse_with_visitor(&data, visitor)?;
    Ok(())
}
