use crate::error::{Error, Result};
use crate::luac::LuacChunk;
use std::fs;
use std::path::Path;

/// Run the inspect subcommand
pub fn inspect(input_path: &Path, format: &str) -> Result<()> {
    let data = fs::read(input_path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", input_path.display(), e)))?;

    let chunk = LuacChunk::parse(&data)?;

    match format {
        "text" => {
            let h = &chunk.header;
            println!("Lua chunk, version 0x{:02X}, format {}", h.version, h.format);
            println!(
                "  byte order: {}",
                if h.is_le { "little-endian" } else { "big-endian" }
            );
            println!(
                "  word sizes: int={} size_t={} instruction={} lua_int={} lua_number={}",
                h.int_size, h.size_t_size, h.instruction_size, h.lua_int_size, h.lua_number_size
            );
            println!("  header: {} bytes, chunk: {} bytes", chunk.header_size, chunk.total_size);
            println!("  functions: {}", chunk.functions.len());
            Ok(())
        }
        "json" => {
            let json = serde_json::to_string_pretty(&chunk).map_err(|_| Error::Internal {
                message: "Failed to serialize chunk to JSON".to_string(),
            })?;
            println!("{}", json);
            Ok(())
        }
        other => Err(Error::Internal {
            message: format!("Unknown output format: {}", other),
        }),
    }
}
