use crate::error::{Error, Result};
use crate::luac::LuacChunk;
use std::fs;
use std::path::Path;

/// Run the funcs subcommand: list decoded functions, or resolve which
/// function owns a code address.
pub fn funcs(input_path: &Path, addr: Option<u64>) -> Result<()> {
    let data = fs::read(input_path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", input_path.display(), e)))?;

    let chunk = LuacChunk::parse(&data)?;

    if let Some(addr) = addr {
        match chunk.function_by_code_address(addr) {
            Some(f) => println!(
                "0x{:08x} belongs to function at 0x{:08x} ({})",
                addr,
                f.offset,
                f.name.as_deref().unwrap_or("anonymous")
            ),
            None => println!("0x{:08x} belongs to no decoded function", addr),
        }
        return Ok(());
    }

    for f in chunk.functions.iter() {
        println!(
            "0x{:08x} {:>10} lines {}-{} params {} stack {} size {}",
            f.offset,
            f.name.as_deref().unwrap_or("anonymous"),
            f.line_defined,
            f.last_line_defined,
            f.num_params,
            f.max_stack_size,
            f.size
        );
    }
    Ok(())
}
