use miette::Diagnostic;
use thiserror::Error;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custom error types for the Lua chunk decoder
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("I/O error: {0}")]
    #[diagnostic(code(luac_dec::io_error))]
    Io(String),

    #[error("Invalid chunk magic: expected 0x{expected:08X}, got 0x{got:08X}")]
    #[diagnostic(code(luac_dec::bad_magic))]
    BadMagic { expected: u32, got: u32 },

    #[error("Unsupported Lua bytecode version: 0x{version:02X}")]
    #[diagnostic(code(luac_dec::unsupported_version))]
    UnsupportedVersion { version: u8 },

    #[error("Bad conversion-check signature at offset {offset}")]
    #[diagnostic(code(luac_dec::bad_signature))]
    BadSignature { offset: u64 },

    #[error("Invalid {field} of {size} bytes (must be 2, 4 or 8)")]
    #[diagnostic(code(luac_dec::invalid_word_size))]
    InvalidWordSize { field: &'static str, size: u8 },

    #[error(
        "Endianness check failed: test integer reads 0x{le:X} LE / 0x{be:X} BE, expected 0x5678"
    )]
    #[diagnostic(code(luac_dec::endianness_detection_failed))]
    EndiannessDetectionFailed { le: u64, be: u64 },

    #[error("Number format check failed: test number reads {got}, expected 370.5")]
    #[diagnostic(code(luac_dec::number_format_mismatch))]
    NumberFormatMismatch { got: f64 },

    #[error("Read of {wanted} bytes at offset {offset} exceeds buffer bounds")]
    #[diagnostic(code(luac_dec::buffer_bounds_exceeded))]
    BufferBoundsExceeded { offset: u64, wanted: u64 },

    #[error("Invalid constant tag 0x{tag:02X} at offset {offset}")]
    #[diagnostic(code(luac_dec::invalid_constant_tag))]
    InvalidConstantTag { tag: u8, offset: u64 },

    #[error("Prototype nesting deeper than {max} levels at offset {offset}")]
    #[diagnostic(code(luac_dec::nesting_too_deep))]
    NestingTooDeep { offset: u64, max: usize },

    #[error("Internal error: {message}")]
    #[diagnostic(code(luac_dec::internal_error))]
    Internal { message: String },
}

impl Error {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
