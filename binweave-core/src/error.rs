//! Error types for Binweave operations

/// Errors that can occur while building a binary image
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// Bad field configuration or out-of-range numeric/bit value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Buffer size violates a codec's precondition
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Unrecognized ECC scheme tag
    #[error("Unsupported ECC scheme: {0}")]
    UnsupportedScheme(String),

    /// Two fields occupy overlapping byte ranges
    #[error("Field overlap between {prev} and {next}")]
    FieldOverlap {
        /// Name of the earlier field (by offset).
        prev: String,
        /// Name of the later, overlapping field.
        next: String,
    },

    /// A size computation wrapped the 32-bit domain
    #[error("Size computation overflows 32 bits: {0}")]
    Overflow(String),

    /// Computed layout extent exceeds a caller-fixed image size
    #[error("Image too large: limit {limit}, actual {actual}")]
    ImageTooLarge {
        /// The configured upper bound on the image size.
        limit: u32,
        /// The extent the fields actually require.
        actual: u32,
    },

    /// A referenced input file does not exist or could not be opened
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A referenced input file could not be read (bad offset, premature EOF)
    #[error("File read error: {0}")]
    FileReadError(String),

    /// Output write failure, with the image offset at which it occurred
    #[error("I/O error at image offset {offset}: {message}")]
    Io {
        /// Byte offset into the output image where the write failed.
        offset: u64,
        /// The underlying I/O error message.
        message: String,
    },
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io {
            offset: 0,
            message: err.to_string(),
        }
    }
}
