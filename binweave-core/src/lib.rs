//! # Binweave Core
//!
//! Assembles a flat binary image from a declarative set of named fields, each
//! with an offset, a raw size and an optional per-field error-correction
//! encoding.
//!
//! ## Modules
//!
//! - `ecc`: ECC schemes and byte-buffer encoders
//! - `field`: Field records and image-wide properties
//! - `value`: Field value materialization (literals, byte lists, file data)
//! - `layout`: Offset ordering, overlap detection and image-size inference
//! - `assembler`: Final image write-out with padding

#![warn(missing_docs)]

pub mod assembler;
pub mod ecc;
pub mod error;
pub mod field;
pub mod layout;
pub mod value;

// Re-export commonly used types
pub use assembler::{assemble_image, write_image, AssembleOptions};
pub use ecc::EccScheme;
pub use error::BuildError;
pub use field::{BinField, ImageProperties};

/// Result type alias for Binweave operations
pub type Result<T> = core::result::Result<T, BuildError>;
