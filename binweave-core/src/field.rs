//! Field records and image-wide properties

use crate::ecc::EccScheme;
use crate::error::BuildError;
use crate::Result;
use bytes::Bytes;

/// One named region of the output image
///
/// A field is created with its placement and scheme, populated exactly once
/// with `size` bytes of data (see [`crate::value`]), consumed once by the
/// assembler and then dropped. It is never mutated after population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinField {
    /// Field name, used in diagnostics only; uniqueness is not enforced
    pub name: String,

    /// Byte offset of the encoded field inside the output image
    pub offset: u32,

    /// Raw, pre-encoding byte length
    pub size: u32,

    /// Error-correction scheme applied at assembly time
    pub ecc: EccScheme,

    /// Owned raw data, exactly `size` bytes once populated
    pub data: Bytes,
}

impl BinField {
    /// Create an empty field awaiting data population
    pub fn new(name: impl Into<String>, offset: u32, size: u32, ecc: EccScheme) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
            ecc,
            data: Bytes::new(),
        }
    }

    /// Attach the materialized data buffer.
    ///
    /// The buffer length must equal the declared raw size.
    pub fn with_data(mut self, data: Bytes) -> Result<Self> {
        if data.len() as u64 != u64::from(self.size) {
            return Err(BuildError::InvalidValue(format!(
                "{}: data buffer is {} bytes, field size is {}",
                self.name,
                data.len(),
                self.size
            )));
        }
        self.data = data;
        Ok(self)
    }

    /// Post-encoding size of this field in the output image.
    pub fn encoded_size(&self) -> Result<u32> {
        self.ecc.encoded_len(self.size)
    }

    /// Image offset one past the encoded field.
    ///
    /// Fails with [`BuildError::Overflow`] when the end does not fit in the
    /// 32-bit unsigned domain.
    pub fn end_offset(&self) -> Result<u32> {
        let encoded = self.encoded_size()?;
        self.offset.checked_add(encoded).ok_or_else(|| {
            BuildError::Overflow(format!(
                "{}: offset {:#x} + encoded size {:#x}",
                self.name, self.offset, encoded
            ))
        })
    }
}

/// Image-wide configuration, set once before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageProperties {
    /// Total image size in bytes. Zero means "infer from the fields";
    /// otherwise it is an upper bound the computed layout must not exceed.
    /// Updated in place by the layout validator when inferring.
    pub total_size: u32,

    /// Byte used to fill gaps between fields and trailing space
    pub padding_value: u8,
}

impl ImageProperties {
    /// Create image properties with an explicit size limit (0 = infer)
    pub fn new(total_size: u32, padding_value: u8) -> Self {
        Self {
            total_size,
            padding_value,
        }
    }
}
