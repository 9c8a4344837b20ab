//! JSON manifest reader
//!
//! The manifest is the declarative description of the image: image-wide
//! properties plus one entry per field. This module normalizes it into the
//! typed records `binweave-core` consumes.

use anyhow::{bail, Context, Result};
use binweave_core::{
    ecc::EccScheme,
    field::{BinField, ImageProperties},
    value::{materialize, materialize_u32, parse_u32, ValueFormat, ValueSpec},
};
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// A numeric manifest entry: either a JSON number or a string literal with
/// auto-detected base ("0x100", "0b101", "64").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Plain JSON number
    Number(u64),
    /// Numeric string, base auto-detected
    Text(String),
}

impl Literal {
    fn as_u32(&self) -> Result<u32> {
        match self {
            Literal::Number(n) => {
                u32::try_from(*n).with_context(|| format!("value {n} does not fit in 32 bits"))
            }
            Literal::Text(s) => Ok(parse_u32(s)?),
        }
    }

    fn as_u8(&self) -> Result<u8> {
        let value = self.as_u32()?;
        u8::try_from(value).with_context(|| format!("value {value:#x} does not fit in a byte"))
    }
}

/// Top-level manifest document
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Image-wide properties; all defaults when absent
    #[serde(default)]
    pub image: ImageSection,

    /// Field entries, in any order
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

/// `"image"` section of the manifest
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSection {
    /// Total image size; 0 or absent means "infer from the fields"
    pub size: Option<Literal>,

    /// Padding byte for gaps and trailing space
    pub pad_value: Option<Literal>,
}

/// A scalar field attribute: a plain literal, or a full value object so
/// offsets and sizes can come from a file size or file content as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Plain JSON number
    Number(u64),
    /// Numeric string, base auto-detected
    Text(String),
    /// Full value description (FileSize, FileContent, byte list, alignment)
    Spec(ValueEntry),
}

impl Scalar {
    fn resolve(&self) -> Result<u32> {
        match self {
            Scalar::Number(n) => {
                u32::try_from(*n).with_context(|| format!("value {n} does not fit in 32 bits"))
            }
            Scalar::Text(s) => Ok(parse_u32(s)?),
            Scalar::Spec(entry) => Ok(materialize_u32(&entry.to_spec()?)?),
        }
    }
}

/// One `"fields"` entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    /// Field name, for diagnostics
    pub name: String,

    /// Byte offset into the image
    pub offset: Scalar,

    /// Raw, pre-encoding size in bytes
    pub size: Scalar,

    /// ECC scheme name; "none" when absent
    pub ecc: Option<String>,

    /// Value description; padding fill when absent
    pub value: Option<ValueEntry>,
}

/// A field's `"value"` object
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueEntry {
    /// Input format; 32-bit literal when absent
    #[serde(default)]
    pub format: ValueFormat,

    /// The literal text, byte list, or file path
    pub value: String,

    /// Alignment for numeric values
    pub align: Option<Literal>,

    /// Reverse the buffer bytes after filling
    #[serde(default)]
    pub reverse: bool,

    /// Read offset into the referenced file (FileContent only)
    #[serde(default)]
    pub start_offset: u64,
}

impl ValueEntry {
    fn to_spec(&self) -> Result<ValueSpec> {
        let align = self.align.as_ref().map(|a| a.as_u32()).transpose()?;
        Ok(ValueSpec {
            format: self.format,
            raw: self.value.clone(),
            align,
            reverse: self.reverse,
            file_start_offset: self.start_offset,
        })
    }
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {path}"))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {path}"))?;
        Ok(manifest)
    }

    /// Normalize the manifest into materialized field records and image
    /// properties. Field data buffers are fully populated here; layout
    /// validation is left to the caller.
    pub fn resolve(&self) -> Result<(Vec<BinField>, ImageProperties)> {
        let total_size = self
            .image
            .size
            .as_ref()
            .map(|s| s.as_u32())
            .transpose()
            .context("image.size")?
            .unwrap_or(0);
        let padding_value = self
            .image
            .pad_value
            .as_ref()
            .map(|p| p.as_u8())
            .transpose()
            .context("image.pad_value")?
            .unwrap_or(0);
        let image = ImageProperties::new(total_size, padding_value);

        let mut fields = Vec::with_capacity(self.fields.len());
        for entry in &self.fields {
            let field = entry
                .resolve(padding_value)
                .with_context(|| format!("field {:?}", entry.name))?;
            debug!(field = %field.name, offset = field.offset, size = field.size, "field materialized");
            fields.push(field);
        }

        Ok((fields, image))
    }
}

impl FieldEntry {
    fn resolve(&self, padding_value: u8) -> Result<BinField> {
        let offset = self.offset.resolve().context("offset")?;
        let size = self.size.resolve().context("size")?;
        if size == 0 {
            bail!("field size must not be zero");
        }

        let ecc = match self.ecc.as_deref() {
            None => EccScheme::None,
            Some(name) => name.parse::<EccScheme>()?,
        };

        let spec = self.value.as_ref().map(|v| v.to_spec()).transpose()?;
        let data = materialize(spec.as_ref(), size, padding_value)?;

        Ok(BinField::new(self.name.clone(), offset, size, ecc).with_data(data)?)
    }
}
