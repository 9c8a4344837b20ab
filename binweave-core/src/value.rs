//! Field value materialization
//!
//! Turns a declarative value description (numeric literal, byte list, file
//! size or file content reference) into the owned data buffer of a field.
//! The buffer is always exactly the field's declared raw size, padded with
//! the image padding value where the description supplies fewer bytes.

use crate::error::BuildError;
use crate::Result;
use bytes::Bytes;
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::warn;

/// Input format of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ValueFormat {
    /// A single numeric literal, at most 32 bits, little-endian in the buffer
    #[default]
    #[serde(rename = "32bit")]
    Raw32,

    /// Whitespace-separated byte literals, first byte at the lowest address
    #[serde(rename = "bytes")]
    ByteList,

    /// The value is the byte length of the referenced file
    #[serde(rename = "FileSize")]
    FileSize,

    /// The value is the raw content of the referenced file
    #[serde(rename = "FileContent")]
    FileContent,
}

/// Declarative description of a field value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueSpec {
    /// How `raw` is interpreted
    pub format: ValueFormat,

    /// The literal text, byte list, or file path
    pub raw: String,

    /// Round the numeric value up to a multiple of this (values of at most
    /// 4 bytes only)
    pub align: Option<u32>,

    /// Reverse the buffer bytes after filling
    pub reverse: bool,

    /// Byte offset into the referenced file for `FileContent`
    pub file_start_offset: u64,
}

impl ValueSpec {
    /// A plain numeric literal with no attributes
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            raw: text.into(),
            ..Self::default()
        }
    }
}

/// Parse a numeric literal with auto-detected base (0x / 0o / 0b / decimal).
pub fn parse_u32(text: &str) -> Result<u32> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        u32::from_str_radix(oct, 8)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2)
    } else {
        text.parse::<u32>()
    };
    parsed.map_err(|_| BuildError::InvalidValue(format!("not a 32-bit numeric literal: {text:?}")))
}

/// Parse a single byte literal with auto-detected base.
pub fn parse_u8(text: &str) -> Result<u8> {
    let value = parse_u32(text)?;
    u8::try_from(value)
        .map_err(|_| BuildError::InvalidValue(format!("byte literal out of range: {text:?}")))
}

/// Materialize a field data buffer of exactly `size` bytes.
///
/// An absent spec yields a buffer filled with `padding_value` (a pure
/// reservation field). Fails with `InvalidValue` on a zero size, a value
/// that does not fit the buffer, or a malformed literal; with
/// `FileNotFound`/`FileReadError` on file reference problems.
pub fn materialize(spec: Option<&ValueSpec>, size: u32, padding_value: u8) -> Result<Bytes> {
    if size == 0 {
        return Err(BuildError::InvalidValue(
            "field size must not be zero".to_string(),
        ));
    }

    let size = size as usize;
    let mut buf = vec![padding_value; size];

    let Some(spec) = spec else {
        return Ok(Bytes::from(buf));
    };

    match spec.format {
        ValueFormat::ByteList => {
            let tokens: Vec<&str> = spec.raw.split_whitespace().collect();
            if tokens.len() > size {
                return Err(BuildError::InvalidValue(format!(
                    "{} byte literals given for a {} byte field",
                    tokens.len(),
                    size
                )));
            }
            for (i, token) in tokens.iter().enumerate() {
                buf[i] = parse_u8(token)?;
            }
        }
        ValueFormat::Raw32 => {
            let value = parse_u32(&spec.raw)?;
            if size < 4 && value >> (8 * size) != 0 {
                return Err(BuildError::InvalidValue(format!(
                    "value {:#x} larger than field size {}",
                    value, size
                )));
            }
            let bytes = value.to_le_bytes();
            let n = size.min(4);
            buf[..n].copy_from_slice(&bytes[..n]);
        }
        ValueFormat::FileSize => {
            if size > 4 {
                return Err(BuildError::InvalidValue(
                    "FileSize fields must not exceed 4 bytes".to_string(),
                ));
            }
            let len = file_size(&spec.raw)?;
            let max = if size == 4 {
                u64::from(u32::MAX)
            } else {
                (1u64 << (8 * size)) - 1
            };
            if len > max {
                warn!(
                    file = %spec.raw,
                    len,
                    "file size too large for the field, taking lower bytes"
                );
            }
            let bytes = (len as u32).to_le_bytes();
            buf[..size].copy_from_slice(&bytes[..size]);
        }
        ValueFormat::FileContent => {
            read_file_bytes(&spec.raw, spec.file_start_offset, &mut buf)?;
        }
    }

    if spec.reverse {
        buf.reverse();
    }

    if let Some(align) = spec.align.filter(|&a| a > 0) {
        if size > 4 {
            return Err(BuildError::InvalidValue(
                "cannot align values larger than 4 bytes".to_string(),
            ));
        }
        let mut word = [0u8; 4];
        word[..size].copy_from_slice(&buf[..size]);
        let aligned = align_up(u32::from_le_bytes(word), align)?;
        buf[..size].copy_from_slice(&aligned.to_le_bytes()[..size]);
    }

    Ok(Bytes::from(buf))
}

/// Materialize a scalar attribute value (offsets, sizes) as a u32.
pub fn materialize_u32(spec: &ValueSpec) -> Result<u32> {
    let mut value = match spec.format {
        ValueFormat::Raw32 => parse_u32(&spec.raw)?,
        ValueFormat::ByteList => {
            let tokens: Vec<&str> = spec.raw.split_whitespace().collect();
            if tokens.len() > 4 {
                return Err(BuildError::InvalidValue(format!(
                    "{} byte literals given for a 32-bit value",
                    tokens.len()
                )));
            }
            let mut value = 0u32;
            for (i, token) in tokens.iter().enumerate() {
                value |= u32::from(parse_u8(token)?) << (8 * i);
            }
            value
        }
        ValueFormat::FileSize => {
            let len = file_size(&spec.raw)?;
            if len > u64::from(u32::MAX) {
                warn!(file = %spec.raw, len, "file size exceeds 32 bits, taking lower bytes");
            }
            len as u32
        }
        ValueFormat::FileContent => {
            let mut bytes = [0u8; 4];
            read_file_bytes(&spec.raw, spec.file_start_offset, &mut bytes)?;
            u32::from_le_bytes(bytes)
        }
    };

    if let Some(align) = spec.align.filter(|&a| a > 0) {
        value = align_up(value, align)?;
    }

    Ok(value)
}

/// Round `value` up to the next multiple of `align`.
fn align_up(value: u32, align: u32) -> Result<u32> {
    value
        .checked_add(align - 1)
        .map(|v| v / align * align)
        .ok_or_else(|| {
            BuildError::Overflow(format!("aligning {:#x} to {:#x}", value, align))
        })
}

/// Byte length of a file on disk.
fn file_size(path: &str) -> Result<u64> {
    match std::fs::metadata(Path::new(path)) {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(BuildError::FileNotFound(path.to_string()))
        }
        Err(err) => Err(BuildError::FileReadError(format!("{path}: {err}"))),
    }
}

/// Fill `buf` from `path`, starting at `start_offset`.
fn read_file_bytes(path: &str, start_offset: u64, buf: &mut [u8]) -> Result<()> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(BuildError::FileNotFound(path.to_string()));
        }
        Err(err) => return Err(BuildError::FileReadError(format!("{path}: {err}"))),
    };

    if start_offset > 0 {
        file.seek(SeekFrom::Start(start_offset))
            .map_err(|err| BuildError::FileReadError(format!("{path}: seek: {err}")))?;
    }

    file.read_exact(buf).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            BuildError::FileReadError(format!("{path}: reached end of file prematurely"))
        } else {
            BuildError::FileReadError(format!("{path}: {err}"))
        }
    })
}
