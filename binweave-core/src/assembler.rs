//! Image assembly
//!
//! Streams padding and per-field encoded bytes to a writer in a single
//! forward pass. Callers are expected to have run [`crate::layout::validate`]
//! first; the assembler relies on its ordering, overlap and size guarantees.

use crate::ecc::EccScheme;
use crate::error::BuildError;
use crate::field::{BinField, ImageProperties};
use crate::Result;
use std::io::Write;
use tracing::debug;

const PADDING_CHUNK: usize = 8192;

/// Per-run assembly options
///
/// Replaces the process-wide flags of older tools of this kind: options are
/// threaded through the pipeline explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssembleOptions {
    /// Emit a mask image: fields tagged with nibble parity are encoded with
    /// the mask variant, producing a uniform fill over the protected region
    /// instead of real redundancy.
    pub mask: bool,
}

/// Scheme actually applied to a field for this run.
fn effective_scheme(field: &BinField, opts: AssembleOptions) -> EccScheme {
    if opts.mask && field.ecc == EccScheme::NibbleParity {
        EccScheme::MaskedNibbleParity
    } else {
        field.ecc
    }
}

/// Write the assembled image to `writer`, returning the byte count written.
///
/// Layout: for each field in offset order, padding up to the field offset,
/// then the field's encoded bytes; after the last field, padding up to
/// `image.total_size`. The `None` scheme streams the field's owned buffer
/// directly without an encoding copy.
///
/// A write failure surfaces as [`BuildError::Io`] carrying the image offset
/// at which it occurred. Partially written output is not rolled back; on a
/// non-success result the output must be treated as invalid.
pub fn write_image<W: Write>(
    fields: &[BinField],
    image: &ImageProperties,
    opts: AssembleOptions,
    writer: &mut W,
) -> Result<u64> {
    let mut current: u64 = 0;

    for field in fields {
        let offset = u64::from(field.offset);
        if offset > current {
            write_padding(writer, image.padding_value, offset - current, current)?;
            current = offset;
        }

        let scheme = effective_scheme(field, opts);
        let written = if scheme == EccScheme::None {
            write_all(writer, &field.data, current)?;
            field.data.len() as u64
        } else {
            let encoded = scheme.encode(&field.data)?;
            write_all(writer, &encoded, current)?;
            encoded.len() as u64
        };

        debug!(field = %field.name, offset = current, len = written, %scheme, "field written");
        current += written;
    }

    let total = u64::from(image.total_size);
    if current < total {
        write_padding(writer, image.padding_value, total - current, current)?;
        current = total;
    }

    Ok(current)
}

/// Assemble the image into an owned buffer.
pub fn assemble_image(
    fields: &[BinField],
    image: &ImageProperties,
    opts: AssembleOptions,
) -> Result<bytes::Bytes> {
    let mut out = Vec::with_capacity(image.total_size as usize);
    write_image(fields, image, opts, &mut out)?;
    Ok(bytes::Bytes::from(out))
}

fn write_all<W: Write>(writer: &mut W, data: &[u8], image_offset: u64) -> Result<()> {
    writer.write_all(data).map_err(|err| BuildError::Io {
        offset: image_offset,
        message: err.to_string(),
    })
}

fn write_padding<W: Write>(
    writer: &mut W,
    padding_value: u8,
    mut remaining: u64,
    mut image_offset: u64,
) -> Result<()> {
    let chunk = [padding_value; PADDING_CHUNK];
    while remaining > 0 {
        let n = remaining.min(PADDING_CHUNK as u64) as usize;
        write_all(writer, &chunk[..n], image_offset)?;
        image_offset += n as u64;
        remaining -= n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::validate;
    use bytes::Bytes;
    use std::io;

    fn field(name: &str, offset: u32, data: &[u8], ecc: EccScheme) -> BinField {
        BinField::new(name, offset, data.len() as u32, ecc)
            .with_data(Bytes::copy_from_slice(data))
            .unwrap()
    }

    #[test]
    fn gaps_are_padded_and_size_inferred() {
        let fields = vec![
            field("head", 0, &[0xAA, 0xBB], EccScheme::None),
            field("tail", 4, &[0xCC], EccScheme::None),
        ];
        let mut image = ImageProperties::new(0, 0xFF);
        validate(&fields, &mut image).unwrap();

        let out = assemble_image(&fields, &image, AssembleOptions::default()).unwrap();
        assert_eq!(out.as_ref(), &[0xAA, 0xBB, 0xFF, 0xFF, 0xCC]);
    }

    #[test]
    fn trailing_padding_reaches_total_size() {
        let fields = vec![field("head", 0, &[0x01], EccScheme::None)];
        let image = ImageProperties::new(4, 0x00);
        let out = assemble_image(&fields, &image, AssembleOptions::default()).unwrap();
        assert_eq!(out.as_ref(), &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn encoded_fields_take_their_encoded_size() {
        let fields = vec![
            field("triple", 0, &[0x11, 0x22], EccScheme::MajorityRule),
            field("after", 6, &[0x33], EccScheme::None),
        ];
        let mut image = ImageProperties::new(0, 0xEE);
        validate(&fields, &mut image).unwrap();
        assert_eq!(image.total_size, 7);

        let out = assemble_image(&fields, &image, AssembleOptions::default()).unwrap();
        assert_eq!(out.as_ref(), &[0x11, 0x22, 0x11, 0x22, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn mask_option_switches_nibble_parity() {
        let fields = vec![field("fuse", 0, &[0x42, 0x99], EccScheme::NibbleParity)];
        let image = ImageProperties::new(4, 0x00);

        let normal = assemble_image(&fields, &image, AssembleOptions::default()).unwrap();
        let masked = assemble_image(&fields, &image, AssembleOptions { mask: true }).unwrap();

        assert_ne!(normal, masked);
        assert_eq!(masked.as_ref(), &[0x42; 4]);
    }

    #[test]
    fn empty_layout_emits_pure_padding() {
        let image = ImageProperties::new(3, 0x5A);
        let out = assemble_image(&[], &image, AssembleOptions::default()).unwrap();
        assert_eq!(out.as_ref(), &[0x5A, 0x5A, 0x5A]);
    }

    /// Writer that fails once `limit` bytes have been accepted.
    struct FailAfter {
        limit: usize,
        written: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_reports_image_offset() {
        let fields = vec![
            field("head", 0, &[0x01, 0x02], EccScheme::None),
            field("tail", 2, &[0x03], EccScheme::None),
        ];
        let image = ImageProperties::new(3, 0x00);
        let mut writer = FailAfter {
            limit: 2,
            written: 0,
        };

        let err = write_image(&fields, &image, AssembleOptions::default(), &mut writer)
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::Io {
                offset: 2,
                message: "disk full".to_string(),
            }
        );
    }
}
