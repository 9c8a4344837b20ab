//! Field ordering and layout validation
//!
//! Walks the fields once in offset order, checking the layout invariants
//! and deriving or enforcing the total image size.

use crate::ecc::{EccScheme, MAJORITY_10BIT_RAW_SIZE};
use crate::error::BuildError;
use crate::field::{BinField, ImageProperties};
use crate::Result;
use tracing::debug;

/// Sort fields into strictly increasing offset order.
pub fn sort_fields(fields: &mut [BinField]) {
    fields.sort_by_key(|f| f.offset);
}

/// Validate a sorted field collection against an image-size policy.
///
/// Checks, in order: per-scheme size preconditions, field overlap, 32-bit
/// overflow of the layout extent, and the configured size limit. Stops at
/// the first violation, naming the offending field(s).
///
/// On success, if `image.total_size` is zero it is set in place to the
/// computed extent; the validator doubles as the size-inference step.
pub fn validate(fields: &[BinField], image: &mut ImageProperties) -> Result<()> {
    let mut prev: Option<(&BinField, u32)> = None;

    for field in fields {
        if let Some((prev_field, prev_end)) = prev {
            if prev_end > field.offset {
                return Err(BuildError::FieldOverlap {
                    prev: prev_field.name.clone(),
                    next: field.name.clone(),
                });
            }
        }

        if field.ecc == EccScheme::MajorityRule10Bit && field.size != MAJORITY_10BIT_RAW_SIZE {
            return Err(BuildError::InvalidValue(format!(
                "{}: field size for 10 bits majority ECC must be {} bytes, got {}",
                field.name, MAJORITY_10BIT_RAW_SIZE, field.size
            )));
        }

        prev = Some((field, field.end_offset()?));
    }

    let extent = prev.map_or(0, |(_, end)| end);
    debug!(extent, "computed layout extent");

    if image.total_size == 0 {
        image.total_size = extent;
    } else if extent > image.total_size {
        return Err(BuildError::ImageTooLarge {
            limit: image.total_size,
            actual: extent,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn field(name: &str, offset: u32, size: u32, ecc: EccScheme) -> BinField {
        BinField::new(name, offset, size, ecc)
            .with_data(Bytes::from(vec![0u8; size as usize]))
            .unwrap()
    }

    #[test]
    fn overlapping_fields_are_rejected() {
        let fields = vec![
            field("header", 0, 4, EccScheme::None),
            field("payload", 3, 1, EccScheme::None),
        ];
        let mut image = ImageProperties::default();
        let err = validate(&fields, &mut image).unwrap_err();
        assert_eq!(
            err,
            BuildError::FieldOverlap {
                prev: "header".to_string(),
                next: "payload".to_string(),
            }
        );
    }

    #[test]
    fn abutting_fields_infer_total_size() {
        let fields = vec![
            field("header", 0, 4, EccScheme::None),
            field("payload", 4, 1, EccScheme::None),
        ];
        let mut image = ImageProperties::default();
        validate(&fields, &mut image).unwrap();
        assert_eq!(image.total_size, 5);
    }

    #[test]
    fn encoded_size_counts_toward_overlap() {
        // 2 raw bytes under majority rule occupy 6 bytes
        let fields = vec![
            field("triple", 0, 2, EccScheme::MajorityRule),
            field("next", 5, 1, EccScheme::None),
        ];
        let mut image = ImageProperties::default();
        assert!(matches!(
            validate(&fields, &mut image),
            Err(BuildError::FieldOverlap { .. })
        ));
    }

    #[test]
    fn ten_bit_majority_size_is_enforced() {
        let fields = vec![field("fuse", 0, 4, EccScheme::MajorityRule10Bit)];
        let mut image = ImageProperties::default();
        let err = validate(&fields, &mut image).unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue(_)));
    }

    #[test]
    fn extent_overflow_is_reported() {
        let fields = vec![field("tail", u32::MAX - 1, 4, EccScheme::None)];
        let mut image = ImageProperties::default();
        let err = validate(&fields, &mut image).unwrap_err();
        assert!(matches!(err, BuildError::Overflow(_)));
    }

    #[test]
    fn fixed_size_limit_is_enforced() {
        let fields = vec![field("blob", 0x10, 8, EccScheme::None)];
        let mut image = ImageProperties::new(0x17, 0xFF);
        let err = validate(&fields, &mut image).unwrap_err();
        assert_eq!(
            err,
            BuildError::ImageTooLarge {
                limit: 0x17,
                actual: 0x18,
            }
        );

        let mut image = ImageProperties::new(0x18, 0xFF);
        validate(&fields, &mut image).unwrap();
        assert_eq!(image.total_size, 0x18);
    }

    #[test]
    fn empty_field_list_is_valid() {
        let mut image = ImageProperties::new(0x20, 0x00);
        validate(&[], &mut image).unwrap();
        assert_eq!(image.total_size, 0x20);
    }

    #[test]
    fn sort_orders_by_offset() {
        let mut fields = vec![
            field("b", 8, 1, EccScheme::None),
            field("a", 0, 1, EccScheme::None),
            field("c", 16, 1, EccScheme::None),
        ];
        sort_fields(&mut fields);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
