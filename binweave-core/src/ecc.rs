//! ECC schemes and their byte-buffer encoders
//!
//! Each scheme is a pure transform from a raw input buffer to an encoded
//! output buffer with a fixed output-size relationship. Encoding is
//! write-only: no decoder is provided, downstream consumers vote/check the
//! redundancy themselves.

use crate::error::BuildError;
use crate::Result;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

/// Raw field size required by [`EccScheme::MajorityRule10Bit`], in bytes
pub const MAJORITY_10BIT_RAW_SIZE: u32 = 2;

/// Error-correction scheme applied to a field's raw data
///
/// The set is closed; the codec dispatch is a single exhaustive match so a
/// new scheme is a compile-time-checked, localized change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EccScheme {
    /// Pass-through, output equals input
    #[default]
    None,

    /// One parity byte per 4-bit nibble (output = 2x input)
    NibbleParity,

    /// Mask variant of nibble parity: the whole output buffer is filled with
    /// the first input byte, producing a uniform mask rather than real
    /// redundancy (output = 2x input)
    MaskedNibbleParity,

    /// Triple redundancy over the whole buffer (output = 3x input)
    MajorityRule,

    /// A 10-bit value packed three times into a 4-byte word; raw size must
    /// be exactly 2 bytes (output = 2x input)
    MajorityRule10Bit,

    /// (72,64) extended-Hamming SECDED: one check byte appended per started
    /// 8-byte block (output = ceil(9/8 x input))
    Secded,
}

impl EccScheme {
    /// Encoded output size for a raw input of `raw_size` bytes.
    ///
    /// Fails with [`BuildError::Overflow`] when the result does not fit in
    /// the 32-bit unsigned domain.
    pub fn encoded_len(&self, raw_size: u32) -> Result<u32> {
        let wide = match self {
            EccScheme::None => u64::from(raw_size),
            EccScheme::NibbleParity | EccScheme::MaskedNibbleParity | EccScheme::MajorityRule10Bit => {
                2 * u64::from(raw_size)
            }
            EccScheme::MajorityRule => 3 * u64::from(raw_size),
            EccScheme::Secded => (9 * u64::from(raw_size) + 7) / 8,
        };
        u32::try_from(wide).map_err(|_| {
            BuildError::Overflow(format!(
                "encoded size for {} bytes with {} scheme",
                raw_size, self
            ))
        })
    }

    /// Encode `input` according to this scheme.
    ///
    /// The input is the raw field buffer; the returned buffer has exactly
    /// `encoded_len(input.len())` bytes. The input is never mutated.
    pub fn encode(&self, input: &[u8]) -> Result<Bytes> {
        match self {
            EccScheme::None => Ok(Bytes::copy_from_slice(input)),
            EccScheme::NibbleParity => Ok(encode_nibble_parity(input)),
            EccScheme::MaskedNibbleParity => Ok(encode_mask_nibble_parity(input)),
            EccScheme::MajorityRule => Ok(encode_majority_rule(input)),
            EccScheme::MajorityRule10Bit => encode_majority_rule_10bit(input),
            EccScheme::Secded => Ok(encode_secded(input)),
        }
    }
}

impl FromStr for EccScheme {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(EccScheme::None),
            "nibble" => Ok(EccScheme::NibbleParity),
            "nibble_mask" => Ok(EccScheme::MaskedNibbleParity),
            "majority" => Ok(EccScheme::MajorityRule),
            "10_bits_majority" => Ok(EccScheme::MajorityRule10Bit),
            "secded" => Ok(EccScheme::Secded),
            other => Err(BuildError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for EccScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EccScheme::None => "none",
            EccScheme::NibbleParity => "nibble",
            EccScheme::MaskedNibbleParity => "nibble_mask",
            EccScheme::MajorityRule => "majority",
            EccScheme::MajorityRule10Bit => "10_bits_majority",
            EccScheme::Secded => "secded",
        };
        f.write_str(name)
    }
}

/// Nibble parity: one output byte per input nibble, low nibble first.
///
/// For a nibble with bits b0..b3, the output byte keeps the nibble in its
/// low 4 bits and packs {b0^b1, b2^b3, b0^b2, b1^b3} into bits 4..7.
fn encode_nibble_parity(input: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(input.len() * 2);
    for enc_index in 0..input.len() * 2 {
        let byte = input[enc_index / 2];
        let nibble = if enc_index % 2 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        };

        let b0 = nibble & 1;
        let b1 = (nibble >> 1) & 1;
        let b2 = (nibble >> 2) & 1;
        let b3 = (nibble >> 3) & 1;

        let enc = nibble
            | ((b0 ^ b1) << 4)
            | ((b2 ^ b3) << 5)
            | ((b0 ^ b2) << 6)
            | ((b1 ^ b3) << 7);
        out.push(enc);
    }
    Bytes::from(out)
}

/// Mask variant: the entire output is the first input byte repeated.
fn encode_mask_nibble_parity(input: &[u8]) -> Bytes {
    if input.is_empty() {
        return Bytes::new();
    }
    Bytes::from(vec![input[0]; input.len() * 2])
}

/// Majority rule: three back-to-back verbatim copies of the input.
fn encode_majority_rule(input: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(input.len() * 3);
    out.extend_from_slice(input);
    out.extend_from_slice(input);
    out.extend_from_slice(input);
    Bytes::from(out)
}

/// 10-bit majority rule: the little-endian 16-bit input value, which must
/// fit in 10 bits, is placed three times into a 32-bit word at bit offsets
/// 0, 10 and 20. The upper 2 bits stay zero. A downstream decoder can vote
/// bit-wise across the three copies.
fn encode_majority_rule_10bit(input: &[u8]) -> Result<Bytes> {
    if input.len() != MAJORITY_10BIT_RAW_SIZE as usize {
        return Err(BuildError::InvalidSize(format!(
            "10 bits majority rule requires a {}-byte raw value, got {}",
            MAJORITY_10BIT_RAW_SIZE,
            input.len()
        )));
    }

    let value = u16::from_le_bytes([input[0], input[1]]);
    if value & 0xFC00 != 0 {
        return Err(BuildError::InvalidValue(format!(
            "10 bit majority value {:#x} has bits set above bit 9",
            value
        )));
    }

    let value = u32::from(value & 0x3FF);
    let word = value | (value << 10) | (value << 20);
    Ok(Bytes::copy_from_slice(&word.to_le_bytes()))
}

/// SECDED: a systematic (72,64) extended-Hamming code at byte granularity.
///
/// The input is copied verbatim, then one check byte is appended for each
/// started 8-byte block. Bits 0..6 of the check byte hold the Hamming bits
/// R1,R2,R4,R8,R16,R32,R64; bit 7 is the overall parity of the block,
/// enabling double-error detection.
fn encode_secded(input: &[u8]) -> Bytes {
    let check_count = input.len().div_ceil(8);
    let mut out = Vec::with_capacity(input.len() + check_count);
    out.extend_from_slice(input);
    for block in input.chunks(8) {
        out.push(secded_check_byte(block));
    }
    Bytes::from(out)
}

/// Check byte for one block of up to 8 data bytes.
///
/// Data bits are conceptually placed into codeword positions 1..72 skipping
/// the power-of-two positions reserved for the parity bits. Rk is the XOR of
/// every data bit whose codeword position has bit k set.
fn secded_check_byte(block: &[u8]) -> u8 {
    debug_assert!(block.len() <= 8);

    let mut syndrome: u8 = 0;
    let mut parity: u8 = 0;
    let mut pos: u32 = 0;

    for &byte in block {
        for bit_index in 0..8 {
            // next non-power-of-two codeword position
            pos += 1;
            while pos.is_power_of_two() {
                pos += 1;
            }

            if (byte >> bit_index) & 1 == 1 {
                parity ^= 1;
                for k in 0..7 {
                    if pos & (1 << k) != 0 {
                        syndrome ^= 1 << k;
                    }
                }
            }
        }
    }

    syndrome | (parity << 7)
}
