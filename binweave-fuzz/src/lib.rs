//! Fuzzing entry points for binweave-core codecs and the manifest reader
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Wrap these helpers in fuzz targets: cargo fuzz run fuzz_encode

use binweave_core::ecc::EccScheme;

/// Encode arbitrary data under a scheme chosen by the first input byte.
/// Should never panic; invalid sizes/values surface as errors.
pub fn fuzz_encode(data: &[u8]) {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };

    let scheme = match selector % 6 {
        0 => EccScheme::None,
        1 => EccScheme::NibbleParity,
        2 => EccScheme::MaskedNibbleParity,
        3 => EccScheme::MajorityRule,
        4 => EccScheme::MajorityRule10Bit,
        _ => EccScheme::Secded,
    };

    let _ = scheme.encode(payload);
    let _ = scheme.encoded_len(payload.len() as u32);
}

/// Parse arbitrary bytes as a JSON manifest - should never panic.
pub fn fuzz_manifest(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(manifest) = serde_json::from_str::<binweave_cli::manifest::Manifest>(text) {
        let _ = manifest.resolve();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_encode_empty() {
        fuzz_encode(&[]);
    }

    #[test]
    fn test_fuzz_encode_all_schemes() {
        for selector in 0..6 {
            fuzz_encode(&[selector, 0x12, 0x34, 0x56]);
        }
    }

    #[test]
    fn test_fuzz_manifest_random() {
        fuzz_manifest(&[0xFF; 64]);
        fuzz_manifest(b"{\"fields\":[]}");
    }
}
