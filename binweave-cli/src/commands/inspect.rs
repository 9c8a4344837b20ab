use crate::manifest::Manifest;
use anyhow::Result;
use binweave_core::layout::{sort_fields, validate};
use colored::*;
use tracing::info;

pub fn execute(input: &str, show_hex: bool) -> Result<()> {
    info!("Inspecting manifest: {}", input);

    let manifest = Manifest::load(input)?;
    let (mut fields, mut image) = manifest.resolve()?;
    sort_fields(&mut fields);
    validate(&fields, &mut image)?;

    println!("\n=== Image layout ===");
    println!(
        "Image size: {} bytes, padding {:#04x}",
        image.total_size, image.padding_value
    );
    println!("Fields: {}", fields.len());

    for field in &fields {
        let encoded = field.encoded_size()?;
        println!(
            "\n{} {}",
            "field".bold(),
            field.name.cyan()
        );
        println!(
            "  offset {:#010x}  raw {} bytes  encoded {} bytes  ecc {}",
            field.offset, field.size, encoded, field.ecc
        );
        if show_hex {
            for (i, chunk) in field.data.chunks(16).enumerate() {
                println!("  {:08x}: {}", i * 16, hex::encode(chunk));
            }
        }
    }

    Ok(())
}
