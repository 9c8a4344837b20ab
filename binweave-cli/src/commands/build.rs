use crate::manifest::Manifest;
use anyhow::{Context, Result};
use binweave_core::{
    assembler::{write_image, AssembleOptions},
    layout::{sort_fields, validate},
};
use colored::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

pub fn execute(input: &str, output: &str, mask: bool) -> Result<()> {
    info!("Building image from {} to {}", input, output);

    let manifest = Manifest::load(input)?;
    let (mut fields, mut image) = manifest.resolve()?;
    info!("Materialized {} fields", fields.len());

    sort_fields(&mut fields);
    validate(&fields, &mut image)?;
    info!(
        "Layout valid, image size {} bytes, padding {:#04x}",
        image.total_size, image.padding_value
    );

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {output}"))?;
    let mut writer = BufWriter::new(file);
    let written = write_image(&fields, &image, AssembleOptions { mask }, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {output}"))?;

    println!(
        "{} wrote {} ({} bytes{})",
        "✓".green(),
        output,
        written,
        if mask { ", mask image" } else { "" }
    );

    Ok(())
}
