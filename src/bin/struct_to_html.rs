//! Convert a document snapshot to HTML.
//!
//! Reads a JSON snapshot (structure tree, page operators, referenced objects),
//! writes the body markup to stdout and optionally the id index to a file.
//!
//! Usage:
//!   struct_to_html <snapshot.json> [--index <out.json>] [--no-images]
//!   RUST_LOG=debug struct_to_html snapshot.json

use std::fs;
use std::path::PathBuf;
use std::process;
use tagged_pdf_html::{render, ConversionOptions, SnapshotDocument};

struct CliConfig {
    snapshot: PathBuf,
    index: Option<PathBuf>,
    embed_images: bool,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut snapshot = None;
        let mut index = None;
        let mut embed_images = true;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--index" => {
                    i += 1;
                    match args.get(i) {
                        Some(path) => index = Some(PathBuf::from(path)),
                        None => return Err("--index needs a path".to_string()),
                    }
                },
                "--no-images" => {
                    embed_images = false;
                },
                other if other.starts_with("--") => {
                    return Err(format!("Unknown option {}", other));
                },
                other => snapshot = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        Ok(Self {
            snapshot: snapshot.ok_or_else(|| "Missing snapshot path".to_string())?,
            index,
            embed_images,
        })
    }
}

fn run(config: &CliConfig) -> tagged_pdf_html::Result<()> {
    let doc = SnapshotDocument::open(&config.snapshot)?;
    let options = ConversionOptions::default().with_embed_images(config.embed_images);
    let rendered = render(&doc, &options)?;

    println!("{}", rendered.body);

    if let Some(path) = &config.index {
        let json = serde_json::to_string_pretty(&rendered.content_index)?;
        fs::write(path, json)?;
        log::info!("Wrote id index for {} elements to {}", rendered.content_index.len(), path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let config = match CliConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: struct_to_html <snapshot.json> [--index <out.json>] [--no-images]");
            process::exit(2);
        },
    };

    if let Err(e) = run(&config) {
        eprintln!("Conversion failed: {}", e);
        process::exit(1);
    }
}
