//! Build script for spotgate.
//!
//! Copies `.env.example` from the crate root to the local data directory
//! (`<data_local_dir>/spotgate/.env.example`), next to the `.env` file the
//! binary reads at startup, so users find a ready configuration template after
//! installation. A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotgate");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    fs::create_dir_all(&out_dir)?;
    fs::copy(&template, out_dir.join(".env.example"))?;

    Ok(())
}
