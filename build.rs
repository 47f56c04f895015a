use std::{env, path::PathBuf};

use anyhow::Context;
use fs_extra::dir::{CopyOptions, copy};

// Mirrors `assets/` into OUT_DIR so native builds load from a fixed location
// regardless of the working directory.
fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.is_dir() {
        return Ok(());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let options = CopyOptions::new().overwrite(true);
    copy(&assets, &out_dir, &options)
        .with_context(|| format!("copying {} to {}", assets.display(), out_dir.display()))?;

    Ok(())
}
