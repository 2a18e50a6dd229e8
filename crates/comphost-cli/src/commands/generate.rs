//! `comphost gen`: write the package schema to disk.

use anyhow::Context;
use comphost_schema::generate;
use std::path::{Path, PathBuf};

/// Default schema file name inside the component directory
pub const SCHEMA_FILE: &str = "schema.json";

pub fn execute(dir: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let path = write_schema(dir, output)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Generate the schema of `dir` and write it, four-space indented.
pub fn write_schema(dir: &Path, output: Option<&Path>) -> anyhow::Result<PathBuf> {
    let generated = generate(dir).with_context(|| format!("generating schema for {}", dir.display()))?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(SCHEMA_FILE));
    let json = generated.schema.to_json_pretty()?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
