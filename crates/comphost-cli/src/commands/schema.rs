//! `comphost schema`: print the package schema.

use anyhow::Context;
use comphost_schema::generate;
use std::path::Path;

pub fn execute(dir: &Path) -> anyhow::Result<()> {
    let generated = generate(dir).with_context(|| format!("generating schema for {}", dir.display()))?;
    println!("{}", generated.schema.to_json_pretty()?);
    Ok(())
}
