//! `comphost components`: list detected components.

use anyhow::Context;
use comphost_parser::DeclarationSource;
use comphost_schema::{extract, ComponentMap};
use std::path::Path;

pub fn execute(dir: &Path) -> anyhow::Result<()> {
    let source = DeclarationSource::load(dir).with_context(|| format!("loading {}", dir.display()))?;
    for skipped in source.skipped() {
        eprintln!("skipped {} (parse errors)", skipped.path.display());
    }

    let components = extract(&source);
    if components.is_empty() {
        println!("No components found in {}", dir.display());
        return Ok(());
    }
    for line in summary(&components) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per component: name, input count, output count.
fn summary(components: &ComponentMap) -> Vec<String> {
    let width = components.keys().map(String::len).max().unwrap_or(0);
    components
        .iter()
        .map(|(name, component)| {
            format!(
                "{:width$}  {} inputs, {} outputs",
                name,
                component.inputs.len(),
                component.outputs.len(),
                width = width
            )
        })
        .collect()
}
