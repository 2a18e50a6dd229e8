//! Component Schema Library
//!
//! This crate derives a package schema from component source code:
//! - Package descriptor parsing (package.json)
//! - Component extraction (classes, args interfaces, nested types)
//! - Package schema assembly (tokens, required lists, normalization)

#![warn(rust_2018_idioms)]

pub mod analyzer;
pub mod assemble;
pub mod manifest;
pub mod schema;

pub use analyzer::{extract, is_component_class, AnalysisError};
pub use assemble::{assemble, normalize_property, AssemblyError};
pub use manifest::{ManifestError, PackageDescriptor};
pub use schema::{
    type_pointer, type_token, BaseProvider, ComponentMap, ComponentSchema, LanguageStub,
    ObjectTypeDefinition, PackageSchema, Parameterization, PropertyDefinition, ResourceSchema,
    SchemaProperty, TypeDefinition,
};

use comphost_parser::{DeclarationSource, SourceError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors from generating the schema of a component directory
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Everything derived from one component directory.
#[derive(Debug)]
pub struct GeneratedPackage {
    pub descriptor: PackageDescriptor,
    pub source: DeclarationSource,
    pub components: ComponentMap,
    pub schema: PackageSchema,
}

/// Read the package descriptor and sources of `dir` and derive its schema.
pub fn generate(dir: &Path) -> Result<GeneratedPackage, GenerateError> {
    let descriptor = PackageDescriptor::from_dir(dir)?;
    let source = DeclarationSource::load(dir)?;
    let components = extract(&source);
    let schema = assemble(&descriptor, &components)?;
    info!(
        package = %descriptor.name,
        version = %descriptor.version,
        units = source.len(),
        components = components.len(),
        "generated package schema"
    );
    Ok(GeneratedPackage {
        descriptor,
        source,
        components,
        schema,
    })
}
