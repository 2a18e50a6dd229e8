//! Schema data model
//!
//! Two layers live here:
//! - the raw, structural output of extraction ([`ComponentSchema`],
//!   [`SchemaProperty`], [`TypeDefinition`]), keyed by declaration names;
//! - the canonical package schema ([`PackageSchema`] and friends), keyed by
//!   type tokens and serialized with the field names consumers expect.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Module segment of every token emitted by this crate
pub const TOKEN_MODULE: &str = "index";

/// Token of a resource or type: `<package>:index:<Name>`
pub fn type_token(package: &str, name: &str) -> String {
    format!("{}:{}:{}", package, TOKEN_MODULE, name)
}

/// `$ref` pointer at a package-level type
pub fn type_pointer(token: &str) -> String {
    format!("#/types/{}", token)
}

// ============================================================================
// Extraction output
// ============================================================================

/// Structural description of one input, output or nested property.
///
/// Exactly one of `ty` and `reference` determines the shape; `items` and
/// `additional_properties` refine array and dictionary shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,

    /// Name of a type definition
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaProperty>>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaProperty {
    /// A property of a plain type (`string`, `number`, `object`, ...)
    pub fn of_type(ty: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            ..Default::default()
        }
    }

    pub fn array(items: SchemaProperty) -> Self {
        Self {
            ty: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// A string-keyed dictionary
    pub fn map(values: SchemaProperty) -> Self {
        Self {
            ty: Some("object".to_string()),
            additional_properties: Some(Box::new(values)),
            ..Default::default()
        }
    }

    /// A reference to the type definition `name`
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn described(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }
}

/// Named object type discovered while extracting a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,
}

/// Raw schema of one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub inputs: IndexMap<String, SchemaProperty>,

    #[serde(default)]
    pub outputs: IndexMap<String, SchemaProperty>,

    #[serde(default)]
    pub type_definitions: IndexMap<String, TypeDefinition>,
}

/// Extraction result: component schemas by component name
pub type ComponentMap = IndexMap<String, ComponentSchema>;

// ============================================================================
// Package schema
// ============================================================================

/// Property as it appears in the package schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyDefinition>>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<PropertyDefinition>>,
}

impl PropertyDefinition {
    /// Every `$ref` pointer in this property and its element shapes.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        if let Some(reference) = &self.reference {
            refs.push(reference);
        }
        if let Some(items) = &self.items {
            items.collect_references(refs);
        }
        if let Some(values) = &self.additional_properties {
            values.collect_references(refs);
        }
    }
}

/// Component resource entry of the package schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    pub is_component: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub input_properties: IndexMap<String, PropertyDefinition>,

    pub required_inputs: Vec<String>,

    pub properties: IndexMap<String, PropertyDefinition>,

    pub required: Vec<String>,
}

/// Object type entry of the package schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeDefinition {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub properties: IndexMap<String, PropertyDefinition>,

    pub required: Vec<String>,
}

/// Per-language code generation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStub {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<IndexMap<String, String>>,

    #[serde(default)]
    pub respect_schema_version: bool,
}

impl LanguageStub {
    fn versioned() -> Self {
        Self {
            respect_schema_version: true,
            ..Default::default()
        }
    }
}

/// Language section emitted for every package.
pub fn default_languages() -> IndexMap<String, LanguageStub> {
    let mut dev_dependencies = IndexMap::new();
    dev_dependencies.insert("typescript".to_string(), "^3.7.0".to_string());

    let mut language = IndexMap::new();
    language.insert(
        "nodejs".to_string(),
        LanguageStub {
            dependencies: Some(IndexMap::new()),
            dev_dependencies: Some(dev_dependencies),
            respect_schema_version: true,
        },
    );
    for name in ["python", "csharp", "go"] {
        language.insert(name.to_string(), LanguageStub::versioned());
    }
    language
}

/// Provider a parameterized package is served by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseProvider {
    pub name: String,
    pub version: String,
}

/// Self-description of a parameterized package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameterization {
    pub base_provider: BaseProvider,

    /// Opaque, base64-encoded parameter value
    pub parameter: String,
}

/// Canonical package schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSchema {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub resources: IndexMap<String, ResourceSchema>,
    pub types: IndexMap<String, ObjectTypeDefinition>,
    pub language: IndexMap<String, LanguageStub>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameterization: Option<Parameterization>,
}

impl PackageSchema {
    /// Compact JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// JSON indented with four spaces
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokens() {
        assert_eq!(type_token("pkg", "MyComponent"), "pkg:index:MyComponent");
        assert_eq!(type_pointer("pkg:index:Tags"), "#/types/pkg:index:Tags");
    }

    #[test]
    fn test_property_definition_field_names() {
        let def = PropertyDefinition {
            description: Some("Tags".to_string()),
            ty: Some("object".to_string()),
            additional_properties: Some(Box::new(PropertyDefinition {
                reference: Some("#/types/pkg:index:Tag".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({
                "description": "Tags",
                "type": "object",
                "additionalProperties": { "$ref": "#/types/pkg:index:Tag" }
            })
        );
        assert_eq!(def.references(), vec!["#/types/pkg:index:Tag"]);
    }

    #[test]
    fn test_schema_property_field_names() {
        let prop = SchemaProperty::array(SchemaProperty::reference("Rule")).optional(true);
        assert_eq!(
            serde_json::to_value(&prop).unwrap(),
            json!({ "type": "array", "items": { "ref": "Rule", "optional": false }, "optional": true })
        );
    }

    #[test]
    fn test_language_section() {
        let language = serde_json::to_value(default_languages()).unwrap();
        assert_eq!(
            language,
            json!({
                "nodejs": {
                    "dependencies": {},
                    "devDependencies": { "typescript": "^3.7.0" },
                    "respectSchemaVersion": true
                },
                "python": { "respectSchemaVersion": true },
                "csharp": { "respectSchemaVersion": true },
                "go": { "respectSchemaVersion": true }
            })
        );
    }
}
