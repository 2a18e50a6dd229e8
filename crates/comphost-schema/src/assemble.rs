//! Package schema assembly
//!
//! Turns extracted component schemas into one canonical [`PackageSchema`]:
//! resource and type tokens, required lists, and `$ref`/array/dictionary
//! normalization of every property.

use crate::manifest::PackageDescriptor;
use crate::schema::{
    default_languages, type_pointer, type_token, ComponentMap, ComponentSchema,
    ObjectTypeDefinition, PackageSchema, PropertyDefinition, ResourceSchema, SchemaProperty,
    TypeDefinition,
};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during assembly
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A `$ref` points at a type the package does not define
    #[error("Unknown type reference {reference} in {owner}")]
    UnknownTypeReference { reference: String, owner: String },
}

/// Assemble the package schema of `package` from extracted components.
pub fn assemble(package: &PackageDescriptor, components: &ComponentMap) -> Result<PackageSchema, AssemblyError> {
    let mut schema = PackageSchema {
        name: package.name.clone(),
        display_name: package.display_name().to_string(),
        version: package.version.clone(),
        resources: IndexMap::new(),
        types: IndexMap::new(),
        language: default_languages(),
        parameterization: None,
    };

    for (name, component) in components {
        let token = type_token(&package.name, name);
        debug!(token = %token, "assembling resource");
        schema
            .resources
            .insert(token, resource_schema(&package.name, component));

        for (type_name, definition) in &component.type_definitions {
            let token = type_token(&package.name, type_name);
            let object = object_type(&package.name, definition);
            if let Some(previous) = schema.types.get(&token) {
                if *previous != object {
                    warn!(
                        token = %token,
                        component = %name,
                        "type definition collides with another of the same name; last writer wins"
                    );
                }
            }
            schema.types.insert(token, object);
        }
    }

    check_references(&schema)?;
    Ok(schema)
}

fn resource_schema(package: &str, component: &ComponentSchema) -> ResourceSchema {
    ResourceSchema {
        is_component: true,
        description: component.description.clone(),
        input_properties: normalize_all(package, &component.inputs),
        required_inputs: required(&component.inputs),
        properties: normalize_all(package, &component.outputs),
        required: required(&component.outputs),
    }
}

fn object_type(package: &str, definition: &TypeDefinition) -> ObjectTypeDefinition {
    ObjectTypeDefinition {
        ty: "object".to_string(),
        description: definition.description.clone(),
        properties: normalize_all(package, &definition.properties),
        required: required(&definition.properties),
    }
}

/// Names of the non-optional properties, in declaration order.
fn required(properties: &IndexMap<String, SchemaProperty>) -> Vec<String> {
    properties
        .iter()
        .filter(|(_, prop)| !prop.optional)
        .map(|(name, _)| name.clone())
        .collect()
}

fn normalize_all(
    package: &str,
    properties: &IndexMap<String, SchemaProperty>,
) -> IndexMap<String, PropertyDefinition> {
    properties
        .iter()
        .map(|(name, prop)| (name.clone(), normalize_property(package, prop)))
        .collect()
}

/// Normalize one property into its package schema form.
///
/// - `ref` becomes a `$ref` pointer and carries no `type`
/// - explicit `items` are kept, themselves normalized
/// - a legacy `"T[]"` type becomes `type: "array"` with `items: { type: T }`
/// - `additionalProperties` normalizes like `items`
pub fn normalize_property(package: &str, prop: &SchemaProperty) -> PropertyDefinition {
    let mut def = PropertyDefinition {
        description: prop.description.clone(),
        ..Default::default()
    };

    if let Some(reference) = &prop.reference {
        def.reference = Some(type_pointer(&type_token(package, reference)));
    } else if let Some(items) = &prop.items {
        def.ty = Some(prop.ty.clone().unwrap_or_else(|| "array".to_string()));
        def.items = Some(Box::new(element_shape(package, items)));
    } else if let Some(element) = prop.ty.as_deref().and_then(|ty| ty.strip_suffix("[]")) {
        def.ty = Some("array".to_string());
        def.items = Some(Box::new(element_shape(package, &SchemaProperty::of_type(element))));
    } else {
        def.ty = prop.ty.clone();
    }

    if let Some(values) = &prop.additional_properties {
        def.additional_properties = Some(Box::new(element_shape(package, values)));
    }

    def
}

/// Element shapes (`items`, `additionalProperties`) carry no description.
fn element_shape(package: &str, prop: &SchemaProperty) -> PropertyDefinition {
    PropertyDefinition {
        description: None,
        ..normalize_property(package, prop)
    }
}

/// Every `$ref` must name a type emitted in this package.
fn check_references(schema: &PackageSchema) -> Result<(), AssemblyError> {
    let known = |reference: &str| {
        reference
            .strip_prefix("#/types/")
            .map(|token| schema.types.contains_key(token))
            .unwrap_or(false)
    };

    let resources = schema.resources.iter().flat_map(|(token, resource)| {
        resource
            .input_properties
            .values()
            .chain(resource.properties.values())
            .map(move |prop| (token, prop))
    });
    let types = schema
        .types
        .iter()
        .flat_map(|(token, object)| object.properties.values().map(move |prop| (token, prop)));

    for (owner, prop) in resources.chain(types) {
        if let Some(reference) = prop.references().into_iter().find(|r| !known(r)) {
            return Err(AssemblyError::UnknownTypeReference {
                reference: reference.to_string(),
                owner: owner.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> PackageDescriptor {
        PackageDescriptor::new("pkg", "1.0.0")
    }

    #[test]
    fn test_legacy_array_matches_explicit_items() {
        let legacy = normalize_property("pkg", &SchemaProperty::of_type("string[]"));
        let explicit = normalize_property("pkg", &SchemaProperty::array(SchemaProperty::of_type("string")));
        assert_eq!(legacy, explicit);
        assert_eq!(legacy.ty.as_deref(), Some("array"));
        assert_eq!(legacy.items.unwrap().ty.as_deref(), Some("string"));
    }

    #[test]
    fn test_nested_legacy_array() {
        let def = normalize_property("pkg", &SchemaProperty::of_type("number[][]"));
        let inner = def.items.unwrap();
        assert_eq!(inner.ty.as_deref(), Some("array"));
        assert_eq!(inner.items.unwrap().ty.as_deref(), Some("number"));
    }

    #[test]
    fn test_reference_has_no_type() {
        let def = normalize_property(
            "pkg",
            &SchemaProperty::reference("Rule").described(Some("Routing rule")),
        );
        assert_eq!(def.reference.as_deref(), Some("#/types/pkg:index:Rule"));
        assert_eq!(def.ty, None);
        assert_eq!(def.description.as_deref(), Some("Routing rule"));
    }

    #[test]
    fn test_items_and_additional_properties_refs() {
        let array = normalize_property("pkg", &SchemaProperty::array(SchemaProperty::reference("Rule")));
        assert_eq!(
            array.items.unwrap().reference.as_deref(),
            Some("#/types/pkg:index:Rule")
        );

        let map = normalize_property("pkg", &SchemaProperty::map(SchemaProperty::of_type("string")));
        assert_eq!(map.ty.as_deref(), Some("object"));
        assert_eq!(map.additional_properties.unwrap().ty.as_deref(), Some("string"));
    }

    #[test]
    fn test_unknown_type_reference_fails() {
        let mut component = ComponentSchema::default();
        component
            .inputs
            .insert("rule".to_string(), SchemaProperty::reference("Missing"));
        let mut components = ComponentMap::new();
        components.insert("Router".to_string(), component);

        let err = assemble(&package(), &components).unwrap_err();
        match err {
            AssemblyError::UnknownTypeReference { reference, owner } => {
                assert_eq!(reference, "#/types/pkg:index:Missing");
                assert_eq!(owner, "pkg:index:Router");
            }
        }
    }

    #[test]
    fn test_type_definitions_become_package_types() {
        let mut rule = TypeDefinition::default();
        rule.properties
            .insert("path".to_string(), SchemaProperty::of_type("string"));
        rule.properties
            .insert("weight".to_string(), SchemaProperty::of_type("number").optional(true));

        let mut component = ComponentSchema::default();
        component
            .inputs
            .insert("rule".to_string(), SchemaProperty::reference("Rule"));
        component.type_definitions.insert("Rule".to_string(), rule);
        let mut components = ComponentMap::new();
        components.insert("Router".to_string(), component);

        let schema = assemble(&package(), &components).unwrap();
        let rule = &schema.types["pkg:index:Rule"];
        assert_eq!(rule.ty, "object");
        assert_eq!(rule.required, vec!["path".to_string()]);
        assert_eq!(schema.display_name, "pkg");
    }
}
