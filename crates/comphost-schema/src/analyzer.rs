//! Component schema extraction
//!
//! Walks every first-party unit of a [`DeclarationSource`], detects
//! component classes by their heritage clauses, and describes each one's
//! outputs (`Output<T>` instance properties) and inputs (the `<Name>Args`
//! interface next to it) as [`ComponentSchema`]s.

use crate::schema::{ComponentMap, ComponentSchema, SchemaProperty, TypeDefinition};
use comphost_parser::ast::{ClassDecl, LiteralType};
use comphost_parser::{DeclKind, DeclRef, DeclarationSource, Primitive, Resolver, SemanticType};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Supertype name that marks a class as a component
pub const COMPONENT_CAPABILITY: &str = "ComponentResource";

/// Wrappers marking an instance property as a component output
pub const OUTPUT_WRAPPERS: &[&str] = &["Output", "OutputInstance"];

/// Wrappers marking an argument as a possibly deferred input
pub const INPUT_WRAPPERS: &[&str] = &["Input"];

/// Identity properties every resource has; never reported as outputs
pub const RESERVED_OUTPUTS: &[&str] = &["urn", "id"];

/// Suffix of the companion args interface: `Foo` -> `FooArgs`
pub const ARGS_SUFFIX: &str = "Args";

/// Nesting limit for arrays, maps and type definitions
const MAX_SCHEMA_DEPTH: usize = 32;

/// Errors that abort the extraction of a single component
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Type of {component}.{property} nests deeper than {limit} levels")]
    DepthLimit {
        component: String,
        property: String,
        limit: usize,
    },
}

/// Whether a class declares the component capability in its heritage.
///
/// Detection is textual: any `extends`/`implements` reference containing
/// `ComponentResource` qualifies, plain or namespaced.
pub fn is_component_class(class: &ClassDecl) -> bool {
    class
        .heritage()
        .any(|clause| clause.expression.contains(COMPONENT_CAPABILITY))
}

/// Name of the args interface of a component.
pub fn args_interface_name(component: &str) -> String {
    format!("{}{}", component, ARGS_SUFFIX)
}

/// Extract the schema of every component in the source.
pub fn extract(source: &DeclarationSource) -> ComponentMap {
    let resolver = Resolver::new(source);
    let mut components = ComponentMap::new();

    for unit in source.units() {
        if unit.is_dependency() || unit.is_declaration_only() {
            continue;
        }
        debug!(unit = %unit.path.display(), "analyzing unit");

        for (class_ref, class) in resolver.classes(unit.id) {
            if !is_component_class(class) || (class.is_default && class.name.name == "default") {
                continue;
            }
            let name = class.name.name.clone();
            debug!(component = %name, unit = %unit.path.display(), "found component");

            match extract_component(&resolver, &class_ref, class) {
                Ok(schema) => {
                    if components.contains_key(&name) {
                        warn!(
                            component = %name,
                            unit = %unit.path.display(),
                            "duplicate component declaration replaces an earlier one"
                        );
                    }
                    components.insert(name, schema);
                }
                Err(e) => {
                    warn!(component = %name, error = %e, "skipping component");
                }
            }
        }
    }

    components
}

/// Extract one component class.
pub fn extract_component(
    resolver: &Resolver<'_>,
    class_ref: &DeclRef,
    class: &ClassDecl,
) -> Result<ComponentSchema, AnalysisError> {
    let component = class.name.name.as_str();
    let mut extractor = Extractor::new(resolver, component);
    let mut schema = ComponentSchema {
        description: class.doc.clone(),
        ..Default::default()
    };

    for prop in resolver.class_properties(class_ref) {
        let ty = resolver.property_type(&prop).without_nullish();
        let Some(inner) = ty.unwrap_generic(OUTPUT_WRAPPERS) else {
            continue;
        };
        // Outputs are always required, even when declared with `?`
        let output = extractor.convert(inner, &prop.name, 0)?.described(prop.doc);
        debug!(component, output = %prop.name, ty = %inner, "found output property");
        schema.outputs.insert(prop.name, output);
    }
    for reserved in RESERVED_OUTPUTS {
        schema.outputs.shift_remove(*reserved);
    }

    let args_name = args_interface_name(component);
    match resolver.find_interface(class_ref.unit, class_ref.namespace(), &args_name) {
        Some(args) => {
            for prop in resolver.interface_properties(&args, false) {
                let ty = resolver.property_type(&prop).without_nullish();
                let inner = ty.unwrap_generic(INPUT_WRAPPERS).unwrap_or(&ty);
                let input = extractor
                    .convert(inner, &prop.name, 0)?
                    .optional(prop.optional)
                    .described(prop.doc);
                debug!(component, input = %prop.name, ty = %inner, "found input property");
                schema.inputs.insert(prop.name, input);
            }
        }
        None => debug!(component, args = %args_name, "no args interface; component has no inputs"),
    }

    schema.type_definitions = extractor.type_definitions;
    Ok(schema)
}

/// Converts resolved types of one component into schema properties.
struct Extractor<'r, 's> {
    resolver: &'r Resolver<'s>,
    component: &'r str,
    type_definitions: IndexMap<String, TypeDefinition>,
    /// Declaration each registered definition name stands for
    registered: IndexMap<String, DeclRef>,
}

impl<'r, 's> Extractor<'r, 's> {
    fn new(resolver: &'r Resolver<'s>, component: &'r str) -> Self {
        Self {
            resolver,
            component,
            type_definitions: IndexMap::new(),
            registered: IndexMap::new(),
        }
    }

    fn convert(&mut self, ty: &SemanticType, property: &str, depth: usize) -> Result<SchemaProperty, AnalysisError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(AnalysisError::DepthLimit {
                component: self.component.to_string(),
                property: property.to_string(),
                limit: MAX_SCHEMA_DEPTH,
            });
        }

        let ty = ty.without_nullish();
        // Wrappers nested inside arrays and maps
        if let Some(inner) = ty
            .unwrap_generic(INPUT_WRAPPERS)
            .or_else(|| ty.unwrap_generic(OUTPUT_WRAPPERS))
        {
            return self.convert(inner, property, depth + 1);
        }

        let prop = match &ty {
            SemanticType::Primitive(p) => SchemaProperty::of_type(p.name()),
            SemanticType::Literal(literal) => SchemaProperty::of_type(literal_base(literal).name()),
            SemanticType::Union(members) => match common_primitive(members) {
                Some(p) => SchemaProperty::of_type(p.name()),
                None => fallback(&ty),
            },
            SemanticType::Array(elem) => SchemaProperty::array(self.convert(elem, property, depth + 1)?),
            SemanticType::Map(value) => SchemaProperty::map(self.convert(value, property, depth + 1)?),
            SemanticType::Declared(decl) if decl.kind != DeclKind::Enum => {
                SchemaProperty::reference(self.register(decl, property, depth + 1)?)
            }
            SemanticType::Object | SemanticType::ObjectLiteral(_) => SchemaProperty::of_type("object"),
            _ => fallback(&ty),
        };
        Ok(prop)
    }

    /// Register the type definition of a local object type, once.
    fn register(&mut self, decl: &DeclRef, property: &str, depth: usize) -> Result<String, AnalysisError> {
        let name = decl.simple_name().to_string();
        match self.registered.get(&name) {
            Some(existing) if existing == decl => return Ok(name),
            Some(existing) => warn!(
                component = self.component,
                type_name = %name,
                replaced = %existing.name,
                "type definition name collision; last writer wins"
            ),
            None => {}
        }
        self.registered.insert(name.clone(), decl.clone());
        // Placeholder so self-referencing types terminate
        self.type_definitions.insert(name.clone(), TypeDefinition::default());

        let mut definition = TypeDefinition {
            description: self.resolver.declaration_doc(decl).map(str::to_string),
            properties: IndexMap::new(),
        };
        for prop in self.resolver.declared_properties(decl) {
            let ty = self.resolver.property_type(&prop);
            let schema = self
                .convert(&ty, property, depth + 1)?
                .optional(prop.optional)
                .described(prop.doc);
            definition.properties.insert(prop.name, schema);
        }
        debug!(component = self.component, type_name = %name, "registered type definition");
        self.type_definitions.insert(name.clone(), definition);
        Ok(name)
    }
}

fn literal_base(literal: &LiteralType) -> Primitive {
    match literal {
        LiteralType::String(_) => Primitive::String,
        LiteralType::Number(_) => Primitive::Number,
        LiteralType::Boolean(_) => Primitive::Boolean,
    }
}

/// The primitive every member of a union shares (`"a" | "b"` is a string,
/// `true | false` a boolean).
fn common_primitive(members: &[SemanticType]) -> Option<Primitive> {
    let mut common = None;
    for member in members {
        let base = match member {
            SemanticType::Primitive(p) => *p,
            SemanticType::Literal(literal) => literal_base(literal),
            _ => return None,
        };
        match common {
            None => common = Some(base),
            Some(existing) if existing == base => {}
            Some(_) => return None,
        }
    }
    common
}

/// Unclassifiable types keep their printed form, lower-cased.
fn fallback(ty: &SemanticType) -> SchemaProperty {
    SchemaProperty::of_type(ty.to_string().to_lowercase())
}
