//! Dynamic component host
//!
//! Finds a component class in a declaration source, loads the runtime
//! module of its unit and constructs an instance.

use crate::error::HostError;
use crate::module::{ComponentInstance, ModuleCache, ModuleLoader};
use crate::value::{PropertyMap, Value};
use comphost_parser::{DeclarationSource, Resolver, SourceUnit};
use comphost_schema::is_component_class;
use std::sync::Arc;
use tracing::{debug, info};

/// Resource name every hosted instance is created with.
pub fn resource_name(component: &str) -> String {
    format!("{}-1", component.to_lowercase())
}

/// Instantiates components through a shared module cache.
#[derive(Debug)]
pub struct ComponentHost {
    cache: ModuleCache,
}

impl ComponentHost {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            cache: ModuleCache::new(loader),
        }
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Unit declaring the first component class named `component`.
    ///
    /// Uses the same detection and unit filtering as schema extraction.
    pub fn locate<'s>(&self, source: &'s DeclarationSource, component: &str) -> Result<&'s SourceUnit, HostError> {
        let resolver = Resolver::new(source);
        source
            .units()
            .iter()
            .filter(|unit| !unit.is_dependency() && !unit.is_declaration_only())
            .find(|unit| {
                resolver
                    .classes(unit.id)
                    .into_iter()
                    .any(|(_, class)| class.name.name == component && is_component_class(class))
            })
            .ok_or_else(|| HostError::ComponentNotFound {
                component: component.to_string(),
                directory: source.root().to_path_buf(),
            })
    }

    /// Locate, load and construct `component` with the raw `inputs`.
    pub fn instantiate(
        &self,
        source: &DeclarationSource,
        component: &str,
        inputs: &PropertyMap,
    ) -> Result<ComponentInstance, HostError> {
        let unit = self.locate(source, component)?;
        debug!(component = %component, unit = %unit.path.display(), "located component");

        let module = self.cache.load(&unit.path)?;
        let class = module
            .export(component)
            .ok_or_else(|| HostError::ExportNotFound {
                component: component.to_string(),
                module: unit.path.clone(),
            })?;

        let name = resource_name(component);
        let instance = class
            .construct(&name, inputs)
            .map_err(|source| HostError::ConstructFailed {
                component: component.to_string(),
                source,
            })?;
        info!(component = %component, urn = %instance.urn(), "instantiated component");
        Ok(instance)
    }
}

/// Own properties of `instance` that hold outputs, in declaration order.
///
/// The handles are shared with the instance, so outputs that resolve later
/// are visible through the harvested state.
pub fn harvest_state(instance: &ComponentInstance) -> PropertyMap {
    instance
        .properties()
        .iter()
        .filter(|(_, value)| value.is_output())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructError;
    use crate::module::{ComponentClass, Module, ModuleRegistry};
    use crate::value::Output;

    const SOURCE: &str = r#"
export interface WebArgs { port: number }
export class Web extends pulumi.ComponentResource {
    public readonly url: pulumi.Output<string>;
}
export class Plain {}
"#;

    fn source() -> DeclarationSource {
        DeclarationSource::from_units("/project", [("web.ts", SOURCE)])
    }

    fn web_class() -> ComponentClass {
        ComponentClass::new("Web", |name, inputs| {
            let mut instance = ComponentInstance::new("pkg:index:Web", name);
            instance.set("port", inputs.get("port").cloned().unwrap_or(Value::Null));
            instance.set("url", Output::pending());
            Ok(instance)
        })
    }

    fn host(module: Module) -> ComponentHost {
        let registry = ModuleRegistry::new();
        registry.register_module(module);
        ComponentHost::new(Arc::new(registry))
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("MyComponent"), "mycomponent-1");
    }

    #[test]
    fn test_instantiate_uses_resource_name() {
        let host = host(Module::new("/project/web.ts").with_export(web_class()));
        let mut inputs = PropertyMap::new();
        inputs.insert("port".to_string(), 8080.0.into());

        let instance = host.instantiate(&source(), "Web", &inputs).unwrap();
        assert_eq!(instance.name(), "web-1");
        assert_eq!(instance.get("port"), Some(&Value::Number(8080.0)));
    }

    #[test]
    fn test_harvest_keeps_only_outputs() {
        let host = host(Module::new("/project/web.ts").with_export(web_class()));
        let instance = host.instantiate(&source(), "Web", &PropertyMap::new()).unwrap();

        let state = harvest_state(&instance);
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["url"]);
        let harvested = state["url"].as_output().unwrap();
        assert!(!harvested.is_resolved());
        assert!(harvested.ptr_eq(instance.get("url").and_then(Value::as_output).unwrap()));
    }

    #[test]
    fn test_non_component_classes_are_not_found() {
        let host = host(Module::new("/project/web.ts"));
        let err = host.instantiate(&source(), "Plain", &PropertyMap::new()).unwrap_err();
        assert!(matches!(err, HostError::ComponentNotFound { component, .. } if component == "Plain"));
    }

    #[test]
    fn test_missing_export() {
        let host = host(Module::new("/project/web.ts"));
        let err = host.instantiate(&source(), "Web", &PropertyMap::new()).unwrap_err();
        assert!(matches!(err, HostError::ExportNotFound { component, .. } if component == "Web"));
    }

    #[test]
    fn test_constructor_failure() {
        let failing = ComponentClass::new("Web", |_, _| Err(ConstructError::new("port is required")));
        let host = host(Module::new("/project/web.ts").with_export(failing));
        let err = host.instantiate(&source(), "Web", &PropertyMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to instantiate component Web: port is required"
        );
    }
}
