//! Runtime modules and component classes
//!
//! A [`Module`] is the executable counterpart of one source unit: a set of
//! exported [`ComponentClass`] constructors. Modules come from a
//! [`ModuleLoader`]; [`ModuleRegistry`] is the in-process loader, mapping
//! unit paths to module factories. [`ModuleCache`] makes loading idempotent.

use crate::error::{ConstructError, HostError};
use crate::value::{PropertyMap, Value};
use comphost_parser::source::normalize_path;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Constructor of a component class: `(resource name, inputs) -> instance`
pub type Constructor =
    dyn Fn(&str, &PropertyMap) -> Result<ComponentInstance, ConstructError> + Send + Sync;

/// Live component: identity plus own properties in assignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    urn: String,
    type_token: String,
    name: String,
    properties: PropertyMap,
}

impl ComponentInstance {
    /// New instance with the URN `urn:<type>::<name>`
    pub fn new(type_token: impl Into<String>, name: impl Into<String>) -> Self {
        let type_token = type_token.into();
        let name = name.into();
        Self {
            urn: format!("urn:{}::{}", type_token, name),
            type_token,
            name,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = urn.into();
        self
    }

    /// Assign an own property. Reassigning keeps the original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn urn(&self) -> &str {
        &self.urn
    }

    pub fn type_token(&self) -> &str {
        &self.type_token
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An exported, constructible component class.
#[derive(Clone)]
pub struct ComponentClass {
    name: String,
    constructor: Arc<Constructor>,
}

impl ComponentClass {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&str, &PropertyMap) -> Result<ComponentInstance, ConstructError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, resource_name: &str, inputs: &PropertyMap) -> Result<ComponentInstance, ConstructError> {
        (self.constructor)(resource_name, inputs)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Loaded runtime module of one unit.
#[derive(Debug, Clone)]
pub struct Module {
    path: PathBuf,
    exports: IndexMap<String, ComponentClass>,
}

impl Module {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exports: IndexMap::new(),
        }
    }

    /// Add an export, keyed by the class name.
    pub fn with_export(mut self, class: ComponentClass) -> Self {
        self.exports.insert(class.name.clone(), class);
        self
    }

    pub fn export(&self, name: &str) -> Option<&ComponentClass> {
        self.exports.get(name)
    }

    pub fn exports(&self) -> impl Iterator<Item = &ComponentClass> {
        self.exports.values()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Source of runtime modules for source units.
pub trait ModuleLoader: Send + Sync {
    /// Load the module of the unit at `path`. Called at most once per path
    /// through a [`ModuleCache`].
    fn load(&self, path: &Path) -> Result<Module, HostError>;
}

type ModuleFactory = Arc<dyn Fn(&Path) -> Result<Module, HostError> + Send + Sync>;

/// In-process loader: unit path -> module factory.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: RwLock<FxHashMap<PathBuf, ModuleFactory>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory that builds the module of the unit at `path`.
    /// A later registration for the same path replaces the earlier one.
    pub fn register<F>(&self, path: impl AsRef<Path>, factory: F)
    where
        F: Fn(&Path) -> Result<Module, HostError> + Send + Sync + 'static,
    {
        self.factories
            .write()
            .insert(normalize_path(path.as_ref()), Arc::new(factory));
    }

    /// Register a prebuilt module under its own path.
    pub fn register_module(&self, module: Module) {
        let path = module.path().to_path_buf();
        self.register(path, move |_| Ok(module.clone()));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.factories.read().contains_key(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, path: &Path) -> Result<Module, HostError> {
        let factory = self
            .factories
            .read()
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| HostError::ModuleNotFound {
                path: path.to_path_buf(),
            })?;
        // Factory runs without the registry lock held
        factory(path)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.factories.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Loads each module at most once and hands out shared handles.
///
/// Concurrent loads of one path wait for the first; a failed load leaves
/// the path unloaded so a later call retries.
pub struct ModuleCache {
    loader: Arc<dyn ModuleLoader>,
    modules: Mutex<FxHashMap<PathBuf, Arc<OnceCell<Arc<Module>>>>>,
}

impl ModuleCache {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            modules: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn load(&self, path: &Path) -> Result<Arc<Module>, HostError> {
        let path = normalize_path(path);
        let cell = self.modules.lock().entry(path.clone()).or_default().clone();

        cell.get_or_try_init(|| {
            debug!(module = %path.display(), "loading module");
            self.loader.load(&path).map(Arc::new)
        })
        .cloned()
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.modules
            .lock()
            .get(&normalize_path(path))
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    /// Number of loaded modules
    pub fn len(&self) -> usize {
        self.modules
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache")
            .field("loaded", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn greeter() -> ComponentClass {
        ComponentClass::new("Greeter", |name, inputs| {
            let mut instance = ComponentInstance::new("pkg:index:Greeter", name);
            if let Some(greeting) = inputs.get("greeting") {
                instance.set("greeting", greeting.clone());
            }
            Ok(instance)
        })
    }

    #[test]
    fn test_instance_properties_keep_order() {
        let mut instance = ComponentInstance::new("pkg:index:Web", "web-1");
        instance.set("b", 1.0);
        instance.set("a", 2.0);
        instance.set("b", 3.0);
        assert_eq!(instance.properties().keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(instance.get("b"), Some(&Value::Number(3.0)));
        assert_eq!(instance.urn(), "urn:pkg:index:Web::web-1");
    }

    #[test]
    fn test_registry_loads_registered_modules() {
        let registry = ModuleRegistry::new();
        registry.register_module(Module::new("/project/index.ts").with_export(greeter()));

        let module = registry.load(Path::new("/project/./index.ts")).unwrap();
        assert!(module.export("Greeter").is_some());
        assert!(module.export("Other").is_none());

        let err = registry.load(Path::new("/project/other.ts")).unwrap_err();
        assert!(matches!(err, HostError::ModuleNotFound { .. }));
    }

    #[test]
    fn test_cache_runs_factory_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let registry = ModuleRegistry::new();
        let counter = runs.clone();
        registry.register("/project/index.ts", move |path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Module::new(path).with_export(greeter()))
        });

        let cache = ModuleCache::new(Arc::new(registry));
        let first = cache.load(Path::new("/project/index.ts")).unwrap();
        let second = cache.load(Path::new("/project/index.ts")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded(Path::new("/project/index.ts")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let registry = ModuleRegistry::new();
        let counter = attempts.clone();
        registry.register("/project/flaky.ts", move |path| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(HostError::ModuleNotFound {
                    path: path.to_path_buf(),
                })
            } else {
                Ok(Module::new(path))
            }
        });

        let cache = ModuleCache::new(Arc::new(registry));
        assert!(cache.load(Path::new("/project/flaky.ts")).is_err());
        assert!(!cache.is_loaded(Path::new("/project/flaky.ts")));
        assert!(cache.load(Path::new("/project/flaky.ts")).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_class_construct_passes_name_and_inputs() {
        let mut inputs = PropertyMap::new();
        inputs.insert("greeting".to_string(), "hello".into());
        let instance = greeter().construct("greeter-1", &inputs).unwrap();
        assert_eq!(instance.name(), "greeter-1");
        assert_eq!(instance.get("greeting").and_then(Value::as_str), Some("hello"));
    }
}
