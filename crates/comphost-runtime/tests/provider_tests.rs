//! Integration tests for the provider lifecycle
//!
//! Each test builds a component project on disk and registers in-process
//! modules for its units.

use comphost_runtime::{
    decode_parameter, ComponentClass, ComponentInstance, ComponentProvider, HostError, Module,
    ModuleRegistry, Output, PropertyMap, ProviderError, Value, BASE_PROVIDER_NAME,
};
use comphost_schema::PackageSchema;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const WEB_COMPONENT: &str = r#"
import * as pulumi from "@pulumi/pulumi";

export interface WebArgs {
    port: pulumi.Input<number>;
}

export class Web extends pulumi.ComponentResource {
    public readonly url: pulumi.Output<string>;
    public readonly ready: pulumi.Output<boolean>;

    constructor(name: string, args: WebArgs, opts?: pulumi.ComponentResourceOptions) {
        super("pkg:index:Web", name, args, opts);
    }
}
"#;

const QUEUE_COMPONENT: &str = r#"
import * as pulumi from "@pulumi/pulumi";

export interface QueueArgs {
    depth?: number;
}

export class Queue extends pulumi.ComponentResource {
    public readonly arn: pulumi.Output<string>;
}
"#;

/// Write a project with one `index.ts` unit; returns the unit's path as
/// the declaration source sees it.
fn project(root: &Path, package: &str, unit: &str) -> PathBuf {
    fs::write(
        root.join("package.json"),
        format!(r#"{{ "name": "{}", "version": "1.0.0" }}"#, package),
    )
    .unwrap();
    fs::write(root.join("index.ts"), unit).unwrap();
    root.canonicalize().unwrap().join("index.ts")
}

fn web_class(url: Output) -> ComponentClass {
    ComponentClass::new("Web", move |name, inputs| {
        let mut instance = ComponentInstance::new("web-components:index:Web", name);
        instance.set("port", inputs.get("port").cloned().unwrap_or(Value::Null));
        instance.set("url", url.clone());
        instance.set("ready", Output::resolved(true));
        Ok(instance)
    })
}

fn queue_class() -> ComponentClass {
    ComponentClass::new("Queue", |name, _| {
        let mut instance = ComponentInstance::new("queue-components:index:Queue", name);
        instance.set("arn", Output::pending());
        Ok(instance)
    })
}

fn inputs(port: f64) -> PropertyMap {
    let mut inputs = PropertyMap::new();
    inputs.insert("port".to_string(), Value::Number(port));
    inputs
}

#[test]
fn test_construct_requires_parameterize() {
    let temp = TempDir::new().unwrap();
    let unit = project(temp.path(), "web-components", WEB_COMPONENT);

    let registry = ModuleRegistry::new();
    registry.register_module(Module::new(&unit).with_export(web_class(Output::pending())));
    let provider = ComponentProvider::new(Arc::new(registry));

    let err = provider
        .construct("web", "web-components:index:Web", &inputs(80.0), &PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotParameterized { .. }));

    let result = provider.parameterize(temp.path()).unwrap();
    assert_eq!(result.name, "web-components");
    assert_eq!(result.version, "1.0.0");

    let constructed = provider
        .construct("web", "web-components:index:Web", &inputs(80.0), &PropertyMap::new())
        .unwrap();
    assert_eq!(constructed.urn, "urn:web-components:index:Web::web-1");
    assert_eq!(constructed.state.keys().collect::<Vec<_>>(), vec!["url", "ready"]);
}

#[test]
fn test_schema_carries_parameterization() {
    let temp = TempDir::new().unwrap();
    project(temp.path(), "web-components", WEB_COMPONENT);

    let provider = ComponentProvider::new(Arc::new(ModuleRegistry::new())).with_version("0.9.0");
    provider.parameterize(temp.path()).unwrap();

    let serialized = provider.get_schema().unwrap();
    assert_eq!(
        PackageSchema::from_json(&serialized).unwrap(),
        provider.session().unwrap().schema
    );

    let schema: serde_json::Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(schema["name"], "web-components");
    assert_eq!(
        schema["resources"]["web-components:index:Web"]["requiredInputs"],
        serde_json::json!(["port"])
    );
    assert_eq!(schema["parameterization"]["baseProvider"]["name"], BASE_PROVIDER_NAME);
    assert_eq!(schema["parameterization"]["baseProvider"]["version"], "0.9.0");

    let parameter = schema["parameterization"]["parameter"].as_str().unwrap();
    let session = provider.session().unwrap();
    assert_eq!(decode_parameter(parameter).unwrap(), session.directory);
    assert!(session.directory.is_absolute());
}

#[test]
fn test_last_parameterize_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let web_unit = project(first.path(), "web-components", WEB_COMPONENT);
    let queue_unit = project(second.path(), "queue-components", QUEUE_COMPONENT);

    let registry = ModuleRegistry::new();
    registry.register_module(Module::new(&web_unit).with_export(web_class(Output::pending())));
    registry.register_module(Module::new(&queue_unit).with_export(queue_class()));
    let provider = ComponentProvider::new(Arc::new(registry));

    provider.parameterize(first.path()).unwrap();
    let result = provider.parameterize(second.path()).unwrap();
    assert_eq!(result.name, "queue-components");

    let schema = provider.get_schema().unwrap();
    assert!(schema.contains("queue-components:index:Queue"));
    assert!(!schema.contains("web-components:index:Web"));
    assert_eq!(provider.session().unwrap().generation, 2);

    let err = provider
        .construct("web", "web-components:index:Web", &inputs(80.0), &PropertyMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Host(HostError::ComponentNotFound { component, .. }) if component == "Web"
    ));

    let queue = provider
        .construct("queue", "queue-components:index:Queue", &PropertyMap::new(), &PropertyMap::new())
        .unwrap();
    assert_eq!(queue.state.keys().collect::<Vec<_>>(), vec!["arn"]);
}

#[test]
fn test_failed_parameterize_keeps_session() {
    let good = TempDir::new().unwrap();
    let broken = TempDir::new().unwrap();
    project(good.path(), "web-components", WEB_COMPONENT);
    fs::write(broken.path().join("index.ts"), WEB_COMPONENT).unwrap();

    let provider = ComponentProvider::new(Arc::new(ModuleRegistry::new()));
    provider.parameterize(good.path()).unwrap();

    let err = provider.parameterize(broken.path()).unwrap_err();
    assert!(matches!(err, ProviderError::Parameterize { .. }));
    assert!(provider.get_schema().unwrap().contains("web-components:index:Web"));
    assert_eq!(provider.session().unwrap().generation, 1);
}

#[test]
fn test_modules_load_once_across_constructs() {
    let temp = TempDir::new().unwrap();
    let unit = project(temp.path(), "web-components", WEB_COMPONENT);

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let registry = ModuleRegistry::new();
    registry.register(&unit, move |path| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Module::new(path).with_export(web_class(Output::pending())))
    });
    let provider = ComponentProvider::new(Arc::new(registry));
    provider.parameterize(temp.path()).unwrap();

    for port in [80.0, 443.0] {
        provider
            .construct("web", "web-components:index:Web", &inputs(port), &PropertyMap::new())
            .unwrap();
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(provider.host().cache().is_loaded(&unit));
}

#[test]
fn test_state_holds_unresolved_outputs() {
    let temp = TempDir::new().unwrap();
    let unit = project(temp.path(), "web-components", WEB_COMPONENT);

    let url = Output::pending();
    let registry = ModuleRegistry::new();
    registry.register_module(Module::new(&unit).with_export(web_class(url.clone())));
    let provider = ComponentProvider::new(Arc::new(registry));
    provider.parameterize(temp.path()).unwrap();

    let result = provider
        .construct("web", "web-components:index:Web", &inputs(80.0), &PropertyMap::new())
        .unwrap();
    let harvested = result.state["url"].as_output().unwrap();
    assert!(harvested.ptr_eq(&url));
    assert!(!harvested.is_resolved());
    assert!(!result.state.contains_key("port"));

    url.resolve("https://web.example.com");
    assert_eq!(
        harvested.value().and_then(Value::as_str),
        Some("https://web.example.com")
    );
}

#[test]
fn test_construct_errors_name_the_problem() {
    let temp = TempDir::new().unwrap();
    let unit = project(temp.path(), "web-components", WEB_COMPONENT);

    let registry = ModuleRegistry::new();
    registry.register_module(Module::new(&unit));
    let provider = ComponentProvider::new(Arc::new(registry));
    provider.parameterize(temp.path()).unwrap();

    let err = provider
        .construct("web", "web-components", &PropertyMap::new(), &PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidTypeToken(token) if token == "web-components"));

    let err = provider
        .construct("web", "web-components:index:Web", &PropertyMap::new(), &PropertyMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Host(HostError::ExportNotFound { component, .. }) if component == "Web"
    ));
}

#[test]
fn test_unregistered_module() {
    let temp = TempDir::new().unwrap();
    project(temp.path(), "web-components", WEB_COMPONENT);

    let provider = ComponentProvider::new(Arc::new(ModuleRegistry::new()));
    provider.parameterize(temp.path()).unwrap();

    let err = provider
        .construct("web", "web-components:index:Web", &PropertyMap::new(), &PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, ProviderError::Host(HostError::ModuleNotFound { .. })));
}

#[test]
fn test_constructor_assigned_urn_and_dependencies() {
    let temp = TempDir::new().unwrap();
    let unit = project(temp.path(), "web-components", WEB_COMPONENT);

    let db_urn = "urn:pulumi:dev::app::db:index:Database::main";
    let class = ComponentClass::new("Web", move |name, _| {
        let mut instance = ComponentInstance::new("web-components:index:Web", name)
            .with_urn(format!("urn:pulumi:dev::app::web-components:index:Web::{}", name));
        instance.set("url", Output::depending_on(vec![db_urn.to_string()]));
        instance.set("ready", Output::resolved(false));
        Ok(instance)
    });
    let registry = ModuleRegistry::new();
    registry.register_module(Module::new(&unit).with_export(class));
    let provider = ComponentProvider::new(Arc::new(registry));
    provider.parameterize(temp.path()).unwrap();

    let result = provider
        .construct("web", "web-components:index:Web", &inputs(80.0), &PropertyMap::new())
        .unwrap();
    assert_eq!(result.urn, "urn:pulumi:dev::app::web-components:index:Web::web-1");
    let url = result.state["url"].as_output().unwrap();
    assert_eq!(url.dependencies(), [db_urn.to_string()]);
    assert!(!url.is_resolved());
}
