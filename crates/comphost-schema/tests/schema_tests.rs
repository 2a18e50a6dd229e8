//! Integration tests for extraction and assembly
//!
//! Runs the whole pipeline over realistic component projects.

use comphost_parser::DeclarationSource;
use comphost_schema::{
    assemble, extract, generate, GenerateError, ManifestError, PackageDescriptor, SchemaProperty,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MY_COMPONENT: &str = r#"
import * as pulumi from "@pulumi/pulumi";

export interface MyComponentArgs {
    input1: pulumi.Input<string>;
    input2?: pulumi.Input<number>;
}

export class MyComponent extends pulumi.ComponentResource {
    public readonly output1: pulumi.Output<string>;
    public readonly output2: pulumi.Output<number>;

    constructor(name: string, args: MyComponentArgs, opts?: pulumi.ComponentResourceOptions) {
        super("pkg:index:MyComponent", name, args, opts);
        this.output1 = pulumi.output(args.input1);
        this.output2 = pulumi.output(args.input2 ?? 0);
        this.registerOutputs({ output1: this.output1, output2: this.output2 });
    }
}
"#;

fn in_memory(units: &[(&str, &str)]) -> DeclarationSource {
    DeclarationSource::from_units("/project", units.iter().copied())
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_my_component_end_to_end() {
    let components = extract(&in_memory(&[("index.ts", MY_COMPONENT)]));
    let component = &components["MyComponent"];

    assert_eq!(component.inputs.len(), 2);
    assert_eq!(component.inputs["input1"], SchemaProperty::of_type("string"));
    assert_eq!(
        component.inputs["input2"],
        SchemaProperty::of_type("number").optional(true)
    );
    assert_eq!(component.outputs.len(), 2);
    assert_eq!(component.outputs["output1"], SchemaProperty::of_type("string"));
    assert_eq!(component.outputs["output2"], SchemaProperty::of_type("number"));

    let schema = assemble(&PackageDescriptor::new("pkg", "1.0.0"), &components).unwrap();
    let resource = &schema.resources["pkg:index:MyComponent"];
    assert!(resource.is_component);
    assert_eq!(resource.required_inputs, vec!["input1".to_string()]);
    assert_eq!(
        resource.required,
        vec!["output1".to_string(), "output2".to_string()]
    );
}

#[test]
fn test_bom_and_crlf_units_are_extracted() {
    let source = in_memory(&[(
        "index.ts",
        "\u{FEFF}import * as pulumi from \"@pulumi/pulumi\";\r\n\
         export class Web extends pulumi.ComponentResource { /** The url */ url: pulumi.Output<string>; }",
    )]);
    assert!(source.skipped().is_empty());

    let components = extract(&source);
    assert_eq!(components.keys().collect::<Vec<_>>(), vec!["Web"]);
    assert_eq!(
        components["Web"].outputs["url"].description.as_deref(),
        Some("The url")
    );
}

#[test]
fn test_required_inputs_follow_declaration_order() {
    let components = extract(&in_memory(&[(
        "index.ts",
        r#"
interface OrderArgs {
    zeta: string;
    alpha?: string;
    mid: number;
    beta?: boolean;
    first: boolean;
}
class Order extends pulumi.ComponentResource {}
"#,
    )]));
    let schema = assemble(&PackageDescriptor::new("pkg", "1.0.0"), &components).unwrap();
    assert_eq!(
        schema.resources["pkg:index:Order"].required_inputs,
        vec!["zeta".to_string(), "mid".to_string(), "first".to_string()]
    );
}

#[test]
fn test_assembly_is_deterministic() {
    let source = in_memory(&[
        ("index.ts", MY_COMPONENT),
        (
            "router.ts",
            r#"
export interface Route { path: string; weight?: number }
export interface RouterArgs { routes: Route[]; labels?: Record<string, string> }
export class Router extends pulumi.ComponentResource {
    public readonly table: pulumi.Output<Route[]>;
}
"#,
        ),
    ]);
    let package = PackageDescriptor::new("pkg", "1.0.0").with_description("Test components");

    let first = assemble(&package, &extract(&source)).unwrap().to_json().unwrap();
    let second = assemble(&package, &extract(&source)).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_serialized_package_schema() {
    let source = in_memory(&[(
        "index.ts",
        r#"
/** A route. */
export interface Route { path: string; weight?: number }
export interface RouterArgs {
    /** Routes to serve. */
    routes: Route[];
    labels?: Record<string, string>;
}
/** Routes traffic. */
export class Router extends pulumi.ComponentResource {
    public readonly table: pulumi.Output<Route[]>;
}
"#,
    )]);
    let package = PackageDescriptor::new("pkg", "0.1.0").with_description("Routing");
    let schema = assemble(&package, &extract(&source)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&schema.to_json_pretty().unwrap()).unwrap();

    assert_eq!(value["name"], json!("pkg"));
    assert_eq!(value["displayName"], json!("Routing"));
    assert_eq!(value["version"], json!("0.1.0"));
    assert_eq!(
        value["resources"]["pkg:index:Router"],
        json!({
            "isComponent": true,
            "description": "Routes traffic.",
            "inputProperties": {
                "routes": {
                    "description": "Routes to serve.",
                    "type": "array",
                    "items": { "$ref": "#/types/pkg:index:Route" }
                },
                "labels": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                }
            },
            "requiredInputs": ["routes"],
            "properties": {
                "table": {
                    "type": "array",
                    "items": { "$ref": "#/types/pkg:index:Route" }
                }
            },
            "required": ["table"]
        })
    );
    assert_eq!(
        value["types"]["pkg:index:Route"],
        json!({
            "type": "object",
            "description": "A route.",
            "properties": {
                "path": { "type": "string" },
                "weight": { "type": "number" }
            },
            "required": ["path"]
        })
    );
    assert_eq!(value["language"]["go"], json!({ "respectSchemaVersion": true }));
    assert!(value.get("parameterization").is_none());
}

#[test]
fn test_pretty_json_uses_four_spaces() {
    let schema = assemble(&PackageDescriptor::new("pkg", "1.0.0"), &Default::default()).unwrap();
    let pretty = schema.to_json_pretty().unwrap();
    assert!(pretty.contains("\n    \"name\": \"pkg\""));
}

#[test]
fn test_generate_from_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "package.json",
        r#"{ "name": "my-components", "version": "1.2.3", "description": "My components", "main": "bin/index.js" }"#,
    );
    write(root, "tsconfig.json", r#"{ "compilerOptions": { "outDir": "bin" } }"#);
    write(root, "index.ts", MY_COMPONENT);

    let generated = generate(root).unwrap();
    assert_eq!(generated.descriptor.name, "my-components");
    assert_eq!(generated.schema.display_name, "My components");
    assert!(generated
        .schema
        .resources
        .contains_key("my-components:index:MyComponent"));
}

#[test]
fn test_generate_requires_package_descriptor() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.ts", MY_COMPONENT);

    let err = generate(temp.path()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Manifest(ManifestError::IoError { .. })
    ));
}

#[test]
fn test_package_descriptor_validation() {
    assert!(matches!(
        PackageDescriptor::parse(r#"{ "version": "1.0.0" }"#),
        Err(ManifestError::MissingField(field)) if field == "name"
    ));
    assert!(matches!(
        PackageDescriptor::parse(r#"{ "name": "pkg", "version": "" }"#),
        Err(ManifestError::MissingField(field)) if field == "version"
    ));
    assert!(matches!(
        PackageDescriptor::parse(r#"{ "name": "has space", "version": "1.0.0" }"#),
        Err(ManifestError::ValidationError(_))
    ));
    assert_eq!(
        PackageDescriptor::parse(r#"{ "name": "pkg", "version": "1.0" }"#)
            .unwrap()
            .version,
        "1.0"
    );
    assert!(matches!(
        PackageDescriptor::parse("{ not json"),
        Err(ManifestError::ParseError(_))
    ));

    let descriptor = PackageDescriptor::parse(
        r#"{ "name": "@acme/components", "version": "2.0.0-beta.1", "dependencies": {} }"#,
    )
    .unwrap();
    assert_eq!(descriptor.name, "@acme/components");
    assert_eq!(descriptor.description, None);
}
