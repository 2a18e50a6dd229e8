//! Integration tests for project scanning and cross-unit resolution

use comphost_parser::{DeclKind, DeclRef, DeclarationSource, Resolver, SemanticType, SourceError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn unit_names(source: &DeclarationSource) -> Vec<String> {
    source
        .units()
        .iter()
        .map(|unit| {
            unit.path
                .strip_prefix(source.root())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_load_without_tsconfig() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "index.ts", "export class A {}\n");
    write(root, "lib/util.ts", "export interface U { x: string }\n");
    write(root, "lib/types.d.ts", "export type T = string;\n");
    write(root, "node_modules/dep/index.d.ts", "export class Dep {}\n");
    write(root, ".cache/hidden.ts", "export class Hidden {}\n");
    write(root, "README.md", "# not a source\n");

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(
        unit_names(&source),
        vec!["index.ts", "lib/types.d.ts", "lib/util.ts"]
    );
    assert!(source.units()[1].is_declaration_only());
    assert!(!source.units()[0].is_declaration_only());
}

#[test]
fn test_load_honors_tsconfig() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "tsconfig.json",
        r#"{
    // comments and trailing commas are accepted
    "compilerOptions": { "outDir": "bin", },
    "include": ["src"],
    "exclude": ["src/**/*.test.ts"],
}"#,
    );
    write(root, "src/index.ts", "export class A {}\n");
    write(root, "src/index.test.ts", "export class ATest {}\n");
    write(root, "scripts/build.ts", "export class Build {}\n");
    write(root, "bin/index.d.ts", "export declare class A {}\n");

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(unit_names(&source), vec!["src/index.ts"]);
}

#[test]
fn test_load_missing_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");
    let err = DeclarationSource::load(&missing).unwrap_err();
    assert!(matches!(err, SourceError::DirectoryNotFound(_)));
}

#[test]
fn test_load_skips_unparsable_units() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "good.ts", "export class Good {}\n");
    write(root, "bad.ts", "export class Bad {\n");

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(unit_names(&source), vec!["good.ts"]);
    assert_eq!(source.skipped().len(), 1);
    assert!(source.skipped()[0].path.ends_with("bad.ts"));
}

#[test]
fn test_load_follows_relative_extends() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "tsconfig.json", r#"{ "extends": "./configs/base" }"#);
    write(
        root,
        "configs/base.json",
        r#"{ "include": ["../src"], "exclude": ["../src/**/*.test.ts"] }"#,
    );
    write(root, "src/a.ts", "export class A {}\n");
    write(root, "src/a.test.ts", "export class ATest {}\n");
    write(root, "other/b.ts", "export class B {}\n");

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(unit_names(&source), vec!["src/a.ts"]);
}

#[test]
fn test_extending_config_overrides_base() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "tsconfig.json",
        r#"{ "extends": "./tsconfig.base.json", "include": ["lib"] }"#,
    );
    write(root, "tsconfig.base.json", r#"{ "include": ["src"] }"#);
    write(root, "src/a.ts", "export class A {}\n");
    write(root, "lib/b.ts", "export class B {}\n");

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(unit_names(&source), vec!["lib/b.ts"]);
}

#[test]
fn test_extends_cycle_is_an_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "tsconfig.json", r#"{ "extends": "./a.json" }"#);
    write(root, "a.json", r#"{ "extends": "./b.json" }"#);
    write(root, "b.json", r#"{ "extends": "./a.json" }"#);

    let err = DeclarationSource::load(root).unwrap_err();
    assert!(matches!(err, SourceError::Config { .. }));
}

#[test]
fn test_load_accepts_bom_and_crlf() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "index.ts",
        "\u{FEFF}import * as pulumi from \"@pulumi/pulumi\";\r\n\
         export class Web extends pulumi.ComponentResource {\r\n\
         /** The url */ url: pulumi.Output<string>; }\r\n",
    );

    let source = DeclarationSource::load(root).unwrap();
    assert!(source.skipped().is_empty());
    let resolver = Resolver::new(&source);
    let classes: Vec<_> = resolver
        .classes(source.units()[0].id)
        .into_iter()
        .map(|(_, class)| class.name.name.clone())
        .collect();
    assert_eq!(classes, vec!["Web"]);
}

#[test]
fn test_load_decodes_invalid_utf8_lossily() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "index.ts", "export class A {}\n");
    fs::write(root.join("legacy.ts"), b"// caf\xe9\nexport class Legacy {}\n").unwrap();

    let source = DeclarationSource::load(root).unwrap();
    assert_eq!(unit_names(&source), vec!["index.ts", "legacy.ts"]);
    assert!(source.skipped().is_empty());
}

#[test]
fn test_cross_unit_resolution() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "index.ts",
        r#"
import * as pulumi from "@pulumi/pulumi";
import { Config } from "./config";

export interface SiteArgs {
    config: Config;
    replicas?: pulumi.Input<number>;
}
"#,
    );
    write(
        root,
        "config.ts",
        r#"
/** Site configuration. */
export interface Config {
    domain: string;
}
"#,
    );

    let source = DeclarationSource::load(root).unwrap();
    let resolver = Resolver::new(&source);
    let index = source.unit_by_path(&source.root().join("index.ts")).unwrap().id;
    let config = source.unit_by_path(&source.root().join("config.ts")).unwrap().id;

    let args = resolver.find_interface(index, "", "SiteArgs").unwrap();
    let props = resolver.interface_properties(&args, false);
    assert_eq!(props.len(), 2);

    let config_ref = DeclRef::new(config, "Config", DeclKind::Interface);
    assert_eq!(
        resolver.property_type(&props[0]),
        SemanticType::Declared(config_ref.clone())
    );
    assert_eq!(resolver.declaration_doc(&config_ref), Some("Site configuration."));

    assert!(props[1].optional);
    let replicas = resolver.property_type(&props[1]);
    assert_eq!(replicas.to_string(), "Input<number>");
}
