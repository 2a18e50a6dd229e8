//! Per-unit symbol tables.

use crate::ast::{
    ClassDecl, EnumDecl, ExportDecl, ImportSpecifier, InterfaceDecl, Item, Module, TypeAliasDecl,
};
use rustc_hash::FxHashMap;

/// A named declaration visible in a unit, keyed by its dotted path.
#[derive(Debug, Clone)]
pub(crate) enum Declaration<'s> {
    Class(&'s ClassDecl),
    /// Same-named interfaces merge
    Interface(Vec<&'s InterfaceDecl>),
    Alias(&'s TypeAliasDecl),
    Enum(&'s EnumDecl),
    Namespace,
}

/// What an import binds a local name to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ImportBinding {
    /// `import { name } from "module"`; default imports bind `"default"`
    Named { module: String, name: String },
    /// `import * as local from "module"`
    Namespace { module: String },
}

/// What an exported name refers to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExportTarget {
    /// A declaration or import binding of the unit itself
    Local(String),
    /// `export { name } from "module"`
    Reexport { module: String, name: String },
}

#[derive(Debug, Default)]
pub(crate) struct UnitScope<'s> {
    pub decls: FxHashMap<String, Declaration<'s>>,
    /// Every class of the unit (including namespace members) in source order
    pub classes: Vec<(String, &'s ClassDecl)>,
    pub imports: FxHashMap<String, ImportBinding>,
    pub exports: FxHashMap<String, ExportTarget>,
    /// Modules re-exported with `export * from`
    pub star_exports: Vec<String>,
}

impl<'s> UnitScope<'s> {
    pub fn build(module: &'s Module) -> Self {
        let mut scope = UnitScope::default();
        scope.collect(&module.items, "");
        scope
    }

    fn collect(&mut self, items: &'s [Item], prefix: &str) {
        let top_level = prefix.is_empty();

        for item in items {
            match item {
                Item::Import(import) => {
                    for specifier in &import.specifiers {
                        let binding = match specifier {
                            ImportSpecifier::Named { name, .. } => ImportBinding::Named {
                                module: import.source.clone(),
                                name: name.clone(),
                            },
                            ImportSpecifier::Default(_) => ImportBinding::Named {
                                module: import.source.clone(),
                                name: "default".to_string(),
                            },
                            ImportSpecifier::Namespace(_) => ImportBinding::Namespace {
                                module: import.source.clone(),
                            },
                        };
                        self.imports.insert(specifier.local_name().to_string(), binding);
                    }
                }

                Item::Export(ExportDecl::Named {
                    specifiers, source, ..
                }) if top_level => {
                    for specifier in specifiers {
                        let target = match source {
                            Some(module) => ExportTarget::Reexport {
                                module: module.clone(),
                                name: specifier.name.clone(),
                            },
                            None => ExportTarget::Local(specifier.name.clone()),
                        };
                        self.exports.insert(specifier.exported_name().to_string(), target);
                    }
                }

                Item::Export(ExportDecl::All { source, .. }) if top_level => {
                    self.star_exports.push(source.clone());
                }

                Item::Class(class) => {
                    let key = qualify(prefix, &class.name.name);
                    self.decls.insert(key.clone(), Declaration::Class(class));
                    self.classes.push((key.clone(), class));
                    if top_level && class.exported {
                        if class.is_default {
                            self.exports
                                .insert("default".to_string(), ExportTarget::Local(key.clone()));
                        }
                        if class.name.name != "default" {
                            self.exports
                                .insert(class.name.name.clone(), ExportTarget::Local(key));
                        }
                    }
                }

                Item::Interface(iface) => {
                    let key = qualify(prefix, &iface.name.name);
                    match self.decls.get_mut(&key) {
                        Some(Declaration::Interface(merged)) => merged.push(iface),
                        // A class and an interface of the same name merge too;
                        // the class carries the members that matter.
                        Some(Declaration::Class(_)) => {}
                        _ => {
                            self.decls.insert(key.clone(), Declaration::Interface(vec![iface]));
                        }
                    }
                    self.export_local(top_level && iface.exported, &iface.name.name, key);
                }

                Item::TypeAlias(alias) => {
                    let key = qualify(prefix, &alias.name.name);
                    self.decls.insert(key.clone(), Declaration::Alias(alias));
                    self.export_local(top_level && alias.exported, &alias.name.name, key);
                }

                Item::Enum(decl) => {
                    let key = qualify(prefix, &decl.name.name);
                    self.decls.insert(key.clone(), Declaration::Enum(decl));
                    self.export_local(top_level && decl.exported, &decl.name.name, key);
                }

                Item::Namespace(ns) => {
                    // `declare module "pkg"` describes another module and
                    // `declare global` augments the global scope
                    if !is_name_path(&ns.name) || (ns.is_ambient && ns.name == "global") {
                        continue;
                    }
                    let key = qualify(prefix, &ns.name);
                    // `namespace a.b {}` declares `a` as well
                    let mut path = String::new();
                    for segment in key.split('.') {
                        if !path.is_empty() {
                            path.push('.');
                        }
                        path.push_str(segment);
                        self.decls.entry(path.clone()).or_insert(Declaration::Namespace);
                    }
                    if top_level && ns.exported {
                        let head = key.split('.').next().unwrap_or(&key).to_string();
                        self.exports.insert(head.clone(), ExportTarget::Local(head));
                    }
                    self.collect(&ns.items, &key);
                }

                Item::Export(_) | Item::Other(_) => {}
            }
        }
    }

    fn export_local(&mut self, exported: bool, name: &str, key: String) {
        if exported {
            self.exports.insert(name.to_string(), ExportTarget::Local(key));
        }
    }
}

pub(crate) fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Namespace prefixes to try from the innermost outwards: `a.b`, `a`, ``.
pub(crate) fn enclosing_prefixes(namespace: &str) -> Vec<&str> {
    let mut prefixes = Vec::new();
    let mut current = namespace;
    loop {
        prefixes.push(current);
        match current.rfind('.') {
            Some(idx) => current = &current[..idx],
            None if !current.is_empty() => current = "",
            None => break,
        }
    }
    prefixes
}

fn is_name_path(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}
