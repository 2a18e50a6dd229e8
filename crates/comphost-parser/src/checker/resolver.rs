//! Name lookup, alias expansion and member collection.

use super::scope::{enclosing_prefixes, qualify, Declaration, ExportTarget, ImportBinding, UnitScope};
use super::{DeclKind, DeclRef, Primitive, SemanticType};
use crate::ast::{
    AccessorKind, ClassDecl, ClassMember, KeywordType, LiteralType, Modifiers, ObjectType,
    QualifiedName, Type, TypeAnnotation, TypeMember, TypeOperator, TypeReference,
};
use crate::source::{DeclarationSource, UnitId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Nesting limit for alias expansion and indexed access
const MAX_ALIAS_DEPTH: usize = 32;

/// Nesting limit for import and re-export chains
const MAX_LOOKUP_DEPTH: usize = 32;

/// Nesting limit for `extends` chains
const MAX_HERITAGE_DEPTH: usize = 16;

type TypeEnv = FxHashMap<String, SemanticType>;

/// A property of a class, interface or object type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo<'s> {
    pub name: String,
    pub optional: bool,
    pub doc: Option<&'s str>,
    /// Written type, `None` when the member has no annotation
    pub annotation: Option<&'s TypeAnnotation>,
    /// Declaration the member is written in; its annotation resolves there
    pub owner: DeclRef,
}

/// Base class named in a class's `extends` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseClass {
    /// A class declared in the source
    Local(DeclRef),
    /// A class from a dependency, named as written after following imports
    External(QualifiedName),
    /// An expression or a name that does not denote a class
    Unknown(String),
}

/// What a (possibly dotted) name denotes.
#[derive(Debug, Clone)]
enum Symbol {
    Decl(DeclRef),
    LocalNamespace { unit: UnitId, path: String },
    ModuleNamespace(UnitId),
    External { name: QualifiedName },
}

#[derive(Clone, Copy)]
struct Ctx<'a> {
    unit: UnitId,
    namespace: &'a str,
    env: &'a TypeEnv,
    depth: usize,
}

impl<'a> Ctx<'a> {
    fn deeper(self) -> Self {
        Ctx {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Resolves annotations written anywhere in a [`DeclarationSource`].
pub struct Resolver<'s> {
    source: &'s DeclarationSource,
    scopes: Vec<UnitScope<'s>>,
}

impl<'s> Resolver<'s> {
    pub fn new(source: &'s DeclarationSource) -> Self {
        let scopes = source
            .units()
            .iter()
            .map(|unit| UnitScope::build(&unit.module))
            .collect();
        Self { source, scopes }
    }

    pub fn source(&self) -> &'s DeclarationSource {
        self.source
    }

    /// Classes of a unit, including namespace members, in source order.
    pub fn classes(&self, unit: UnitId) -> Vec<(DeclRef, &'s ClassDecl)> {
        self.scopes
            .get(unit)
            .map(|scope| {
                scope
                    .classes
                    .iter()
                    .map(|(key, class)| (DeclRef::new(unit, key.as_str(), DeclKind::Class), *class))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The class a reference points at.
    pub fn class(&self, decl: &DeclRef) -> Option<&'s ClassDecl> {
        match self.declaration(decl)? {
            Declaration::Class(class) => Some(*class),
            _ => None,
        }
    }

    /// Find an interface by simple name, preferring the given namespace
    /// and its parents, then any namespace of the unit.
    pub fn find_interface(&self, unit: UnitId, namespace: &str, name: &str) -> Option<DeclRef> {
        let scope = self.scopes.get(unit)?;
        for prefix in enclosing_prefixes(namespace) {
            let key = qualify(prefix, name);
            if matches!(scope.decls.get(&key), Some(Declaration::Interface(_))) {
                return Some(DeclRef::new(unit, key, DeclKind::Interface));
            }
        }

        let mut keys: Vec<&String> = scope
            .decls
            .iter()
            .filter(|(key, decl)| {
                matches!(decl, Declaration::Interface(_)) && key.rsplit('.').next() == Some(name)
            })
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys.first()
            .map(|key| DeclRef::new(unit, key.as_str(), DeclKind::Interface))
    }

    /// The class a class extends.
    pub fn base_class(&self, class: &DeclRef) -> Option<BaseClass> {
        let decl = self.class(class)?;
        let heritage = decl.extends.as_ref()?;
        let Some(reference) = &heritage.reference else {
            return Some(BaseClass::Unknown(heritage.expression.clone()));
        };

        let base = match self.lookup(class.unit, class.namespace(), &reference.name, 0) {
            Some(Symbol::Decl(base)) if base.kind == DeclKind::Class => BaseClass::Local(base),
            Some(Symbol::External { name }) => BaseClass::External(name),
            None => BaseClass::External(reference.name.clone()),
            Some(_) => BaseClass::Unknown(heritage.expression.clone()),
        };
        Some(base)
    }

    /// Doc comment of a declaration (the first documented one for merged
    /// interfaces).
    pub fn declaration_doc(&self, decl: &DeclRef) -> Option<&'s str> {
        match self.declaration(decl)? {
            Declaration::Class(class) => {
                let class: &'s ClassDecl = *class;
                class.doc.as_deref()
            }
            Declaration::Interface(merged) => merged
                .iter()
                .copied()
                .find_map(|iface| iface.doc.as_deref()),
            Declaration::Alias(alias) => {
                let alias: &'s _ = *alias;
                alias.doc.as_deref()
            }
            Declaration::Enum(decl) => {
                let decl: &'s _ = *decl;
                decl.doc.as_deref()
            }
            Declaration::Namespace => None,
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Resolve an annotation written at the top level of `unit`.
    pub fn resolve(&self, unit: UnitId, annotation: &TypeAnnotation) -> SemanticType {
        let env = TypeEnv::default();
        self.resolve_type(
            Ctx {
                unit,
                namespace: "",
                env: &env,
                depth: 0,
            },
            annotation,
        )
    }

    /// Resolve an annotation written inside a declaration. Type parameters
    /// of the declaration resolve to `any`.
    pub fn resolve_in(&self, context: &DeclRef, annotation: &TypeAnnotation) -> SemanticType {
        self.resolve_at(context, annotation, 0)
    }

    /// Resolved type of a property; unannotated properties are `any`.
    pub fn property_type(&self, property: &PropertyInfo<'s>) -> SemanticType {
        self.property_type_at(property, 0)
    }

    fn property_type_at(&self, property: &PropertyInfo<'s>, depth: usize) -> SemanticType {
        match property.annotation {
            Some(annotation) => self.resolve_at(&property.owner, annotation, depth),
            None => SemanticType::Any,
        }
    }

    fn resolve_at(&self, context: &DeclRef, annotation: &TypeAnnotation, depth: usize) -> SemanticType {
        if depth >= MAX_ALIAS_DEPTH {
            return SemanticType::Unresolved(annotation.to_string());
        }
        let env = self.type_param_env(context);
        self.resolve_type(
            Ctx {
                unit: context.unit,
                namespace: context.namespace(),
                env: &env,
                depth,
            },
            annotation,
        )
    }

    fn type_param_env(&self, decl: &DeclRef) -> TypeEnv {
        let params = match self.declaration(decl) {
            Some(Declaration::Class(class)) => &class.type_params,
            Some(Declaration::Alias(alias)) => &alias.type_params,
            Some(Declaration::Interface(merged)) => match merged.first() {
                Some(iface) => &iface.type_params,
                None => return TypeEnv::default(),
            },
            _ => return TypeEnv::default(),
        };
        params
            .iter()
            .map(|param| (param.name.name.clone(), SemanticType::Any))
            .collect()
    }

    fn resolve_type(&self, cx: Ctx<'_>, annotation: &TypeAnnotation) -> SemanticType {
        match &annotation.ty {
            Type::Keyword(keyword) => keyword_type(*keyword),
            Type::Reference(reference) => self.resolve_reference(cx, reference, annotation),
            Type::Array(elem) => SemanticType::Array(Box::new(self.resolve_type(cx, elem))),
            Type::Tuple(elems) => {
                SemanticType::Tuple(elems.iter().map(|elem| self.resolve_type(cx, elem)).collect())
            }
            Type::Union(members) => union_of(members.iter().map(|member| self.resolve_type(cx, member))),
            Type::Intersection(members) => SemanticType::Intersection(
                members
                    .iter()
                    .map(|member| self.resolve_type(cx, member))
                    .collect(),
            ),
            Type::Literal(literal) => SemanticType::Literal(literal.clone()),
            Type::Object(object) => match dictionary_value(object) {
                Some(value) => SemanticType::Map(Box::new(self.resolve_type(cx, value))),
                None => SemanticType::ObjectLiteral(annotation.to_string()),
            },
            Type::Parenthesized(inner) => self.resolve_type(cx, inner),
            Type::Operator(TypeOperator::Readonly, inner) => self.resolve_type(cx, inner),
            Type::Operator(TypeOperator::Keyof, _) => SemanticType::Primitive(Primitive::String),
            Type::Operator(TypeOperator::Unique, _) => SemanticType::Primitive(Primitive::Symbol),
            Type::IndexedAccess(object, index) => self.resolve_indexed(cx, object, index, annotation),
            Type::Raw(text) if text.starts_with('`') => SemanticType::Primitive(Primitive::String),
            Type::Function(_) | Type::Query(_) | Type::This | Type::Raw(_) => {
                SemanticType::Unresolved(annotation.to_string())
            }
        }
    }

    fn resolve_reference(
        &self,
        cx: Ctx<'_>,
        reference: &TypeReference,
        annotation: &TypeAnnotation,
    ) -> SemanticType {
        if reference.name.is_simple() && reference.type_args.is_empty() {
            if let Some(bound) = cx.env.get(reference.name.first()) {
                return bound.clone();
            }
        }

        let args: Vec<SemanticType> = reference
            .type_args
            .iter()
            .map(|arg| self.resolve_type(cx, arg))
            .collect();

        match self.lookup(cx.unit, cx.namespace, &reference.name, 0) {
            Some(Symbol::Decl(decl)) => self.resolve_declared(decl, args, cx.depth),
            Some(Symbol::External { name }) => SemanticType::Generic { name, args },
            Some(Symbol::LocalNamespace { .. }) | Some(Symbol::ModuleNamespace(_)) => {
                SemanticType::Unresolved(annotation.to_string())
            }
            None => library_type(&reference.name, args),
        }
    }

    fn resolve_declared(&self, decl: DeclRef, args: Vec<SemanticType>, depth: usize) -> SemanticType {
        match decl.kind {
            DeclKind::Class | DeclKind::Interface => SemanticType::Declared(decl),
            DeclKind::Enum => self.enum_type(&decl),
            DeclKind::Alias => self.expand_alias(decl, args, depth),
        }
    }

    fn expand_alias(&self, decl: DeclRef, args: Vec<SemanticType>, depth: usize) -> SemanticType {
        let Some(Declaration::Alias(alias)) = self.declaration(&decl) else {
            return SemanticType::Unresolved(decl.simple_name().to_string());
        };
        if depth >= MAX_ALIAS_DEPTH {
            return SemanticType::Unresolved(decl.simple_name().to_string());
        }

        // Non-generic object aliases are named types of their own
        if alias.type_params.is_empty() {
            if let Type::Object(object) = &alias.type_annotation.ty {
                if dictionary_value(object).is_none() {
                    return SemanticType::Declared(decl);
                }
            }
        }

        let namespace = decl.namespace();
        let mut env = TypeEnv::default();
        let mut args = args.into_iter();
        for param in &alias.type_params {
            let bound = match (args.next(), &param.default) {
                (Some(arg), _) => arg,
                (None, Some(default)) => self.resolve_type(
                    Ctx {
                        unit: decl.unit,
                        namespace,
                        env: &env,
                        depth: depth + 1,
                    },
                    default,
                ),
                (None, None) => SemanticType::Any,
            };
            env.insert(param.name.name.clone(), bound);
        }

        self.resolve_type(
            Ctx {
                unit: decl.unit,
                namespace,
                env: &env,
                depth: depth + 1,
            },
            &alias.type_annotation,
        )
    }

    fn enum_type(&self, decl: &DeclRef) -> SemanticType {
        let Some(Declaration::Enum(decl)) = self.declaration(decl) else {
            return SemanticType::Primitive(Primitive::Number);
        };
        let strings = decl
            .members
            .iter()
            .filter(|member| member.string_value.is_some())
            .count();
        if strings == 0 {
            SemanticType::Primitive(Primitive::Number)
        } else if strings == decl.members.len() {
            SemanticType::Primitive(Primitive::String)
        } else {
            SemanticType::Union(vec![
                SemanticType::Primitive(Primitive::String),
                SemanticType::Primitive(Primitive::Number),
            ])
        }
    }

    fn resolve_indexed(
        &self,
        cx: Ctx<'_>,
        object: &TypeAnnotation,
        index: &TypeAnnotation,
        annotation: &TypeAnnotation,
    ) -> SemanticType {
        if let Type::Literal(LiteralType::String(key)) = &index.ty {
            if let SemanticType::Declared(decl) = self.resolve_type(cx.deeper(), object) {
                let found = self
                    .declared_properties(&decl)
                    .into_iter()
                    .find(|property| property.name == *key);
                if let Some(property) = found {
                    return self.property_type_at(&property, cx.depth + 1);
                }
            }
        }
        SemanticType::Unresolved(annotation.to_string())
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Instance properties of a class: own members first, in source order,
    /// then members inherited from local base classes. Static members,
    /// methods and `#private` names are left out; get accessors and
    /// constructor parameter properties count.
    pub fn class_properties(&self, class: &DeclRef) -> Vec<PropertyInfo<'s>> {
        let mut members = Members::default();
        self.collect_class(class, &mut members, 0);
        members.properties
    }

    /// Property signatures of an interface, merged across same-named
    /// declarations, optionally with those of the interfaces it extends.
    pub fn interface_properties(&self, iface: &DeclRef, include_inherited: bool) -> Vec<PropertyInfo<'s>> {
        let mut members = Members::default();
        self.collect_interface(iface, include_inherited, &mut members, 0);
        members.properties
    }

    /// Properties of any declared type, inherited members included.
    pub fn declared_properties(&self, decl: &DeclRef) -> Vec<PropertyInfo<'s>> {
        let mut members = Members::default();
        self.collect_declared(decl, &mut members, 0);
        members.properties
    }

    fn collect_declared(&self, decl: &DeclRef, members: &mut Members<'s>, depth: usize) {
        match decl.kind {
            DeclKind::Class => self.collect_class(decl, members, depth),
            DeclKind::Interface => self.collect_interface(decl, true, members, depth),
            DeclKind::Alias => self.collect_alias(decl, members),
            DeclKind::Enum => {}
        }
    }

    fn collect_class(&self, class_ref: &DeclRef, members: &mut Members<'s>, depth: usize) {
        if depth > MAX_HERITAGE_DEPTH {
            return;
        }
        let Some(class) = self.class(class_ref) else {
            return;
        };

        for member in &class.members {
            match member {
                ClassMember::Property(prop) if is_instance_member(&prop.modifiers, &prop.name.name) => {
                    members.push(PropertyInfo {
                        name: prop.name.name.clone(),
                        optional: prop.optional,
                        doc: prop.doc.as_deref(),
                        annotation: prop.type_annotation.as_ref(),
                        owner: class_ref.clone(),
                    });
                }
                ClassMember::Accessor(accessor)
                    if accessor.kind == AccessorKind::Get
                        && is_instance_member(&accessor.modifiers, &accessor.name.name) =>
                {
                    members.push(PropertyInfo {
                        name: accessor.name.name.clone(),
                        optional: false,
                        doc: accessor.doc.as_deref(),
                        annotation: accessor.return_type.as_ref(),
                        owner: class_ref.clone(),
                    });
                }
                ClassMember::Constructor(ctor) => {
                    for param in ctor.params.iter().filter(|p| p.is_parameter_property()) {
                        members.push(PropertyInfo {
                            name: param.name.name.clone(),
                            optional: param.optional,
                            doc: param.doc.as_deref(),
                            annotation: param.type_annotation.as_ref(),
                            owner: class_ref.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        if let Some(BaseClass::Local(base)) = self.base_class(class_ref) {
            self.collect_class(&base, members, depth + 1);
        }
    }

    fn collect_interface(
        &self,
        iface: &DeclRef,
        include_inherited: bool,
        members: &mut Members<'s>,
        depth: usize,
    ) {
        if depth > MAX_HERITAGE_DEPTH {
            return;
        }
        let Some(Declaration::Interface(merged)) = self.declaration(iface) else {
            return;
        };
        let merged: Vec<&'s _> = merged.clone();

        for decl in merged.iter().copied() {
            for prop in decl.properties() {
                members.push(PropertyInfo {
                    name: prop.name.name.clone(),
                    optional: prop.optional,
                    doc: prop.doc.as_deref(),
                    annotation: prop.type_annotation.as_ref(),
                    owner: iface.clone(),
                });
            }
        }

        if !include_inherited {
            return;
        }
        for decl in merged.iter().copied() {
            for base in &decl.extends {
                let Type::Reference(reference) = &base.ty else {
                    continue;
                };
                if let Some(Symbol::Decl(base_ref)) =
                    self.lookup(iface.unit, iface.namespace(), &reference.name, 0)
                {
                    self.collect_declared(&base_ref, members, depth + 1);
                }
            }
        }
    }

    fn collect_alias(&self, alias_ref: &DeclRef, members: &mut Members<'s>) {
        let Some(Declaration::Alias(alias)) = self.declaration(alias_ref) else {
            return;
        };
        let alias: &'s _ = *alias;
        if let Type::Object(object) = &alias.type_annotation.ty {
            for member in &object.members {
                if let TypeMember::Property(prop) = member {
                    members.push(PropertyInfo {
                        name: prop.name.name.clone(),
                        optional: prop.optional,
                        doc: prop.doc.as_deref(),
                        annotation: prop.type_annotation.as_ref(),
                        owner: alias_ref.clone(),
                    });
                }
            }
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn declaration(&self, decl: &DeclRef) -> Option<&Declaration<'s>> {
        self.scopes.get(decl.unit)?.decls.get(&decl.name)
    }

    /// Resolve a name as written in `unit`, inside `namespace`.
    fn lookup(&self, unit: UnitId, namespace: &str, name: &QualifiedName, depth: usize) -> Option<Symbol> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }
        let scope = self.scopes.get(unit)?;

        let full = name.to_string();
        for prefix in enclosing_prefixes(namespace) {
            let key = qualify(prefix, &full);
            if let Some(decl) = scope.decls.get(&key) {
                return Some(declaration_symbol(unit, key, decl));
            }
        }

        let rest = &name.segments[1..];
        match scope.imports.get(name.first())? {
            ImportBinding::Namespace { module } => match self.source.resolve_module(unit, module) {
                Some(target) => self.descend(Symbol::ModuleNamespace(target), rest, depth + 1),
                None => Some(Symbol::External { name: name.clone() }),
            },
            ImportBinding::Named {
                module,
                name: imported,
            } => match self.source.resolve_module(unit, module) {
                Some(target) => {
                    let symbol = self.export(target, imported, depth + 1)?;
                    self.descend(symbol, rest, depth + 1)
                }
                None => {
                    let mut segments = name.segments.clone();
                    if imported != "default" {
                        segments[0] = imported.clone();
                    }
                    Some(Symbol::External {
                        name: QualifiedName { segments },
                    })
                }
            },
        }
    }

    /// Follow the remaining segments of a dotted name into a namespace.
    fn descend(&self, symbol: Symbol, rest: &[String], depth: usize) -> Option<Symbol> {
        if rest.is_empty() {
            return Some(symbol);
        }
        match symbol {
            Symbol::ModuleNamespace(unit) => {
                let head = self.export(unit, &rest[0], depth + 1)?;
                self.descend(head, &rest[1..], depth + 1)
            }
            Symbol::LocalNamespace { unit, path } => {
                let key = format!("{}.{}", path, rest.join("."));
                let decl = self.scopes.get(unit)?.decls.get(&key)?;
                Some(declaration_symbol(unit, key, decl))
            }
            Symbol::External { mut name } => {
                name.segments.extend(rest.iter().cloned());
                Some(Symbol::External { name })
            }
            Symbol::Decl(_) => None,
        }
    }

    /// Resolve a name exported by `unit`, following re-exports.
    fn export(&self, unit: UnitId, name: &str, depth: usize) -> Option<Symbol> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }
        let scope = self.scopes.get(unit)?;

        if let Some(target) = scope.exports.get(name) {
            return match target {
                ExportTarget::Local(local) => {
                    let local = QualifiedName {
                        segments: local.split('.').map(str::to_string).collect(),
                    };
                    self.lookup(unit, "", &local, depth + 1)
                }
                ExportTarget::Reexport { module, name } => {
                    match self.source.resolve_module(unit, module) {
                        Some(target) if name == "*" => Some(Symbol::ModuleNamespace(target)),
                        Some(target) => self.export(target, name, depth + 1),
                        None => Some(Symbol::External {
                            name: QualifiedName::simple(name.clone()),
                        }),
                    }
                }
            };
        }

        scope.star_exports.iter().find_map(|module| {
            let target = self.source.resolve_module(unit, module)?;
            self.export(target, name, depth + 1)
        })
    }
}

/// Properties collected so far; the first declaration of a name wins.
#[derive(Default)]
struct Members<'s> {
    properties: Vec<PropertyInfo<'s>>,
    seen: FxHashSet<String>,
}

impl<'s> Members<'s> {
    fn push(&mut self, property: PropertyInfo<'s>) {
        if self.seen.insert(property.name.clone()) {
            self.properties.push(property);
        }
    }
}

fn declaration_symbol(unit: UnitId, key: String, decl: &Declaration<'_>) -> Symbol {
    let kind = match decl {
        Declaration::Class(_) => DeclKind::Class,
        Declaration::Interface(_) => DeclKind::Interface,
        Declaration::Alias(_) => DeclKind::Alias,
        Declaration::Enum(_) => DeclKind::Enum,
        Declaration::Namespace => return Symbol::LocalNamespace { unit, path: key },
    };
    Symbol::Decl(DeclRef::new(unit, key, kind))
}

fn is_instance_member(modifiers: &Modifiers, name: &str) -> bool {
    !modifiers.is_static && !name.starts_with('#')
}

fn keyword_type(keyword: KeywordType) -> SemanticType {
    match keyword {
        KeywordType::String => SemanticType::Primitive(Primitive::String),
        KeywordType::Number => SemanticType::Primitive(Primitive::Number),
        KeywordType::Boolean => SemanticType::Primitive(Primitive::Boolean),
        KeywordType::BigInt => SemanticType::Primitive(Primitive::BigInt),
        KeywordType::Symbol => SemanticType::Primitive(Primitive::Symbol),
        KeywordType::Object => SemanticType::Object,
        KeywordType::Any => SemanticType::Any,
        KeywordType::Unknown => SemanticType::Unknown,
        KeywordType::Never => SemanticType::Never,
        KeywordType::Void => SemanticType::Void,
        KeywordType::Null => SemanticType::Null,
        KeywordType::Undefined => SemanticType::Undefined,
    }
}

/// Global names of the standard library that have a structural meaning.
fn library_type(name: &QualifiedName, mut args: Vec<SemanticType>) -> SemanticType {
    if name.is_simple() {
        match (name.first(), args.len()) {
            ("Array" | "ReadonlyArray", 1) => return SemanticType::Array(Box::new(args.remove(0))),
            ("Record" | "Map" | "ReadonlyMap", 2) => return SemanticType::Map(Box::new(args.remove(1))),
            ("Readonly", 1) => return args.remove(0),
            ("NonNullable", 1) => return args.remove(0).without_nullish(),
            ("String", 0) => return SemanticType::Primitive(Primitive::String),
            ("Number", 0) => return SemanticType::Primitive(Primitive::Number),
            ("Boolean", 0) => return SemanticType::Primitive(Primitive::Boolean),
            ("Object", 0) => return SemanticType::Object,
            _ => {}
        }
    }
    SemanticType::Generic {
        name: name.clone(),
        args,
    }
}

/// Value type of an object type made only of index signatures.
fn dictionary_value(object: &ObjectType) -> Option<&TypeAnnotation> {
    if object.members.is_empty() {
        return None;
    }
    let mut value = None;
    for member in &object.members {
        match member {
            TypeMember::Index(index) => {
                value.get_or_insert(&index.value_type);
            }
            _ => return None,
        }
    }
    value
}

/// Flattened, deduplicated union; a single member stands for itself.
fn union_of(members: impl Iterator<Item = SemanticType>) -> SemanticType {
    let mut flat: Vec<SemanticType> = Vec::new();
    for member in members {
        let parts = match member {
            SemanticType::Union(inner) => inner,
            other => vec![other],
        };
        for part in parts {
            if !flat.contains(&part) {
                flat.push(part);
            }
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else {
        SemanticType::Union(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(units: &[(&str, &str)]) -> DeclarationSource {
        let source = DeclarationSource::from_units("/project", units.iter().copied());
        assert!(source.skipped().is_empty(), "{:?}", source.skipped());
        source
    }

    fn prop_types(resolver: &Resolver<'_>, decl: &DeclRef) -> Vec<(String, String)> {
        resolver
            .declared_properties(decl)
            .iter()
            .map(|p| (p.name.clone(), resolver.property_type(p).to_string()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_resolves_primitives_and_library_generics() {
        let source = source(&[(
            "index.ts",
            r#"
import * as pulumi from "@pulumi/pulumi";
interface Args {
    a: string;
    b: number[];
    c: Array<boolean>;
    d: Record<string, number>;
    e: { [key: string]: string };
    f: pulumi.Input<string>;
    g: Readonly<string[]>;
    h?: string | undefined;
    i: "literal";
}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let args = DeclRef::new(0, "Args", DeclKind::Interface);
        assert_eq!(
            prop_types(&resolver, &args),
            pairs(&[
                ("a", "string"),
                ("b", "number[]"),
                ("c", "boolean[]"),
                ("d", "Record<string, number>"),
                ("e", "Record<string, string>"),
                ("f", "Input<string>"),
                ("g", "string[]"),
                ("h", "string | undefined"),
                ("i", "\"literal\""),
            ])
        );
    }

    #[test]
    fn test_expands_aliases_with_type_arguments() {
        let source = source(&[(
            "index.ts",
            r#"
type Tags = Record<string, string>;
type Maybe<T> = T | undefined;
type Pair<A, B = number> = [A, B];
type Shape = { width: number; height: number };
interface Args {
    tags: Tags;
    name: Maybe<string>;
    pair: Pair<string>;
    shape: Shape;
}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let props = resolver.interface_properties(&DeclRef::new(0, "Args", DeclKind::Interface), false);
        let types: Vec<SemanticType> = props.iter().map(|p| resolver.property_type(p)).collect();

        assert_eq!(types[0].to_string(), "Record<string, string>");
        assert_eq!(types[1].to_string(), "string | undefined");
        assert_eq!(types[2].to_string(), "[string, number]");
        assert_eq!(
            types[3],
            SemanticType::Declared(DeclRef::new(0, "Shape", DeclKind::Alias))
        );
    }

    #[test]
    fn test_recursive_alias_degrades() {
        let source = source(&[(
            "index.ts",
            "type A = B;\ntype B = A;\ninterface Args { x: A }\n",
        )]);
        let resolver = Resolver::new(&source);
        let props = resolver.interface_properties(&DeclRef::new(0, "Args", DeclKind::Interface), false);
        assert!(matches!(resolver.property_type(&props[0]), SemanticType::Unresolved(_)));
    }

    #[test]
    fn test_enums_map_to_their_value_type() {
        let source = source(&[(
            "index.ts",
            r#"
enum Color { Red = "red", Green = "green" }
enum Level { Low, High }
interface Args { color: Color; level: Level }
"#,
        )]);
        let resolver = Resolver::new(&source);
        let args = DeclRef::new(0, "Args", DeclKind::Interface);
        assert_eq!(
            prop_types(&resolver, &args),
            pairs(&[("color", "string"), ("level", "number")])
        );
    }

    #[test]
    fn test_follows_imports_and_reexports() {
        let source = source(&[
            (
                "index.ts",
                r#"
import { Settings } from "./lib";
import * as lib from "./lib";
import { Output as Out } from "@pulumi/pulumi";
interface Args {
    settings: Settings;
    nested: lib.Settings;
    out: Out<string>;
}
"#,
            ),
            ("lib/index.ts", "export * from \"./settings\";\n"),
            (
                "lib/settings.ts",
                "export interface Settings { verbose: boolean }\n",
            ),
        ]);
        let resolver = Resolver::new(&source);
        let props = resolver.interface_properties(&DeclRef::new(0, "Args", DeclKind::Interface), false);
        let settings = DeclRef::new(2, "Settings", DeclKind::Interface);

        assert_eq!(
            resolver.property_type(&props[0]),
            SemanticType::Declared(settings.clone())
        );
        assert_eq!(resolver.property_type(&props[1]), SemanticType::Declared(settings));
        let out = resolver.property_type(&props[2]);
        assert_eq!(out.to_string(), "Output<string>");
        assert!(out.unwrap_generic(&["Output"]).is_some());
    }

    #[test]
    fn test_class_properties_order_and_filtering() {
        let source = source(&[(
            "index.ts",
            r#"
class Base {
    public readonly inherited: string;
    public readonly shadowed: number;
}
class Widget extends Base {
    /** The URL. */
    public readonly url: string;
    static count: number;
    #secret: string;
    constructor(public readonly region: string, name: string) {
        super();
    }
    get size(): number { return 1; }
    set size(value: number) {}
    method(): void {}
    public readonly shadowed: number;
}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let widget = DeclRef::new(0, "Widget", DeclKind::Class);
        let names: Vec<String> = resolver
            .class_properties(&widget)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["url", "region", "size", "shadowed", "inherited"]);

        let props = resolver.class_properties(&widget);
        assert_eq!(props[0].doc, Some("The URL."));
        assert_eq!(props[4].owner, DeclRef::new(0, "Base", DeclKind::Class));
    }

    #[test]
    fn test_interface_inheritance_and_merging() {
        let source = source(&[(
            "index.ts",
            r#"
interface Base { base: string }
interface Args extends Base { own: number }
interface Args { merged: boolean }
"#,
        )]);
        let resolver = Resolver::new(&source);
        let args = DeclRef::new(0, "Args", DeclKind::Interface);
        let own: Vec<String> = resolver
            .interface_properties(&args, false)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(own, vec!["own", "merged"]);

        let all: Vec<String> = resolver
            .interface_properties(&args, true)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(all, vec!["own", "merged", "base"]);
    }

    #[test]
    fn test_namespace_lookup_prefers_enclosing_namespace() {
        let source = source(&[(
            "index.ts",
            r#"
interface Options { top: string }
namespace storage {
    export interface Options { inner: number }
    export class Bucket {
        public readonly options: Options;
    }
}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let bucket = DeclRef::new(0, "storage.Bucket", DeclKind::Class);
        let props = resolver.class_properties(&bucket);
        assert_eq!(
            resolver.property_type(&props[0]),
            SemanticType::Declared(DeclRef::new(0, "storage.Options", DeclKind::Interface))
        );
        assert_eq!(
            resolver.find_interface(0, "storage", "Options"),
            Some(DeclRef::new(0, "storage.Options", DeclKind::Interface))
        );
        assert_eq!(
            resolver.find_interface(0, "", "Options"),
            Some(DeclRef::new(0, "Options", DeclKind::Interface))
        );
    }

    #[test]
    fn test_base_class_resolution() {
        let source = source(&[(
            "index.ts",
            r#"
import * as pulumi from "@pulumi/pulumi";
import { ComponentResource } from "@pulumi/pulumi";
class A extends pulumi.ComponentResource {}
class B extends A {}
class C extends ComponentResource {}
class D extends mixin(A) {}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let class = |name: &str| DeclRef::new(0, name, DeclKind::Class);

        match resolver.base_class(&class("A")) {
            Some(BaseClass::External(name)) => assert_eq!(name.to_string(), "pulumi.ComponentResource"),
            other => panic!("unexpected base: {:?}", other),
        }
        assert_eq!(resolver.base_class(&class("B")), Some(BaseClass::Local(class("A"))));
        match resolver.base_class(&class("C")) {
            Some(BaseClass::External(name)) => assert_eq!(name.last(), "ComponentResource"),
            other => panic!("unexpected base: {:?}", other),
        }
        assert!(matches!(resolver.base_class(&class("D")), Some(BaseClass::Unknown(_))));
    }

    #[test]
    fn test_indexed_access_and_operators() {
        let source = source(&[(
            "index.ts",
            r#"
interface Shape { width: number }
interface Args {
    width: Shape["width"];
    key: keyof Shape;
    label: `prefix-${string}`;
    callback: (x: number) => void;
}
"#,
        )]);
        let resolver = Resolver::new(&source);
        let args = DeclRef::new(0, "Args", DeclKind::Interface);
        let types = prop_types(&resolver, &args);
        assert_eq!(types[0].1, "number");
        assert_eq!(types[1].1, "string");
        assert_eq!(types[2].1, "string");
        assert!(types[3].1.contains("=>"));
    }
}
