//! Declaration-level AST.
//!
//! Only the declarations that shape a component's schema are modeled in
//! detail. Statements, function bodies and initializers are skipped by the
//! parser and surface as [`Item::Other`].

pub mod types;

pub use types::*;

use crate::token::Span;

/// Parsed source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub items: Vec<Item>,
    pub span: Span,
}

impl Module {
    pub fn new(items: Vec<Item>, span: Span) -> Self {
        Self { items, span }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the unit declares nothing but types (no classes, no
    /// executable statements).
    pub fn is_declaration_only(&self) -> bool {
        self.items.iter().all(|item| match item {
            Item::Import(_)
            | Item::Interface(_)
            | Item::TypeAlias(_)
            | Item::Export(_) => true,
            Item::Namespace(ns) => ns.is_ambient,
            Item::Class(class) => class.is_ambient,
            Item::Enum(_) | Item::Other(_) => false,
        })
    }
}

/// Top-level (or namespace-level) item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Import(ImportDecl),
    Export(ExportDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Namespace(NamespaceDecl),
    /// A statement the declaration parser skips over
    Other(Span),
}

impl Item {
    pub fn span(&self) -> &Span {
        match self {
            Item::Import(decl) => &decl.span,
            Item::Export(decl) => decl.span(),
            Item::Class(decl) => &decl.span,
            Item::Interface(decl) => &decl.span,
            Item::TypeAlias(decl) => &decl.span,
            Item::Enum(decl) => &decl.span,
            Item::Namespace(decl) => &decl.span,
            Item::Other(span) => span,
        }
    }
}

/// Identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Generic type parameter: `T extends Base = Default`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Identifier,
    pub constraint: Option<TypeAnnotation>,
    pub default: Option<TypeAnnotation>,
}

// ============================================================================
// Imports / Exports
// ============================================================================

/// Import declaration
///
/// ```text
/// import * as pulumi from "@pulumi/pulumi";
/// import { Bucket, Table as T } from "./storage";
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import { foo }` or `import { foo as bar }`
    Named { name: String, alias: Option<String> },
    /// `import * as foo`
    Namespace(String),
    /// `import foo`
    Default(String),
}

impl ImportSpecifier {
    /// Name the import is bound to inside the importing unit.
    pub fn local_name(&self) -> &str {
        match self {
            ImportSpecifier::Named { name, alias } => alias.as_deref().unwrap_or(name),
            ImportSpecifier::Namespace(local) | ImportSpecifier::Default(local) => local,
        }
    }
}

/// Export declaration that is not itself a declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export { a, b as c };` or `export { a } from "./x";`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        span: Span,
    },
    /// `export * from "./x";`
    All { source: String, span: Span },
}

impl ExportDecl {
    pub fn span(&self) -> &Span {
        match self {
            ExportDecl::Named { span, .. } => span,
            ExportDecl::All { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

impl ExportSpecifier {
    /// Name visible to importers.
    pub fn exported_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Heritage clause entry: `extends pulumi.ComponentResource<T>`
#[derive(Debug, Clone, PartialEq)]
pub struct HeritageClause {
    /// Source text of the heritage expression, without type arguments
    pub expression: String,
    /// The expression read as a type reference, when it is a plain
    /// (possibly qualified) name
    pub reference: Option<TypeReference>,
    pub span: Span,
}

/// Class declaration
///
/// ```text
/// export class StaticPage extends pulumi.ComponentResource {
///     public readonly endpoint: pulumi.Output<string>;
///     constructor(name: string, args: StaticPageArgs) { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub doc: Option<String>,
    pub exported: bool,
    pub is_default: bool,
    pub is_abstract: bool,
    /// Declared with `declare`
    pub is_ambient: bool,
    pub name: Identifier,
    pub type_params: Vec<TypeParameter>,
    pub extends: Option<HeritageClause>,
    pub implements: Vec<HeritageClause>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    /// All heritage clauses, `extends` first.
    pub fn heritage(&self) -> impl Iterator<Item = &HeritageClause> {
        self.extends.iter().chain(self.implements.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Property(PropertyDecl),
    Method(MethodDecl),
    Accessor(AccessorDecl),
    Constructor(ConstructorDecl),
    Index(IndexSignature),
}

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Private,
    Protected,
    #[default]
    Public,
}

/// Member modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub explicit_visibility: bool,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_abstract: bool,
    pub is_declare: bool,
    pub is_override: bool,
}

/// Field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub doc: Option<String>,
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub optional: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub has_initializer: bool,
    pub span: Span,
}

/// Method declaration (body skipped)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub doc: Option<String>,
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub optional: bool,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// `get name(): T { ... }` / `set name(v: T) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDecl {
    pub doc: Option<String>,
    pub kind: AccessorKind,
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub span: Span,
}

/// Constructor declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub params: Vec<Parameter>,
    pub span: Span,
}

/// Function or constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub doc: Option<String>,
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub optional: bool,
    pub rest: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub has_default: bool,
}

impl Parameter {
    /// Constructor parameters with a visibility or `readonly` modifier also
    /// declare an instance property.
    pub fn is_parameter_property(&self) -> bool {
        self.modifiers.explicit_visibility || self.modifiers.is_readonly
    }
}

// ============================================================================
// Interfaces / type aliases / enums / namespaces
// ============================================================================

/// Interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub doc: Option<String>,
    pub exported: bool,
    pub name: Identifier,
    pub type_params: Vec<TypeParameter>,
    pub extends: Vec<TypeAnnotation>,
    pub members: Vec<TypeMember>,
    pub span: Span,
}

impl InterfaceDecl {
    /// Property signatures in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertySignature> {
        self.members.iter().filter_map(|member| match member {
            TypeMember::Property(prop) => Some(prop),
            _ => None,
        })
    }
}

/// Type alias: `type Tags = Record<string, string>;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub doc: Option<String>,
    pub exported: bool,
    pub name: Identifier,
    pub type_params: Vec<TypeParameter>,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub doc: Option<String>,
    pub exported: bool,
    pub is_const: bool,
    pub name: Identifier,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    /// String initializer, when the member has one
    pub string_value: Option<String>,
}

/// `namespace a.b { ... }` or `declare module "x" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub exported: bool,
    pub is_ambient: bool,
    pub name: String,
    pub items: Vec<Item>,
    pub span: Span,
}
