//! Type annotation AST nodes
//!
//! Covers the type grammar that appears in component declarations:
//! keyword types, (qualified) references with type arguments, arrays,
//! tuples, unions, intersections, literal types, object types, function
//! types. Constructs the schema never inspects (conditional and mapped
//! types, `infer`, import types) are kept as raw source text.

use super::{Identifier, Parameter};
use crate::token::Span;
use std::fmt;

/// Type annotation (compile-time type)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub ty: Type,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(ty: Type, span: Span) -> Self {
        Self { ty, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `string`, `number`, `boolean`, `any`, ...
    Keyword(KeywordType),

    /// `Foo`, `pulumi.Output<string>`
    Reference(TypeReference),

    /// `T[]`
    Array(Box<TypeAnnotation>),

    /// `[string, number]`
    Tuple(Vec<TypeAnnotation>),

    /// `A | B`
    Union(Vec<TypeAnnotation>),

    /// `A & B`
    Intersection(Vec<TypeAnnotation>),

    /// `"literal"`, `42`, `true`
    Literal(LiteralType),

    /// `{ a: string; [key: string]: number }`
    Object(ObjectType),

    /// `(x: number) => string`
    Function(FunctionType),

    /// `(T)`
    Parenthesized(Box<TypeAnnotation>),

    /// `typeof value`
    Query(QualifiedName),

    /// `keyof T`, `readonly T[]`, `unique symbol`
    Operator(TypeOperator, Box<TypeAnnotation>),

    /// `T["key"]`
    IndexedAccess(Box<TypeAnnotation>, Box<TypeAnnotation>),

    /// `this`
    This,

    /// Anything kept as source text (conditional, mapped, template types)
    Raw(String),
}

/// Built-in keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordType {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
}

impl KeywordType {
    /// Keyword type named by an identifier, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        let kw = match name {
            "string" => KeywordType::String,
            "number" => KeywordType::Number,
            "boolean" => KeywordType::Boolean,
            "bigint" => KeywordType::BigInt,
            "symbol" => KeywordType::Symbol,
            "object" => KeywordType::Object,
            "any" => KeywordType::Any,
            "unknown" => KeywordType::Unknown,
            "never" => KeywordType::Never,
            "undefined" => KeywordType::Undefined,
            _ => return None,
        };
        Some(kw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeywordType::String => "string",
            KeywordType::Number => "number",
            KeywordType::Boolean => "boolean",
            KeywordType::BigInt => "bigint",
            KeywordType::Symbol => "symbol",
            KeywordType::Object => "object",
            KeywordType::Any => "any",
            KeywordType::Unknown => "unknown",
            KeywordType::Never => "never",
            KeywordType::Void => "void",
            KeywordType::Null => "null",
            KeywordType::Undefined => "undefined",
        }
    }
}

/// Dotted name: `pulumi.Output`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub segments: Vec<String>,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Rightmost segment: `Output` for `pulumi.Output`
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Type reference: `Point`, `Map<K, V>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    pub name: QualifiedName,
    pub type_args: Vec<TypeAnnotation>,
}

impl TypeReference {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: QualifiedName::simple(name),
            type_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Object type literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub members: Vec<TypeMember>,
}

/// Member of an interface body or object type literal
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMember {
    Property(PropertySignature),
    Method(MethodSignature),
    Index(IndexSignature),
    /// Call or construct signature
    Call(FunctionType),
}

/// `readonly name?: T`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub doc: Option<String>,
    pub name: Identifier,
    pub optional: bool,
    pub readonly: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub span: Span,
}

/// `name?(x: T): R`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: Identifier,
    pub optional: bool,
    pub signature: FunctionType,
}

/// `[key: string]: T`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_name: String,
    pub key_type: TypeAnnotation,
    pub value_type: TypeAnnotation,
    pub readonly: bool,
}

/// Function type: `(x: number, y: string) => number`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub is_constructor: bool,
    pub params: Vec<Parameter>,
    pub return_type: Option<Box<TypeAnnotation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    Keyof,
    Readonly,
    Unique,
}

impl TypeOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "keyof" => Some(TypeOperator::Keyof),
            "readonly" => Some(TypeOperator::Readonly),
            "unique" => Some(TypeOperator::Unique),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeOperator::Keyof => "keyof",
            TypeOperator::Readonly => "readonly",
            TypeOperator::Unique => "unique",
        }
    }
}

// ============================================================================
// Printing
// ============================================================================

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeAnnotation], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Keyword(kw) => write!(f, "{}", kw.name()),
            Type::Reference(reference) => {
                write!(f, "{}", reference.name)?;
                if !reference.type_args.is_empty() {
                    write!(f, "<")?;
                    write_joined(f, &reference.type_args, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Array(elem) => match elem.ty {
                Type::Union(_) | Type::Intersection(_) | Type::Function(_) => {
                    write!(f, "({})[]", elem)
                }
                _ => write!(f, "{}[]", elem),
            },
            Type::Tuple(elems) => {
                write!(f, "[")?;
                write_joined(f, elems, ", ")?;
                write!(f, "]")
            }
            Type::Union(members) => write_joined(f, members, " | "),
            Type::Intersection(members) => write_joined(f, members, " & "),
            Type::Literal(LiteralType::String(s)) => write!(f, "\"{}\"", s),
            Type::Literal(LiteralType::Number(n)) => write!(f, "{}", n),
            Type::Literal(LiteralType::Boolean(b)) => write!(f, "{}", b),
            Type::Object(obj) => {
                if obj.members.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for member in &obj.members {
                    match member {
                        TypeMember::Property(prop) => {
                            if prop.readonly {
                                write!(f, "readonly ")?;
                            }
                            write!(f, "{}", prop.name.name)?;
                            if prop.optional {
                                write!(f, "?")?;
                            }
                            match &prop.type_annotation {
                                Some(ty) => write!(f, ": {}; ", ty)?,
                                None => write!(f, ": any; ")?,
                            }
                        }
                        TypeMember::Method(method) => {
                            write!(f, "{}{}", method.name.name, if method.optional { "?" } else { "" })?;
                            write_signature(f, &method.signature, ": ")?;
                            write!(f, "; ")?;
                        }
                        TypeMember::Index(index) => {
                            write!(
                                f,
                                "[{}: {}]: {}; ",
                                index.key_name, index.key_type, index.value_type
                            )?;
                        }
                        TypeMember::Call(sig) => {
                            write_signature(f, sig, ": ")?;
                            write!(f, "; ")?;
                        }
                    }
                }
                write!(f, "}}")
            }
            Type::Function(func) => {
                if func.is_constructor {
                    write!(f, "new ")?;
                }
                write_signature(f, func, " => ")
            }
            Type::Parenthesized(inner) => write!(f, "({})", inner),
            Type::Query(name) => write!(f, "typeof {}", name),
            Type::Operator(op, operand) => write!(f, "{} {}", op.name(), operand),
            Type::IndexedAccess(object, index) => write!(f, "{}[{}]", object, index),
            Type::This => write!(f, "this"),
            Type::Raw(text) => write!(f, "{}", text),
        }
    }
}

fn write_signature(f: &mut fmt::Formatter<'_>, sig: &FunctionType, arrow: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, param) in sig.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if param.rest {
            write!(f, "...")?;
        }
        write!(f, "{}", param.name.name)?;
        if param.optional {
            write!(f, "?")?;
        }
        if let Some(ty) = &param.type_annotation {
            write!(f, ": {}", ty)?;
        }
    }
    write!(f, ")")?;
    match &sig.return_type {
        Some(ret) => write!(f, "{}{}", arrow, ret),
        None => write!(f, "{}any", arrow),
    }
}
