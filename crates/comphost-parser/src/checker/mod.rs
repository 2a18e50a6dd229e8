//! Lightweight type resolution over a [`DeclarationSource`].
//!
//! The resolver turns written type annotations into [`SemanticType`]s:
//! aliases are expanded, imports are followed across units, well-known
//! library generics (`Array`, `Record`, `Map`) are recognized, and local
//! classes and interfaces become [`SemanticType::Declared`] references.
//! Anything it cannot classify degrades to a textual
//! [`SemanticType::Unresolved`] instead of failing.
//!
//! [`DeclarationSource`]: crate::source::DeclarationSource

mod resolver;
mod scope;

pub use resolver::{BaseClass, PropertyInfo, Resolver};

use crate::ast::{LiteralType, QualifiedName};
use crate::source::UnitId;
use std::fmt;

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
        }
    }
}

/// Kind of a locally declared named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Alias,
    Enum,
}

/// Reference to a named declaration in one unit of the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclRef {
    pub unit: UnitId,
    /// Dotted path for declarations nested in namespaces (`ns.Inner`)
    pub name: String,
    pub kind: DeclKind,
}

impl DeclRef {
    pub fn new(unit: UnitId, name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            unit,
            name: name.into(),
            kind,
        }
    }

    /// Declared name without its namespace path.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Namespace path enclosing the declaration (empty at top level).
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    Primitive(Primitive),
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    /// The `object` type
    Object,
    Literal(LiteralType),
    Array(Box<SemanticType>),
    Tuple(Vec<SemanticType>),
    /// String-keyed dictionary: `Record<string, T>`, `{ [k: string]: T }`
    Map(Box<SemanticType>),
    Union(Vec<SemanticType>),
    Intersection(Vec<SemanticType>),
    /// Application of a name declared outside the source (a dependency
    /// or a global): `pulumi.Output<string>`, `Promise<void>`
    Generic {
        name: QualifiedName,
        args: Vec<SemanticType>,
    },
    /// Local class, interface or object type alias
    Declared(DeclRef),
    /// Anonymous object type, kept as text
    ObjectLiteral(String),
    /// Anything the resolver could not classify, kept as text
    Unresolved(String),
}

impl SemanticType {
    pub fn is_nullish(&self) -> bool {
        matches!(self, SemanticType::Null | SemanticType::Undefined | SemanticType::Void)
    }

    /// The type with `null`/`undefined` members of a union removed.
    pub fn without_nullish(&self) -> SemanticType {
        match self {
            SemanticType::Union(members) => {
                let mut rest: Vec<SemanticType> = members
                    .iter()
                    .filter(|member| !member.is_nullish())
                    .cloned()
                    .collect();
                match rest.len() {
                    0 => self.clone(),
                    1 => rest.remove(0),
                    _ => SemanticType::Union(rest),
                }
            }
            _ => self.clone(),
        }
    }

    /// Argument of a single-argument wrapper whose (last) name is one of
    /// `names`: `Output<T>` / `pulumi.Output<T>` yields `T`.
    pub fn unwrap_generic(&self, names: &[&str]) -> Option<&SemanticType> {
        match self {
            SemanticType::Generic { name, args } if args.len() == 1 && names.contains(&name.last()) => {
                Some(&args[0])
            }
            _ => None,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[SemanticType], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Prints types the way a compiler's type printer does: generic names by
/// their last segment, arrays as `T[]`, dictionaries as `Record<string, T>`.
impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Primitive(p) => write!(f, "{}", p.name()),
            SemanticType::Any => write!(f, "any"),
            SemanticType::Unknown => write!(f, "unknown"),
            SemanticType::Never => write!(f, "never"),
            SemanticType::Void => write!(f, "void"),
            SemanticType::Null => write!(f, "null"),
            SemanticType::Undefined => write!(f, "undefined"),
            SemanticType::Object => write!(f, "object"),
            SemanticType::Literal(LiteralType::String(s)) => write!(f, "\"{}\"", s),
            SemanticType::Literal(LiteralType::Number(n)) => write!(f, "{}", n),
            SemanticType::Literal(LiteralType::Boolean(b)) => write!(f, "{}", b),
            SemanticType::Array(elem) => match elem.as_ref() {
                SemanticType::Union(_) | SemanticType::Intersection(_) => write!(f, "({})[]", elem),
                _ => write!(f, "{}[]", elem),
            },
            SemanticType::Tuple(elems) => {
                write!(f, "[")?;
                write_list(f, elems, ", ")?;
                write!(f, "]")
            }
            SemanticType::Map(value) => write!(f, "Record<string, {}>", value),
            SemanticType::Union(members) => write_list(f, members, " | "),
            SemanticType::Intersection(members) => write_list(f, members, " & "),
            SemanticType::Generic { name, args } => {
                write!(f, "{}", name.last())?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, args, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            SemanticType::Declared(decl) => write!(f, "{}", decl.simple_name()),
            SemanticType::ObjectLiteral(text) | SemanticType::Unresolved(text) => {
                write!(f, "{}", text)
            }
        }
    }
}
