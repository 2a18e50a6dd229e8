//! Component Source Parser
//!
//! Reads the declarations of a TypeScript component project:
//! - **Lexer / parser**: declaration-level AST (`token`, `lexer`, `ast`, `parser`)
//! - **Source**: project scanning with `tsconfig.json` filters (`source`)
//! - **Checker**: name lookup and type resolution across units (`checker`)

#![warn(rust_2018_idioms)]

pub mod ast;
pub mod checker;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

pub use checker::{BaseClass, DeclKind, DeclRef, Primitive, PropertyInfo, Resolver, SemanticType};
pub use lexer::{LexError, Lexer};
pub use parser::{parse_module, ParseError, ParseErrorKind, Parser};
pub use source::{DeclarationSource, SkippedUnit, SourceError, SourceUnit, TsConfig, UnitId};
pub use token::{Span, Token};
