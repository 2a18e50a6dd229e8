//! Declaration parsing: imports, exports, classes, interfaces, type
//! aliases, enums and namespaces.

use super::recovery::{skip_balanced, skip_expression, skip_statement};
use super::types::{
    is_member_name_start, parse_qualified_name, parse_return_type, parse_type_annotation,
    parse_type_arguments, parse_type_members, parse_type_parameters, parse_type_reference,
};
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::{Span, Token};

/// Prefix state collected before the declaration keyword.
#[derive(Debug, Default)]
struct DeclContext {
    doc: Option<String>,
    exported: bool,
    is_default: bool,
    is_ambient: bool,
    is_abstract: bool,
}

/// Parse one top-level or namespace-level item.
pub fn parse_item(parser: &mut Parser<'_>) -> Result<Item, ParseError> {
    let start = parser.current_span();
    let mut ctx = DeclContext {
        doc: parser.leading_doc(),
        ..DeclContext::default()
    };

    if parser.check(&Token::Export) {
        if let Some(item) = parse_export_clause(parser, start)? {
            return Ok(item);
        }
        ctx.exported = true;
        ctx.is_default = parser.eat(&Token::Default);
    }

    if parser.check_ident("declare") && starts_ambient_declaration(parser.peek()) {
        parser.advance();
        ctx.is_ambient = true;
    }

    if parser.check_ident("abstract") && matches!(parser.peek(), Some(Token::Class)) {
        parser.advance();
        ctx.is_abstract = true;
    }

    let current = parser.current().clone();
    match &current {
        Token::Class => return parse_class(parser, ctx, start).map(Item::Class),
        Token::Interface => return parse_interface(parser, ctx, start).map(Item::Interface),
        Token::Enum => return parse_enum(parser, ctx, false, start).map(Item::Enum),
        Token::Const if matches!(parser.peek(), Some(Token::Enum)) => {
            parser.advance();
            return parse_enum(parser, ctx, true, start).map(Item::Enum);
        }
        Token::Import
            if !ctx.exported
                && !matches!(parser.peek(), Some(Token::LeftParen) | Some(Token::Dot)) =>
        {
            return parse_import(parser, start);
        }
        Token::Identifier(word) => {
            let next = parser.peek();
            match word.as_str() {
                "type" if !ctx.is_default && matches!(next, Some(Token::Identifier(_))) => {
                    return parse_type_alias(parser, ctx, start).map(Item::TypeAlias);
                }
                "namespace" | "module"
                    if matches!(next, Some(Token::Identifier(_)) | Some(Token::StringLiteral(_))) =>
                {
                    return parse_namespace(parser, ctx, start).map(Item::Namespace);
                }
                "global" if ctx.is_ambient && matches!(next, Some(Token::LeftBrace)) => {
                    return parse_namespace(parser, ctx, start).map(Item::Namespace);
                }
                _ => {}
            }
        }
        _ => {}
    }

    skip_statement(parser)?;
    Ok(Item::Other(parser.span_from(&start)))
}

fn starts_ambient_declaration(token: Option<&Token>) -> bool {
    match token {
        Some(Token::Class)
        | Some(Token::Interface)
        | Some(Token::Enum)
        | Some(Token::Const)
        | Some(Token::Let)
        | Some(Token::Var)
        | Some(Token::Function) => true,
        Some(Token::Identifier(word)) => matches!(
            word.as_str(),
            "namespace" | "module" | "global" | "abstract" | "type" | "async"
        ),
        _ => false,
    }
}

// ============================================================================
// Imports / Exports
// ============================================================================

fn parse_import(parser: &mut Parser<'_>, start: Span) -> Result<Item, ParseError> {
    parser.expect(Token::Import)?;

    // Side-effect import: `import "./polyfill";`
    if let Token::StringLiteral(source) = parser.current().clone() {
        parser.advance();
        skip_import_attributes(parser)?;
        parser.eat(&Token::Semicolon);
        return Ok(Item::Import(ImportDecl {
            specifiers: Vec::new(),
            source,
            type_only: false,
            span: parser.span_from(&start),
        }));
    }

    let type_only = parser.check_ident("type")
        && match parser.peek() {
            Some(Token::LeftBrace) => true,
            Some(Token::Operator(op)) => op == "*",
            Some(Token::Identifier(word)) => word != "from",
            _ => false,
        };
    if type_only {
        parser.advance();
    }

    let mut specifiers = Vec::new();

    if let Token::Identifier(name) = parser.current().clone() {
        parser.advance();
        // `import fs = require("fs");` or `import Alias = Ns.Member;`
        if parser.check(&Token::Equal) {
            skip_statement(parser)?;
            return Ok(Item::Other(parser.span_from(&start)));
        }
        specifiers.push(ImportSpecifier::Default(name));
        parser.eat(&Token::Comma);
    }

    if matches!(parser.current(), Token::Operator(op) if op == "*") {
        parser.advance();
        if !parser.eat_ident("as") {
            return Err(parser.unexpected_token(&[Token::Identifier("as".into())]));
        }
        specifiers.push(ImportSpecifier::Namespace(parser.expect_identifier()?.name));
    } else if parser.eat(&Token::LeftBrace) {
        while !parser.check(&Token::RightBrace) {
            if parser.check_ident("type") && is_specifier_after_type(parser.peek()) {
                parser.advance();
            }
            let name = parser.expect_property_name()?.name;
            let alias = if parser.eat_ident("as") {
                Some(parser.expect_property_name()?.name)
            } else {
                None
            };
            specifiers.push(ImportSpecifier::Named { name, alias });
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
        parser.expect(Token::RightBrace)?;
    }

    if !parser.eat_ident("from") {
        return Err(parser.unexpected_token(&[Token::Identifier("from".into())]));
    }
    let source = expect_string(parser)?;
    skip_import_attributes(parser)?;
    parser.eat(&Token::Semicolon);

    Ok(Item::Import(ImportDecl {
        specifiers,
        source,
        type_only,
        span: parser.span_from(&start),
    }))
}

/// `type` inside `{ }` is a modifier when a specifier name follows it.
fn is_specifier_after_type(token: Option<&Token>) -> bool {
    match token {
        Some(Token::Comma) | Some(Token::RightBrace) => false,
        Some(tok) => !tok.is_ident("as") && tok.property_name().is_some(),
        None => false,
    }
}

/// `with { type: "json" }` / `assert { ... }`
fn skip_import_attributes(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    if (parser.check_ident("with") || parser.check_ident("assert"))
        && matches!(parser.peek(), Some(Token::LeftBrace))
        && !parser.newline_before()
    {
        parser.advance();
        skip_balanced(parser)?;
    }
    Ok(())
}

fn expect_string(parser: &mut Parser<'_>) -> Result<String, ParseError> {
    match parser.current().clone() {
        Token::StringLiteral(s) => {
            parser.advance();
            Ok(s)
        }
        _ => Err(parser.unexpected_token(&[Token::StringLiteral(String::new())])),
    }
}

/// Export forms that are not followed by a declaration. Returns `None`
/// (with `export` consumed) when a declaration follows.
fn parse_export_clause(parser: &mut Parser<'_>, start: Span) -> Result<Option<Item>, ParseError> {
    let next = parser.peek().cloned();
    match next {
        Some(Token::LeftBrace) => {
            parser.advance();
            parse_named_export(parser, start).map(Some)
        }
        Some(Token::Identifier(word))
            if word == "type" && matches!(parser.peek_nth(2), Some(Token::LeftBrace)) =>
        {
            parser.advance();
            parser.advance();
            parse_named_export(parser, start).map(Some)
        }
        Some(Token::Operator(op)) if op == "*" => {
            parser.advance();
            parser.advance();
            let alias = if parser.eat_ident("as") {
                Some(parser.expect_property_name()?.name)
            } else {
                None
            };
            if !parser.eat_ident("from") {
                return Err(parser.unexpected_token(&[Token::Identifier("from".into())]));
            }
            let source = expect_string(parser)?;
            skip_import_attributes(parser)?;
            parser.eat(&Token::Semicolon);
            let span = parser.span_from(&start);
            let decl = match alias {
                Some(alias) => ExportDecl::Named {
                    specifiers: vec![ExportSpecifier {
                        name: "*".to_string(),
                        alias: Some(alias),
                    }],
                    source: Some(source),
                    span,
                },
                None => ExportDecl::All { source, span },
            };
            Ok(Some(Item::Export(decl)))
        }
        // `export = x;`, `export import a = b.c;`, `export as namespace X;`
        Some(Token::Equal) | Some(Token::Import) => {
            parser.advance();
            skip_statement(parser)?;
            Ok(Some(Item::Other(parser.span_from(&start))))
        }
        Some(Token::Identifier(word)) if word == "as" => {
            parser.advance();
            skip_statement(parser)?;
            Ok(Some(Item::Other(parser.span_from(&start))))
        }
        _ => {
            parser.advance();
            Ok(None)
        }
    }
}

fn parse_named_export(parser: &mut Parser<'_>, start: Span) -> Result<Item, ParseError> {
    parser.expect(Token::LeftBrace)?;
    let mut specifiers = Vec::new();

    while !parser.check(&Token::RightBrace) {
        if parser.check_ident("type") && is_specifier_after_type(parser.peek()) {
            parser.advance();
        }
        let name = parser.expect_property_name()?.name;
        let alias = if parser.eat_ident("as") {
            Some(parser.expect_property_name()?.name)
        } else {
            None
        };
        specifiers.push(ExportSpecifier { name, alias });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;

    let source = if parser.eat_ident("from") {
        Some(expect_string(parser)?)
    } else {
        None
    };
    skip_import_attributes(parser)?;
    parser.eat(&Token::Semicolon);

    Ok(Item::Export(ExportDecl::Named {
        specifiers,
        source,
        span: parser.span_from(&start),
    }))
}

// ============================================================================
// Classes
// ============================================================================

fn parse_class(parser: &mut Parser<'_>, ctx: DeclContext, start: Span) -> Result<ClassDecl, ParseError> {
    let class_span = parser.current_span();
    parser.expect(Token::Class)?;

    let name = match parser.current() {
        Token::Identifier(_) => parser.expect_identifier()?,
        _ if ctx.is_default => Identifier::new("default", class_span),
        _ => {
            return Err(ParseError::invalid_syntax("class name required", parser.current_span())
                .with_suggestion("add a name after 'class'"))
        }
    };

    let type_params = if parser.check(&Token::Less) {
        parse_type_parameters(parser)?
    } else {
        Vec::new()
    };

    let extends = if parser.eat(&Token::Extends) {
        Some(parse_heritage_clause(parser)?)
    } else {
        None
    };

    let mut implements = Vec::new();
    if parser.eat(&Token::Implements) {
        loop {
            implements.push(parse_heritage_clause(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::LeftBrace)?;
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) {
        if parser.at_eof() {
            return Err(ParseError::unclosed_delimiter(Token::LeftBrace, class_span));
        }
        if parser.eat(&Token::Semicolon) {
            continue;
        }
        if let Some(member) = parse_class_member(parser)? {
            members.push(member);
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(ClassDecl {
        doc: ctx.doc,
        exported: ctx.exported,
        is_default: ctx.is_default,
        is_abstract: ctx.is_abstract,
        is_ambient: ctx.is_ambient,
        name,
        type_params,
        extends,
        implements,
        members,
        span: parser.span_from(&start),
    })
}

/// One entry of an `extends` / `implements` clause.
///
/// Plain (possibly qualified) names with type arguments are read as type
/// references. Anything else (`mixin(Base)`) is kept as source text.
fn parse_heritage_clause(parser: &mut Parser<'_>) -> Result<HeritageClause, ParseError> {
    let start = parser.current_span();
    let resume = parser.pos;

    if matches!(parser.current(), Token::Identifier(_)) {
        let name = parse_qualified_name(parser)?;
        let type_args = if parser.check(&Token::Less) {
            parse_type_arguments(parser)?
        } else {
            Vec::new()
        };
        if parser.check_any(&[Token::LeftBrace, Token::Comma, Token::Implements]) {
            return Ok(HeritageClause {
                expression: name.to_string(),
                reference: Some(TypeReference { name, type_args }),
                span: parser.span_from(&start),
            });
        }
        parser.pos = resume;
    }

    let mut depth = 0usize;
    while !parser.at_eof() {
        if depth == 0 && parser.check_any(&[Token::LeftBrace, Token::Comma, Token::Implements]) {
            break;
        }
        match parser.current() {
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        parser.advance();
    }

    let span = parser.span_from(&start);
    if span.start == span.end || parser.pos == resume {
        return Err(ParseError::invalid_syntax("empty heritage clause", start));
    }
    Ok(HeritageClause {
        expression: parser.slice(span.start, span.end).to_string(),
        reference: None,
        span,
    })
}

fn parse_class_member(parser: &mut Parser<'_>) -> Result<Option<ClassMember>, ParseError> {
    let doc = parser.leading_doc();
    let start = parser.current_span();

    skip_decorators(parser)?;

    // `static { ... }` initialization block
    if parser.check_ident("static") && matches!(parser.peek(), Some(Token::LeftBrace)) {
        parser.advance();
        skip_balanced(parser)?;
        return Ok(None);
    }

    let modifiers = parse_modifiers(parser);

    // Accessors
    if (parser.check_ident("get") || parser.check_ident("set"))
        && is_member_name_start(parser.peek())
    {
        let kind = if parser.check_ident("get") {
            AccessorKind::Get
        } else {
            AccessorKind::Set
        };
        parser.advance();
        let name = parse_member_name(parser)?;
        let params = parse_parameters(parser)?;
        let return_type = if parser.eat(&Token::Colon) {
            Some(parse_return_type(parser)?)
        } else {
            None
        };
        skip_body(parser)?;
        return Ok(name.map(|name| {
            ClassMember::Accessor(AccessorDecl {
                doc,
                kind,
                modifiers,
                name,
                params,
                return_type,
                span: parser.span_from(&start),
            })
        }));
    }

    // Constructor
    if (parser.check_ident("constructor")
        || matches!(parser.current(), Token::StringLiteral(s) if s == "constructor"))
        && matches!(parser.peek(), Some(Token::LeftParen))
    {
        parser.advance();
        let params = parse_parameters(parser)?;
        skip_body(parser)?;
        return Ok(Some(ClassMember::Constructor(ConstructorDecl {
            params,
            span: parser.span_from(&start),
        })));
    }

    // Index signature
    if parser.check(&Token::LeftBracket)
        && matches!(parser.peek(), Some(Token::Identifier(_)))
        && matches!(parser.peek_nth(2), Some(Token::Colon))
    {
        parser.advance();
        let key_name = parser.expect_identifier()?.name;
        parser.expect(Token::Colon)?;
        let key_type = parse_type_annotation(parser)?;
        parser.expect(Token::RightBracket)?;
        parser.expect(Token::Colon)?;
        let value_type = parse_type_annotation(parser)?;
        parser.eat(&Token::Semicolon);
        return Ok(Some(ClassMember::Index(IndexSignature {
            key_name,
            key_type,
            value_type,
            readonly: modifiers.is_readonly,
        })));
    }

    // Generator method
    if matches!(parser.current(), Token::Operator(op) if op == "*") {
        parser.advance();
    }

    let name = parse_member_name(parser)?;
    let optional = parser.eat(&Token::Question);
    parser.eat(&Token::Bang);

    if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
        if parser.check(&Token::Less) {
            parse_type_parameters(parser)?;
        }
        let params = parse_parameters(parser)?;
        let return_type = if parser.eat(&Token::Colon) {
            Some(parse_return_type(parser)?)
        } else {
            None
        };
        skip_body(parser)?;
        return Ok(name.map(|name| {
            ClassMember::Method(MethodDecl {
                doc,
                modifiers,
                name,
                optional,
                params,
                return_type,
                span: parser.span_from(&start),
            })
        }));
    }

    let type_annotation = if parser.eat(&Token::Colon) {
        Some(parse_type_annotation(parser)?)
    } else {
        None
    };
    let has_initializer = parser.eat(&Token::Equal);
    if has_initializer {
        skip_expression(parser)?;
    }
    if !parser.eat(&Token::Semicolon) {
        parser.eat(&Token::Comma);
    }

    Ok(name.map(|name| {
        ClassMember::Property(PropertyDecl {
            doc,
            modifiers,
            name,
            optional,
            type_annotation,
            has_initializer,
            span: parser.span_from(&start),
        })
    }))
}

/// Member name. Computed names (`[Symbol.iterator]`) yield `None`.
fn parse_member_name(parser: &mut Parser<'_>) -> Result<Option<Identifier>, ParseError> {
    if parser.check(&Token::Hash) {
        let span = parser.current_span();
        parser.advance();
        let name = parser.expect_property_name()?;
        return Ok(Some(Identifier::new(format!("#{}", name.name), span)));
    }
    if parser.check(&Token::LeftBracket) {
        skip_balanced(parser)?;
        return Ok(None);
    }
    parser.expect_property_name().map(Some)
}

fn parse_modifiers(parser: &mut Parser<'_>) -> Modifiers {
    let mut modifiers = Modifiers::default();

    loop {
        let word = match parser.current() {
            Token::Identifier(word) => word.clone(),
            _ => break,
        };
        if !is_member_name_start(parser.peek()) {
            break;
        }
        match word.as_str() {
            "public" => set_visibility(&mut modifiers, Visibility::Public),
            "private" => set_visibility(&mut modifiers, Visibility::Private),
            "protected" => set_visibility(&mut modifiers, Visibility::Protected),
            "static" => modifiers.is_static = true,
            "readonly" => modifiers.is_readonly = true,
            "abstract" => modifiers.is_abstract = true,
            "declare" => modifiers.is_declare = true,
            "override" => modifiers.is_override = true,
            "async" | "accessor" => {}
            _ => break,
        }
        parser.advance();
    }

    modifiers
}

fn set_visibility(modifiers: &mut Modifiers, visibility: Visibility) {
    modifiers.visibility = visibility;
    modifiers.explicit_visibility = true;
}

fn skip_decorators(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    while parser.eat(&Token::At) {
        if parser.check(&Token::LeftParen) {
            skip_balanced(parser)?;
            continue;
        }
        parse_qualified_name(parser)?;
        if parser.check(&Token::Less) {
            parse_type_arguments(parser)?;
        }
        if parser.check(&Token::LeftParen) {
            skip_balanced(parser)?;
        }
    }
    Ok(())
}

/// Skip a function body, or the `;` ending a body-less signature.
fn skip_body(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    if parser.check(&Token::LeftBrace) {
        skip_balanced(parser)
    } else {
        parser.eat(&Token::Semicolon);
        Ok(())
    }
}

/// Parameter list, including the parentheses.
pub fn parse_parameters(parser: &mut Parser<'_>) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();

    while !parser.check(&Token::RightParen) {
        let doc = parser.leading_doc();
        skip_decorators(parser)?;

        let mut modifiers = Modifiers::default();
        while let Token::Identifier(word) = parser.current().clone() {
            let followed_by_name = matches!(
                parser.peek(),
                Some(Token::Identifier(_))
                    | Some(Token::LeftBrace)
                    | Some(Token::LeftBracket)
                    | Some(Token::DotDotDot)
            );
            if !followed_by_name {
                break;
            }
            match word.as_str() {
                "public" => set_visibility(&mut modifiers, Visibility::Public),
                "private" => set_visibility(&mut modifiers, Visibility::Private),
                "protected" => set_visibility(&mut modifiers, Visibility::Protected),
                "readonly" => modifiers.is_readonly = true,
                "override" => modifiers.is_override = true,
                _ => break,
            }
            parser.advance();
        }

        let rest = parser.eat(&Token::DotDotDot);
        let name = match parser.current() {
            Token::LeftBrace | Token::LeftBracket => {
                let span = parser.current_span();
                skip_balanced(parser)?;
                Identifier::new("__destructured", span)
            }
            Token::This => {
                let span = parser.current_span();
                parser.advance();
                Identifier::new("this", span)
            }
            _ => parser.expect_property_name()?,
        };
        let optional = parser.eat(&Token::Question);
        let type_annotation = if parser.eat(&Token::Colon) {
            Some(parse_type_annotation(parser)?)
        } else {
            None
        };
        let has_default = parser.eat(&Token::Equal);
        if has_default {
            skip_expression(parser)?;
        }

        params.push(Parameter {
            doc,
            modifiers,
            name,
            optional,
            rest,
            type_annotation,
            has_default,
        });

        if !parser.eat(&Token::Comma) {
            break;
        }
    }

    parser.expect(Token::RightParen)?;
    Ok(params)
}

// ============================================================================
// Interfaces / type aliases / enums / namespaces
// ============================================================================

fn parse_interface(
    parser: &mut Parser<'_>,
    ctx: DeclContext,
    start: Span,
) -> Result<InterfaceDecl, ParseError> {
    parser.expect(Token::Interface)?;
    let name = parser.expect_identifier()?;
    let type_params = if parser.check(&Token::Less) {
        parse_type_parameters(parser)?
    } else {
        Vec::new()
    };

    let mut extends = Vec::new();
    if parser.eat(&Token::Extends) {
        loop {
            let ref_start = parser.current_span();
            let reference = parse_type_reference(parser)?;
            extends.push(TypeAnnotation::new(
                Type::Reference(reference),
                parser.span_from(&ref_start),
            ));
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::LeftBrace)?;
    let members = parse_type_members(parser)?;
    parser.expect(Token::RightBrace)?;

    Ok(InterfaceDecl {
        doc: ctx.doc,
        exported: ctx.exported,
        name,
        type_params,
        extends,
        members,
        span: parser.span_from(&start),
    })
}

fn parse_type_alias(
    parser: &mut Parser<'_>,
    ctx: DeclContext,
    start: Span,
) -> Result<TypeAliasDecl, ParseError> {
    parser.advance(); // `type`
    let name = parser.expect_identifier()?;
    let type_params = if parser.check(&Token::Less) {
        parse_type_parameters(parser)?
    } else {
        Vec::new()
    };
    parser.expect(Token::Equal)?;
    let type_annotation = parse_type_annotation(parser)?;
    parser.eat(&Token::Semicolon);

    Ok(TypeAliasDecl {
        doc: ctx.doc,
        exported: ctx.exported,
        name,
        type_params,
        type_annotation,
        span: parser.span_from(&start),
    })
}

fn parse_enum(
    parser: &mut Parser<'_>,
    ctx: DeclContext,
    is_const: bool,
    start: Span,
) -> Result<EnumDecl, ParseError> {
    parser.expect(Token::Enum)?;
    let name = parser.expect_identifier()?;
    parser.expect(Token::LeftBrace)?;

    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) {
        let member_name = parser.expect_property_name()?.name;
        let mut string_value = None;
        if parser.eat(&Token::Equal) {
            match (parser.current().clone(), parser.peek()) {
                (Token::StringLiteral(s), Some(Token::Comma) | Some(Token::RightBrace)) => {
                    parser.advance();
                    string_value = Some(s);
                }
                _ => skip_expression(parser)?,
            }
        }
        members.push(EnumMember {
            name: member_name,
            string_value,
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(EnumDecl {
        doc: ctx.doc,
        exported: ctx.exported,
        is_const,
        name,
        members,
        span: parser.span_from(&start),
    })
}

fn parse_namespace(
    parser: &mut Parser<'_>,
    ctx: DeclContext,
    start: Span,
) -> Result<NamespaceDecl, ParseError> {
    let keyword = parser.advance();
    let name = if keyword.is_ident("global") {
        "global".to_string()
    } else if let Token::StringLiteral(s) = parser.current().clone() {
        parser.advance();
        s
    } else {
        parse_qualified_name(parser)?.to_string()
    };

    let mut items = Vec::new();
    if parser.eat(&Token::LeftBrace) {
        while !parser.check(&Token::RightBrace) {
            if parser.at_eof() {
                return Err(ParseError::unclosed_delimiter(Token::LeftBrace, start));
            }
            if parser.eat(&Token::Semicolon) {
                continue;
            }
            items.push(parse_item(parser)?);
        }
        parser.expect(Token::RightBrace)?;
    } else {
        parser.eat(&Token::Semicolon);
    }

    Ok(NamespaceDecl {
        exported: ctx.exported,
        is_ambient: ctx.is_ambient,
        name,
        items,
        span: parser.span_from(&start),
    })
}
