//! Type annotation parsing
//!
//! ```text
//! type         := function_type | conditional
//! conditional  := union ('extends' union '?' type ':' type)?
//! union        := '|'? intersection ('|' intersection)*
//! intersection := '&'? operator ('&' operator)*
//! operator     := ('keyof' | 'readonly' | 'unique') operator | postfix
//! postfix      := primary ('[' ']' | '[' type ']')*
//! ```

use super::recovery::skip_balanced;
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

/// Parse a type annotation.
pub fn parse_type_annotation(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    parse_type(parser, true)
}

/// Parse a type where a conditional type is not allowed (type parameter
/// constraints, where `extends` already has a meaning).
pub fn parse_constraint(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    parse_type(parser, false)
}

fn parse_type(parser: &mut Parser<'_>, allow_conditional: bool) -> Result<TypeAnnotation, ParseError> {
    parser.enter()?;
    let result = parse_type_inner(parser, allow_conditional);
    parser.exit();
    result
}

fn parse_type_inner(
    parser: &mut Parser<'_>,
    allow_conditional: bool,
) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();

    if is_start_of_function_type(parser) {
        return parse_function_type(parser, false);
    }
    if parser.check(&Token::New)
        || (parser.check_ident("abstract") && matches!(parser.peek(), Some(Token::New)))
    {
        parser.eat_ident("abstract");
        parser.advance();
        return parse_function_type(parser, true);
    }

    let check_type = parse_union(parser)?;

    if allow_conditional && parser.check(&Token::Extends) && !parser.newline_before() {
        parser.advance();
        parse_type(parser, false)?;
        parser.expect(Token::Question)?;
        parse_type(parser, true)?;
        parser.expect(Token::Colon)?;
        parse_type(parser, true)?;
        let span = parser.span_from(&start);
        let raw = parser.slice(span.start, span.end).to_string();
        return Ok(TypeAnnotation::new(Type::Raw(raw), span));
    }

    Ok(check_type)
}

fn parse_union(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();
    parser.eat(&Token::Pipe);

    let first = parse_intersection(parser)?;
    if !parser.check(&Token::Pipe) {
        return Ok(first);
    }

    let mut members = vec![first];
    while parser.eat(&Token::Pipe) {
        members.push(parse_intersection(parser)?);
    }
    Ok(TypeAnnotation::new(Type::Union(members), parser.span_from(&start)))
}

fn parse_intersection(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();
    parser.eat(&Token::Amp);

    let first = parse_operator(parser)?;
    if !parser.check(&Token::Amp) {
        return Ok(first);
    }

    let mut members = vec![first];
    while parser.eat(&Token::Amp) {
        members.push(parse_operator(parser)?);
    }
    Ok(TypeAnnotation::new(
        Type::Intersection(members),
        parser.span_from(&start),
    ))
}

fn parse_operator(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();

    if let Token::Identifier(word) = parser.current().clone() {
        if let Some(op) = TypeOperator::from_name(&word) {
            if starts_type(parser.peek()) {
                parser.advance();
                parser.enter()?;
                let operand = parse_operator(parser);
                parser.exit();
                let operand = operand?;
                return Ok(TypeAnnotation::new(
                    Type::Operator(op, Box::new(operand)),
                    parser.span_from(&start),
                ));
            }
        }
        if word == "infer" && matches!(parser.peek(), Some(Token::Identifier(_))) {
            parser.advance();
            parser.advance();
            if parser.check(&Token::Extends) {
                parser.advance();
                parse_constraint(parser)?;
            }
            let span = parser.span_from(&start);
            let raw = parser.slice(span.start, span.end).to_string();
            return Ok(TypeAnnotation::new(Type::Raw(raw), span));
        }
    }

    parse_postfix(parser)
}

fn parse_postfix(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();
    let mut ty = parse_primary(parser)?;

    while parser.check(&Token::LeftBracket) && !parser.newline_before() {
        parser.advance();
        if parser.eat(&Token::RightBracket) {
            ty = TypeAnnotation::new(Type::Array(Box::new(ty)), parser.span_from(&start));
        } else {
            let index = parse_type_annotation(parser)?;
            parser.expect(Token::RightBracket)?;
            ty = TypeAnnotation::new(
                Type::IndexedAccess(Box::new(ty), Box::new(index)),
                parser.span_from(&start),
            );
        }
    }

    Ok(ty)
}

fn parse_primary(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();

    let ty = match parser.current().clone() {
        Token::Identifier(name) => {
            let is_qualified = matches!(parser.peek(), Some(Token::Dot));
            match KeywordType::from_name(&name) {
                Some(kw) if !is_qualified => {
                    parser.advance();
                    Type::Keyword(kw)
                }
                _ => Type::Reference(parse_type_reference(parser)?),
            }
        }
        Token::Void => {
            parser.advance();
            Type::Keyword(KeywordType::Void)
        }
        Token::Null => {
            parser.advance();
            Type::Keyword(KeywordType::Null)
        }
        Token::This => {
            parser.advance();
            Type::This
        }
        Token::StringLiteral(s) => {
            parser.advance();
            Type::Literal(LiteralType::String(s))
        }
        Token::NumberLiteral(n) => {
            parser.advance();
            Type::Literal(LiteralType::Number(n))
        }
        Token::Operator(op) if op == "-" => {
            parser.advance();
            match parser.current().clone() {
                Token::NumberLiteral(n) => {
                    parser.advance();
                    Type::Literal(LiteralType::Number(-n))
                }
                _ => return Err(parser.unexpected_token(&[Token::NumberLiteral(0.0)])),
            }
        }
        Token::True => {
            parser.advance();
            Type::Literal(LiteralType::Boolean(true))
        }
        Token::False => {
            parser.advance();
            Type::Literal(LiteralType::Boolean(false))
        }
        Token::TemplateLiteral(raw) => {
            parser.advance();
            Type::Raw(raw)
        }
        Token::Typeof => {
            parser.advance();
            if parser.check(&Token::Import) {
                return parse_import_type(parser, start);
            }
            Type::Query(parse_qualified_name(parser)?)
        }
        Token::Import => return parse_import_type(parser, start),
        Token::LeftParen => {
            parser.advance();
            let inner = parse_type_annotation(parser)?;
            parser.expect(Token::RightParen)?;
            Type::Parenthesized(Box::new(inner))
        }
        Token::LeftBracket => Type::Tuple(parse_tuple(parser)?),
        Token::LeftBrace => {
            if is_start_of_mapped_type(parser) {
                skip_balanced(parser)?;
                let span = parser.span_from(&start);
                let raw = parser.slice(span.start, span.end).to_string();
                return Ok(TypeAnnotation::new(Type::Raw(raw), span));
            }
            parser.advance();
            let members = parse_type_members(parser)?;
            parser.expect(Token::RightBrace)?;
            Type::Object(ObjectType { members })
        }
        _ => {
            return Err(parser
                .unexpected_token(&[])
                .with_suggestion("expected a type"))
        }
    };

    Ok(TypeAnnotation::new(ty, parser.span_from(&start)))
}

/// `import("./mod").Name<T>`, kept as raw text.
fn parse_import_type(
    parser: &mut Parser<'_>,
    start: crate::token::Span,
) -> Result<TypeAnnotation, ParseError> {
    parser.expect(Token::Import)?;
    skip_balanced(parser)?;
    while parser.eat(&Token::Dot) {
        parser.expect_property_name()?;
    }
    if parser.check(&Token::Less) {
        parse_type_arguments(parser)?;
    }
    let span = parser.span_from(&start);
    let raw = parser.slice(span.start, span.end).to_string();
    Ok(TypeAnnotation::new(Type::Raw(raw), span))
}

/// Dotted name: `a.b.c`
pub fn parse_qualified_name(parser: &mut Parser<'_>) -> Result<QualifiedName, ParseError> {
    let first = parser.expect_identifier()?;
    let mut segments = vec![first.name];
    while parser.check(&Token::Dot) {
        parser.advance();
        segments.push(parser.expect_property_name()?.name);
    }
    Ok(QualifiedName { segments })
}

/// Type reference with optional type arguments: `pulumi.Output<string>`
pub fn parse_type_reference(parser: &mut Parser<'_>) -> Result<TypeReference, ParseError> {
    let name = parse_qualified_name(parser)?;
    let type_args = if parser.check(&Token::Less) && !parser.newline_before() {
        parse_type_arguments(parser)?
    } else {
        Vec::new()
    };
    Ok(TypeReference { name, type_args })
}

/// `<A, B>`
pub fn parse_type_arguments(parser: &mut Parser<'_>) -> Result<Vec<TypeAnnotation>, ParseError> {
    parser.expect(Token::Less)?;
    let mut args = Vec::new();
    while !parser.check(&Token::Greater) {
        args.push(parse_type_annotation(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::Greater)?;
    Ok(args)
}

/// `<T extends Base = Default, U>`
pub fn parse_type_parameters(parser: &mut Parser<'_>) -> Result<Vec<TypeParameter>, ParseError> {
    parser.expect(Token::Less)?;
    let mut params = Vec::new();

    while !parser.check(&Token::Greater) {
        // Variance and const modifiers
        while (parser.check(&Token::Const) || parser.check_ident("in") || parser.check_ident("out"))
            && matches!(parser.peek(), Some(Token::Identifier(_)))
        {
            parser.advance();
        }

        let name = parser.expect_identifier()?;
        let constraint = if parser.eat(&Token::Extends) {
            Some(parse_constraint(parser)?)
        } else {
            None
        };
        let default = if parser.eat(&Token::Equal) {
            Some(parse_type_annotation(parser)?)
        } else {
            None
        };
        params.push(TypeParameter {
            name,
            constraint,
            default,
        });

        if !parser.eat(&Token::Comma) {
            break;
        }
    }

    parser.expect(Token::Greater)?;
    Ok(params)
}

fn parse_tuple(parser: &mut Parser<'_>) -> Result<Vec<TypeAnnotation>, ParseError> {
    parser.expect(Token::LeftBracket)?;
    let mut elems = Vec::new();

    while !parser.check(&Token::RightBracket) {
        parser.eat(&Token::DotDotDot);
        // Named member: `[first: string, rest?: number]`
        if matches!(parser.current(), Token::Identifier(_))
            && matches!(parser.peek(), Some(Token::Colon) | Some(Token::Question))
            && !matches!(parser.peek_nth(2), Some(Token::Comma) | Some(Token::RightBracket))
        {
            parser.advance();
            parser.eat(&Token::Question);
            parser.expect(Token::Colon)?;
        }
        elems.push(parse_type_annotation(parser)?);
        parser.eat(&Token::Question);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }

    parser.expect(Token::RightBracket)?;
    Ok(elems)
}

/// Function or constructor type; `new` has already been consumed.
fn parse_function_type(
    parser: &mut Parser<'_>,
    is_constructor: bool,
) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();
    if parser.check(&Token::Less) {
        parse_type_parameters(parser)?;
    }
    let params = super::decl::parse_parameters(parser)?;
    parser.expect(Token::Arrow)?;
    let return_type = parse_return_type(parser)?;

    Ok(TypeAnnotation::new(
        Type::Function(FunctionType {
            is_constructor,
            params,
            return_type: Some(Box::new(return_type)),
        }),
        parser.span_from(&start),
    ))
}

/// Return type position, where type predicates (`x is T`, `asserts x`) are
/// allowed. Predicates read as `boolean` / `void`.
pub fn parse_return_type(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    let start = parser.current_span();

    if parser.check_ident("asserts")
        && matches!(parser.peek(), Some(Token::Identifier(_)) | Some(Token::This))
    {
        parser.advance();
        parser.advance();
        if parser.eat_ident("is") {
            parse_type_annotation(parser)?;
        }
        return Ok(TypeAnnotation::new(
            Type::Keyword(KeywordType::Void),
            parser.span_from(&start),
        ));
    }

    if matches!(parser.current(), Token::Identifier(_) | Token::This)
        && matches!(parser.peek(), Some(tok) if tok.is_ident("is"))
    {
        parser.advance();
        parser.advance();
        parse_type_annotation(parser)?;
        return Ok(TypeAnnotation::new(
            Type::Keyword(KeywordType::Boolean),
            parser.span_from(&start),
        ));
    }

    parse_type_annotation(parser)
}

/// Members of an interface body or object type literal, up to (not
/// including) the closing `}`.
pub fn parse_type_members(parser: &mut Parser<'_>) -> Result<Vec<TypeMember>, ParseError> {
    let mut members = Vec::new();

    while !parser.check(&Token::RightBrace) {
        if parser.at_eof() {
            return Err(parser.unexpected_token(&[Token::RightBrace]));
        }
        if parser.eat(&Token::Semicolon) || parser.eat(&Token::Comma) {
            continue;
        }
        if let Some(member) = parse_type_member(parser)? {
            members.push(member);
        }
        if !parser.eat(&Token::Semicolon) {
            parser.eat(&Token::Comma);
        }
    }

    Ok(members)
}

fn parse_type_member(parser: &mut Parser<'_>) -> Result<Option<TypeMember>, ParseError> {
    let doc = parser.leading_doc();
    let start = parser.current_span();

    let readonly = parser.check_ident("readonly") && is_member_name_start(parser.peek());
    if readonly {
        parser.advance();
    }

    // Index signature or computed property name
    if parser.check(&Token::LeftBracket) {
        if matches!(parser.peek(), Some(Token::Identifier(_)))
            && matches!(parser.peek_nth(2), Some(Token::Colon))
        {
            parser.advance();
            let key_name = parser.expect_identifier()?.name;
            parser.expect(Token::Colon)?;
            let key_type = parse_type_annotation(parser)?;
            parser.expect(Token::RightBracket)?;
            parser.expect(Token::Colon)?;
            let value_type = parse_type_annotation(parser)?;
            return Ok(Some(TypeMember::Index(IndexSignature {
                key_name,
                key_type,
                value_type,
                readonly,
            })));
        }
        skip_balanced(parser)?;
        parser.eat(&Token::Question);
        skip_member_tail(parser)?;
        return Ok(None);
    }

    // Call and construct signatures
    if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
        return Ok(Some(TypeMember::Call(parse_signature(parser, false)?)));
    }
    if parser.check(&Token::New)
        && matches!(parser.peek(), Some(Token::LeftParen) | Some(Token::Less))
    {
        parser.advance();
        return Ok(Some(TypeMember::Call(parse_signature(parser, true)?)));
    }

    // Accessor signatures
    if (parser.check_ident("get") || parser.check_ident("set"))
        && is_member_name_start(parser.peek())
    {
        let is_get = parser.check_ident("get");
        parser.advance();
        let name = parser.expect_property_name()?;
        let signature = parse_signature(parser, false)?;
        if !is_get {
            return Ok(None);
        }
        return Ok(Some(TypeMember::Property(PropertySignature {
            doc,
            name,
            optional: false,
            readonly: true,
            type_annotation: signature.return_type.map(|ty| *ty),
            span: parser.span_from(&start),
        })));
    }

    let name = parser.expect_property_name()?;
    let optional = parser.eat(&Token::Question);

    if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
        let signature = parse_signature(parser, false)?;
        return Ok(Some(TypeMember::Method(MethodSignature {
            name,
            optional,
            signature,
        })));
    }

    let type_annotation = if parser.eat(&Token::Colon) {
        Some(parse_type_annotation(parser)?)
    } else {
        None
    };

    Ok(Some(TypeMember::Property(PropertySignature {
        doc,
        name,
        optional,
        readonly,
        type_annotation,
        span: parser.span_from(&start),
    })))
}

/// `<T>(params): R` of a method, call or construct signature.
fn parse_signature(parser: &mut Parser<'_>, is_constructor: bool) -> Result<FunctionType, ParseError> {
    if parser.check(&Token::Less) {
        parse_type_parameters(parser)?;
    }
    let params = super::decl::parse_parameters(parser)?;
    let return_type = if parser.eat(&Token::Colon) {
        Some(Box::new(parse_return_type(parser)?))
    } else {
        None
    };
    Ok(FunctionType {
        is_constructor,
        params,
        return_type,
    })
}

/// Skip the remainder of a member whose name could not be represented.
fn skip_member_tail(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
        parse_signature(parser, false)?;
    } else if parser.eat(&Token::Colon) {
        parse_type_annotation(parser)?;
    }
    Ok(())
}

/// Whether a token can start a member name (after a modifier word).
pub(crate) fn is_member_name_start(token: Option<&Token>) -> bool {
    match token {
        Some(Token::LeftBracket) | Some(Token::Hash) => true,
        Some(tok) => tok.property_name().is_some(),
        None => false,
    }
}

/// Whether a token can start a type.
fn starts_type(token: Option<&Token>) -> bool {
    matches!(
        token,
        Some(Token::Identifier(_))
            | Some(Token::LeftParen)
            | Some(Token::LeftBracket)
            | Some(Token::LeftBrace)
            | Some(Token::Typeof)
            | Some(Token::Void)
            | Some(Token::Null)
            | Some(Token::This)
            | Some(Token::StringLiteral(_))
            | Some(Token::NumberLiteral(_))
            | Some(Token::TemplateLiteral(_))
            | Some(Token::True)
            | Some(Token::False)
    )
}

/// `(` starts a function type when its matching `)` is followed by `=>`;
/// `<` always does in type position.
fn is_start_of_function_type(parser: &Parser<'_>) -> bool {
    if parser.check(&Token::Less) {
        return true;
    }
    if !parser.check(&Token::LeftParen) {
        return false;
    }
    match parser.find_matching(parser.pos) {
        Some(close) => matches!(parser.tokens.get(close + 1), Some((Token::Arrow, _))),
        None => false,
    }
}

/// `{ [K in T]: ... }`, `{ readonly [K in T]: ... }`, `{ -readonly [...] }`
fn is_start_of_mapped_type(parser: &Parser<'_>) -> bool {
    let mut n = 1;
    if matches!(parser.peek_nth(n), Some(Token::Operator(op)) if op == "+" || op == "-") {
        n += 1;
    }
    if matches!(parser.peek_nth(n), Some(tok) if tok.is_ident("readonly")) {
        n += 1;
    }
    matches!(parser.peek_nth(n), Some(Token::LeftBracket))
        && matches!(parser.peek_nth(n + 1), Some(Token::Identifier(_)))
        && matches!(parser.peek_nth(n + 2), Some(tok) if tok.is_ident("in"))
}
