//! Skipping and error recovery.
//!
//! The declaration parser never interprets statements or expressions. These
//! helpers step over them by balancing `()`, `[]` and `{}` and by applying
//! automatic semicolon insertion at line breaks.

use super::{ParseError, Parser};
use crate::token::{Span, Token};

/// Synchronize to the next statement boundary after an error.
pub fn sync_to_statement_boundary(parser: &mut Parser<'_>) {
    while !parser.at_eof() {
        match parser.current() {
            Token::Class
            | Token::Interface
            | Token::Enum
            | Token::Import
            | Token::Export
            | Token::Function
            | Token::Const
            | Token::Let
            | Token::Var
                if parser.newline_before() =>
            {
                return;
            }

            Token::Semicolon => {
                parser.advance();
                return;
            }

            _ => {
                parser.advance();
            }
        }
    }
}

/// Skip a bracketed group starting at the current opening token.
pub fn skip_balanced(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    let open = parser.current().clone();
    let open_span = parser.current_span();
    let mut depth = 0usize;

    loop {
        match parser.current() {
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    parser.advance();
                    return Ok(());
                }
            }
            Token::Eof => return Err(ParseError::unclosed_delimiter(open, open_span)),
            _ => {}
        }
        parser.advance();
    }
}

/// Skip a whole statement that the declaration parser does not model.
///
/// Stops after a `;` at nesting depth zero, before a `}` that closes the
/// enclosing block, or at a line break that ends the statement.
pub fn skip_statement(parser: &mut Parser<'_>) -> Result<Span, ParseError> {
    let start = parser.current_span();
    let mut depth = 0usize;
    let mut first = true;

    while !parser.at_eof() {
        if depth == 0 && !first {
            if parser.check(&Token::RightBrace) {
                break;
            }
            if parser.newline_before() && statement_ends_here(parser) {
                break;
            }
            if closed_block(parser) && starts_declaration(parser.current()) {
                break;
            }
        }
        first = false;

        match parser.current() {
            Token::Semicolon if depth == 0 => {
                parser.advance();
                break;
            }
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
        parser.advance();
    }

    if depth > 0 {
        return Err(ParseError::unclosed_delimiter(Token::LeftBrace, start));
    }

    Ok(parser.span_from(&start))
}

/// Skip an initializer or default value expression.
///
/// Stops (without consuming) at a depth-zero `,`, `;`, `)` or `}`, or at a
/// line break that ends the expression.
pub fn skip_expression(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    let start = parser.current_span();
    let mut depth = 0usize;
    let mut first = true;

    while !parser.at_eof() {
        if depth == 0 {
            if parser.check_any(&[
                Token::Comma,
                Token::Semicolon,
                Token::RightParen,
                Token::RightBrace,
                Token::RightBracket,
            ]) {
                return Ok(());
            }
            if !first && parser.newline_before() && statement_ends_here(parser) {
                return Ok(());
            }
        }
        first = false;

        match parser.current() {
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => depth -= 1,
            _ => {}
        }
        parser.advance();
    }

    if depth > 0 {
        return Err(ParseError::unclosed_delimiter(Token::LeftParen, start));
    }
    Ok(())
}

/// Whether the previous token closed a block.
fn closed_block(parser: &Parser<'_>) -> bool {
    parser.pos > 0 && matches!(parser.tokens[parser.pos - 1].0, Token::RightBrace)
}

/// Automatic semicolon insertion: a line break ends the statement unless
/// the previous token expects more or the next one continues the expression.
fn statement_ends_here(parser: &Parser<'_>) -> bool {
    let prev = &parser.tokens[parser.pos - 1].0;
    if expects_continuation(prev) {
        return false;
    }
    !continues_expression(parser.current())
}

fn expects_continuation(token: &Token) -> bool {
    matches!(
        token,
        Token::Operator(_)
            | Token::Equal
            | Token::Comma
            | Token::Dot
            | Token::QuestionDot
            | Token::LeftParen
            | Token::LeftBracket
            | Token::LeftBrace
            | Token::Arrow
            | Token::Colon
            | Token::Question
            | Token::Pipe
            | Token::Amp
            | Token::Less
            | Token::Extends
            | Token::Implements
            | Token::New
            | Token::Typeof
            | Token::Const
            | Token::Let
            | Token::Var
            | Token::Export
            | Token::Import
            | Token::Default
            | Token::At
    )
}

fn continues_expression(token: &Token) -> bool {
    match token {
        Token::Operator(op) => op != "++" && op != "--",
        Token::Dot
        | Token::QuestionDot
        | Token::Arrow
        | Token::Comma
        | Token::Equal
        | Token::Question
        | Token::Colon
        | Token::Pipe
        | Token::Amp
        | Token::Less
        | Token::Greater
        | Token::LeftParen
        | Token::LeftBracket
        | Token::Extends
        | Token::Implements => true,
        Token::Identifier(word) => word == "as" || word == "satisfies" || word == "instanceof",
        _ => false,
    }
}

fn starts_declaration(token: &Token) -> bool {
    matches!(
        token,
        Token::Class | Token::Interface | Token::Enum | Token::Import | Token::Export
    )
}
