//! Declaration parser
//!
//! A recursive descent parser that turns the token stream into the
//! declaration-level AST in [`crate::ast`]. Declarations that shape a
//! component schema (classes, interfaces, type aliases, imports and
//! exports) are parsed in full. Every other statement is skipped by
//! balanced-delimiter scanning and recorded as [`Item::Other`].

pub mod decl;
pub mod error;
pub mod recovery;
pub mod types;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Comment, CommentKind, Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Maximum nesting of type annotations before the parser gives up.
const MAX_TYPE_DEPTH: usize = 128;

/// Parser state.
pub struct Parser<'a> {
    /// Source text, for slicing raw type text and heritage expressions
    source: &'a str,

    /// Pre-tokenized input
    tokens: Vec<(Token, Span)>,

    /// Comment trivia in source order
    comments: Vec<Comment>,

    /// Cursor into `tokens`
    pos: usize,

    /// Current type nesting depth
    depth: usize,

    /// Errors recovered from so far
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    /// Tokenize `source` and position the cursor on its first token.
    pub fn new(source: &'a str) -> Result<Self, Vec<LexError>> {
        let lexed = Lexer::new(source).tokenize()?;

        Ok(Self {
            source,
            tokens: lexed.tokens,
            comments: lexed.comments,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
        })
    }

    /// Parse the entire source unit into a Module AST.
    ///
    /// Fails with every error collected, in source order.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            // A stray closing brace can only come from unbalanced input.
            if self.check(&Token::RightBrace) {
                let span = self.current_span();
                self.errors
                    .push(ParseError::unexpected_token(vec![], Token::RightBrace, span));
                self.advance();
                continue;
            }

            let before = self.pos;
            match decl::parse_item(&mut self) {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    recovery::sync_to_statement_boundary(&mut self);
                }
            }
            if self.pos == before {
                self.advance();
            }
        }

        let span = match items.last() {
            Some(last) => self.combine_spans(&start_span, last.span()),
            None => start_span,
        };

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Module::new(items, span))
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Token after the current one.
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    /// Peek `n` tokens ahead of the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        if self.pos == 0 {
            Span::new(0, 0, 1, 1)
        } else {
            self.tokens[self.pos - 1].1
        }
    }

    /// Move past the current token and return it.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Whether the current token is of the `expected` kind (payload ignored).
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Whether the current token is of one of the `expected` kinds.
    pub fn check_any(&self, expected: &[Token]) -> bool {
        expected.iter().any(|tok| self.check(tok))
    }

    /// Check if the current token is the contextual word `word`.
    #[inline]
    pub fn check_ident(&self, word: &str) -> bool {
        self.current().is_ident(word)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the contextual word `word` if it is current.
    pub fn eat_ident(&mut self, word: &str) -> bool {
        if self.check_ident(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the `expected` kind or fail.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier.
    pub fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current() {
            Token::Identifier(name) => {
                let ident = Identifier::new(name.clone(), span);
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Consume a member name: identifier, keyword, string or number.
    pub fn expect_property_name(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current().property_name() {
            Some(name) => {
                self.advance();
                Ok(Identifier::new(name, span))
            }
            None => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Whether a line break separates the current token from the previous one.
    pub fn newline_before(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        let prev = self.tokens[self.pos - 1].1;
        let cur = self.tokens[self.pos].1;
        self.source[prev.end..cur.start].contains('\n')
    }

    /// Index of the token closing the bracket opened at `open`, if balanced.
    pub fn find_matching(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, (tok, _)) in self.tokens.iter().enumerate().skip(open) {
            match tok {
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
                Token::RightParen | Token::RightBracket | Token::RightBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                Token::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// Source text between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    // ========================================================================
    // Documentation comments
    // ========================================================================

    /// Leading documentation comment of the declaration starting at the
    /// current token.
    ///
    /// The comment closest to the declaration wins. A run of `//` comments
    /// on consecutive lines reads as one comment.
    pub fn leading_doc(&self) -> Option<String> {
        let from = if self.pos == 0 { 0 } else { self.previous_span().end };
        let to = self.current_span().start;

        let first = self.comments.partition_point(|c| c.span.start < from);
        let candidates: Vec<&Comment> = self.comments[first..]
            .iter()
            .take_while(|c| c.span.end <= to)
            .collect();

        let last = candidates.last()?;
        if last.kind != CommentKind::Line {
            return Some(last.body()).filter(|body| !body.is_empty());
        }

        let mut run = vec![*last];
        for comment in candidates.iter().rev().skip(1) {
            let next_line = run[run.len() - 1].span.line;
            if comment.kind == CommentKind::Line && comment.span.line + 1 == next_line {
                run.push(comment);
            } else {
                break;
            }
        }

        let body = run
            .iter()
            .rev()
            .map(|c| c.body())
            .collect::<Vec<_>>()
            .join("\n");
        Some(body).filter(|body| !body.is_empty())
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    /// Enter one level of type nesting.
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_TYPE_DEPTH {
            return Err(ParseError::too_deep(MAX_TYPE_DEPTH, self.current_span()));
        }
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Span covering `start` through `end`.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        Span {
            start: start.start,
            end: end.end,
            line: start.line,
            column: start.column,
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        let end = self.previous_span();
        if end.end < start.start {
            *start
        } else {
            self.combine_spans(start, &end)
        }
    }
}

/// Parse a source unit in one step, folding lexer errors into parse errors.
pub fn parse_module(source: &str) -> Result<Module, Vec<ParseError>> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;
    parser.parse()
}
