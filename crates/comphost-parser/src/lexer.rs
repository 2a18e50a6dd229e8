//! Lexer for component source units.
//!
//! Built on logos, like the rest of the front end. Comments are not thrown
//! away: they are collected as trivia next to the token stream so that the
//! parser can attach leading documentation comments to declarations.

use crate::token::{Comment, CommentKind, Span, Token};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// Converted to [`Token`] (or to [`Comment`] trivia) after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
// Whitespace and line terminators, including BOM, NBSP, VT, LS and PS
#[logos(skip r"[ \t\r\n\f\x0B\x{A0}\x{FEFF}\x{2028}\x{2029}]+")]
enum LogosToken {
    // Comments (kept as trivia)
    #[regex(r"//[^\n]*", |lex| lex.slice().to_string())]
    LineComment(String),

    #[token("/*", lex_block_comment)]
    BlockComment(String),

    // Keywords (must come before identifiers)
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("function")]
    Function,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("new")]
    New,
    #[token("typeof")]
    Typeof,
    #[token("void")]
    Void,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("this")]
    This,
    #[token("default")]
    Default,
    #[token("super")]
    Super,
    #[token("return")]
    Return,

    // Identifiers (must come after keywords)
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Numbers with numeric separator support
    #[regex(r"0[xX][0-9a-fA-F]+(_[0-9a-fA-F]+)*n?", |lex| parse_radix(lex, 16))]
    #[regex(r"0[bB][01]+(_[01]+)*n?", |lex| parse_radix(lex, 2))]
    #[regex(r"0[oO][0-7]+(_[0-7]+)*n?", |lex| parse_radix(lex, 8))]
    #[regex(r"[0-9]+(_[0-9]+)*n", parse_bigint)]
    #[regex(r"[0-9]+(_[0-9]+)*(\.[0-9]*(_[0-9]+)*)?([eE][+-]?[0-9]+)?", parse_decimal)]
    #[regex(r"\.[0-9]+(_[0-9]+)*([eE][+-]?[0-9]+)?", parse_decimal)]
    NumberLiteral(f64),

    // Strings
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    #[regex(r"'([^'\\\n]|\\.)*'", parse_string)]
    StringLiteral(String),

    #[token("`", lex_template)]
    TemplateLiteral(String),

    // Punctuation
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("<")]
    Less,
    // `>` is never merged with a following `>` or `=` so that nested type
    // arguments (`Output<Array<string>>`) close one bracket at a time.
    #[token(">")]
    Greater,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    DotDotDot,
    #[token("?")]
    Question,
    #[token("?.")]
    QuestionDot,
    #[token("=")]
    Equal,
    #[token("=>")]
    Arrow,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("@")]
    At,
    #[token("#")]
    Hash,
    #[token("!")]
    Bang,

    #[token("+", operator)]
    #[token("-", operator)]
    #[token("*", operator)]
    #[token("/", operator)]
    #[token("%", operator)]
    #[token("^", operator)]
    #[token("~", operator)]
    #[token("==", operator)]
    #[token("===", operator)]
    #[token("!=", operator)]
    #[token("!==", operator)]
    #[token("<=", operator)]
    #[token("<<", operator)]
    #[token("&&", operator)]
    #[token("||", operator)]
    #[token("??", operator)]
    #[token("??=", operator)]
    #[token("&&=", operator)]
    #[token("||=", operator)]
    #[token("++", operator)]
    #[token("--", operator)]
    #[token("**", operator)]
    #[token("+=", operator)]
    #[token("-=", operator)]
    #[token("*=", operator)]
    #[token("/=", operator)]
    #[token("%=", operator)]
    #[token("&=", operator)]
    #[token("|=", operator)]
    #[token("^=", operator)]
    Operator(String),
}

fn operator(lex: &mut logos::Lexer<LogosToken>) -> String {
    lex.slice().to_string()
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    // "/*" is consumed; find the terminator
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(lex.slice().to_string())
}

fn lex_template(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'$' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                depth = 1;
                i += 1;
            }
            b'{' if depth > 0 => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            b'`' if depth == 0 => {
                lex.bump(i + 1);
                return Some(lex.slice().to_string());
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn parse_radix(lex: &mut logos::Lexer<LogosToken>, radix: u32) -> Option<f64> {
    let digits = lex.slice()[2..].trim_end_matches('n').replace('_', "");
    u64::from_str_radix(&digits, radix).ok().map(|n| n as f64)
}

fn parse_bigint(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().trim_end_matches('n').replace('_', "").parse().ok()
}

fn parse_decimal(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1];
    Some(unescape_string(inner))
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some(c) => result.push(c),
                None => break,
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{char}' at {}:{}", .span.line, .span.column)]
    UnexpectedCharacter { char: char, span: Span },

    #[error("Unterminated literal or comment at {}:{}", .span.line, .span.column)]
    Unterminated { span: Span },
}

/// Output of a successful tokenization.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Tokens, terminated by [`Token::Eof`]
    pub tokens: Vec<(Token, Span)>,
    /// Comment trivia in source order
    pub comments: Vec<Comment>,
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    lexed: Lexed,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexed: Lexed::default(),
            errors: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Lexed, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();

            // Update line and column based on skipped text
            advance_position(&self.source[last_end..range.start], &mut line, &mut column);

            let span = Span::new(range.start, range.end, line, column);

            match token_result {
                Ok(LogosToken::LineComment(text)) => self.push_comment(CommentKind::Line, text, span),
                Ok(LogosToken::BlockComment(text)) => {
                    let kind = if text.starts_with("/**") && text.len() > 4 {
                        CommentKind::Doc
                    } else {
                        CommentKind::Block
                    };
                    self.push_comment(kind, text, span);
                }
                Ok(LogosToken::Operator(op))
                    if (op == "/" || op == "/=") && self.regex_allowed() =>
                {
                    match scan_regex(&self.source[range.start..]) {
                        Some(len) => {
                            logos_lexer.bump(len - op.len());
                            let end = range.start + len;
                            let raw = self.source[range.start..end].to_string();
                            let span = Span::new(range.start, end, line, column);
                            self.lexed.tokens.push((Token::RegexLiteral(raw), span));
                        }
                        None => self.lexed.tokens.push((Token::Operator(op), span)),
                    }
                }
                Ok(logos_token) => {
                    let token = convert_token(logos_token);
                    self.lexed.tokens.push((token, span));
                }
                Err(()) => {
                    let rest = &self.source[range.start..];
                    let error = if rest.starts_with("/*")
                        || rest.starts_with('`')
                        || rest.starts_with('"')
                        || rest.starts_with('\'')
                    {
                        LexError::Unterminated { span }
                    } else {
                        let char = rest.chars().next().unwrap_or('\0');
                        LexError::UnexpectedCharacter { char, span }
                    };
                    self.errors.push(error);
                }
            }

            let end = logos_lexer.span().end;
            advance_position(&self.source[range.start..end], &mut line, &mut column);
            last_end = end;
        }

        // Add EOF token
        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.lexed.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.lexed)
        } else {
            Err(self.errors)
        }
    }

    fn push_comment(&mut self, kind: CommentKind, text: String, span: Span) {
        self.lexed.comments.push(Comment { kind, text, span });
    }

    /// A `/` starts a regular expression unless it follows an operand.
    fn regex_allowed(&self) -> bool {
        !matches!(
            self.lexed.tokens.last(),
            Some((
                Token::Identifier(_)
                    | Token::NumberLiteral(_)
                    | Token::StringLiteral(_)
                    | Token::TemplateLiteral(_)
                    | Token::RegexLiteral(_)
                    | Token::RightParen
                    | Token::RightBracket
                    | Token::RightBrace
                    | Token::This
                    | Token::Super
                    | Token::True
                    | Token::False
                    | Token::Null,
                _
            ))
        )
    }
}

/// Length of the regular expression literal at the start of `text`
/// (which begins with `/`), flags included.
fn scan_regex(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut in_class = false;
    let mut i = 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn advance_position(text: &str, line: &mut u32, column: &mut u32) {
    for c in text.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

fn convert_token(logos_token: LogosToken) -> Token {
    match logos_token {
        LogosToken::Class => Token::Class,
        LogosToken::Interface => Token::Interface,
        LogosToken::Enum => Token::Enum,
        LogosToken::Import => Token::Import,
        LogosToken::Export => Token::Export,
        LogosToken::Extends => Token::Extends,
        LogosToken::Implements => Token::Implements,
        LogosToken::Function => Token::Function,
        LogosToken::Const => Token::Const,
        LogosToken::Let => Token::Let,
        LogosToken::Var => Token::Var,
        LogosToken::New => Token::New,
        LogosToken::Typeof => Token::Typeof,
        LogosToken::Void => Token::Void,
        LogosToken::Null => Token::Null,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::This => Token::This,
        LogosToken::Default => Token::Default,
        LogosToken::Super => Token::Super,
        LogosToken::Return => Token::Return,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::NumberLiteral(n) => Token::NumberLiteral(n),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::TemplateLiteral(raw) => Token::TemplateLiteral(raw),
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Colon => Token::Colon,
        LogosToken::Dot => Token::Dot,
        LogosToken::DotDotDot => Token::DotDotDot,
        LogosToken::Question => Token::Question,
        LogosToken::QuestionDot => Token::QuestionDot,
        LogosToken::Equal => Token::Equal,
        LogosToken::Arrow => Token::Arrow,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Amp => Token::Amp,
        LogosToken::At => Token::At,
        LogosToken::Hash => Token::Hash,
        LogosToken::Bang => Token::Bang,
        LogosToken::Operator(op) => Token::Operator(op),
        LogosToken::LineComment(_) | LogosToken::BlockComment(_) => {
            unreachable!("comments are diverted to trivia")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .tokens
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_nested_type_arguments_close_separately() {
        let toks = tokens("Output<Array<string>>");
        assert_eq!(
            toks,
            vec![
                Token::Identifier("Output".into()),
                Token::Less,
                Token::Identifier("Array".into()),
                Token::Less,
                Token::Identifier("string".into()),
                Token::Greater,
                Token::Greater,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_whitespace_is_skipped() {
        let toks = tokens("\u{FEFF}class\u{A0}A\x0B{\u{2028}}\u{2029}");
        assert_eq!(
            toks,
            vec![
                Token::Class,
                Token::Identifier("A".into()),
                Token::LeftBrace,
                Token::RightBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_collected_as_trivia() {
        let lexed = Lexer::new("// first\n/** doc */ class /* inline */ A {}")
            .tokenize()
            .unwrap();
        assert_eq!(lexed.comments.len(), 3);
        assert_eq!(lexed.comments[0].kind, CommentKind::Line);
        assert_eq!(lexed.comments[1].kind, CommentKind::Doc);
        assert_eq!(lexed.comments[2].kind, CommentKind::Block);
        assert!(matches!(lexed.tokens[0].0, Token::Class));
        assert_eq!(lexed.tokens[0].1.line, 2);
    }

    #[test]
    fn test_template_literal_with_substitution() {
        let toks = tokens("const s = `a ${ {b: 1}.b } c`;");
        assert!(matches!(&toks[3], Token::TemplateLiteral(raw) if raw == "`a ${ {b: 1}.b } c`"));
        assert_eq!(toks[4], Token::Semicolon);
    }

    #[test]
    fn test_numbers_and_strings() {
        let toks = tokens(r#"0x1F 1_000 2.5 10n 'it\'s' "a\nb""#);
        assert_eq!(toks[0], Token::NumberLiteral(31.0));
        assert_eq!(toks[1], Token::NumberLiteral(1000.0));
        assert_eq!(toks[2], Token::NumberLiteral(2.5));
        assert_eq!(toks[3], Token::NumberLiteral(10.0));
        assert_eq!(toks[4], Token::StringLiteral("it's".into()));
        assert_eq!(toks[5], Token::StringLiteral("a\nb".into()));
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let errors = Lexer::new("class A {} /* never closed").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::Unterminated { .. }));
    }

    #[test]
    fn test_regex_literal_versus_division() {
        let toks = tokens("const re = /a[/]b\\//gi; const half = total / 2;");
        assert!(matches!(&toks[3], Token::RegexLiteral(raw) if raw == "/a[/]b\\//gi"));
        assert!(toks.contains(&Token::Operator("/".into())));
    }

    #[test]
    fn test_contextual_words_are_identifiers() {
        let toks = tokens("type readonly namespace declare");
        assert!(toks[..4].iter().all(|t| matches!(t, Token::Identifier(_))));
    }
}
