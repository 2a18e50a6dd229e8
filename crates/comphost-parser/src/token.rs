//! Token and source location types.

use std::fmt;

/// A lexical token.
///
/// Only words that can never start an identifier are lexed as keywords.
/// Contextual words (`type`, `namespace`, `readonly`, `declare`, ...) stay
/// identifiers and are recognized by the parser where they matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Class,
    Interface,
    Enum,
    Import,
    Export,
    Extends,
    Implements,
    Function,
    Const,
    Let,
    Var,
    New,
    Typeof,
    Void,
    Null,
    True,
    False,
    This,
    Default,
    Super,
    Return,

    // Literals
    Identifier(String),
    StringLiteral(String),
    NumberLiteral(f64),
    /// Raw template literal text, backticks included
    TemplateLiteral(String),
    /// Raw regular expression literal, slashes and flags included
    RegexLiteral(String),

    // Punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Less,
    Greater,
    Semicolon,
    Comma,
    Colon,
    Dot,
    DotDotDot,
    Question,
    QuestionDot,
    Equal,
    Arrow,
    Pipe,
    Amp,
    At,
    Hash,
    Bang,
    /// Any other operator character sequence (`+`, `===`, `&&`, ...)
    Operator(String),

    // Special
    Eof,
}

impl Token {
    /// Text usable as a property or member name.
    ///
    /// Any keyword is a legal property name in member position.
    pub fn property_name(&self) -> Option<String> {
        match self {
            Token::Identifier(name) | Token::StringLiteral(name) => Some(name.clone()),
            Token::NumberLiteral(n) => Some(n.to_string()),
            tok => tok.keyword_text().map(str::to_string),
        }
    }

    /// Check if this token is the identifier `word`.
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(name) if name == word)
    }

    fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Enum => "enum",
            Token::Import => "import",
            Token::Export => "export",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::Function => "function",
            Token::Const => "const",
            Token::Let => "let",
            Token::Var => "var",
            Token::New => "new",
            Token::Typeof => "typeof",
            Token::Void => "void",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::This => "this",
            Token::Default => "default",
            Token::Super => "super",
            Token::Return => "return",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.keyword_text() {
            return write!(f, "{}", text);
        }
        match self {
            Token::Identifier(name) => write!(f, "{}", name),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::NumberLiteral(n) => write!(f, "{}", n),
            Token::TemplateLiteral(raw) | Token::RegexLiteral(raw) => write!(f, "{}", raw),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::DotDotDot => write!(f, "..."),
            Token::Question => write!(f, "?"),
            Token::QuestionDot => write!(f, "?."),
            Token::Equal => write!(f, "="),
            Token::Arrow => write!(f, "=>"),
            Token::Pipe => write!(f, "|"),
            Token::Amp => write!(f, "&"),
            Token::At => write!(f, "@"),
            Token::Hash => write!(f, "#"),
            Token::Bang => write!(f, "!"),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Eof => write!(f, "end of file"),
            _ => unreachable!("keywords are handled above"),
        }
    }
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

/// Comment flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
    /// `/** ... */`
    Doc,
}

/// A comment collected as trivia during lexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Raw comment text including delimiters
    pub text: String,
    pub span: Span,
}

impl Comment {
    /// Comment body with delimiters and leading `*` gutters removed.
    pub fn body(&self) -> String {
        match self.kind {
            CommentKind::Line => self
                .text
                .trim_start_matches('/')
                .trim()
                .to_string(),
            CommentKind::Block | CommentKind::Doc => {
                let inner = self.text.trim_start_matches("/*").trim_start_matches('*');
                let inner = inner.strip_suffix("*/").unwrap_or(inner);
                inner
                    .lines()
                    .map(|line| {
                        let line = line.trim();
                        let line = line.strip_prefix('*').unwrap_or(line);
                        line.strip_prefix(' ').unwrap_or(line).trim_end()
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(kind: CommentKind, text: &str) -> Comment {
        Comment {
            kind,
            text: text.to_string(),
            span: Span::new(0, text.len(), 1, 1),
        }
    }

    #[test]
    fn test_line_comment_body() {
        assert_eq!(comment(CommentKind::Line, "// Output 1 comment.").body(), "Output 1 comment.");
        assert_eq!(comment(CommentKind::Line, "//no space").body(), "no space");
    }

    #[test]
    fn test_doc_comment_body() {
        let c = comment(
            CommentKind::Doc,
            "/**\n     * The primary input.\n     * Second line.\n     */",
        );
        assert_eq!(c.body(), "The primary input.\nSecond line.");

        let single = comment(CommentKind::Doc, "/** The primary input string */");
        assert_eq!(single.body(), "The primary input string");
    }

    #[test]
    fn test_property_name_accepts_keywords() {
        assert_eq!(Token::Default.property_name(), Some("default".to_string()));
        assert_eq!(Token::Identifier("type".into()).property_name(), Some("type".to_string()));
        assert_eq!(Token::LeftBrace.property_name(), None);
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(10, 12, 2, 3);
        let b = Span::new(4, 8, 1, 5);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 12);
        assert_eq!(merged.line, 1);
    }
}
