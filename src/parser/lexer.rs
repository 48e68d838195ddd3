//! Lexer (tokenizer) for C and C++ source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! parser. Preprocessor directives are skipped rather than parsed. Keywords
//! come from a [`SymbolTable`], so the same lexer serves the C, C++ and GNU
//! keyword sets.
//!
//! # Completion
//!
//! When a completion offset is configured the lexer stops at the caret. It
//! emits a [`TokenKind::Completion`] token holding the identifier prefix typed
//! before the caret (possibly empty), followed by one
//! [`TokenKind::EndOfCompletion`] token, and nothing after that. A caret
//! inside a comment or a string or character literal has nothing to
//! complete: the stream ends with [`TokenKind::Eof`] at the caret instead.

use super::symbols::SymbolTable;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntegerLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // Identifiers
    Identifier,
    Completion,
    EndOfCompletion,

    // Keywords
    Auto,
    Bool,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    False,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    This,
    True,
    Typedef,
    Typeid,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,

    // GNU spellings, mapped onto the base keywords by the token kind map
    GnuConst,
    GnuInline,
    GnuRestrict,
    GnuSigned,
    GnuVolatile,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    LtLtEq,
    GtGtEq,
    AmpEq,
    PipeEq,
    CaretEq,

    // Increment/Decrement
    PlusPlus,
    MinusMinus,

    // Member access
    Dot,
    Arrow,

    // Ternary
    Question,
    Colon,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Ellipsis,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "floating literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Completion => "completion point",
            TokenKind::EndOfCompletion => "end of completion",
            TokenKind::Eof => "end of file",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Dot => "'.'",
            TokenKind::Arrow => "'->'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Ellipsis => "'...'",
            keyword => return write!(f, "keyword {keyword:?}"),
        };
        f.write_str(text)
    }
}

/// A lexed token. Tokens are never mutated after lexing; grammar variants
/// reinterpret kinds through a [`super::symbols::TokenKindMap`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub end: usize,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            end,
            text: text.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Completion => write!(f, "'{}'", self.text),
            kind => write!(f, "{kind}"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated block comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },

    #[error("unterminated {what} starting at offset {offset}")]
    UnterminatedLiteral { what: &'static str, offset: usize },

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

/// Lexer for C and C++ source code
pub struct Lexer<'s> {
    source: &'s str,
    input: Vec<char>,
    position: usize,
    offset: usize,
    keywords: FxHashMap<&'static str, TokenKind>,
    completion_offset: Option<usize>,
    // Set once a skipped comment contains the caret
    caret_hidden: bool,
}

impl<'s> Lexer<'s> {
    /// Create a new lexer over `source` using the keywords of `symbols`.
    pub fn new(source: &'s str, symbols: &SymbolTable) -> Self {
        Self {
            source,
            input: source.chars().collect(),
            position: 0,
            offset: 0,
            keywords: symbols.keywords().collect(),
            completion_offset: None,
            caret_hidden: false,
        }
    }

    /// Stop at `offset` and emit completion tokens there.
    pub fn with_completion_offset(mut self, offset: Option<usize>) -> Self {
        self.completion_offset = offset;
        self
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if let Some(caret) = self.completion_offset {
                if self.caret_hidden {
                    tokens.push(Token::new(TokenKind::Eof, caret, caret, ""));
                    break;
                }
                if self.offset >= caret {
                    self.push_completion(&mut tokens, caret, caret);
                    break;
                }
            }

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.offset, self.offset, ""));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            let token = match self.next_token() {
                Ok(token) => token,
                Err(LexError::UnterminatedLiteral { offset, .. })
                    if self.completion_offset.is_some_and(|caret| offset < caret && caret <= self.offset) =>
                {
                    self.caret_hidden = true;
                    Token::new(TokenKind::StringLiteral, offset, self.offset, "")
                }
                Err(err) => return Err(err),
            };

            if let Some(caret) = self.completion_offset {
                let is_literal = matches!(token.kind, TokenKind::StringLiteral | TokenKind::CharLiteral);
                if self.caret_hidden || (is_literal && token.offset < caret && caret < token.end) {
                    tokens.push(Token::new(TokenKind::Eof, caret, caret, ""));
                    break;
                }

                let is_word = matches!(token.kind, TokenKind::Identifier)
                    || self.keywords.contains_key(token.text.as_str());
                if is_word && token.offset < caret && caret <= token.end {
                    self.push_completion(&mut tokens, token.offset, caret);
                    break;
                }
            }

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn push_completion(&self, tokens: &mut Vec<Token>, start: usize, caret: usize) {
        let prefix = self.source.get(start..caret).unwrap_or_default();
        tokens.push(Token::new(TokenKind::Completion, start, caret, prefix));
        tokens.push(Token::new(TokenKind::EndOfCompletion, caret, caret, ""));
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.offset;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, start, start, "")),
        };

        let kind = match ch {
            '"' => self.quoted_literal('"', TokenKind::StringLiteral, start)?,
            '\'' => self.quoted_literal('\'', TokenKind::CharLiteral, start)?,
            '0'..='9' => self.number_literal(),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start),

            '+' => self.select(&[('+', TokenKind::PlusPlus), ('=', TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.select(
                &[('-', TokenKind::MinusMinus), ('=', TokenKind::MinusEq), ('>', TokenKind::Arrow)],
                TokenKind::Minus,
            ),
            '*' => self.select(&[('=', TokenKind::StarEq)], TokenKind::Star),
            '/' => self.select(&[('=', TokenKind::SlashEq)], TokenKind::Slash),
            '%' => self.select(&[('=', TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.select(&[('=', TokenKind::EqEq)], TokenKind::Eq),
            '!' => self.select(&[('=', TokenKind::NotEq)], TokenKind::Bang),
            '^' => self.select(&[('=', TokenKind::CaretEq)], TokenKind::Caret),
            '&' => self.select(&[('&', TokenKind::AndAnd), ('=', TokenKind::AmpEq)], TokenKind::Amp),
            '|' => self.select(&[('|', TokenKind::OrOr), ('=', TokenKind::PipeEq)], TokenKind::Pipe),
            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    self.select(&[('=', TokenKind::LtLtEq)], TokenKind::LtLt)
                } else {
                    self.select(&[('=', TokenKind::Le)], TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    self.select(&[('=', TokenKind::GtGtEq)], TokenKind::GtGt)
                } else {
                    self.select(&[('=', TokenKind::Ge)], TokenKind::Gt)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => return Err(LexError::UnexpectedCharacter { ch, offset: start }),
        };

        let text = self.source.get(start..self.offset).unwrap_or_default();
        Ok(Token::new(kind, start, self.offset, text))
    }

    /// Consume one of `options` if the next character matches, else `single`.
    fn select(&mut self, options: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
        for &(next, kind) in options {
            if self.peek() == Some(next) {
                self.advance();
                return kind;
            }
        }
        single
    }

    /// String and character literals. The token text keeps the quotes and
    /// escape sequences exactly as written.
    fn quoted_literal(
        &mut self,
        quote: char,
        kind: TokenKind,
        start: usize,
    ) -> Result<TokenKind, LexError> {
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '\n' => break,
                c if c == quote => {
                    self.advance();
                    return Ok(kind);
                }
                _ => {
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedLiteral {
            what: if quote == '"' { "string literal" } else { "character literal" },
            offset: start,
        })
    }

    /// Integer and floating literals, including hex and suffixes.
    fn number_literal(&mut self) -> TokenKind {
        let mut is_float = self
            .source
            .get(..self.offset)
            .is_some_and(|consumed| consumed.ends_with('.'));

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                // Exponent signs: 1e-5, 0x1p+3
                let exponent = matches!(ch, 'e' | 'E' | 'p' | 'P');
                self.advance();
                if exponent && matches!(self.peek(), Some('+') | Some('-')) {
                    is_float = true;
                    self.advance();
                }
            } else if ch == '.' {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let word = self.source.get(start..self.offset).unwrap_or_default();
        self.keywords
            .get(word)
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...). The newline is left for the
    /// whitespace loop.
    fn skip_line_comment(&mut self) {
        let start = self.offset;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
        if self.completion_offset.is_some_and(|caret| start < caret && caret <= self.offset) {
            self.caret_hidden = true;
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.offset;
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                if self.completion_offset.is_some_and(|caret| start < caret && caret < self.offset) {
                    self.caret_hidden = true;
                }
                return Ok(());
            }
            self.advance();
        }

        // The caret may sit in a comment that is still being typed
        if self.completion_offset.is_some_and(|caret| start < caret) {
            self.caret_hidden = true;
            return Ok(());
        }
        Err(LexError::UnterminatedComment { offset: start })
    }

    /// Skip a preprocessor line, honoring backslash continuations.
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\\' && self.peek() == Some('\n') {
                self.advance();
            } else if ch == '\n' {
                break;
            }
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::symbols::{C99, CPP, GNU_C99};

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, &C99)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("int main() { return 0; }", &C99).tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert!(matches!(&tokens[1], Token { kind: TokenKind::Identifier, text, .. } if text == "main"));
        assert_eq!(tokens[1].offset, 4);
        assert_eq!(tokens[1].end, 8);
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[5].kind, TokenKind::Return);
        assert_eq!(tokens[6].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[9].kind, TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("++ -- += -= == != && || <<= >>= -> ..."),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::LtLtEq,
                TokenKind::GtGtEq,
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let kinds = kinds("int x; // comment\nint y; /* block\ncomment */ int z;");
        assert_eq!(kinds.len(), 10);
        assert_eq!(kinds[3], TokenKind::Int);
        assert_eq!(kinds[7], TokenKind::Identifier);
    }

    #[test]
    fn test_literals_keep_source_text() {
        let tokens = Lexer::new(r#""hello\nworld" 'a' 0x1F 1.5e-3"#, &C99).tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, r#""hello\nworld""#);
        assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[2].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[2].text, "0x1F");
        assert_eq!(tokens[3].kind, TokenKind::FloatLiteral);
    }

    #[test]
    fn test_preprocessor_skip() {
        assert_eq!(
            kinds("#include <stdio.h>\n#define X \\\n 1\nint x;"),
            vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_dialect_keywords() {
        let c = Lexer::new("bool this", &C99).tokenize().unwrap();
        assert_eq!(c[0].kind, TokenKind::Identifier);

        let cpp = Lexer::new("bool this", &CPP).tokenize().unwrap();
        assert_eq!(cpp[0].kind, TokenKind::Bool);
        assert_eq!(cpp[1].kind, TokenKind::This);

        let gnu = Lexer::new("__const__ __inline", &GNU_C99).tokenize().unwrap();
        assert_eq!(gnu[0].kind, TokenKind::GnuConst);
        assert_eq!(gnu[1].kind, TokenKind::GnuInline);
    }

    #[test]
    fn test_completion_inside_identifier() {
        let tokens = Lexer::new("p->abc + 1", &C99)
            .with_completion_offset(Some(5))
            .tokenize()
            .unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].kind, TokenKind::Completion);
        assert_eq!(tokens[2].text, "ab");
        assert_eq!(tokens[2].offset, 3);
        assert_eq!(tokens[3].kind, TokenKind::EndOfCompletion);
    }

    #[test]
    fn test_completion_in_whitespace() {
        let tokens = Lexer::new("x = ", &C99)
            .with_completion_offset(Some(4))
            .tokenize()
            .unwrap();

        assert_eq!(tokens[2].kind, TokenKind::Completion);
        assert!(tokens[2].text.is_empty());
        assert_eq!(tokens[2].offset, 4);
    }

    #[test]
    fn test_caret_in_comment_ends_stream() {
        let tokens = Lexer::new("int x; /* com */ int y;", &C99)
            .with_completion_offset(Some(12))
            .tokenize()
            .unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
        assert_eq!(tokens[3].offset, 12);
        assert!(tokens.iter().all(|token| token.kind != TokenKind::Completion));

        let line = Lexer::new("int x; // note", &C99)
            .with_completion_offset(Some(14))
            .tokenize()
            .unwrap();
        assert_eq!(line.last().map(|token| token.kind), Some(TokenKind::Eof));
        assert_eq!(line.len(), 4);

        let open = Lexer::new("int x; /* still typ", &C99)
            .with_completion_offset(Some(19))
            .tokenize()
            .unwrap();
        assert_eq!(open.len(), 4);
    }

    #[test]
    fn test_caret_after_comment_still_completes() {
        let tokens = Lexer::new("/* c */ ab", &C99)
            .with_completion_offset(Some(10))
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Completion);
        assert_eq!(tokens[0].text, "ab");
    }

    #[test]
    fn test_caret_in_string_ends_stream() {
        let closed = Lexer::new(r#"s = "abc";"#, &C99)
            .with_completion_offset(Some(6))
            .tokenize()
            .unwrap();
        assert_eq!(
            closed.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![TokenKind::Identifier, TokenKind::Eq, TokenKind::Eof]
        );

        let open = Lexer::new(r#"s = "ab"#, &C99)
            .with_completion_offset(Some(7))
            .tokenize()
            .unwrap();
        assert_eq!(open.len(), 3);
        assert_eq!(open[2].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("int /* x", &C99).tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedComment { offset: 4 });
    }
}
