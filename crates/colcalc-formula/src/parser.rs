//! Formula parser
//!
//! A recursive descent parser for the `@function(args)` formula language.
//!
//! ```text
//! expr    := call | literal | column
//! call    := '@' IDENT [ '(' [ arg (',' arg)* ] ')' ]
//! arg     := IDENT '=' expr | expr
//! literal := ['-'] NUMBER | STRING
//! column  := IDENT ( '.' IDENT | '[' DIGITS ']' )*
//! ```

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use colcalc_formula::{parse_formula, FormulaExpr};
///
/// let ast = parse_formula("@mul(price, 0.93)").unwrap();
/// assert!(matches!(ast, FormulaExpr::Function { .. }));
///
/// let ast = parse_formula("raw_column").unwrap();
/// assert_eq!(ast, FormulaExpr::ColumnRef("raw_column".into()));
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let tokens = Lexer::new(formula).tokenize()?;
    let mut parser = FormulaParser { tokens, pos: 0 };

    if parser.current().token == Token::Eof {
        return Err(FormulaError::malformed(0, "Empty formula"));
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    let trailing = parser.current();
    if trailing.token != Token::Eof {
        return Err(FormulaError::malformed(
            trailing.offset,
            format!("Unexpected {} after expression", trailing.token.describe()),
        ));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),

    // Column name or function name
    Identifier(String),

    // Punctuation
    At,
    Minus,
    Equal,
    Comma,
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string {:?}", s),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::At => "'@'".into(),
            Token::Minus => "'-'".into(),
            Token::Equal => "'='".into(),
            Token::Comma => "','".into(),
            Token::LeftParen => "'('".into(),
            Token::RightParen => "')'".into(),
            Token::Eof => "end of formula".into(),
        }
    }
}

/// Token with its byte offset in the formula text
#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    offset: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn tokenize(mut self) -> FormulaResult<Vec<Spanned>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let offset = self.pos;
            let token = self.scan_token()?;
            let done = token == Token::Eof;
            tokens.push(Spanned { token, offset });
            if done {
                return Ok(tokens);
            }
        }
    }

    // === Token scanning ===

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        // Single-character tokens
        let single = match c {
            '@' => Some(Token::At),
            '-' => Some(Token::Minus),
            '=' => Some(Token::Equal),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c == '\'' || c == '"' {
            return self.scan_string(c);
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }

        Err(FormulaError::malformed(
            self.pos,
            format!("Unexpected character {:?}", c),
        ))
    }

    fn scan_string(&mut self, quote: char) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            self.advance();
            if c == quote {
                return Ok(Token::String(s));
            }
            s.push(c);
        }

        Err(FormulaError::malformed(start, "Unterminated string literal"))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        self.skip_digits();

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent part
        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(FormulaError::malformed(start, "Missing exponent digits"));
            }
            self.skip_digits();
        }

        if self.peek_char().is_some_and(is_ident_char) {
            return Err(FormulaError::malformed(
                start,
                "Identifiers cannot start with a digit",
            ));
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::malformed(start, format!("Invalid number '{}'", num_str)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.skip_ident_chars();

        // Dotted (`a.b`) and indexed (`a[0]`) suffixes
        loop {
            if self.peek_char() == Some('.')
                && self
                    .peek_char_at(1)
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            {
                self.advance();
                self.skip_ident_chars();
            } else if let Some(len) = self.index_suffix_len() {
                self.pos += len;
            } else {
                break;
            }
        }

        Token::Identifier(self.input[start..self.pos].to_string())
    }

    /// Byte length of a `[digits]` suffix at the current position
    fn index_suffix_len(&self) -> Option<usize> {
        let rest = self.input[self.pos..].strip_prefix('[')?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        (digits > 0 && rest[digits..].starts_with(']')).then_some(digits + 2)
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_ident_chars(&mut self) {
        while self.peek_char().is_some_and(is_ident_char) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Formula parser
struct FormulaParser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl FormulaParser {
    fn current(&self) -> &Spanned {
        // The token list always ends with Eof and we never move past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .map_or(&Token::Eof, |spanned| &spanned.token)
    }

    fn consume(&mut self) -> Spanned {
        let spanned = self.current().clone();
        if spanned.token != Token::Eof {
            self.pos += 1;
        }
        spanned
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        let current = self.current();
        if &current.token == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::malformed(
                current.offset,
                format!(
                    "Expected {}, got {}",
                    expected.describe(),
                    current.token.describe()
                ),
            ))
        }
    }

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        let Spanned { token, offset } = self.consume();
        match token {
            Token::At => self.parse_call(offset),
            Token::Number(n) => Ok(FormulaExpr::Number(n)),
            Token::String(s) => Ok(FormulaExpr::String(s)),
            Token::Identifier(name) => Ok(FormulaExpr::ColumnRef(name)),
            Token::Minus => match self.consume().token {
                Token::Number(n) => Ok(FormulaExpr::Number(-n)),
                other => Err(FormulaError::malformed(
                    offset,
                    format!("Expected number after '-', got {}", other.describe()),
                )),
            },
            other => Err(FormulaError::malformed(
                offset,
                format!("Expected expression, got {}", other.describe()),
            )),
        }
    }

    /// Parse a call after its `@` marker
    fn parse_call(&mut self, marker_offset: usize) -> FormulaResult<FormulaExpr> {
        // The name must follow the marker directly: `@ add(..)` is not a call
        let Spanned { token, offset } = self.consume();
        let name = match token {
            Token::Identifier(name)
                if offset == marker_offset + 1 && name.chars().all(is_ident_char) =>
            {
                name
            }
            Token::Identifier(name) if offset != marker_offset + 1 => {
                return Err(FormulaError::malformed(
                    marker_offset,
                    format!("Unexpected whitespace between '@' and '{}'", name),
                ))
            }
            other => {
                return Err(FormulaError::malformed(
                    marker_offset,
                    format!("Expected function name after '@', got {}", other.describe()),
                ))
            }
        };

        // Bare `@name` is a zero-argument call
        if self.current().token != Token::LeftParen {
            return Ok(FormulaExpr::Function {
                name,
                args: Vec::new(),
            });
        }
        self.consume();

        let mut args = Vec::new();
        if self.current().token == Token::RightParen {
            self.consume();
            return Ok(FormulaExpr::Function { name, args });
        }

        let mut seen_keyword = false;
        loop {
            let offset = self.current().offset;
            let arg = self.parse_argument()?;

            match &arg {
                FormulaExpr::KeywordArg { name: keyword, .. } => {
                    let duplicate = args.iter().any(|existing| {
                        matches!(existing, FormulaExpr::KeywordArg { name, .. } if name == keyword)
                    });
                    if duplicate {
                        return Err(FormulaError::malformed(
                            offset,
                            format!("Duplicate keyword argument '{}'", keyword),
                        ));
                    }
                    seen_keyword = true;
                }
                _ if seen_keyword => {
                    return Err(FormulaError::malformed(
                        offset,
                        "Positional argument follows keyword argument",
                    ));
                }
                _ => {}
            }
            args.push(arg);

            if self.current().token == Token::Comma {
                self.consume();
                continue;
            }
            self.expect(&Token::RightParen)?;
            return Ok(FormulaExpr::Function { name, args });
        }
    }

    fn parse_argument(&mut self) -> FormulaResult<FormulaExpr> {
        if let Token::Identifier(name) = &self.current().token {
            if *self.peek_next() == Token::Equal {
                let name = name.clone();
                self.consume(); // name
                self.consume(); // '='
                let value = self.parse_expression()?;
                return Ok(FormulaExpr::KeywordArg {
                    name,
                    value: Box::new(value),
                });
            }
        }
        self.parse_expression()
    }
}
