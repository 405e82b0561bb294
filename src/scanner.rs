use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::context::Context;
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Converts source text into a vector of tokens.
///
/// The scanner walks the source one character at a time with up to two
/// characters of lookahead. Offsets count characters, so lexemes are sliced
/// back out of the source with char-indexed substrings.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    ctx: &'a mut Context,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str, ctx: &'a mut Context) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            ctx,
        }
    }

    /// Scans the source and returns the tokens, ending with an EOF token.
    /// Scan errors are reported to the context and scanning continues with
    /// the next character.
    pub fn scan(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::Eof, String::new(), None, self.line));

        self.tokens
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> char {
        match self.chars.next() {
            Some(char) => {
                self.current += 1;
                char
            },
            None => panic!("tried to advance past the end of the source"),
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Returns the character after the next one without consuming anything.
    fn peek_next(&mut self) -> Option<char> {
        let char = self.chars.peek_next().copied();
        self.chars.reset_cursor();

        char
    }

    /// Consumes the next character if it is the expected one.
    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }

        false
    }

    /// Returns if the scanner has reached the end of the source.
    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type) {
        self.add_literal_token(r#type, None);
    }

    /// Adds a new token carrying a literal payload to the list of tokens.
    fn add_literal_token(&mut self, r#type: Type, literal: Option<Literal>) {
        let lexeme = self.source.substring(self.start, self.current).to_string();
        self.tokens.push(Token::new(r#type, lexeme, literal, self.line));
    }

    /// Scans the next token. The first character of the lexeme is consumed
    /// up front; everything else peeks before it takes.
    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen),
            ')' => self.add_token(Type::RightParen),
            '{' => self.add_token(Type::LeftBrace),
            '}' => self.add_token(Type::RightBrace),
            ',' => self.add_token(Type::Comma),
            '.' => self.add_token(Type::Dot),
            ';' => self.add_token(Type::Semicolon),
            '-' => self.add_token(Type::Minus),
            '+' => self.add_token(Type::Plus),
            '*' => self.add_token(Type::Star),

            '/' => {
                if self.match_next('/') {
                    // A comment runs until the end of the line.
                    while !self.is_at_end() && self.peek() != Some('\n') {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash);
                }
            },

            // Logical negation is spelled `not`; `!` only exists in `!=`.
            '!' => {
                if self.match_next('=') {
                    self.add_token(Type::BangEqual);
                } else {
                    self.ctx.error(self.line, "Unexpected bare `!` character");
                }
            },
            '=' => {
                if self.match_next('=') {
                    self.add_token(Type::EqualEqual);
                } else {
                    self.add_token(Type::Equal);
                }
            },
            '<' => {
                if self.match_next('=') {
                    self.add_token(Type::LessEqual);
                } else {
                    self.add_token(Type::Less);
                }
            },
            '>' => {
                if self.match_next('=') {
                    self.add_token(Type::GreaterEqual);
                } else {
                    self.add_token(Type::Greater);
                }
            },

            '"' => self.string(),

            ' ' | '\r' | '\t' => {},

            '\n' => {
                self.line += 1;
            },

            c if c.is_ascii_digit() => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.ctx.error(self.line, &format!("Unexpected character: `{c}`"));
            },
        }
    }

    /// Handles a string literal. Strings may span multiple lines and have no
    /// escape sequences; the payload is the interior without the quotes.
    fn string(&mut self) {
        while !self.is_at_end() && self.peek() != Some('"') {
            let c = self.advance();

            if c == '\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            self.ctx.error(self.line, "Unterminated string");
            return;
        }

        self.advance(); // Consume the closing quote.

        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_literal_token(Type::String, Some(Literal::String(value)));
    }

    /// Handles a number literal. A dot makes it a float, but only when a
    /// digit follows; `123.foo` scans as an integer, a dot and an identifier.
    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        let mut floating_point = false;

        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            floating_point = true;

            self.advance(); // Consume the dot.

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme = self.source.substring(self.start, self.current);

        if floating_point {
            match lexeme.parse::<f64>() {
                Ok(value) => self.add_literal_token(Type::Float, Some(Literal::Float(value))),
                Err(_) => {
                    self.ctx.error(self.line, "Number out of range");
                    self.add_literal_token(Type::Float, Some(Literal::Float(0.0)));
                },
            }
        } else {
            match lexeme.parse::<i64>() {
                Ok(value) => self.add_literal_token(Type::Integer, Some(Literal::Integer(value))),
                Err(_) => {
                    self.ctx.error(self.line, "Number out of range");
                    self.add_literal_token(Type::Integer, Some(Literal::Integer(0)));
                },
            }
        }
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let word = self.source.substring(self.start, self.current);
        let r#type = match word {
            "let"    => Type::Let,
            "true"   => Type::True,
            "false"  => Type::False,
            "none"   => Type::None,
            "or"     => Type::Or,
            "and"    => Type::And,
            "not"    => Type::Not,
            "if"     => Type::If,
            "else"   => Type::Else,
            "while"  => Type::While,
            "for"    => Type::For,
            "fun"    => Type::Fun,
            "return" => Type::Return,
            "struct" => Type::Struct,
            _        => Type::Identifier,
        };

        self.add_token(r#type);
    }
}
