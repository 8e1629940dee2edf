use std::iter::FusedIterator;

use log::{debug, info};
use phf::phf_map;

use crate::error::GloxError;
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and" => TokenType::AND,
    b"break" => TokenType::BREAK,
    b"class" => TokenType::CLASS,
    b"continue" => TokenType::CONTINUE,
    b"else" => TokenType::ELSE,
    b"false" => TokenType::FALSE,
    b"for" => TokenType::FOR,
    b"fun" => TokenType::FUN,
    b"get" => TokenType::GET,
    b"if" => TokenType::IF,
    b"nil" => TokenType::NIL,
    b"of" => TokenType::OF,
    b"or" => TokenType::OR,
    b"return" => TokenType::RETURN,
    b"set" => TokenType::SET,
    b"static" => TokenType::STATIC,
    b"super" => TokenType::SUPER,
    b"this" => TokenType::THIS,
    b"true" => TokenType::TRUE,
    b"var" => TokenType::VAR,
    b"while" => TokenType::WHILE,
};

/// Byte-oriented scanner over a UTF-8 source buffer. Non-ASCII bytes only
/// ever appear inside string literals, which are carried through verbatim.
///
/// Tokens are produced through the `Iterator` implementation; scan errors
/// are recoverable, so the iterator keeps yielding after an `Err` item.
/// The final item is always the `EOF` token.
#[derive(Debug, Clone)]
pub struct Scanner {
    source: Vec<u8>,
    start: usize,
    current: usize,
    line: usize,
    pending_token: Option<TokenType>,
}

impl Scanner {
    pub fn new(buf: Vec<u8>) -> Self {
        info!("Initializing scanner with buffer of {} bytes", buf.len());

        Self {
            source: buf,
            start: 0,
            current: 0,
            line: 1,
            pending_token: None,
        }
    }

    fn scan_token(&mut self) -> Result<(), GloxError> {
        let byte: u8 = self.advance();

        match byte {
            b'(' => self.add_token(TokenType::LEFT_PAREN),

            b')' => self.add_token(TokenType::RIGHT_PAREN),

            b'{' => self.add_token(TokenType::LEFT_BRACE),

            b'}' => self.add_token(TokenType::RIGHT_BRACE),

            b'[' => self.add_token(TokenType::LEFT_BRACKET),

            b']' => self.add_token(TokenType::RIGHT_BRACKET),

            b',' => self.add_token(TokenType::COMMA),

            b'.' => self.add_token(TokenType::DOT),

            b'-' => self.add_token(TokenType::MINUS),

            b'+' => self.add_token(TokenType::PLUS),

            b';' => self.add_token(TokenType::SEMICOLON),

            b'*' => self.add_token(TokenType::STAR),

            b'?' => self.add_token(TokenType::QUESTION),

            b':' => self.add_token(TokenType::COLON),

            b'!' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.add_token(token_type);
            }

            b'=' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else if self.match_byte(b'>') {
                    TokenType::LAMBDA_ARROW
                } else {
                    TokenType::EQUAL
                };

                self.add_token(token_type);
            }

            b'<' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.add_token(token_type);
            }

            b'>' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.add_token(token_type);
            }

            b' ' | b'\r' | b'\t' => {
                debug!("Skipping whitespace");
            }

            b'\n' => {
                self.add_token(TokenType::NEW_LINE);
                self.line += 1;
            }

            b'/' => {
                if self.match_byte(b'/') {
                    debug!("Found comment, skipping until newline");

                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::SLASH);
                }
            }

            b'"' => {
                self.scan_string()?;
            }

            b'0'..=b'9' => {
                self.scan_number()?;
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.scan_identifier();
            }

            _ => {
                debug!(
                    "Unexpected character '{}' at line {}",
                    byte as char, self.line
                );

                return Err(GloxError::scan(self.line, "Unexpected character."));
            }
        }

        Ok(())
    }

    fn scan_string(&mut self) -> Result<(), GloxError> {
        // Strings may span multiple lines.
        while !self.is_at_end() && self.peek() != b'"' {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(GloxError::scan(self.line, "Unterminated string."));
        }

        // Consume the closing quote.
        self.advance();

        let value: String = self.lexeme_text(self.start + 1, self.current - 1);

        info!("Scanned string literal: {}", value);

        self.add_token(TokenType::STRING(value));

        Ok(())
    }

    fn scan_number(&mut self) -> Result<(), GloxError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' {
            if !self.peek_next().is_ascii_digit() {
                // Consume the dangling dot so scanning resumes after it.
                self.advance();

                return Err(GloxError::scan(self.line, "Unterminated number literal."));
            }

            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.lexeme_text(self.start, self.current);
        let number: f64 = text.parse().unwrap_or(0.0);

        info!("Scanned number: {}", number);

        self.add_token(TokenType::NUMBER(number));

        Ok(())
    }

    fn scan_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        match KEYWORDS.get(&self.source[self.start..self.current]) {
            Some(token_type) => {
                self.add_token(token_type.clone());
            }

            None => {
                self.add_token(TokenType::IDENTIFIER);
            }
        }
    }

    fn lexeme_text(&self, from: usize, to: usize) -> String {
        // The scanner only ever splits the buffer at ASCII boundaries.
        String::from_utf8_lossy(&self.source[from..to]).into_owned()
    }

    #[inline]
    fn add_token(&mut self, token_type: TokenType) {
        self.pending_token = Some(token_type);
    }

    #[inline]
    fn advance(&mut self) -> u8 {
        let byte: u8 = self.source[self.current];

        self.current += 1;

        byte
    }

    #[inline]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;

            true
        }
    }

    #[inline]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.current]
        }
    }

    #[inline]
    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            0
        } else {
            self.source[self.current + 1]
        }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

impl Iterator for Scanner {
    type Item = Result<Token, GloxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_at_end() {
            if self.current == self.source.len() {
                self.current += 1;

                info!("Reached EOF at line {}", self.line);

                return Some(Ok(Token::new(TokenType::EOF, "".to_string(), self.line)));
            }

            return None;
        }

        self.pending_token = None;
        self.start = self.current;

        // A NEW_LINE token belongs on the line it terminates.
        let token_line: usize = self.line;

        if let Err(e) = self.scan_token() {
            debug!("Scan error: {}", e);

            return Some(Err(e));
        }

        if let Some(token_type) = self.pending_token.take() {
            let lexeme: String = self.lexeme_text(self.start, self.current);

            debug!(
                "Emitting token: type={:?}, lexeme={:?}, line={}",
                token_type, lexeme, token_line
            );

            Some(Ok(Token::new(token_type, lexeme, token_line)))
        } else {
            // Whitespace or a comment; keep scanning.
            self.next()
        }
    }
}

impl FusedIterator for Scanner {}
