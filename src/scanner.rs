use crate::ast::{Token, TokenType, keyword};
use crate::error::LexError;

pub struct Scanner {
    source_chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: u32,
    col: u32,
    start_line: u32,
    start_col: u32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source_chars: source.chars().collect(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
            col: 1,
            start_line: 1,
            start_col: 1,
        }
    }

    pub fn tokens(&self) -> &Vec<Token> {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn advance(&mut self) -> char {
        let c = self.source_chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.new_line();
        } else {
            self.col += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source_chars.len()
    }

    fn peek(&self) -> char {
        self.peek_next_i(0)
    }

    fn peek_next_i(&self, i: usize) -> char {
        if self.current + i >= self.source_chars.len() {
            '\0'
        } else {
            self.source_chars[self.current + i]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        };

        self.advance();
        true
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.tokens.push(Token {
            kind: token_type,
            lexeme: self.current_source_str(),
            line: self.start_line,
            col: self.start_col,
        });
    }

    fn current_source_str(&self) -> String {
        self.source_chars[self.start..self.current].iter().collect()
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.start = 0;
        self.current = 0;
        self.col = 1;
        self.line = 1;
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.col = 1;
    }

    pub fn scan(&mut self) -> Result<(), LexError> {
        self.reset();
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_col = self.col;
            self.scan_token()?;
        }
        self.tokens.push(Token {
            kind: TokenType::Eof,
            lexeme: String::from("eof"),
            line: self.line,
            col: self.col,
        });

        Ok(())
    }

    // string -> "'" (char | "''")* "'"
    fn match_string(&mut self) -> Result<(), LexError> {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error_at_start("Found unterminated string"));
            }
            let c = self.advance();
            if c == '\'' {
                if self.peek() == '\'' {
                    self.advance();
                    value.push('\'');
                } else {
                    break;
                }
            } else {
                value.push(c);
            }
        }
        self.add_token(TokenType::String(value));
        Ok(())
    }

    // quoted_identifier -> "`" (char | "``")+ "`"
    fn match_quoted_identifier(&mut self) -> Result<(), LexError> {
        let mut name = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error_at_start("Found unterminated quoted identifier"));
            }
            let c = self.advance();
            if c == '`' {
                if self.peek() == '`' {
                    self.advance();
                    name.push('`');
                } else {
                    break;
                }
            } else {
                name.push(c);
            }
        }
        if name.is_empty() {
            return Err(self.error_at_start("Found empty quoted identifier"));
        }
        self.add_token(TokenType::QuotedIdentifier(name));
        Ok(())
    }

    // number -> digits ["." [digits]] [exponent] | "." digits [exponent]
    // where:
    // exponent -> ("e" | "E") ["+" | "-"] digits
    fn match_number(&mut self) -> Result<(), LexError> {
        let mut found_dot = self.source_chars[self.start] == '.';
        let mut found_e = false;
        loop {
            let peek_char = self.peek();

            if peek_char == '.' {
                if found_dot || found_e {
                    return Err(self.error("Found invalid number"));
                }
                found_dot = true;
                self.advance();
            } else if peek_char == 'e' || peek_char == 'E' {
                if found_e {
                    return Err(self.error("Found invalid number"));
                }
                found_e = true;
                let peek_next_char = self.peek_next_i(1);
                if peek_next_char == '+' || peek_next_char == '-' {
                    self.advance();
                    if !(self.peek_next_i(1).is_ascii_digit()) {
                        return Err(self.error("Found invalid number"));
                    }
                    self.advance();
                } else if peek_next_char.is_ascii_digit() {
                    self.advance();
                } else {
                    return Err(self.error("Found invalid number"));
                }
            } else if peek_char.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let peek_char = self.peek();
        if peek_char.is_alphabetic() || peek_char == '_' {
            return Err(self.error("Found invalid number"));
        }

        let number = self.current_source_str();
        if found_dot || found_e {
            self.add_token(TokenType::Float(number));
        } else {
            self.add_token(TokenType::Integer(number));
        }
        Ok(())
    }

    fn match_keyword_or_identifier(&mut self) {
        loop {
            let peek_char = self.peek();
            if !(peek_char.is_alphanumeric() || peek_char == '_') {
                break;
            }
            self.advance();
        }
        let identifier = self.current_source_str();

        match keyword(&identifier.to_lowercase()) {
            Some(kind) => self.add_token(kind),
            None => self.add_token(TokenType::Identifier(identifier)),
        }
    }

    fn skip_line_comment(&mut self) {
        loop {
            let peek_char = self.peek();
            if peek_char == '\n' || self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let curr_char = self.advance();
        match curr_char {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '*' => self.add_token(TokenType::Star),
            ',' => self.add_token(TokenType::Comma),
            ';' => self.add_token(TokenType::Semicolon),
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.match_number()?;
                } else {
                    self.add_token(TokenType::Dot);
                }
            }
            '+' => self.add_token(TokenType::Plus),
            '=' => self.add_token(TokenType::Equal),
            '/' => {
                if self.match_char('*') {
                    loop {
                        if self.is_at_end() {
                            return Err(self.error_at_start("Found unterminated comment"));
                        }
                        if self.peek() == '*' && self.peek_next_i(1) == '/' {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash)
                }
            }
            '#' => self.skip_line_comment(),
            '-' => {
                if self.match_char('-') {
                    self.skip_line_comment();
                } else {
                    self.add_token(TokenType::Minus)
                }
            }
            '<' => {
                if self.match_char('>') {
                    self.add_token(TokenType::NotEqual);
                } else if self.match_char('=') {
                    self.add_token(TokenType::LessEqual);
                } else {
                    self.add_token(TokenType::Less);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenType::GreaterEqual);
                } else {
                    self.add_token(TokenType::Greater);
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::NotEqual);
                } else {
                    return Err(self.error_at_start("Found unexpected character while scanning: !"));
                }
            }
            '\n' | '\r' | ' ' | '\t' => {}

            '\'' => self.match_string()?,

            '`' => self.match_quoted_identifier()?,

            // numeric
            c if c.is_ascii_digit() => {
                self.match_number()?;
            }

            // Keywords and identifiers
            c if c.is_alphabetic() || c == '_' => {
                self.match_keyword_or_identifier();
            }

            _ => {
                return Err(self.error_at_start(&format!(
                    "Found unexpected character while scanning: {}",
                    curr_char
                )));
            }
        }
        Ok(())
    }

    fn error(&self, message: &str) -> LexError {
        LexError {
            message: message.to_owned(),
            line: self.line,
            col: self.col,
        }
    }

    fn error_at_start(&self, message: &str) -> LexError {
        LexError {
            message: message.to_owned(),
            line: self.start_line,
            col: self.start_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TokenTypeVariant;
    use strum::IntoDiscriminant;

    fn scan(sql: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(sql);
        scanner.scan().expect("scan should succeed");
        scanner.into_tokens()
    }

    fn kinds(sql: &str) -> Vec<TokenType> {
        scan(sql).into_iter().map(|tok| tok.kind).collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select SeLeCt FROM"),
            vec![
                TokenType::Select,
                TokenType::Select,
                TokenType::From,
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("foo_1 `select` `a``b`"),
            vec![
                TokenType::Identifier("foo_1".to_owned()),
                TokenType::QuotedIdentifier("select".to_owned()),
                TokenType::QuotedIdentifier("a`b".to_owned()),
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_strings_are_unescaped() {
        assert_eq!(
            kinds("'it''s' ''"),
            vec![
                TokenType::String("it's".to_owned()),
                TokenType::String(String::new()),
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 4.2 .5 5. 1e10 1.5E-3 2e+2"),
            vec![
                TokenType::Integer("42".to_owned()),
                TokenType::Float("4.2".to_owned()),
                TokenType::Float(".5".to_owned()),
                TokenType::Float("5.".to_owned()),
                TokenType::Float("1e10".to_owned()),
                TokenType::Float("1.5E-3".to_owned()),
                TokenType::Float("2e+2".to_owned()),
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_operators() {
        let variants = scan("( ) , . * / + - = <> != < <= > >= ;")
            .iter()
            .map(|tok| tok.kind.discriminant())
            .collect::<Vec<_>>();
        assert_eq!(
            variants,
            vec![
                TokenTypeVariant::LeftParen,
                TokenTypeVariant::RightParen,
                TokenTypeVariant::Comma,
                TokenTypeVariant::Dot,
                TokenTypeVariant::Star,
                TokenTypeVariant::Slash,
                TokenTypeVariant::Plus,
                TokenTypeVariant::Minus,
                TokenTypeVariant::Equal,
                TokenTypeVariant::NotEqual,
                TokenTypeVariant::NotEqual,
                TokenTypeVariant::Less,
                TokenTypeVariant::LessEqual,
                TokenTypeVariant::Greater,
                TokenTypeVariant::GreaterEqual,
                TokenTypeVariant::Semicolon,
                TokenTypeVariant::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_discarded() {
        let sql = "select -- trailing comment\n 1 /* block\ncomment */ # hash comment\n";
        assert_eq!(
            kinds(sql),
            vec![
                TokenType::Select,
                TokenType::Integer("1".to_owned()),
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = scan("select a,\n  b");
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 8));
        assert_eq!((tokens[3].line, tokens[3].col), (2, 3));
    }

    #[test]
    fn test_lex_errors() {
        let cases = [
            ("select 'abc", 1, 8),
            ("select `abc", 1, 8),
            ("select ``", 1, 8),
            ("select 1e", 1, 9),
            ("select 1abc", 1, 9),
            ("select 1.5_x", 1, 11),
            ("select\n  @", 2, 3),
            ("select /* abc", 1, 8),
            ("select \"a\"", 1, 8),
        ];
        for (sql, line, col) in cases {
            let mut scanner = Scanner::new(sql);
            let err = scanner.scan().expect_err(sql);
            assert_eq!((err.line, err.col), (line, col), "{}: {}", sql, err);
        }
    }
}
