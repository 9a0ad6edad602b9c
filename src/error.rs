use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line: {line}, col: {col}] Scanner error: {message}")]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

/// Failure while matching the token stream against the grammar.
///
/// `found` is the lexeme of the offending token and `expected` lists the
/// tokens or constructs that would have been accepted at that point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}, col {col}] Error at '{found}': {message}")]
pub struct ParseError {
    pub message: String,
    pub found: String,
    pub expected: Vec<String>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn line(&self) -> u32 {
        match self {
            Error::Lex(err) => err.line,
            Error::Parse(err) => err.line,
        }
    }

    pub fn col(&self) -> u32 {
        match self {
            Error::Lex(err) => err.col,
            Error::Parse(err) => err.col,
        }
    }
}
