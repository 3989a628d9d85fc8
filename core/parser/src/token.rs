//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the search-expression lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.

/// Tokens recognized by the search-expression lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Literals
    /// A bare word. Keywords are recognized case-insensitively and never become terms.
    Term(String),
    /// A quoted phrase: "small area" or 'small area'
    Phrase(String),

    // Operators
    And,
    Or,
    Not,

    // Delimiters
    LParen,
    RParen,
    /// Separates the items of a top-level list
    Comma,

    // Special
    EOF,
    /// A quote that is never closed
    Unterminated(char),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Term(s) => write!(f, "{}", s),
            Token::Phrase(s) => write!(f, "\"{}\"", s),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::EOF => write!(f, "EOF"),
            Token::Unterminated(q) => write!(f, "UNTERMINATED({})", q),
        }
    }
}
