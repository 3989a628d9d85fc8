//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into a Query.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds the list of expressions the catalogue evaluates.
//! Parsing is strict: stray operators, unbalanced parentheses, empty items
//! and unterminated quotes are errors rather than guesses.
//!
//! GRAMMAR (precedence NOT > AND > OR, comma lowest):
//!   query          --> ( item ( "," item )* )?
//!   item           --> or_expr
//!   or_expr        --> and_expr ( "OR" and_expr )*
//!   and_expr       --> not_expr ( "AND"? not_expr )*
//!   not_expr       --> "NOT" not_expr | primary
//!   primary        --> TERM | PHRASE | "(" or_expr ")"

use crate::ast::{Expression, Query};
use crate::lexer::Lexer;
use crate::token::Token;

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    /// Parses the entire input. Blank input yields an empty query.
    pub fn parse(&mut self) -> ParseResult<Query> {
        let mut query = Query::default();
        if self.current_token == Token::EOF {
            return Ok(query);
        }

        loop {
            if matches!(self.current_token, Token::Comma | Token::EOF) {
                return Err(ParseError::new(format!(
                    "Empty item before {}",
                    self.current_token
                )));
            }
            query.items.push(self.parse_or()?);

            match &self.current_token {
                Token::Comma => self.advance(),
                Token::EOF => break,
                other => {
                    return Err(ParseError::new(format!(
                        "Unexpected token after expression: {}",
                        other
                    )))
                }
            }
        }

        Ok(query)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {}, found {}",
                expected, self.current_token
            )))
        }
    }

    /// Parses OR expressions (lowest precedence inside an item).
    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;

        while self.current_token == Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions, explicit or implied by adjacency.
    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not()?;

        loop {
            match &self.current_token {
                Token::And => self.advance(),
                // Adjacent operand: implicit AND
                Token::Term(_) | Token::Phrase(_) | Token::Not | Token::LParen => {}
                _ => break,
            }
            let right = self.parse_not()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    /// Parses NOT expressions (highest precedence).
    fn parse_not(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::Not {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expression::not(operand));
        }

        self.parse_primary()
    }

    /// Parses primary expressions (terms, phrases, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token.clone() {
            Token::Term(text) => {
                self.advance();
                Ok(Expression::Term(text))
            }

            Token::Phrase(text) => {
                if text.is_empty() {
                    return Err(ParseError::new("Empty quoted phrase"));
                }
                self.advance();
                Ok(Expression::Term(text))
            }

            Token::LParen => {
                self.advance();
                if self.current_token == Token::RParen {
                    return Err(ParseError::new("Empty parentheses"));
                }
                let expr = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            Token::Unterminated(quote) => Err(ParseError::new(format!(
                "Unterminated phrase opened with {}",
                quote
            ))),

            Token::EOF => Err(ParseError::new("Unexpected end of query")),

            other => Err(ParseError::new(format!("Unexpected token: {}", other))),
        }
    }
}

/// Convenience function to parse a query string directly.
pub fn parse(input: &str) -> ParseResult<Query> {
    let mut parser = Parser::new(input);
    parser.parse()
}
