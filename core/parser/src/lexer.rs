//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw search string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, quoted phrases, the AND/OR/NOT keywords and the
//! delimiters that structure a query.
//!
//! SUPPORTED SYNTAX:
//! - Delimiters: ( ) ,
//! - Keywords (any case): AND OR NOT
//! - Quoted phrases: "small area", 'small area'
//! - Terms: any other run of non-whitespace characters

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,

            // Both quote styles delimit a phrase
            Some(q @ ('"' | '\'')) => self.read_phrase(q),

            Some(ch) => self.read_term(ch),

            // End of input
            None => Token::EOF,
        }
    }

    /// Collects every token up to and including EOF.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::EOF;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    fn read_phrase(&mut self, quote: char) -> Token {
        let mut result = String::new();
        for ch in self.input.by_ref() {
            if ch == quote {
                return Token::Phrase(result.trim().to_string());
            }
            result.push(ch);
        }
        Token::Unterminated(quote)
    }

    fn read_term(&mut self, first_char: char) -> Token {
        let mut term = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if is_boundary(ch) {
                break;
            }
            term.push(ch);
            self.input.next();
        }

        match term.to_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Term(term),
        }
    }
}

/// Returns true if `ch` ends a bare term. An apostrophe only opens a
/// phrase at the start of a token, so "Children's" stays one term.
fn is_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | ',' | '"')
}
