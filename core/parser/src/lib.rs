//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the catalogue search-expression parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert a search string into a boolean query that the
//! catalogue evaluates against one field of each entry.
//!
//! PIPELINE: Query String --> Lexer --> Tokens --> Parser --> Query --> Matcher
//!
//! SUPPORTED FEATURES:
//! - Comma-separated items forming an OR group: Year, County
//! - Exclusion items that always win: Year, NOT Sex
//! - Boolean operators: AND, OR, NOT (any case)
//! - Implicit AND between adjacent terms: electoral division
//! - Quoted phrases: "small area"
//! - Parentheses for grouping

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, Query, UnaryOperator};
pub use lexer::Lexer;
pub use parser::{parse, ParseError, ParseResult, Parser};
pub use token::Token;
