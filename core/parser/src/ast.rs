//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for search expressions.
//! CONTEXT: After the Lexer tokenizes a query string, the Parser converts
//! those tokens into a `Query`: a comma-separated list of boolean
//! expressions. Callers evaluate it by supplying a predicate that decides
//! whether a single term matches the field being searched.
//!
//! SUPPORTED EXPRESSIONS:
//! - Terms and quoted phrases: population, "small area"
//! - Binary operations: AND, OR (adjacent terms are an implicit AND)
//! - Unary operations: NOT
//! - Parentheses for grouping

/// A parsed search expression.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A word or phrase to look for.
    Term(String),

    /// A binary operation: left op right.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A unary operation: op operand.
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Not,
}

impl Expression {
    pub fn term(text: impl Into<String>) -> Self {
        Expression::Term(text.into())
    }

    pub fn not(operand: Expression) -> Self {
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::And,
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::Or,
            right: Box::new(right),
        }
    }

    /// Evaluates the expression, asking `matches` about each term.
    pub fn evaluate<F>(&self, matches: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Expression::Term(term) => matches(term),
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => !operand.evaluate(matches),
            Expression::BinaryOp { left, op, right } => match op {
                BinaryOperator::And => left.evaluate(matches) && right.evaluate(matches),
                BinaryOperator::Or => left.evaluate(matches) || right.evaluate(matches),
            },
        }
    }

    /// True for a `NOT x` expression at the top of the tree.
    pub fn is_negation(&self) -> bool {
        matches!(
            self,
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                ..
            }
        )
    }

    /// Collects lowercase terms that count towards a match (those under an
    /// even number of NOTs), in the order written.
    pub fn positive_terms(&self, out: &mut Vec<String>) {
        self.collect_terms(false, out);
    }

    fn collect_terms(&self, negated: bool, out: &mut Vec<String>) {
        match self {
            Expression::Term(term) if !negated => out.push(term.to_lowercase()),
            Expression::Term(_) => {}
            Expression::UnaryOp { operand, .. } => operand.collect_terms(!negated, out),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_terms(negated, out);
                right.collect_terms(negated, out);
            }
        }
    }
}

/// A full query: the comma-separated items of one search field.
///
/// Items form an OR group. Items written as `NOT ...` are exclusions, and
/// an exclusion always wins over an inclusion that also matches.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Query {
    pub items: Vec<Expression>,
}

impl Query {
    /// A query with no items places no constraint.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn inclusions(&self) -> impl Iterator<Item = &Expression> {
        self.items.iter().filter(|e| !e.is_negation())
    }

    pub fn exclusions(&self) -> impl Iterator<Item = &Expression> {
        self.items.iter().filter(|e| e.is_negation())
    }

    /// Evaluates the query with `matches` deciding single terms.
    ///
    /// Fails if any exclusion rejects the field. Otherwise passes if there
    /// are no inclusions or at least one inclusion holds.
    pub fn evaluate<F>(&self, matches: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        if self.exclusions().any(|e| !e.evaluate(matches)) {
            return false;
        }
        let mut inclusions = self.inclusions().peekable();
        inclusions.peek().is_none() || inclusions.any(|e| e.evaluate(matches))
    }

    /// Lowercase terms that count towards a match across all items.
    pub fn positive_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        for item in &self.items {
            item.positive_terms(&mut terms);
        }
        terms
    }
}
