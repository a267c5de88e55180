//! Row filter expressions
//!
//! A small boolean language evaluated against one row at a time:
//!
//! ```text
//! {age} >= 18 and ({state} == 'NY' or not {verified})
//! ```
//!
//! Fields are written in braces. Literals are quoted strings, numbers,
//! `None`/`null`, `True`/`False`. A bare operand tests truthiness.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::{Result, TableError};
use crate::model::{CellValue, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, left: &CellValue, right: &CellValue) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left.compare(right) == Some(Ordering::Less),
            CompareOp::Le => {
                matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal))
            }
            CompareOp::Gt => left.compare(right) == Some(Ordering::Greater),
            CompareOp::Ge => {
                matches!(left.compare(right), Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

/// Parsed filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(String),
    Literal(CellValue),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Parse an expression
    pub fn parse(source: &str) -> Result<Expr> {
        let tokens = tokenize(source)?;
        let mut parser = ExprParser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(TableError::invalid(format!(
                "unexpected trailing input in expression {source:?}"
            )));
        }
        Ok(expr)
    }

    /// Evaluate against a row
    pub fn evaluate(&self, row: &Row<'_>) -> Result<bool> {
        match self {
            Expr::Compare(left, op, right) => {
                let left = left.value(row)?;
                let right = right.value(row)?;
                Ok(op.holds(&left, &right))
            }
            Expr::And(left, right) => Ok(left.evaluate(row)? && right.evaluate(row)?),
            Expr::Or(left, right) => Ok(left.evaluate(row)? || right.evaluate(row)?),
            Expr::Not(inner) => Ok(!inner.evaluate(row)?),
            Expr::Field(_) | Expr::Literal(_) => Ok(self.value(row)?.is_truthy()),
        }
    }

    fn value<'a>(&'a self, row: &Row<'a>) -> Result<Cow<'a, CellValue>> {
        match self {
            Expr::Field(name) => row
                .get(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| TableError::UnknownColumn(name.clone())),
            Expr::Literal(value) => Ok(Cow::Borrowed(value)),
            other => Ok(Cow::Owned(CellValue::Bool(other.evaluate(row)?))),
        }
    }
}

impl std::str::FromStr for Expr {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        Expr::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Field(String),
    Literal(CellValue),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '{' => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => {
                            return Err(TableError::invalid(format!(
                                "unterminated field reference at offset {start}"
                            )))
                        }
                    }
                }
                tokens.push(Token::Field(name));
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == c => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        },
                        Some((_, ch)) => text.push(ch),
                        None => {
                            return Err(TableError::invalid(format!(
                                "unterminated string at offset {start}"
                            )))
                        }
                    }
                }
                tokens.push(Token::Literal(CellValue::String(text)));
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some((_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                let op = match (c, followed_by_eq) {
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::Ne,
                    ('<', true) => CompareOp::Le,
                    ('>', true) => CompareOp::Ge,
                    ('<', false) => CompareOp::Lt,
                    ('>', false) => CompareOp::Gt,
                    _ => {
                        return Err(TableError::invalid(format!(
                            "unknown operator at offset {start}"
                        )))
                    }
                };
                tokens.push(Token::Op(op));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut text = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' || ch == '-' || ch == 'e' || ch == 'E' {
                        text.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = if let Ok(i) = text.parse::<i64>() {
                    CellValue::Int(i)
                } else if let Ok(f) = text.parse::<f64>() {
                    CellValue::Float(f)
                } else {
                    return Err(TableError::invalid(format!("bad number {text:?}")));
                };
                tokens.push(Token::Literal(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        word.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = match word.as_str() {
                    "and" | "AND" => Token::And,
                    "or" | "OR" => Token::Or,
                    "not" | "NOT" => Token::Not,
                    "None" | "null" | "NULL" => Token::Literal(CellValue::Null),
                    "True" | "true" => Token::Literal(CellValue::Bool(true)),
                    "False" | "false" => Token::Literal(CellValue::Bool(false)),
                    _ => {
                        return Err(TableError::invalid(format!(
                            "unexpected word {word:?}; fields are written as {{{word}}}"
                        )))
                    }
                };
                tokens.push(token);
            }
            other => {
                return Err(TableError::invalid(format!(
                    "unexpected character {other:?} at offset {start}"
                )))
            }
        }
    }

    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_operand()?;
        if let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.parse_operand()?;
            return Ok(Expr::Compare(Box::new(left), op, Box::new(right)));
        }
        Ok(left)
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Field(name)) => Ok(Expr::Field(name)),
            Some(Token::Literal(value)) => Ok(Expr::Literal(value)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(TableError::invalid("missing closing parenthesis")),
                }
            }
            Some(token) => Err(TableError::invalid(format!("unexpected token {token:?}"))),
            None => Err(TableError::invalid("expression ended unexpectedly")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    fn people() -> Table {
        Table::from_rows(
            ["name", "age", "state"],
            vec![
                vec!["ann".into(), 17.into(), "NY".into()],
                vec!["bob".into(), 30.into(), "CA".into()],
                vec!["cy".into(), 45.5.into(), CellValue::Null],
            ],
        )
        .unwrap()
    }

    fn matching(source: &str) -> Vec<String> {
        let expr = Expr::parse(source).unwrap();
        people()
            .rows()
            .filter(|row| expr.evaluate(row).unwrap())
            .map(|row| row.get("name").unwrap().display().into_owned())
            .collect()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(matching("{age} >= 18"), vec!["bob", "cy"]);
        assert_eq!(matching("{state} == 'NY'"), vec!["ann"]);
        assert_eq!(matching("{state} != \"NY\""), vec!["bob", "cy"]);
        assert_eq!(matching("{age} < 30.0"), vec!["ann"]);
    }

    #[test]
    fn test_boolean_logic_and_none() {
        assert_eq!(matching("{age} > 18 and {state} == None"), vec!["cy"]);
        assert_eq!(matching("not ({state} == 'CA' or {age} < 18)"), vec!["cy"]);
        assert_eq!(matching("{state}"), vec!["ann", "bob"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expr::parse("{age} >").is_err());
        assert!(Expr::parse("{age").is_err());
        assert!(Expr::parse("age > 3").is_err());
        assert!(Expr::parse("({age} > 3").is_err());
        assert!(Expr::parse("{age} = 3").is_err());
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let expr = Expr::parse("{nope} == 1").unwrap();
        let table = people();
        let row = table.row(0).unwrap();
        assert_eq!(
            expr.evaluate(&row).unwrap_err(),
            TableError::UnknownColumn("nope".into())
        );
    }
}
