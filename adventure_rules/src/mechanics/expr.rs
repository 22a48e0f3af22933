//! A closed boolean condition language over flag names.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or_expr    := and_expr (("or" | "||") and_expr)*
//! and_expr   := not_expr (("and" | "&&") not_expr)*
//! not_expr   := ("not" | "!") not_expr | comparison
//! comparison := primary (("==" | "!=") primary)*
//! primary    := identifier | "true" | "false" | "True" | "False" | "(" or_expr ")"
//! ```
//!
//! Identifiers read a flag, absent flags are false. Chained comparisons hold
//! only if every adjacent pair holds (`a == b == c` means `a == b and b == c`).

use std::collections::HashMap;

use crate::error::ExprError;

/// Deepest allowed nesting of parentheses and `not`.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Bool(bool),
    And,
    Or,
    Not,
    Eq,
    Ne,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(match word.as_str() {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                "true" | "True" => Token::Bool(true),
                "false" | "False" => Token::Bool(false),
                _ => Token::Ident(word),
            });
            continue;
        }

        chars.next();
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' | '!' | '&' | '|' => {
                let next = chars.peek().map(|&(_, c)| c);
                match (c, next) {
                    ('=', Some('=')) => {
                        chars.next();
                        Token::Eq
                    }
                    ('!', Some('=')) => {
                        chars.next();
                        Token::Ne
                    }
                    ('&', Some('&')) => {
                        chars.next();
                        Token::And
                    }
                    ('|', Some('|')) => {
                        chars.next();
                        Token::Or
                    }
                    ('!', _) => Token::Not,
                    _ => return Err(ExprError::UnexpectedChar { found: c, pos }),
                }
            }
            _ => return Err(ExprError::UnexpectedChar { found: c, pos }),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Flag(String),
    Literal(bool),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// Chain of operands joined by `==` (`true`) or `!=` (`false`).
    Compare(Box<Expr>, Vec<(bool, Expr)>),
}

impl Expr {
    /// Parse an expression. Empty input is an error.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.or_expr()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(expr),
            Some(token) => Err(ExprError::TrailingInput(format!("{:?}", token))),
        }
    }

    /// Evaluate against a flag mapping. Reads only the mapping.
    pub fn eval(&self, flags: &HashMap<String, bool>) -> bool {
        match self {
            Expr::Flag(name) => flags.get(name).copied().unwrap_or(false),
            Expr::Literal(value) => *value,
            Expr::Not(inner) => !inner.eval(flags),
            Expr::And(terms) => terms.iter().all(|t| t.eval(flags)),
            Expr::Or(terms) => terms.iter().any(|t| t.eval(flags)),
            Expr::Compare(first, rest) => {
                let mut left = first.eval(flags);
                for (equal, operand) in rest {
                    let right = operand.eval(flags);
                    if (left == right) != *equal {
                        return false;
                    }
                    left = right;
                }
                true
            }
        }
    }

    /// Flag names referenced anywhere in the expression.
    pub fn flags(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_flags(&mut out);
        out
    }

    fn collect_flags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Flag(name) => out.push(name),
            Expr::Literal(_) => {}
            Expr::Not(inner) => inner.collect_flags(out),
            Expr::And(terms) | Expr::Or(terms) => {
                terms.iter().for_each(|t| t.collect_flags(out));
            }
            Expr::Compare(first, rest) => {
                first.collect_flags(out);
                rest.iter().for_each(|(_, t)| t.collect_flags(out));
            }
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExprError::TooDeep(MAX_NESTING));
        }
        Ok(())
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut terms = vec![self.and_expr()?];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            terms.push(self.and_expr()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut terms = vec![self.not_expr()?];
        while self.peek() == Some(&Token::And) {
            self.advance();
            terms.push(self.not_expr()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn not_expr(&mut self) -> Result<Expr, ExprError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            self.enter()?;
            let inner = self.not_expr()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.primary()?;
        let mut rest = Vec::new();
        loop {
            let equal = match self.peek() {
                Some(Token::Eq) => true,
                Some(Token::Ne) => false,
                _ => break,
            };
            self.advance();
            rest.push((equal, self.primary()?));
        }
        Ok(if rest.is_empty() {
            first
        } else {
            Expr::Compare(Box::new(first), rest)
        })
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(Expr::Flag(name)),
            Some(Token::Bool(value)) => Ok(Expr::Literal(value)),
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.or_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(ExprError::Unexpected(format!("{:?}", token))),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExprError::Unexpected(format!("{:?}", token))),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
