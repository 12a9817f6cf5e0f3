//! Arithmetic Expression Evaluator
//!
//! Evaluates the expression captured by the calculator matcher. Input is
//! first reduced to ASCII digits and `+ - * / ( ) .`, then tokenized and
//! evaluated by a small recursive-descent parser. There are no names,
//! calls or assignments in the grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```

use std::fmt;

use crate::error::ExpressionError;

/// Maximum nesting of parentheses and unary signs
const MAX_DEPTH: usize = 64;

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Drop every character outside the arithmetic alphabet
pub fn sanitize(expression: &str) -> String {
    expression.chars().filter(|c| is_allowed(*c)).collect()
}

/// Evaluate a free-form arithmetic expression
pub fn evaluate(expression: &str) -> Result<f64, ExpressionError> {
    let clean = sanitize(expression);

    if clean.is_empty() || !clean.chars().all(is_allowed) {
        return Err(ExpressionError::DisallowedCharacters);
    }

    if clean.matches('(').count() != clean.matches(')').count() {
        return Err(ExpressionError::UnbalancedParentheses);
    }

    let tokens = tokenize(&clean)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };

    let value = parser.expression()?;
    if let Some(extra) = parser.peek() {
        return Err(ExpressionError::Syntax(format!("неожиданный символ '{}'", extra)));
    }

    if !value.is_finite() {
        return Err(ExpressionError::NonFinite);
    }

    Ok(value)
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' | '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                let literal = &input[start..end];
                if literal.matches('.').count() > 1 {
                    return Err(ExpressionError::Syntax(format!(
                        "некорректное число '{}'",
                        literal
                    )));
                }
                let value = literal.parse::<f64>().map_err(|_| {
                    ExpressionError::Syntax(format!("некорректное число '{}'", literal))
                })?;
                Token::Number(value)
            }
            other => {
                return Err(ExpressionError::Syntax(format!(
                    "неожиданный символ '{}'",
                    other
                )))
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

// ============================================================================
// Recursive-descent evaluation
// ============================================================================

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn nested<F>(&mut self, f: F) -> Result<f64, ExpressionError>
    where
        F: FnOnce(&mut Self) -> Result<f64, ExpressionError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::Syntax(
                "слишком глубокая вложенность".to_string(),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;

        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }

        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.unary()?;

        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                value / rhs
            };
        }

        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(|p| p.unary()).map(|v| -v)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(|p| p.unary())
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, ExpressionError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.nested(|p| p.expression())?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExpressionError::Syntax(format!(
                        "ожидалась ')', получено '{}'",
                        other
                    ))),
                    None => Err(ExpressionError::Syntax("ожидалась ')'".to_string())),
                }
            }
            Some(other) => Err(ExpressionError::Syntax(format!(
                "неожиданный символ '{}'",
                other
            ))),
            None => Err(ExpressionError::Syntax(
                "неожиданный конец выражения".to_string(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
