//! Arithmetic expressions on the right-hand side of MAD-X assignments.

use std::f64::consts::PI;

use beam_core::errors::{BeamError, ErrorInfo};

use super::lexer::{Spanned, Token};

/// Name resolution used while evaluating an expression.
pub(crate) trait Scope {
    fn variable(&self, name: &str) -> Option<f64>;
    fn attribute(&self, element: &str, attribute: &str) -> Option<f64>;
}

/// Read position inside a single statement.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Spanned]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    pub(crate) fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |t| t.line)
    }

    pub(crate) fn error(&self, code: &str, message: impl Into<String>) -> BeamError {
        BeamError::Parse(ErrorInfo::new(code, message).with_context("line", self.line().to_string()))
    }

    pub(crate) fn expect(&mut self, expected: &Token) -> Result<(), BeamError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(
                "madx-syntax",
                format!("expected {expected:?}, found {:?}", self.peek()),
            ))
        }
    }

    pub(crate) fn ident(&mut self) -> Result<&'a str, BeamError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            other => Err(self.error("madx-syntax", format!("expected a name, found {other:?}"))),
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    Some(match name {
        "pi" => PI,
        "twopi" => 2.0 * PI,
        "degrad" => 180.0 / PI,
        "raddeg" => PI / 180.0,
        "e" => std::f64::consts::E,
        "clight" => 299_792_458.0,
        "emass" => 0.510_998_950_00e-3,
        "pmass" => 0.938_272_088_16,
        "mumass" => 0.105_658_375_5,
        _ => return None,
    })
}

fn function(name: &str, arg: f64) -> Option<f64> {
    Some(match name {
        "sqrt" => arg.sqrt(),
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "tan" => arg.tan(),
        "asin" => arg.asin(),
        "acos" => arg.acos(),
        "atan" => arg.atan(),
        "abs" => arg.abs(),
        "exp" => arg.exp(),
        "log" => arg.ln(),
        "log10" => arg.log10(),
        "sinh" => arg.sinh(),
        "cosh" => arg.cosh(),
        "tanh" => arg.tanh(),
        _ => return None,
    })
}

/// Evaluates `expr := term (('+' | '-') term)*`.
pub(crate) fn eval(cursor: &mut Cursor<'_>, scope: &dyn Scope) -> Result<f64, BeamError> {
    let mut value = term(cursor, scope)?;
    loop {
        if cursor.eat(&Token::Plus) {
            value += term(cursor, scope)?;
        } else if cursor.eat(&Token::Minus) {
            value -= term(cursor, scope)?;
        } else {
            return Ok(value);
        }
    }
}

fn term(cursor: &mut Cursor<'_>, scope: &dyn Scope) -> Result<f64, BeamError> {
    let mut value = unary(cursor, scope)?;
    loop {
        if cursor.eat(&Token::Star) {
            value *= unary(cursor, scope)?;
        } else if cursor.eat(&Token::Slash) {
            value /= unary(cursor, scope)?;
        } else {
            return Ok(value);
        }
    }
}

fn unary(cursor: &mut Cursor<'_>, scope: &dyn Scope) -> Result<f64, BeamError> {
    if cursor.eat(&Token::Minus) {
        return Ok(-unary(cursor, scope)?);
    }
    if cursor.eat(&Token::Plus) {
        return unary(cursor, scope);
    }
    power(cursor, scope)
}

fn power(cursor: &mut Cursor<'_>, scope: &dyn Scope) -> Result<f64, BeamError> {
    let base = primary(cursor, scope)?;
    if cursor.eat(&Token::Caret) {
        let exponent = unary(cursor, scope)?;
        return Ok(base.powf(exponent));
    }
    Ok(base)
}

fn primary(cursor: &mut Cursor<'_>, scope: &dyn Scope) -> Result<f64, BeamError> {
    match cursor.advance() {
        Some(Token::Number(value)) => Ok(*value),
        Some(Token::LParen) => {
            let value = eval(cursor, scope)?;
            cursor.expect(&Token::RParen)?;
            Ok(value)
        }
        Some(Token::Ident(name)) => {
            if cursor.eat(&Token::LParen) {
                let arg = eval(cursor, scope)?;
                cursor.expect(&Token::RParen)?;
                return function(name, arg)
                    .ok_or_else(|| cursor.error("madx-function", format!("unknown function '{name}'")));
            }
            if cursor.eat(&Token::Arrow) {
                let attribute = cursor.ident()?;
                return scope.attribute(name, attribute).ok_or_else(|| {
                    cursor.error(
                        "madx-attribute",
                        format!("element '{name}' has no attribute '{attribute}'"),
                    )
                });
            }
            scope
                .variable(name)
                .or_else(|| constant(name))
                .ok_or_else(|| cursor.error("madx-undefined", format!("undefined variable '{name}'")))
        }
        other => Err(cursor.error(
            "madx-syntax",
            format!("expected an expression, found {other:?}"),
        )),
    }
}
