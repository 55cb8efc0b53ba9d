//! Safe arithmetic evaluation for field expressions
//!
//! Evaluates a fully-substituted expression string: numeric literals,
//! `+ - * /`, parentheses, and a whitelist of math helpers. The original
//! product evaluated these strings with dynamically constructed functions
//! behind a character denylist; here the grammar is parsed and evaluated
//! directly, so nothing can execute. The denylist check is kept at the
//! boundary: it still rejects unresolved `{...}` placeholders and keeps
//! the error taxonomy stable for callers.
//!
//! Failure policy: a denylist hit is returned as [`EvalError`] and the
//! caller leaves the field untouched; any parse or evaluation failure
//! inside the grammar degrades to `0` with a diagnostic, so one broken
//! formula cannot break the rest of a sheet.

use thiserror::Error;

/// Characters that are never valid in an arithmetic expression.
///
/// Statement separators, piping, templating. `{` and `}` also catch
/// placeholders that were never substituted.
const DENYLIST: &[char] = &[';', '&', '|', '`', '$', '{', '}'];

/// Error for expressions rejected before evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Expression contains a denylisted character
    #[error("Expression contains forbidden character '{0}'")]
    InvalidExpression(char),
}

/// Evaluate an arithmetic expression string.
///
/// Returns `Err` only for denylisted input; malformed-but-safe input
/// evaluates to `0.0` (logged at warn). Non-finite results also collapse
/// to `0.0`.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let trimmed = expression.trim();
    if let Some(bad) = trimmed.chars().find(|c| DENYLIST.contains(c)) {
        return Err(EvalError::InvalidExpression(bad));
    }

    match parse(trimmed) {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Ok(0.0),
        Err(reason) => {
            tracing::warn!(expression = trimmed, %reason, "expression evaluation failed");
            Ok(0.0)
        }
    }
}

/// Render an evaluation result the way sheet values are stored.
///
/// Integral results drop the fractional part ("15", not "15.0"); others
/// use the shortest float form ("7.5").
pub fn render_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&nc) = chars.peek() {
                    if nc.is_ascii_digit() || nc == '.' {
                        text.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = text
                    .parse()
                    .map_err(|_| format!("invalid number literal '{text}'"))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&nc) = chars.peek() {
                    // Dots allow legacy "Math.floor" spellings
                    if nc.is_alphanumeric() || nc == '_' || nc == '.' {
                        name.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn parse(input: &str) -> Result<f64, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(format!("trailing input at token {token:?}")),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            other => Err(format!("expected {expected:?}, found {other:?}")),
        }
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('-' | '+') unary | primary
    fn unary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.primary(),
        }
    }

    // primary := number | ident '(' args ')' | 'true' | 'false' | '(' expression ')'
    fn primary(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                // Checkbox values arrive as substituted "true"/"false"
                "true" => Ok(1.0),
                "false" => Ok(0.0),
                _ => {
                    self.expect(&Token::LParen)?;
                    let args = self.arguments()?;
                    self.expect(&Token::RParen)?;
                    apply_function(&name, &args)
                }
            },
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>, String> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token::RParen)) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                _ => return Ok(args),
            }
        }
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, String> {
    // Legacy formulas spell these as Math.floor etc.
    let name = name.strip_prefix("Math.").unwrap_or(name);

    let one_arg = || -> Result<f64, String> {
        match args {
            [value] => Ok(*value),
            _ => Err(format!("{name} expects exactly one argument")),
        }
    };

    match name {
        "floor" => Ok(one_arg()?.floor()),
        "ceil" => Ok(one_arg()?.ceil()),
        "round" => Ok(one_arg()?.round()),
        "trunc" => Ok(one_arg()?.trunc()),
        "abs" => Ok(one_arg()?.abs()),
        "sqrt" => Ok(one_arg()?.sqrt()),
        // Legacy parsing helpers; arguments are already numeric here, so
        // parseInt reduces to truncation and the others to identity
        "parseInt" => Ok(one_arg()?.trunc()),
        "parseFloat" | "Number" => one_arg(),
        "isNaN" => Ok(if one_arg()?.is_nan() { 1.0 } else { 0.0 }),
        "isFinite" => Ok(if one_arg()?.is_finite() { 1.0 } else { 0.0 }),
        "min" => args
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| "min expects at least one argument".to_string()),
        "max" => args
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| "max expects at least one argument".to_string()),
        other => Err(format!("unknown function '{other}'")),
    }
}
