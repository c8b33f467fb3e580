use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_while},
    character::complete::{char, digit1, hex_digit1, satisfy},
    combinator::{opt, peek, recognize},
    number::complete::double,
    sequence::{pair, preceded},
};
use tracing::{debug, trace};

use crate::engine::stack::ensure_sufficient_stack;
use crate::engine::value::Value;

// Exactly these three characters separate atoms.
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t')
}

fn is_symbol_terminator(c: char) -> bool {
    is_whitespace(c) || c == ')'
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while(is_whitespace).parse(input)
}

// A double-quoted run without escapes. A missing closing quote runs to end of input.
fn string_literal(input: &str) -> IResult<&str, Value> {
    preceded(char('"'), pair(take_till(|c: char| c == '"'), opt(char('"'))))
        .map(|(text, _): (&str, Option<char>)| Value::String(text.to_string()))
        .parse(input)
}

// A numeral starts with a digit, or with '-' immediately followed by a digit.
fn numeral_start(input: &str) -> IResult<&str, &str> {
    peek(alt((
        recognize(pair(char('-'), satisfy(|c| c.is_ascii_digit()))),
        recognize(satisfy(|c| c.is_ascii_digit())),
    )))
    .parse(input)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}

// `0x` numerals are hexadecimal integers, read as a double like any other numeral.
fn hex_numeral(input: &str) -> IResult<&str, Value> {
    let (rest, (sign, digits)) = (
        opt(char('-')),
        preceded(alt((tag("0x"), tag("0X"))), hex_digit1),
    )
        .parse(input)?;
    let magnitude = digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0.0, |acc, d| acc * 16.0 + f64::from(d));
    Ok((rest, number_value(if sign.is_some() { -magnitude } else { magnitude })))
}

#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
fn number(input: &str) -> IResult<&str, Value> {
    let (input, _) = numeral_start(input)?;
    if let Ok(hex) = hex_numeral(input) {
        return Ok(hex);
    }
    let full: IResult<&str, f64> = double(input);
    match full {
        Ok((rest, n)) => Ok((rest, number_value(n))),
        Err(_) => {
            // `double` rejects a dangling exponent such as "1e"; keep the integer part.
            let (rest, digits) = recognize(pair(opt(char('-')), digit1)).parse(input)?;
            trace!(digits, "Falling back to integer part of numeral");
            Ok((rest, number_value(digits.parse::<f64>().unwrap_or(0.0))))
        }
    }
}

fn symbol(input: &str) -> IResult<&str, Value> {
    take_till1(is_symbol_terminator)
        .map(|s: &str| Value::Symbol(s.to_string()))
        .parse(input)
}

/// Cursor over script text producing one form per [`Reader::parse`] call.
///
/// Malformed text never produces an error: an unterminated list closes at end of
/// input, a stray `)` at top level is skipped and reads as `nil`, and every call
/// consumes at least one character when any input remains.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    rest: &'a str,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { rest: source }
    }

    pub fn remaining(&self) -> &'a str {
        self.rest
    }

    fn skip_whitespace(&mut self) {
        if let Ok((rest, _)) = whitespace(self.rest) {
            self.rest = rest;
        }
    }

    /// True once only whitespace remains.
    pub fn eof(&mut self) -> bool {
        self.skip_whitespace();
        self.rest.is_empty()
    }

    pub fn parse(&mut self) -> Value {
        self.skip_whitespace();
        let mut chars = self.rest.chars();
        match chars.next() {
            None => Value::Nil,
            Some('(') => {
                self.rest = chars.as_str();
                ensure_sufficient_stack(|| self.parse_list())
            }
            Some(')') => {
                debug!("Skipping unmatched ')'");
                self.rest = chars.as_str();
                Value::Nil
            }
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_list(&mut self) -> Value {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            let mut chars = self.rest.chars();
            match chars.next() {
                None => {
                    debug!(items = items.len(), "Unterminated list closed at end of input");
                    break;
                }
                Some(')') => {
                    self.rest = chars.as_str();
                    break;
                }
                Some(_) => items.push(self.parse()),
            }
        }
        Value::List(items)
    }

    fn parse_atom(&mut self) -> Value {
        match alt((string_literal, number, symbol)).parse(self.rest) {
            Ok((rest, value)) => {
                self.rest = rest;
                value
            }
            Err(e) => {
                debug!(error = %e, "Unreadable atom, skipping one character");
                let mut chars = self.rest.chars();
                chars.next();
                self.rest = chars.as_str();
                Value::Nil
            }
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.eof() {
            None
        } else {
            Some(self.parse())
        }
    }
}

/// Reads one form and any whitespace after it, returning the unread remainder.
pub fn parse_expr(input: &str) -> (&str, Value) {
    let mut reader = Reader::new(input);
    let value = reader.parse();
    reader.skip_whitespace();
    (reader.remaining(), value)
}
